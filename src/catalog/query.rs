//! Offer listing filters and ordering
//!
//! Raw query strings are parsed into a typed [`OfferQuery`] at the service
//! boundary. Filters on `min_price` and `max_delivery_time` apply to the
//! computed tier aggregates, never to stored columns:
//!
//! - `min_price=X`: offers whose cheapest tier costs **at most** X
//! - `max_delivery_time=N`: offers whose fastest tier takes at most N days
//!
//! Offers without tiers have no aggregates and never match either filter.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::core_types::UserId;
use crate::error::{DomainError, DomainResult};
use crate::models::Offer;
use crate::pagination::{PageRequest, PaginationConfig};

/// Raw query parameters of GET /api/offers/
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OfferListParams {
    /// Only offers of this business user
    pub creator_id: Option<String>,
    /// Cheapest tier at most this price
    pub min_price: Option<String>,
    /// Fastest tier at most this many days
    pub max_delivery_time: Option<String>,
    /// Substring of title or description
    pub search: Option<String>,
    /// `updated_at`, `-updated_at`, `min_price` or `-min_price`
    pub ordering: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OfferOrdering {
    UpdatedAtAsc,
    #[default]
    UpdatedAtDesc,
    MinPriceAsc,
    MinPriceDesc,
}

impl FromStr for OfferOrdering {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "updated_at" => Ok(Self::UpdatedAtAsc),
            "-updated_at" => Ok(Self::UpdatedAtDesc),
            "min_price" => Ok(Self::MinPriceAsc),
            "-min_price" => Ok(Self::MinPriceDesc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferQuery {
    pub creator_id: Option<UserId>,
    pub min_price: Option<Decimal>,
    pub max_delivery_time: Option<i32>,
    /// Lowercased search term
    pub search: Option<String>,
    pub ordering: OfferOrdering,
    pub page: PageRequest,
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl OfferQuery {
    pub fn parse(params: &OfferListParams, pagination: &PaginationConfig) -> DomainResult<Self> {
        let creator_id = non_empty(&params.creator_id)
            .map(|raw| {
                raw.parse::<UserId>()
                    .map_err(|_| DomainError::validation("creator_id", "must be an integer"))
            })
            .transpose()?;

        let min_price = non_empty(&params.min_price)
            .map(|raw| {
                raw.parse::<Decimal>()
                    .map_err(|_| DomainError::validation("min_price", "must be a number"))
            })
            .transpose()?;

        let max_delivery_time = non_empty(&params.max_delivery_time)
            .map(|raw| {
                raw.parse::<i32>().map_err(|_| {
                    DomainError::validation("max_delivery_time", "must be an integer")
                })
            })
            .transpose()?;

        let ordering = match non_empty(&params.ordering) {
            None => OfferOrdering::default(),
            Some(raw) => raw.parse().map_err(|_| {
                DomainError::validation(
                    "ordering",
                    "must be one of updated_at, -updated_at, min_price, -min_price",
                )
            })?,
        };

        let page = PageRequest::parse(
            params.page.as_deref(),
            params.page_size.as_deref(),
            pagination,
        )?;

        Ok(Self {
            creator_id,
            min_price,
            max_delivery_time,
            search: non_empty(&params.search).map(str::to_lowercase),
            ordering,
            page,
        })
    }

    /// Whether an offer passes every filter
    pub fn matches(&self, offer: &Offer) -> bool {
        if self.creator_id.is_some_and(|id| offer.user != id) {
            return false;
        }
        if let Some(bound) = self.min_price
            && !offer.min_price().is_some_and(|p| p <= bound)
        {
            return false;
        }
        if let Some(bound) = self.max_delivery_time
            && !offer.min_delivery_time().is_some_and(|d| d <= bound)
        {
            return false;
        }
        if let Some(term) = &self.search
            && !offer.title.to_lowercase().contains(term.as_str())
            && !offer.description.to_lowercase().contains(term.as_str())
        {
            return false;
        }
        true
    }

    /// Total order used by every store: the requested key, then id.
    /// Offers without tiers sort after priced ones in both directions.
    pub fn compare(&self, a: &Offer, b: &Offer) -> Ordering {
        let primary = match self.ordering {
            OfferOrdering::UpdatedAtAsc => a.updated_at.cmp(&b.updated_at),
            OfferOrdering::UpdatedAtDesc => b.updated_at.cmp(&a.updated_at),
            OfferOrdering::MinPriceAsc => nulls_last(a.min_price(), b.min_price(), false),
            OfferOrdering::MinPriceDesc => nulls_last(a.min_price(), b.min_price(), true),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

fn nulls_last(a: Option<Decimal>, b: Option<Decimal>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OfferDetail, OfferType};
    use chrono::{Duration, Utc};

    fn params(pairs: &[(&str, &str)]) -> OfferListParams {
        let mut p = OfferListParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "creator_id" => p.creator_id = v,
                "min_price" => p.min_price = v,
                "max_delivery_time" => p.max_delivery_time = v,
                "search" => p.search = v,
                "ordering" => p.ordering = v,
                "page" => p.page = v,
                "page_size" => p.page_size = v,
                other => panic!("unknown param {}", other),
            }
        }
        p
    }

    fn parse(pairs: &[(&str, &str)]) -> DomainResult<OfferQuery> {
        OfferQuery::parse(&params(pairs), &PaginationConfig::default())
    }

    fn offer(id: i64, owner: UserId, tiers: &[(i64, i32)], age_min: i64) -> Offer {
        let now = Utc::now();
        Offer {
            id,
            user: owner,
            title: format!("Offer {}", id),
            image: None,
            description: "Website design".into(),
            created_at: now,
            updated_at: now - Duration::minutes(age_min),
            details: tiers
                .iter()
                .zip([OfferType::Basic, OfferType::Standard, OfferType::Premium])
                .map(|((price, days), offer_type)| OfferDetail {
                    id: id * 10,
                    offer_id: id,
                    user: owner,
                    title: offer_type.to_string(),
                    revisions: 1,
                    delivery_time_in_days: *days,
                    price: Decimal::from(*price),
                    features: vec![],
                    offer_type,
                })
                .collect(),
        }
    }

    #[test]
    fn test_defaults() {
        let q = parse(&[]).unwrap();
        assert_eq!(q.creator_id, None);
        assert_eq!(q.ordering, OfferOrdering::UpdatedAtDesc);
        assert_eq!(q.page.page_size, 6);
    }

    #[test]
    fn test_malformed_filters_are_field_labeled() {
        assert_eq!(
            parse(&[("creator_id", "abc")]).unwrap_err(),
            DomainError::validation("creator_id", "must be an integer")
        );
        assert_eq!(
            parse(&[("min_price", "cheap")]).unwrap_err(),
            DomainError::validation("min_price", "must be a number")
        );
        assert_eq!(
            parse(&[("max_delivery_time", "1.5")]).unwrap_err(),
            DomainError::validation("max_delivery_time", "must be an integer")
        );
        assert!(matches!(
            parse(&[("ordering", "title")]).unwrap_err(),
            DomainError::Validation { ref field, .. } if field == "ordering"
        ));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let q = parse(&[("creator_id", ""), ("min_price", " ")]).unwrap();
        assert_eq!(q.creator_id, None);
        assert_eq!(q.min_price, None);
    }

    #[test]
    fn test_min_price_is_an_upper_bound_on_cheapest_tier() {
        let q = parse(&[("min_price", "10")]).unwrap();
        assert!(q.matches(&offer(1, 1, &[(10, 5), (50, 2)], 0)));
        assert!(!q.matches(&offer(2, 1, &[(11, 5), (50, 2)], 0)));
        assert!(!q.matches(&offer(3, 1, &[], 0)));
    }

    #[test]
    fn test_max_delivery_time_uses_fastest_tier() {
        let q = parse(&[("max_delivery_time", "2")]).unwrap();
        assert!(q.matches(&offer(1, 1, &[(10, 5), (50, 2)], 0)));
        assert!(!q.matches(&offer(2, 1, &[(10, 5), (50, 3)], 0)));
    }

    #[test]
    fn test_creator_and_search() {
        let q = parse(&[("creator_id", "7"), ("search", "WEBSITE")]).unwrap();
        assert!(q.matches(&offer(1, 7, &[(10, 5)], 0)));
        assert!(!q.matches(&offer(2, 8, &[(10, 5)], 0)));
        let q = parse(&[("search", "mobile")]).unwrap();
        assert!(!q.matches(&offer(1, 7, &[(10, 5)], 0)));
    }

    #[test]
    fn test_ordering_by_min_price() {
        let mut offers = vec![
            offer(1, 1, &[(30, 1)], 0),
            offer(2, 1, &[], 0),
            offer(3, 1, &[(10, 1), (90, 1)], 0),
        ];
        let q = parse(&[("ordering", "min_price")]).unwrap();
        offers.sort_by(|a, b| q.compare(a, b));
        assert_eq!(offers.iter().map(|o| o.id).collect::<Vec<_>>(), vec![3, 1, 2]);

        let q = parse(&[("ordering", "-min_price")]).unwrap();
        offers.sort_by(|a, b| q.compare(a, b));
        assert_eq!(offers.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 3, 2]);
    }

    #[test]
    fn test_default_ordering_is_newest_update_first() {
        let mut offers = vec![offer(1, 1, &[(1, 1)], 30), offer(2, 1, &[(1, 1)], 5)];
        let q = parse(&[]).unwrap();
        offers.sort_by(|a, b| q.compare(a, b));
        assert_eq!(offers[0].id, 2);
    }
}
