//! Review listing filters

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;
use utoipa::IntoParams;

use crate::core_types::UserId;
use crate::error::{DomainError, DomainResult};
use crate::models::Review;

/// Raw query parameters of GET /api/reviews/
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListParams {
    /// Reviews about this business user
    pub business_user_id: Option<String>,
    /// Reviews written by this user
    pub reviewer_id: Option<String>,
    /// `updated_at`, `-updated_at`, `rating` or `-rating`
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewOrdering {
    UpdatedAtAsc,
    #[default]
    UpdatedAtDesc,
    RatingAsc,
    RatingDesc,
}

impl FromStr for ReviewOrdering {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "updated_at" => Ok(Self::UpdatedAtAsc),
            "-updated_at" => Ok(Self::UpdatedAtDesc),
            "rating" => Ok(Self::RatingAsc),
            "-rating" => Ok(Self::RatingDesc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewQuery {
    pub business_user: Option<UserId>,
    pub reviewer: Option<UserId>,
    pub ordering: ReviewOrdering,
}

fn parse_id(raw: Option<&str>, field: &str) -> DomainResult<Option<UserId>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| DomainError::validation(field, "must be an integer")),
    }
}

impl ReviewQuery {
    pub fn parse(params: &ReviewListParams) -> DomainResult<Self> {
        let ordering = match params.ordering.as_deref().map(str::trim) {
            None | Some("") => ReviewOrdering::default(),
            Some(raw) => raw.parse().map_err(|_| {
                DomainError::validation(
                    "ordering",
                    "must be one of updated_at, -updated_at, rating, -rating",
                )
            })?,
        };
        Ok(Self {
            business_user: parse_id(params.business_user_id.as_deref(), "business_user_id")?,
            reviewer: parse_id(params.reviewer_id.as_deref(), "reviewer_id")?,
            ordering,
        })
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.business_user.is_none_or(|id| review.business_user == id)
            && self.reviewer.is_none_or(|id| review.reviewer == id)
    }

    /// Requested key, then id
    pub fn compare(&self, a: &Review, b: &Review) -> Ordering {
        let primary = match self.ordering {
            ReviewOrdering::UpdatedAtAsc => a.updated_at.cmp(&b.updated_at),
            ReviewOrdering::UpdatedAtDesc => b.updated_at.cmp(&a.updated_at),
            ReviewOrdering::RatingAsc => a.rating.cmp(&b.rating),
            ReviewOrdering::RatingDesc => b.rating.cmp(&a.rating),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}
