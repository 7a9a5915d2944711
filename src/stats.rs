//! Platform statistics shown on the landing page

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::authz::{Actor, policy};
use crate::error::DomainResult;
use crate::store::MarketStore;

/// GET /api/base-info/
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct BaseInfo {
    pub review_count: u64,
    /// Mean rating over all reviews, one decimal place, 0 without reviews
    #[schema(example = 4.6)]
    pub average_rating: f64,
    pub business_profile_count: u64,
    pub offer_count: u64,
}

impl BaseInfo {
    /// Build from raw aggregates as counted by a store
    pub fn from_totals(
        review_count: u64,
        rating_sum: i64,
        business_profile_count: u64,
        offer_count: u64,
    ) -> Self {
        let average_rating = if review_count == 0 {
            0.0
        } else {
            (rating_sum as f64 / review_count as f64 * 10.0).round() / 10.0
        };
        Self {
            review_count,
            average_rating,
            business_profile_count,
            offer_count,
        }
    }
}

pub struct StatsService {
    store: Arc<dyn MarketStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    pub async fn base_info(&self, actor: &Actor) -> DomainResult<BaseInfo> {
        policy::STATS_LIST.check(actor)?;
        Ok(self.store.base_info().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_is_rounded_to_one_decimal() {
        let info = BaseInfo::from_totals(3, 14, 2, 5);
        assert_eq!(info.average_rating, 4.7);
        assert_eq!(BaseInfo::from_totals(2, 9, 0, 0).average_rating, 4.5);
    }

    #[test]
    fn test_no_reviews() {
        let info = BaseInfo::from_totals(0, 0, 1, 1);
        assert_eq!(info.average_rating, 0.0);
        assert_eq!(info.business_profile_count, 1);
    }

    #[tokio::test]
    async fn test_public_endpoint() {
        let store = Arc::new(crate::store::MemoryStore::new());
        let service = StatsService::new(store);
        let info = service.base_info(&Actor::Anonymous).await.unwrap();
        assert_eq!(info.review_count, 0);
        assert_eq!(info.offer_count, 0);
    }
}
