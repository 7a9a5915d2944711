//! Customer reviews of business users
//!
//! One review per `(business_user, reviewer)` pair, enforced by the store.
//! Only the reviewer may change or remove a review.

pub mod query;
pub mod service;

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::UserId;
use crate::models::Review;

pub use query::{ReviewListParams, ReviewOrdering, ReviewQuery};
pub use service::ReviewService;

/// POST /api/reviews/
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewReview {
    #[schema(example = 2)]
    pub business_user: UserId,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    #[schema(example = 4)]
    pub rating: i32,
    #[serde(default)]
    pub description: String,
}

/// PATCH /api/reviews/{id}/
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ReviewPatch {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: Option<i32>,
    pub description: Option<String>,
}

impl ReviewPatch {
    pub fn apply(&self, review: &mut Review) {
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if let Some(description) = &self.description {
            review.description = description.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let review = NewReview {
                business_user: 1,
                rating,
                description: String::new(),
            };
            assert_eq!(review.validate().is_ok(), ok, "rating {}", rating);
        }
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let mut review = Review {
            id: 1,
            business_user: 2,
            reviewer: 3,
            rating: 4,
            description: "Solid work".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        ReviewPatch {
            rating: Some(5),
            description: None,
        }
        .apply(&mut review);
        assert_eq!(review.rating, 5);
        assert_eq!(review.description, "Solid work");
    }

    #[test]
    fn test_reviewer_is_not_accepted_from_payload() {
        let json = r#"{"business_user": 2, "rating": 5, "reviewer": 9}"#;
        assert!(serde_json::from_str::<NewReview>(json).is_err());
    }
}
