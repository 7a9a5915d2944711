use std::sync::Arc;

use validator::Validate;

use super::query::{ReviewListParams, ReviewQuery};
use super::{NewReview, ReviewPatch};
use crate::authz::{Actor, policy};
use crate::core_types::ReviewId;
use crate::error::{DomainError, DomainResult};
use crate::models::Review;
use crate::store::{MarketStore, StoreError};

pub struct ReviewService {
    store: Arc<dyn MarketStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    pub async fn create_review(&self, actor: &Actor, req: NewReview) -> DomainResult<Review> {
        policy::REVIEW_CREATE.check(actor)?;
        let reviewer = actor.require_user()?;
        req.validate()
            .map_err(|e| DomainError::from_validation(&e))?;

        match self.store.get_user(req.business_user).await? {
            Some(user) if user.is_business() => {}
            _ => {
                return Err(DomainError::validation(
                    "business_user",
                    "must reference a business user",
                ));
            }
        }

        let review = self
            .store
            .create_review(reviewer.id, &req)
            .await
            .map_err(|err| match err {
                StoreError::Conflict(_) => {
                    tracing::warn!(
                        reviewer = reviewer.id,
                        business_user = req.business_user,
                        "duplicate review rejected"
                    );
                    DomainError::forbidden("You have already reviewed this business user")
                }
                StoreError::ForeignKey(_) => {
                    DomainError::validation("business_user", "must reference a business user")
                }
                other => other.into(),
            })?;
        tracing::info!(
            review_id = review.id,
            reviewer = review.reviewer,
            business_user = review.business_user,
            rating = review.rating,
            "review created"
        );
        Ok(review)
    }

    pub async fn update_review(
        &self,
        actor: &Actor,
        id: ReviewId,
        patch: ReviewPatch,
    ) -> DomainResult<Review> {
        policy::REVIEW_UPDATE.check(actor)?;
        let review = self.load(id).await?;
        policy::REVIEW_UPDATE.check_object(actor, &review)?;
        patch
            .validate()
            .map_err(|e| DomainError::from_validation(&e))?;

        let updated = self
            .store
            .update_review(id, review.reviewer, &patch)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => DomainError::not_found("Review not found"),
                other => other.into(),
            })?;
        tracing::info!(review_id = id, rating = updated.rating, "review updated");
        Ok(updated)
    }

    pub async fn delete_review(&self, actor: &Actor, id: ReviewId) -> DomainResult<()> {
        policy::REVIEW_DELETE.check(actor)?;
        let review = self.load(id).await?;
        policy::REVIEW_DELETE.check_object(actor, &review)?;

        self.store
            .delete_review(id, review.reviewer)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => DomainError::not_found("Review not found"),
                other => other.into(),
            })?;
        tracing::info!(review_id = id, "review deleted");
        Ok(())
    }

    pub async fn list_reviews(
        &self,
        actor: &Actor,
        params: &ReviewListParams,
    ) -> DomainResult<Vec<Review>> {
        policy::REVIEW_LIST.check(actor)?;
        let query = ReviewQuery::parse(params)?;
        Ok(self.store.list_reviews(&query).await?)
    }

    async fn load(&self, id: ReviewId) -> DomainResult<Review> {
        self.store
            .get_review(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Review not found"))
    }
}
