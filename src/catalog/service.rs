use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use validator::Validate;

use super::query::{OfferListParams, OfferQuery};
use super::types::{NewOffer, OfferDetailInput, OfferDetailPatch, OfferPatch, OfferView};
use crate::authz::{Actor, policy};
use crate::core_types::{OfferDetailId, OfferId, UserId};
use crate::error::{DomainError, DomainResult};
use crate::models::{Offer, OfferDetail, User};
use crate::pagination::{Page, PaginationConfig};
use crate::store::{MarketStore, StoreError};

/// Offer catalog: offers, their tiers and the public listing
pub struct OfferService {
    store: Arc<dyn MarketStore>,
    pagination: PaginationConfig,
}

impl OfferService {
    pub fn new(store: Arc<dyn MarketStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    pub async fn create_offer(&self, actor: &Actor, req: NewOffer) -> DomainResult<OfferView> {
        policy::OFFER_CREATE.check(actor)?;
        let owner = actor.require_user()?;

        req.validate()
            .map_err(|e| DomainError::from_validation(&e))?;
        if req.details.is_empty() {
            return Err(DomainError::validation(
                "details",
                "an offer needs at least one tier",
            ));
        }
        validate_tiers(&req.details)?;

        let offer = self.store.create_offer(owner.id, &req).await?;
        tracing::info!(
            offer_id = offer.id,
            user_id = owner.id,
            tiers = offer.details.len(),
            "offer created"
        );
        Ok(OfferView::new(offer, Some(owner)))
    }

    pub async fn get_offer(&self, actor: &Actor, id: OfferId) -> DomainResult<OfferView> {
        policy::OFFER_RETRIEVE.check(actor)?;
        let offer = self.load(id).await?;
        policy::OFFER_RETRIEVE.check_object(actor, &offer)?;
        let owner = self.store.get_user(offer.user).await?;
        Ok(OfferView::new(offer, owner.as_ref()))
    }

    /// Patch an offer; listed tiers are upserted by `offer_type`, the
    /// others are left untouched.
    pub async fn update_offer(
        &self,
        actor: &Actor,
        id: OfferId,
        patch: OfferPatch,
    ) -> DomainResult<OfferView> {
        policy::OFFER_UPDATE.check(actor)?;
        let offer = self.load(id).await?;
        policy::OFFER_UPDATE.check_object(actor, &offer)?;

        patch
            .validate()
            .map_err(|e| DomainError::from_validation(&e))?;
        if let Some(details) = &patch.details {
            validate_tiers(details)?;
        }

        // Admins skip the in-transaction owner re-check
        let expected_owner = if actor.is_admin() {
            None
        } else {
            actor.id()
        };
        let updated = self
            .store
            .update_offer(id, expected_owner, &patch)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => DomainError::not_found("Offer not found"),
                StoreError::PreconditionFailed(_) => {
                    DomainError::forbidden("You are not the owner of this resource")
                }
                other => other.into(),
            })?;
        tracing::info!(offer_id = id, actor_id = ?actor.id(), "offer updated");

        let owner = self.store.get_user(updated.user).await?;
        Ok(OfferView::new(updated, owner.as_ref()))
    }

    pub async fn delete_offer(&self, actor: &Actor, id: OfferId) -> DomainResult<()> {
        policy::OFFER_DELETE.check(actor)?;
        let offer = self.load(id).await?;
        policy::OFFER_DELETE.check_object(actor, &offer)?;

        self.store.delete_offer(id).await.map_err(|err| match err {
            StoreError::NotFound => DomainError::not_found("Offer not found"),
            other => other.into(),
        })?;
        tracing::info!(offer_id = id, actor_id = ?actor.id(), "offer deleted");
        Ok(())
    }

    pub async fn list_offers(
        &self,
        actor: &Actor,
        params: &OfferListParams,
    ) -> DomainResult<Page<OfferView>> {
        policy::OFFER_LIST.check(actor)?;
        let query = OfferQuery::parse(params, &self.pagination)?;

        let (count, offers) = self.store.list_offers(&query).await?;
        let owners = self.owners_of(&offers).await?;
        let page = Page::new(offers, count, query.page)?;
        Ok(page.map(|offer| {
            let owner = owners.get(&offer.user);
            OfferView::new(offer, owner)
        }))
    }

    // ------------------------------------------------------------------
    // Single tiers (admin only)
    // ------------------------------------------------------------------

    pub async fn get_offer_detail(
        &self,
        actor: &Actor,
        id: OfferDetailId,
    ) -> DomainResult<OfferDetail> {
        policy::OFFER_DETAIL_RETRIEVE.check(actor)?;
        self.load_detail(id).await
    }

    pub async fn update_offer_detail(
        &self,
        actor: &Actor,
        id: OfferDetailId,
        patch: OfferDetailPatch,
    ) -> DomainResult<OfferDetail> {
        policy::OFFER_DETAIL_UPDATE.check(actor)?;
        let detail = self.load_detail(id).await?;
        policy::OFFER_DETAIL_UPDATE.check_object(actor, &detail)?;

        patch
            .validate()
            .map_err(|e| DomainError::from_validation(&e))?;
        if let Some(price) = patch.price {
            validate_price(price)?;
        }

        let updated = self
            .store
            .update_offer_detail(id, &patch)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => DomainError::not_found("Offer detail not found"),
                StoreError::Conflict(_) => DomainError::validation(
                    "offer_type",
                    "this offer already has a tier of that type",
                ),
                other => other.into(),
            })?;
        tracing::info!(offer_detail_id = id, offer_id = updated.offer_id, "offer detail updated");
        Ok(updated)
    }

    pub async fn delete_offer_detail(&self, actor: &Actor, id: OfferDetailId) -> DomainResult<()> {
        policy::OFFER_DETAIL_DELETE.check(actor)?;
        let detail = self.load_detail(id).await?;
        policy::OFFER_DETAIL_DELETE.check_object(actor, &detail)?;

        self.store
            .delete_offer_detail(id)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => DomainError::not_found("Offer detail not found"),
                other => other.into(),
            })?;
        tracing::info!(offer_detail_id = id, offer_id = detail.offer_id, "offer detail deleted");
        Ok(())
    }

    async fn load(&self, id: OfferId) -> DomainResult<Offer> {
        self.store
            .get_offer(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Offer not found"))
    }

    async fn load_detail(&self, id: OfferDetailId) -> DomainResult<OfferDetail> {
        self.store
            .get_offer_detail(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Offer detail not found"))
    }

    async fn owners_of(&self, offers: &[Offer]) -> DomainResult<HashMap<UserId, User>> {
        let mut ids: Vec<UserId> = offers.iter().map(|o| o.user).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self.store.get_users(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

/// Prices are stored as NUMERIC(10, 2): non-negative, at most two
/// decimal places, below 10^8
fn validate_price(price: Decimal) -> DomainResult<()> {
    if price < Decimal::ZERO {
        return Err(DomainError::validation("price", "must not be negative"));
    }
    if price.normalize().scale() > 2 {
        return Err(DomainError::validation(
            "price",
            "must have at most 2 decimal places",
        ));
    }
    if price >= Decimal::new(100_000_000, 0) {
        return Err(DomainError::validation("price", "must be below 100000000"));
    }
    Ok(())
}

/// Per-tier checks plus `offer_type` uniqueness within one payload
fn validate_tiers(details: &[OfferDetailInput]) -> DomainResult<()> {
    let mut seen = HashSet::new();
    for tier in details {
        tier.validate()
            .map_err(|e| DomainError::from_validation(&e))?;
        validate_price(tier.price)?;
        if !seen.insert(tier.offer_type) {
            return Err(DomainError::validation(
                "details",
                format!("duplicate offer_type '{}'", tier.offer_type),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OfferType, UserRole};
    use crate::store::MemoryStore;
    use crate::store::memory::testing::actor;

    fn tier(offer_type: OfferType, price: i64, days: i32) -> OfferDetailInput {
        OfferDetailInput {
            title: format!("{} tier", offer_type),
            revisions: 2,
            delivery_time_in_days: days,
            price: Decimal::from(price),
            features: vec!["Logo".into()],
            offer_type,
        }
    }

    fn new_offer(details: Vec<OfferDetailInput>) -> NewOffer {
        NewOffer {
            title: "Grafikdesign".into(),
            description: "Logos and more".into(),
            image: None,
            details,
        }
    }

    async fn setup() -> (Arc<MemoryStore>, OfferService) {
        let store = Arc::new(MemoryStore::new());
        let service = OfferService::new(store.clone(), PaginationConfig::default());
        (store, service)
    }

    #[tokio::test]
    async fn test_create_offer_computes_aggregates() {
        let (store, service) = setup().await;
        let biz = actor(&store, "biz", UserRole::Business, false).await;

        let view = service
            .create_offer(
                &biz,
                new_offer(vec![
                    tier(OfferType::Basic, 10, 5),
                    tier(OfferType::Premium, 50, 2),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(view.details.len(), 2);
        assert_eq!(view.min_price, Some(Decimal::from(10)));
        assert_eq!(view.min_delivery_time, Some(2));
        assert_eq!(view.user, biz.id().unwrap());
        assert!(view.details.iter().all(|d| d.user == view.user));
    }

    #[tokio::test]
    async fn test_create_offer_rejects_empty_and_duplicate_tiers() {
        let (store, service) = setup().await;
        let biz = actor(&store, "biz", UserRole::Business, false).await;

        let err = service.create_offer(&biz, new_offer(vec![])).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "details"));

        let err = service
            .create_offer(
                &biz,
                new_offer(vec![tier(OfferType::Basic, 1, 1), tier(OfferType::Basic, 2, 2)]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "details"));

        let err = service
            .create_offer(&biz, new_offer(vec![tier(OfferType::Basic, -1, 1)]))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::validation("price", "must not be negative"));
    }

    #[tokio::test]
    async fn test_customer_cannot_create_offer() {
        let (store, service) = setup().await;
        let customer = actor(&store, "cust", UserRole::Customer, false).await;
        let err = service
            .create_offer(&customer, new_offer(vec![tier(OfferType::Basic, 1, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_patch_merges_tiers_by_type() {
        let (store, service) = setup().await;
        let biz = actor(&store, "biz", UserRole::Business, false).await;
        let created = service
            .create_offer(
                &biz,
                new_offer(vec![
                    tier(OfferType::Basic, 10, 5),
                    tier(OfferType::Premium, 50, 2),
                ]),
            )
            .await
            .unwrap();

        let patch = OfferPatch {
            details: Some(vec![
                tier(OfferType::Basic, 15, 4),
                tier(OfferType::Standard, 30, 3),
            ]),
            ..Default::default()
        };
        let updated = service.update_offer(&biz, created.id, patch).await.unwrap();
        let types: Vec<_> = updated.details.iter().map(|d| d.offer_type).collect();
        assert_eq!(
            types,
            vec![OfferType::Basic, OfferType::Standard, OfferType::Premium]
        );
        assert_eq!(updated.min_price, Some(Decimal::from(15)));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_may_update() {
        let (store, service) = setup().await;
        let owner = actor(&store, "owner", UserRole::Business, false).await;
        let other = actor(&store, "other", UserRole::Business, false).await;
        let admin = actor(&store, "admin", UserRole::Customer, true).await;
        let created = service
            .create_offer(&owner, new_offer(vec![tier(OfferType::Basic, 10, 5)]))
            .await
            .unwrap();

        let patch = OfferPatch {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        let err = service
            .update_offer(&other, created.id, patch.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let updated = service.update_offer(&admin, created.id, patch).await.unwrap();
        assert_eq!(updated.title, "Renamed");
    }

    #[tokio::test]
    async fn test_anonymous_may_list_but_not_retrieve() {
        let (store, service) = setup().await;
        let biz = actor(&store, "biz", UserRole::Business, false).await;
        let created = service
            .create_offer(&biz, new_offer(vec![tier(OfferType::Basic, 10, 5)]))
            .await
            .unwrap();

        let page = service
            .list_offers(&Actor::Anonymous, &OfferListParams::default())
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(
            page.results[0].user_details.as_ref().map(|u| u.username.as_str()),
            Some("biz")
        );

        let err = service
            .get_offer(&Actor::Anonymous, created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_offer_detail_is_admin_only() {
        let (store, service) = setup().await;
        let biz = actor(&store, "biz", UserRole::Business, false).await;
        let admin = actor(&store, "admin", UserRole::Customer, true).await;
        let created = service
            .create_offer(
                &biz,
                new_offer(vec![
                    tier(OfferType::Basic, 10, 5),
                    tier(OfferType::Premium, 50, 2),
                ]),
            )
            .await
            .unwrap();
        let basic_id = created.details[0].id;

        let err = service.get_offer_detail(&biz, basic_id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(service.get_offer_detail(&admin, basic_id).await.is_ok());

        let clash = OfferDetailPatch {
            offer_type: Some(OfferType::Premium),
            ..Default::default()
        };
        let err = service
            .update_offer_detail(&admin, basic_id, clash)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "offer_type"));

        service.delete_offer_detail(&admin, basic_id).await.unwrap();
        let err = service.get_offer_detail(&admin, basic_id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_price_fits_storage_column() {
        assert!(validate_price(Decimal::new(9_999_999_999, 2)).is_ok());
        assert!(validate_price(Decimal::new(1050, 3)).is_ok());

        for bad in [
            Decimal::new(-1, 2),
            Decimal::new(1001, 3),
            Decimal::new(100_000_000, 0),
        ] {
            let err = validate_price(bad).unwrap_err();
            assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "price"));
        }
    }

    #[tokio::test]
    async fn test_oversized_price_rejected_on_create_and_patch() {
        let (store, service) = setup().await;
        let biz = actor(&store, "biz", UserRole::Business, false).await;
        let admin = actor(&store, "admin", UserRole::Customer, true).await;

        let mut pricey = tier(OfferType::Basic, 10, 5);
        pricey.price = Decimal::new(123_456_789, 0);
        let err = service
            .create_offer(&biz, new_offer(vec![pricey]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "price"));

        let created = service
            .create_offer(&biz, new_offer(vec![tier(OfferType::Basic, 10, 5)]))
            .await
            .unwrap();
        let patch = OfferDetailPatch {
            price: Some(Decimal::new(19_999, 3)),
            ..Default::default()
        };
        let err = service
            .update_offer_detail(&admin, created.details[0].id, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "price"));
    }
}
