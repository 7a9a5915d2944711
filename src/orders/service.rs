use std::sync::Arc;

use super::state::{OrderStatus, TransitionError};
use super::{CompletedOrderCount, CreateOrderRequest, OrderCount, UpdateOrderStatusRequest};
use crate::authz::{Actor, policy};
use crate::core_types::{OrderId, UserId};
use crate::error::{DomainError, DomainResult};
use crate::models::{NewOrder, Order};
use crate::store::{MarketStore, OrderScope, StoreError};

pub struct OrderService {
    store: Arc<dyn MarketStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Place an order against one tier, copying its commercial terms
    pub async fn create_order(&self, actor: &Actor, req: CreateOrderRequest) -> DomainResult<Order> {
        policy::ORDER_CREATE.check(actor)?;
        let customer = actor.require_user()?;

        let detail = self
            .store
            .get_offer_detail(req.offer_detail_id)
            .await?
            .ok_or_else(|| {
                DomainError::validation("offer_detail_id", "offer detail does not exist")
            })?;

        let order = self
            .store
            .create_order(&NewOrder::snapshot(&detail, customer.id))
            .await
            .map_err(|err| match err {
                StoreError::ForeignKey(_) => {
                    DomainError::validation("offer_detail_id", "offer detail does not exist")
                }
                other => other.into(),
            })?;
        tracing::info!(
            order_id = order.id,
            customer_user = order.customer_user,
            business_user = order.business_user,
            offer_type = %order.offer_type,
            "order created"
        );
        Ok(order)
    }

    /// Orders the actor takes part in, newest first; admins see all
    pub async fn list_orders(&self, actor: &Actor) -> DomainResult<Vec<Order>> {
        policy::ORDER_LIST.check(actor)?;
        let user = actor.require_user()?;
        let scope = if user.is_admin {
            OrderScope::All
        } else if user.is_business() {
            OrderScope::Business(user.id)
        } else {
            OrderScope::Customer(user.id)
        };
        Ok(self.store.list_orders(scope).await?)
    }

    /// Orders outside the actor's visibility are reported missing
    pub async fn get_order(&self, actor: &Actor, id: OrderId) -> DomainResult<Order> {
        policy::ORDER_RETRIEVE.check(actor)?;
        let user = actor.require_user()?;
        let order = self.load(id).await?;
        let visible =
            user.is_admin || order.customer_user == user.id || order.business_user == user.id;
        if !visible {
            return Err(DomainError::not_found("Order not found"));
        }
        Ok(order)
    }

    pub async fn update_status(
        &self,
        actor: &Actor,
        id: OrderId,
        req: UpdateOrderStatusRequest,
    ) -> DomainResult<Order> {
        policy::ORDER_STATUS_UPDATE.check(actor)?;
        let order = self.load(id).await?;
        policy::ORDER_STATUS_UPDATE.check_object(actor, &order)?;

        let next = order.status.transition(req.status).map_err(|err| match err {
            TransitionError::Terminal(status) => {
                DomainError::forbidden(format!("Order is already {} and cannot change", status))
            }
            TransitionError::Unchanged(status) => {
                DomainError::validation("status", format!("order is already {}", status))
            }
        })?;

        let updated = self
            .store
            .update_order_status(id, order.business_user, order.status, next)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => DomainError::not_found("Order not found"),
                StoreError::PreconditionFailed(_) => {
                    DomainError::forbidden("Order status changed concurrently")
                }
                other => other.into(),
            })?;
        tracing::info!(
            order_id = id,
            from = %order.status,
            to = %updated.status,
            "order status changed"
        );
        Ok(updated)
    }

    pub async fn delete_order(&self, actor: &Actor, id: OrderId) -> DomainResult<()> {
        policy::ORDER_DELETE.check(actor)?;
        self.store.delete_order(id).await.map_err(|err| match err {
            StoreError::NotFound => DomainError::not_found("Order not found"),
            other => other.into(),
        })?;
        tracing::info!(order_id = id, actor_id = ?actor.id(), "order deleted");
        Ok(())
    }

    pub async fn count_in_progress(
        &self,
        actor: &Actor,
        business_user: UserId,
    ) -> DomainResult<OrderCount> {
        let order_count = self
            .count(actor, business_user, OrderStatus::InProgress)
            .await?;
        Ok(OrderCount { order_count })
    }

    pub async fn count_completed(
        &self,
        actor: &Actor,
        business_user: UserId,
    ) -> DomainResult<CompletedOrderCount> {
        let completed_order_count = self
            .count(actor, business_user, OrderStatus::Completed)
            .await?;
        Ok(CompletedOrderCount {
            completed_order_count,
        })
    }

    async fn count(
        &self,
        actor: &Actor,
        business_user: UserId,
        status: OrderStatus,
    ) -> DomainResult<u64> {
        policy::ORDER_COUNT.check(actor)?;
        match self.store.get_user(business_user).await? {
            Some(user) if user.is_business() => {}
            _ => return Err(DomainError::not_found("Business user not found")),
        }
        Ok(self.store.count_orders(business_user, status).await?)
    }

    async fn load(&self, id: OrderId) -> DomainResult<Order> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NewOffer, OfferDetailInput};
    use crate::catalog::types::OfferDetailPatch;
    use crate::models::{OfferType, UserRole};
    use crate::store::MemoryStore;
    use crate::store::memory::testing::actor;
    use rust_decimal::Decimal;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: OrderService,
        business: Actor,
        customer: Actor,
        premium_id: i64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let business = actor(&store, "biz", UserRole::Business, false).await;
        let customer = actor(&store, "cust", UserRole::Customer, false).await;
        let offer = store
            .create_offer(
                business.id().unwrap(),
                &NewOffer {
                    title: "Design".into(),
                    description: String::new(),
                    image: None,
                    details: vec![
                        OfferDetailInput {
                            title: "Basic".into(),
                            revisions: 1,
                            delivery_time_in_days: 5,
                            price: Decimal::from(10),
                            features: vec!["Logo".into()],
                            offer_type: OfferType::Basic,
                        },
                        OfferDetailInput {
                            title: "Premium".into(),
                            revisions: -1,
                            delivery_time_in_days: 2,
                            price: Decimal::from(50),
                            features: vec!["Logo".into(), "Flyer".into()],
                            offer_type: OfferType::Premium,
                        },
                    ],
                },
            )
            .await
            .unwrap();
        let premium_id = offer.detail(OfferType::Premium).unwrap().id;
        Fixture {
            service: OrderService::new(store.clone()),
            store,
            business,
            customer,
            premium_id,
        }
    }

    fn status(status: OrderStatus) -> UpdateOrderStatusRequest {
        UpdateOrderStatusRequest { status }
    }

    #[tokio::test]
    async fn test_order_copies_tier_terms() {
        let f = fixture().await;
        let order = f
            .service
            .create_order(&f.customer, CreateOrderRequest { offer_detail_id: f.premium_id })
            .await
            .unwrap();
        assert_eq!(order.price, Decimal::from(50));
        assert_eq!(order.offer_type, OfferType::Premium);
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.business_user, f.business.id().unwrap());

        // Editing the tier afterwards leaves the order untouched
        f.store
            .update_offer_detail(
                f.premium_id,
                &OfferDetailPatch {
                    price: Some(Decimal::from(99)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let reloaded = f.service.get_order(&f.customer, order.id).await.unwrap();
        assert_eq!(reloaded.price, Decimal::from(50));
        assert_eq!(reloaded.features, order.features);
    }

    #[tokio::test]
    async fn test_create_requires_customer_and_existing_tier() {
        let f = fixture().await;
        let err = f
            .service
            .create_order(&f.business, CreateOrderRequest { offer_detail_id: f.premium_id })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = f
            .service
            .create_order(&f.customer, CreateOrderRequest { offer_detail_id: 9999 })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_only_business_participant_moves_status() {
        let f = fixture().await;
        let order = f
            .service
            .create_order(&f.customer, CreateOrderRequest { offer_detail_id: f.premium_id })
            .await
            .unwrap();

        let err = f
            .service
            .update_status(&f.customer, order.id, status(OrderStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let done = f
            .service
            .update_status(&f.business, order.id, status(OrderStatus::Completed))
            .await
            .unwrap();
        assert_eq!(done.status, OrderStatus::Completed);

        // Terminal
        let err = f
            .service
            .update_status(&f.business, order.id, status(OrderStatus::Cancelled))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_unchanged_status_is_validation_error() {
        let f = fixture().await;
        let order = f
            .service
            .create_order(&f.customer, CreateOrderRequest { offer_detail_id: f.premium_id })
            .await
            .unwrap();
        let err = f
            .service
            .update_status(&f.business, order.id, status(OrderStatus::InProgress))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "status"));
    }

    #[tokio::test]
    async fn test_delete_is_admin_only() {
        let f = fixture().await;
        let admin = actor(&f.store, "root", UserRole::Customer, true).await;
        let order = f
            .service
            .create_order(&f.customer, CreateOrderRequest { offer_detail_id: f.premium_id })
            .await
            .unwrap();

        for participant in [&f.customer, &f.business] {
            let err = f.service.delete_order(participant, order.id).await.unwrap_err();
            assert!(matches!(err, DomainError::Forbidden(_)));
        }
        f.service.delete_order(&admin, order.id).await.unwrap();
        let err = f.service.get_order(&admin, order.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_visibility_and_listing() {
        let f = fixture().await;
        let stranger = actor(&f.store, "other", UserRole::Customer, false).await;
        let order = f
            .service
            .create_order(&f.customer, CreateOrderRequest { offer_detail_id: f.premium_id })
            .await
            .unwrap();

        let err = f.service.get_order(&stranger, order.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(f.service.list_orders(&stranger).await.unwrap().is_empty());
        assert_eq!(f.service.list_orders(&f.business).await.unwrap().len(), 1);
        assert_eq!(f.service.list_orders(&f.customer).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_counters() {
        let f = fixture().await;
        let business_id = f.business.id().unwrap();
        for _ in 0..3 {
            f.service
                .create_order(&f.customer, CreateOrderRequest { offer_detail_id: f.premium_id })
                .await
                .unwrap();
        }
        let orders = f.service.list_orders(&f.business).await.unwrap();
        f.service
            .update_status(&f.business, orders[0].id, status(OrderStatus::Completed))
            .await
            .unwrap();

        let open = f.service.count_in_progress(&f.customer, business_id).await.unwrap();
        assert_eq!(open.order_count, 2);
        let done = f.service.count_completed(&f.customer, business_id).await.unwrap();
        assert_eq!(done.completed_order_count, 1);

        let err = f
            .service
            .count_in_progress(&f.business, f.customer.id().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
