//! Order lifecycle
//!
//! Customers order one offer tier; the order keeps a copy of the tier's
//! commercial terms. Only the status moves afterwards, see [`state`].

pub mod service;
pub mod state;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::OfferDetailId;

pub use service::OrderService;
pub use state::{OrderStatus, TransitionError};

/// POST /api/orders/
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    #[schema(example = 1)]
    pub offer_detail_id: OfferDetailId,
}

/// PATCH /api/orders/{id}/ accepts the status and nothing else
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// GET /api/order-count/{business_user_id}/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderCount {
    pub order_count: u64,
}

/// GET /api/completed-order-count/{business_user_id}/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CompletedOrderCount {
    pub completed_order_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_request_rejects_other_fields() {
        let ok: UpdateOrderStatusRequest =
            serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        assert_eq!(ok.status, OrderStatus::Completed);

        assert!(
            serde_json::from_str::<UpdateOrderStatusRequest>(r#"{"status": "completed", "price": 1}"#)
                .is_err()
        );
        assert!(serde_json::from_str::<UpdateOrderStatusRequest>(r#"{"status": "done"}"#).is_err());
    }

    #[test]
    fn test_count_shapes() {
        let json = serde_json::to_value(OrderCount { order_count: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"order_count": 3}));
        let json = serde_json::to_value(CompletedOrderCount {
            completed_order_count: 1,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"completed_order_count": 1}));
    }
}
