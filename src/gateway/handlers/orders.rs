//! Order handlers

use std::sync::Arc;

use axum::{Extension, extract::State, http::StatusCode};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, JsonBody, PathId, created, ok};
use crate::authz::Actor;
use crate::error::DomainError;
use crate::models::Order;
use crate::orders::{CompletedOrderCount, CreateOrderRequest, OrderCount, UpdateOrderStatusRequest};

/// Orders visible to the caller, newest first
///
/// GET /api/orders/
#[utoipa::path(
    get,
    path = "/api/orders/",
    responses(
        (status = 200, description = "Orders", body = ApiResponse<Vec<Order>>),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<Order>> {
    ok(state.orders.list_orders(&actor).await?)
}

/// Place an order against one offer tier
///
/// POST /api/orders/
#[utoipa::path(
    post,
    path = "/api/orders/",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<Order>),
        (status = 400, description = "Unknown offer tier"),
        (status = 403, description = "Not a customer")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    JsonBody(req): JsonBody<CreateOrderRequest>,
) -> ApiResult<Order> {
    created(state.orders.create_order(&actor, req).await?)
}

/// GET /api/orders/{id}/
#[utoipa::path(
    get,
    path = "/api/orders/{id}/",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = ApiResponse<Order>),
        (status = 404, description = "Order not found or not visible")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
) -> ApiResult<Order> {
    ok(state.orders.get_order(&actor, id).await?)
}

/// Move an order to a new status (business side only)
///
/// PATCH /api/orders/{id}/
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = ApiResponse<Order>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Not the business user, or order already final"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
    JsonBody(req): JsonBody<UpdateOrderStatusRequest>,
) -> ApiResult<Order> {
    ok(state.orders.update_status(&actor, id, req).await?)
}

/// DELETE /api/orders/{id}/ (admin)
#[utoipa::path(
    delete,
    path = "/api/orders/{id}/",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
) -> Result<StatusCode, DomainError> {
    state.orders.delete_order(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// In-progress orders of a business user
///
/// GET /api/order-count/{business_user_id}/
#[utoipa::path(
    get,
    path = "/api/order-count/{business_user_id}/",
    params(("business_user_id" = i64, Path, description = "Business user ID")),
    responses(
        (status = 200, description = "In-progress count", body = ApiResponse<OrderCount>),
        (status = 404, description = "Business user not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn order_count(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(business_user_id): PathId,
) -> ApiResult<OrderCount> {
    ok(state.orders.count_in_progress(&actor, business_user_id).await?)
}

/// Completed orders of a business user
///
/// GET /api/completed-order-count/{business_user_id}/
#[utoipa::path(
    get,
    path = "/api/completed-order-count/{business_user_id}/",
    params(("business_user_id" = i64, Path, description = "Business user ID")),
    responses(
        (status = 200, description = "Completed count", body = ApiResponse<CompletedOrderCount>),
        (status = 404, description = "Business user not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn completed_order_count(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(business_user_id): PathId,
) -> ApiResult<CompletedOrderCount> {
    ok(state.orders.count_completed(&actor, business_user_id).await?)
}
