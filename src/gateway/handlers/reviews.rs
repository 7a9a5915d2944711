//! Review handlers

use std::sync::Arc;

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, JsonBody, PathId, QueryParams, created, ok};
use crate::authz::Actor;
use crate::error::DomainError;
use crate::models::Review;
use crate::reviews::{NewReview, ReviewListParams, ReviewPatch};

/// GET /api/reviews/?business_user_id=&reviewer_id=&ordering=
#[utoipa::path(
    get,
    path = "/api/reviews/",
    params(ReviewListParams),
    responses(
        (status = 200, description = "Reviews", body = ApiResponse<Vec<Review>>),
        (status = 400, description = "Malformed filter"),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    QueryParams(params): QueryParams<ReviewListParams>,
) -> ApiResult<Vec<Review>> {
    ok(state.reviews.list_reviews(&actor, &params).await?)
}

/// Rate a business user (customers, once per business user)
///
/// POST /api/reviews/
#[utoipa::path(
    post,
    path = "/api/reviews/",
    request_body = NewReview,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not a customer, or already reviewed")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    JsonBody(req): JsonBody<NewReview>,
) -> ApiResult<Review> {
    created(state.reviews.create_review(&actor, req).await?)
}

/// PATCH /api/reviews/{id}/ (reviewer only)
#[utoipa::path(
    patch,
    path = "/api/reviews/{id}/",
    params(("id" = i64, Path, description = "Review ID")),
    request_body = ReviewPatch,
    responses(
        (status = 200, description = "Updated review", body = ApiResponse<Review>),
        (status = 403, description = "Not the reviewer"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
    JsonBody(patch): JsonBody<ReviewPatch>,
) -> ApiResult<Review> {
    ok(state.reviews.update_review(&actor, id, patch).await?)
}

/// DELETE /api/reviews/{id}/ (reviewer only)
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}/",
    params(("id" = i64, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not the reviewer"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
) -> Result<StatusCode, DomainError> {
    state.reviews.delete_review(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
