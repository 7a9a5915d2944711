//! Offer and offer tier handlers

use std::sync::Arc;

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, JsonBody, PathId, QueryParams, created, ok};
use crate::authz::Actor;
use crate::catalog::{NewOffer, OfferDetailPatch, OfferListParams, OfferPatch, OfferView};
use crate::error::DomainError;
use crate::models::OfferDetail;
use crate::pagination::Page;

/// List offers
///
/// GET /api/offers/?creator_id=&min_price=&max_delivery_time=&search=&ordering=&page=&page_size=
#[utoipa::path(
    get,
    path = "/api/offers/",
    params(OfferListParams),
    responses(
        (status = 200, description = "One page of offers", body = ApiResponse<Page<OfferView>>),
        (status = 400, description = "Malformed filter"),
        (status = 404, description = "Page out of range")
    ),
    tag = "Offers"
)]
pub async fn list_offers(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    QueryParams(params): QueryParams<OfferListParams>,
) -> ApiResult<Page<OfferView>> {
    ok(state.offers.list_offers(&actor, &params).await?)
}

/// Create an offer with its tiers
///
/// POST /api/offers/
#[utoipa::path(
    post,
    path = "/api/offers/",
    request_body = NewOffer,
    responses(
        (status = 201, description = "Offer created", body = ApiResponse<OfferView>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not a business user")
    ),
    security(("bearer_auth" = [])),
    tag = "Offers"
)]
pub async fn create_offer(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    JsonBody(req): JsonBody<NewOffer>,
) -> ApiResult<OfferView> {
    created(state.offers.create_offer(&actor, req).await?)
}

/// Get one offer
///
/// GET /api/offers/{id}/
#[utoipa::path(
    get,
    path = "/api/offers/{id}/",
    params(("id" = i64, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer", body = ApiResponse<OfferView>),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Offer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Offers"
)]
pub async fn get_offer(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
) -> ApiResult<OfferView> {
    ok(state.offers.get_offer(&actor, id).await?)
}

/// Patch an offer; tiers merge by offer_type
///
/// PATCH /api/offers/{id}/
#[utoipa::path(
    patch,
    path = "/api/offers/{id}/",
    params(("id" = i64, Path, description = "Offer ID")),
    request_body = OfferPatch,
    responses(
        (status = 200, description = "Updated offer", body = ApiResponse<OfferView>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Offer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Offers"
)]
pub async fn update_offer(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
    JsonBody(patch): JsonBody<OfferPatch>,
) -> ApiResult<OfferView> {
    ok(state.offers.update_offer(&actor, id, patch).await?)
}

/// Delete an offer and its tiers
///
/// DELETE /api/offers/{id}/
#[utoipa::path(
    delete,
    path = "/api/offers/{id}/",
    params(("id" = i64, Path, description = "Offer ID")),
    responses(
        (status = 204, description = "Offer deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Offer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Offers"
)]
pub async fn delete_offer(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
) -> Result<StatusCode, DomainError> {
    state.offers.delete_offer(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get one offer tier (admin)
///
/// GET /api/offerdetails/{id}/
#[utoipa::path(
    get,
    path = "/api/offerdetails/{id}/",
    params(("id" = i64, Path, description = "Offer detail ID")),
    responses(
        (status = 200, description = "Offer tier", body = ApiResponse<OfferDetail>),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Offer detail not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Offers"
)]
pub async fn get_offer_detail(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
) -> ApiResult<OfferDetail> {
    ok(state.offers.get_offer_detail(&actor, id).await?)
}

/// Patch one offer tier (admin)
///
/// PATCH /api/offerdetails/{id}/
#[utoipa::path(
    patch,
    path = "/api/offerdetails/{id}/",
    params(("id" = i64, Path, description = "Offer detail ID")),
    request_body = OfferDetailPatch,
    responses(
        (status = 200, description = "Updated tier", body = ApiResponse<OfferDetail>),
        (status = 400, description = "Invalid payload or tier type taken"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Offer detail not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Offers"
)]
pub async fn update_offer_detail(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
    JsonBody(patch): JsonBody<OfferDetailPatch>,
) -> ApiResult<OfferDetail> {
    ok(state.offers.update_offer_detail(&actor, id, patch).await?)
}

/// Delete one offer tier (admin)
///
/// DELETE /api/offerdetails/{id}/
#[utoipa::path(
    delete,
    path = "/api/offerdetails/{id}/",
    params(("id" = i64, Path, description = "Offer detail ID")),
    responses(
        (status = 204, description = "Tier deleted"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Offer detail not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Offers"
)]
pub async fn delete_offer_detail(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
) -> Result<StatusCode, DomainError> {
    state.offers.delete_offer_detail(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
