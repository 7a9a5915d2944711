//! Profile handlers

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, JsonBody, PathId, ok};
use crate::authz::Actor;
use crate::profiles::{ProfileListItem, ProfilePatch, ProfileView};

/// GET /api/profile/{id}/
#[utoipa::path(
    get,
    path = "/api/profile/{id}/",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile", body = ApiResponse<ProfileView>),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
) -> ApiResult<ProfileView> {
    ok(state.profiles.get_profile(&actor, id).await?)
}

/// PATCH /api/profile/{id}/ (self or admin)
#[utoipa::path(
    patch,
    path = "/api/profile/{id}/",
    params(("id" = i64, Path, description = "User ID")),
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<ProfileView>),
        (status = 400, description = "Invalid payload or email taken"),
        (status = 403, description = "Not your profile"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    PathId(id): PathId,
    JsonBody(patch): JsonBody<ProfilePatch>,
) -> ApiResult<ProfileView> {
    ok(state.profiles.update_profile(&actor, id, patch).await?)
}

/// Profiles of one account type (admin)
///
/// GET /api/profiles/{type}/
#[utoipa::path(
    get,
    path = "/api/profiles/{type}/",
    params(("type" = String, Path, description = "business or customer")),
    responses(
        (status = 200, description = "Profiles; empty for an unknown type", body = ApiResponse<Vec<ProfileListItem>>),
        (status = 403, description = "Admin privileges required")
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(profile_type): Path<String>,
) -> ApiResult<Vec<ProfileListItem>> {
    ok(state.profiles.list_by_type(&actor, &profile_type).await?)
}
