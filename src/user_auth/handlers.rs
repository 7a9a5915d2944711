use axum::extract::State;
use std::sync::Arc;

use super::service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, JsonBody, created, ok};

/// Register a new user
///
/// POST /api/registration/
#[utoipa::path(
    post,
    path = "/api/registration/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid input, password mismatch or account already exists")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    created(state.user_auth.register(req).await?)
}

/// Login user
///
/// POST /api/login/
#[utoipa::path(
    post,
    path = "/api/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<AuthResponse> {
    ok(state.user_auth.login(req).await?)
}
