use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::authz::{Actor, Policy};
use crate::error::DomainError;
use crate::gateway::state::AppState;

/// Resolve the bearer credential into an [`Actor`] request extension.
///
/// No `Authorization` header means an anonymous actor; read-only policies
/// decide whether that is enough. A header that is present but does not
/// carry a valid token for an existing account is rejected outright.
pub async fn resolve_actor(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, DomainError> {
    let actor = match request.headers().get(header::AUTHORIZATION) {
        None => Actor::Anonymous,
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| DomainError::unauthenticated("Invalid token format"))?;

            let claims = state.user_auth.verify_token(token).map_err(|e| {
                tracing::debug!(error = %e, "bearer token rejected");
                DomainError::unauthenticated("Invalid or expired token")
            })?;

            let user = state
                .user_auth
                .resolve_user(&claims)
                .await?
                .ok_or_else(|| DomainError::unauthenticated("Invalid or expired token"))?;
            Actor::User(user)
        }
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Run a route's collection-level policy before its extractors.
///
/// Layered onto individual handlers after [`resolve_actor`], so an actor
/// that the policy turns away never has its path or body parsed.
pub async fn require_policy(
    State(policy): State<&'static Policy>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, DomainError> {
    match request.extensions().get::<Actor>() {
        Some(actor) => policy.check(actor)?,
        None => policy.check(&Actor::Anonymous)?,
    }
    Ok(next.run(request).await)
}
