pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::{Context, Result};
use axum::{
    Router,
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::authz::policy;
use crate::user_auth::middleware::{require_policy, resolve_actor};
use state::AppState;

/// Wrap a handler so its route policy runs before any extractor
macro_rules! guarded {
    ($handler:expr, $policy:path) => {
        $handler.layer(from_fn_with_state(&$policy, require_policy))
    };
}

/// Build the complete router: `/api/*`, health check and Swagger UI
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Resource Routes (bearer token resolved to an Actor, then the route
    // policy, then extraction)
    // ==========================================================================
    let resource_routes = Router::new()
        // Offers
        .route(
            "/offers/",
            get(guarded!(handlers::list_offers, policy::OFFER_LIST))
                .post(guarded!(handlers::create_offer, policy::OFFER_CREATE)),
        )
        .route(
            "/offers/{id}/",
            get(guarded!(handlers::get_offer, policy::OFFER_RETRIEVE))
                .patch(guarded!(handlers::update_offer, policy::OFFER_UPDATE))
                .delete(guarded!(handlers::delete_offer, policy::OFFER_DELETE)),
        )
        .route(
            "/offerdetails/{id}/",
            get(guarded!(handlers::get_offer_detail, policy::OFFER_DETAIL_RETRIEVE))
                .patch(guarded!(handlers::update_offer_detail, policy::OFFER_DETAIL_UPDATE))
                .delete(guarded!(handlers::delete_offer_detail, policy::OFFER_DETAIL_DELETE)),
        )
        // Orders
        .route(
            "/orders/",
            get(guarded!(handlers::list_orders, policy::ORDER_LIST))
                .post(guarded!(handlers::create_order, policy::ORDER_CREATE)),
        )
        .route(
            "/orders/{id}/",
            get(guarded!(handlers::get_order, policy::ORDER_RETRIEVE))
                .patch(guarded!(handlers::update_order, policy::ORDER_STATUS_UPDATE))
                .delete(guarded!(handlers::delete_order, policy::ORDER_DELETE)),
        )
        .route(
            "/order-count/{id}/",
            get(guarded!(handlers::order_count, policy::ORDER_COUNT)),
        )
        .route(
            "/completed-order-count/{id}/",
            get(guarded!(handlers::completed_order_count, policy::ORDER_COUNT)),
        )
        // Profiles
        .route(
            "/profile/{id}/",
            get(guarded!(handlers::get_profile, policy::PROFILE_RETRIEVE))
                .patch(guarded!(handlers::update_profile, policy::PROFILE_UPDATE)),
        )
        .route(
            "/profiles/{type}/",
            get(guarded!(handlers::list_profiles, policy::PROFILE_LIST_BY_TYPE)),
        )
        // Reviews
        .route(
            "/reviews/",
            get(guarded!(handlers::list_reviews, policy::REVIEW_LIST))
                .post(guarded!(handlers::create_review, policy::REVIEW_CREATE)),
        )
        .route(
            "/reviews/{id}/",
            patch(guarded!(handlers::update_review, policy::REVIEW_UPDATE))
                .delete(guarded!(handlers::delete_review, policy::REVIEW_DELETE)),
        )
        // Stats
        .route("/base-info/", get(handlers::base_info))
        .layer(from_fn_with_state(state.clone(), resolve_actor));

    // ==========================================================================
    // Auth Routes (public)
    // ==========================================================================
    let auth_routes = Router::new()
        .route("/registration/", post(crate::user_auth::handlers::register))
        .route("/login/", post(crate::user_auth::handlers::login));

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .nest("/api", resource_routes.merge(auth_routes))
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port already in use?)", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
