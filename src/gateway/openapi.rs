//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::catalog::{NewOffer, OfferDetailInput, OfferDetailPatch, OfferPatch, OfferView, UserDetails};
use crate::gateway::handlers::HealthResponse;
use crate::models::{OfferDetail, OfferType, Order, Review, UserRole};
use crate::orders::{
    CompletedOrderCount, CreateOrderRequest, OrderCount, OrderStatus, UpdateOrderStatusRequest,
};
use crate::profiles::{
    BusinessProfileView, CustomerProfileView, ProfileListItem, ProfilePatch, ProfileUser,
    ProfileView,
};
use crate::reviews::{NewReview, ReviewPatch};
use crate::stats::BaseInfo;
use crate::user_auth::{AuthResponse, LoginRequest, RegisterRequest};

/// JWT bearer authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token from /api/login/ or /api/registration/: `Authorization: Bearer {token}`",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Coderr Marketplace API",
        version = "1.0.0",
        description = "Freelancer marketplace: offers with pricing tiers, orders, reviews and profiles.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::health::base_info,
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::login,
        crate::gateway::handlers::offers::list_offers,
        crate::gateway::handlers::offers::create_offer,
        crate::gateway::handlers::offers::get_offer,
        crate::gateway::handlers::offers::update_offer,
        crate::gateway::handlers::offers::delete_offer,
        crate::gateway::handlers::offers::get_offer_detail,
        crate::gateway::handlers::offers::update_offer_detail,
        crate::gateway::handlers::offers::delete_offer_detail,
        crate::gateway::handlers::orders::list_orders,
        crate::gateway::handlers::orders::create_order,
        crate::gateway::handlers::orders::get_order,
        crate::gateway::handlers::orders::update_order,
        crate::gateway::handlers::orders::delete_order,
        crate::gateway::handlers::orders::order_count,
        crate::gateway::handlers::orders::completed_order_count,
        crate::gateway::handlers::profiles::get_profile,
        crate::gateway::handlers::profiles::update_profile,
        crate::gateway::handlers::profiles::list_profiles,
        crate::gateway::handlers::reviews::list_reviews,
        crate::gateway::handlers::reviews::create_review,
        crate::gateway::handlers::reviews::update_review,
        crate::gateway::handlers::reviews::delete_review,
    ),
    components(
        schemas(
            HealthResponse,
            BaseInfo,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserRole,
            OfferType,
            OfferDetail,
            OfferDetailInput,
            OfferDetailPatch,
            NewOffer,
            OfferPatch,
            OfferView,
            UserDetails,
            Order,
            OrderStatus,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderCount,
            CompletedOrderCount,
            Review,
            NewReview,
            ReviewPatch,
            ProfileView,
            ProfilePatch,
            ProfileUser,
            BusinessProfileView,
            CustomerProfileView,
            ProfileListItem,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Offers", description = "Offers and their pricing tiers"),
        (name = "Orders", description = "Orders placed against offer tiers"),
        (name = "Reviews", description = "Ratings of business users"),
        (name = "Profiles", description = "User profiles"),
        (name = "System", description = "Health checks and platform stats")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Coderr Marketplace API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json_str = ApiDoc::openapi().to_json().unwrap();
        assert!(json_str.contains("Coderr Marketplace API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths;
        for path in [
            "/api/health",
            "/api/base-info/",
            "/api/login/",
            "/api/registration/",
            "/api/offers/",
            "/api/offers/{id}/",
            "/api/offerdetails/{id}/",
            "/api/orders/",
            "/api/orders/{id}/",
            "/api/order-count/{business_user_id}/",
            "/api/completed-order-count/{business_user_id}/",
            "/api/profile/{id}/",
            "/api/profiles/{type}/",
            "/api/reviews/",
            "/api/reviews/{id}/",
        ] {
            assert!(paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_security_scheme_registered() {
        let components = ApiDoc::openapi().components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
