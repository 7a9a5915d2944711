//! HTTP handlers
//!
//! Handlers only extract, delegate to a service with the resolved
//! [`Actor`](crate::authz::Actor), and wrap the result in the envelope.

pub mod health;
pub mod offers;
pub mod orders;
pub mod profiles;
pub mod reviews;

pub use health::{HealthResponse, base_info, health_check};
pub use offers::{
    create_offer, delete_offer, delete_offer_detail, get_offer, get_offer_detail, list_offers,
    update_offer, update_offer_detail,
};
pub use orders::{
    completed_order_count, create_order, delete_order, get_order, list_orders, order_count,
    update_order,
};
pub use profiles::{get_profile, list_profiles, update_profile};
pub use reviews::{create_review, delete_review, list_reviews, update_review};
