//! Offer catalog
//!
//! Business users publish offers with up to three pricing tiers
//! (basic, standard, premium). Tier sets are merged by `offer_type` on
//! update; single tiers are only reachable by admins.

pub mod query;
pub mod service;
pub mod types;

pub use query::{OfferListParams, OfferOrdering, OfferQuery};
pub use service::OfferService;
pub use types::{NewOffer, OfferDetailInput, OfferDetailPatch, OfferPatch, OfferView, UserDetails};
