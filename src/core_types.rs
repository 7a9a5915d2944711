//! Core types used throughout the system
//!
//! Identifier aliases shared by the store, the services and the gateway.
//! All ids are PostgreSQL `BIGSERIAL` values.

/// User ID - primary key of an account, immutable after registration.
pub type UserId = i64;

/// Offer ID
pub type OfferId = i64;

/// Offer detail (pricing tier) ID
pub type OfferDetailId = i64;

/// Order ID
pub type OrderId = i64;

/// Review ID
pub type ReviewId = i64;
