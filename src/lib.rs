//! Coderr - Freelancer Marketplace Backend
//!
//! Business users publish offers with pricing tiers, customers order a
//! tier and review the business user afterwards.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier aliases (UserId, OfferId, ...)
//! - [`models`] - Persisted entities
//! - [`authz`] - Policy table and two-phase permission checks
//! - [`catalog`] - Offers, tiers and offer listing queries
//! - [`orders`] - Order placement and the status state machine
//! - [`reviews`] - One review per (business user, reviewer)
//! - [`profiles`] - Profile read/update and by-type listings
//! - [`stats`] - Platform totals
//! - [`user_auth`] - Registration, login, bearer tokens
//! - [`store`] - `MarketStore` trait with PostgreSQL and in-memory backends
//! - [`gateway`] - axum router, handlers, response envelope, OpenAPI

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod pagination;

// Domain services
pub mod authz;
pub mod catalog;
pub mod orders;
pub mod profiles;
pub mod reviews;
pub mod stats;
pub mod user_auth;

pub mod gateway;
pub mod store;

// Convenient re-exports at crate root
pub use authz::Actor;
pub use core_types::{OfferDetailId, OfferId, OrderId, ReviewId, UserId};
pub use error::{DomainError, DomainResult};
pub use store::{MarketStore, MemoryStore, PgStore, StoreError};
