//! Data store abstraction
//!
//! [`MarketStore`] is the only way services touch persistence. It enables:
//! - PostgreSQL in production ([`PgStore`])
//! - an in-process store for tests and storage-less runs ([`MemoryStore`])
//!
//! Read-then-write sequences that guard an invariant (review uniqueness,
//! tier upsert, ownership re-check, status compare-and-set) are single
//! store operations so they run inside one transaction.

pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::query::OfferQuery;
use crate::catalog::types::{NewOffer, OfferDetailPatch, OfferPatch};
use crate::core_types::{OfferDetailId, OfferId, OrderId, ReviewId, UserId};
use crate::models::{NewOrder, Offer, OfferDetail, Order, Review, User, UserRole};
use crate::orders::state::OrderStatus;
use crate::profiles::ProfilePatch;
use crate::reviews::query::ReviewQuery;
use crate::reviews::{NewReview, ReviewPatch};
use crate::stats::BaseInfo;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique constraint violated; carries the logical key name
    #[error("unique constraint violated: {0}")]
    Conflict(&'static str),

    #[error("referenced row does not exist: {0}")]
    ForeignKey(String),

    #[error("row not found")]
    NotFound,

    /// A guarded write found the row in a different state than authorized
    #[error("precondition failed: {0}")]
    PreconditionFailed(&'static str),

    /// A value the column cannot hold (SQLSTATE 22001 / 22003 / 23514)
    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    /// Classify constraint violations and values the schema cannot hold
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some("23505") => return StoreError::Conflict(schema::unique_key(db_err.constraint())),
                Some("23503") => {
                    return StoreError::ForeignKey(
                        db_err.constraint().unwrap_or("foreign key").to_string(),
                    );
                }
                Some("22001") | Some("22003") | Some("23514") => {
                    return StoreError::OutOfRange(
                        db_err.constraint().unwrap_or("value").to_string(),
                    );
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Insert payload for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_admin: bool,
}

/// Which orders a listing may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    All,
    Customer(UserId),
    Business(UserId),
}

impl OrderScope {
    pub fn includes(&self, order: &Order) -> bool {
        match self {
            OrderScope::All => true,
            OrderScope::Customer(id) => order.customer_user == *id,
            OrderScope::Business(id) => order.business_user == *id,
        }
    }
}

#[async_trait]
pub trait MarketStore: Send + Sync {
    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Fails with `Conflict("username" | "email")` on duplicates
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn get_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;

    async fn username_exists(&self, username: &str) -> StoreResult<bool>;

    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    /// User plus stored password hash, for credential checks only
    async fn user_credentials(&self, username: &str) -> StoreResult<Option<(User, String)>>;

    /// Fails with `NotFound`, or `Conflict("email")`
    async fn update_profile(&self, id: UserId, patch: &ProfilePatch) -> StoreResult<User>;

    async fn list_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>>;

    // ------------------------------------------------------------------
    // Offers
    // ------------------------------------------------------------------

    /// Insert the offer and upsert its tiers in one transaction
    async fn create_offer(&self, owner: UserId, offer: &NewOffer) -> StoreResult<Offer>;

    async fn get_offer(&self, id: OfferId) -> StoreResult<Option<Offer>>;

    /// Patch an offer and merge tiers by `offer_type`.
    ///
    /// `expected_owner` is re-checked inside the transaction (`None` skips
    /// the check for admins); a mismatch fails `PreconditionFailed`.
    async fn update_offer(
        &self,
        id: OfferId,
        expected_owner: Option<UserId>,
        patch: &OfferPatch,
    ) -> StoreResult<Offer>;

    async fn delete_offer(&self, id: OfferId) -> StoreResult<()>;

    /// One page of offers matching the query, plus the total match count
    async fn list_offers(&self, query: &OfferQuery) -> StoreResult<(u64, Vec<Offer>)>;

    async fn get_offer_detail(&self, id: OfferDetailId) -> StoreResult<Option<OfferDetail>>;

    /// Fails with `Conflict("offer_type")` when the new type is taken
    async fn update_offer_detail(
        &self,
        id: OfferDetailId,
        patch: &OfferDetailPatch,
    ) -> StoreResult<OfferDetail>;

    async fn delete_offer_detail(&self, id: OfferDetailId) -> StoreResult<()>;

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    async fn create_order(&self, order: &NewOrder) -> StoreResult<Order>;

    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Order>>;

    /// Newest first
    async fn list_orders(&self, scope: OrderScope) -> StoreResult<Vec<Order>>;

    /// Compare-and-set: succeeds only while the order still belongs to
    /// `business_user` and is in state `from`.
    async fn update_order_status(
        &self,
        id: OrderId,
        business_user: UserId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Order>;

    async fn delete_order(&self, id: OrderId) -> StoreResult<()>;

    async fn count_orders(&self, business_user: UserId, status: OrderStatus) -> StoreResult<u64>;

    // ------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------

    /// Fails with `Conflict("review")` when the reviewer already rated
    /// this business user
    async fn create_review(&self, reviewer: UserId, review: &NewReview) -> StoreResult<Review>;

    async fn get_review(&self, id: ReviewId) -> StoreResult<Option<Review>>;

    /// Only succeeds while `reviewer` still wrote the review
    async fn update_review(
        &self,
        id: ReviewId,
        reviewer: UserId,
        patch: &ReviewPatch,
    ) -> StoreResult<Review>;

    async fn delete_review(&self, id: ReviewId, reviewer: UserId) -> StoreResult<()>;

    async fn list_reviews(&self, query: &ReviewQuery) -> StoreResult<Vec<Review>>;

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    async fn base_info(&self) -> StoreResult<BaseInfo>;
}
