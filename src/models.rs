//! Persisted marketplace entities
//!
//! Users, offers with their pricing tiers, orders and reviews. These are the
//! rows the store hands back; request and response DTOs live next to the
//! service that owns them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{OfferDetailId, OfferId, OrderId, ReviewId, UserId};
use crate::orders::state::OrderStatus;

// ============================================================================
// Users
// ============================================================================

/// Account type chosen at registration. Never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Business,
    Customer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Business => "business",
            UserRole::Customer => "customer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business" => Ok(UserRole::Business),
            "customer" => Ok(UserRole::Customer),
            _ => Err(()),
        }
    }
}

/// User account (password hash is never part of this struct)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Profile picture URL in the blob store
    pub file: Option<String>,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    pub role: UserRole,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_business(&self) -> bool {
        self.role == UserRole::Business
    }

    pub fn is_customer(&self) -> bool {
        self.role == UserRole::Customer
    }
}

// ============================================================================
// Offers
// ============================================================================

/// Pricing tier key. Unique within one offer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    Basic,
    Standard,
    Premium,
}

impl OfferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Basic => "basic",
            OfferType::Standard => "standard",
            OfferType::Premium => "premium",
        }
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(OfferType::Basic),
            "standard" => Ok(OfferType::Standard),
            "premium" => Ok(OfferType::Premium),
            _ => Err(()),
        }
    }
}

/// One priced variant of an offer
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OfferDetail {
    pub id: OfferDetailId,
    #[serde(rename = "offer")]
    pub offer_id: OfferId,
    /// Owner of the parent offer
    pub user: UserId,
    pub title: String,
    /// -1 means unlimited revisions
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

/// A business user's published service listing
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub id: OfferId,
    pub user: UserId,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Tiers ordered basic, standard, premium
    pub details: Vec<OfferDetail>,
}

impl Offer {
    /// Cheapest tier price, `None` for an offer without tiers
    pub fn min_price(&self) -> Option<Decimal> {
        self.details.iter().map(|d| d.price).min()
    }

    /// Fastest tier delivery time in days
    pub fn min_delivery_time(&self) -> Option<i32> {
        self.details.iter().map(|d| d.delivery_time_in_days).min()
    }

    pub fn detail(&self, offer_type: OfferType) -> Option<&OfferDetail> {
        self.details.iter().find(|d| d.offer_type == offer_type)
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Order placed by a customer against one offer tier.
///
/// The commercial fields are copied from the tier when the order is
/// created and never change afterwards; only `status` moves.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Order {
    pub id: OrderId,
    pub customer_user: UserId,
    pub business_user: UserId,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[schema(value_type = String, example = "150.00")]
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: OfferType,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for an order: a snapshot of the tier at order time
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_user: UserId,
    pub business_user: UserId,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

impl NewOrder {
    pub fn snapshot(detail: &OfferDetail, customer: UserId) -> Self {
        Self {
            customer_user: customer,
            business_user: detail.user,
            title: detail.title.clone(),
            revisions: detail.revisions,
            delivery_time_in_days: detail.delivery_time_in_days,
            price: detail.price,
            features: detail.features.clone(),
            offer_type: detail.offer_type,
        }
    }
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Review {
    pub id: ReviewId,
    pub business_user: UserId,
    pub reviewer: UserId,
    pub rating: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
