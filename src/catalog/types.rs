//! Offer request and response types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::{OfferId, UserId};
use crate::models::{Offer, OfferDetail, OfferType, User};

/// One pricing tier in a create or update payload.
///
/// Tiers are upserted by `offer_type`, so every field is required even on
/// update.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct OfferDetailInput {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    #[schema(example = "Basic Design")]
    pub title: String,
    /// -1 means unlimited
    #[validate(range(min = -1, message = "must be -1 (unlimited) or more"))]
    #[schema(example = 2)]
    pub revisions: i32,
    #[validate(range(min = 1, message = "must be at least 1 day"))]
    #[schema(example = 5)]
    pub delivery_time_in_days: i32,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    #[serde(default)]
    pub features: Vec<String>,
    pub offer_type: OfferType,
}

/// POST /api/offers/
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewOffer {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    #[schema(example = "Grafikdesign-Paket")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Image URL returned by the blob store
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub details: Vec<OfferDetailInput>,
}

/// PATCH /api/offers/{id}/
///
/// Tiers merge by `offer_type`: listed tiers are created or replaced,
/// tiers not listed stay as they are. The tier set is never replaced.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct OfferPatch {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub details: Option<Vec<OfferDetailInput>>,
}

/// PATCH /api/offerdetails/{id}/ (admin only)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct OfferDetailPatch {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(range(min = -1, message = "must be -1 (unlimited) or more"))]
    pub revisions: Option<i32>,
    #[validate(range(min = 1, message = "must be at least 1 day"))]
    pub delivery_time_in_days: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub features: Option<Vec<String>>,
    pub offer_type: Option<OfferType>,
}

impl OfferDetailPatch {
    /// Apply the patch to an in-memory tier
    pub fn apply(&self, detail: &mut OfferDetail) {
        if let Some(title) = &self.title {
            detail.title = title.clone();
        }
        if let Some(revisions) = self.revisions {
            detail.revisions = revisions;
        }
        if let Some(days) = self.delivery_time_in_days {
            detail.delivery_time_in_days = days;
        }
        if let Some(price) = self.price {
            detail.price = price;
        }
        if let Some(features) = &self.features {
            detail.features = features.clone();
        }
        if let Some(offer_type) = self.offer_type {
            detail.offer_type = offer_type;
        }
    }
}

/// Owner snapshot shown next to an offer
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserDetails {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl From<&User> for UserDetails {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}

/// Offer as returned by the API, with computed tier aggregates
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OfferView {
    pub id: OfferId,
    pub user: UserId,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: Vec<OfferDetail>,
    #[schema(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    pub min_delivery_time: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_details: Option<UserDetails>,
}

impl OfferView {
    pub fn new(offer: Offer, owner: Option<&User>) -> Self {
        let min_price = offer.min_price();
        let min_delivery_time = offer.min_delivery_time();
        Self {
            id: offer.id,
            user: offer.user,
            title: offer.title,
            image: offer.image,
            description: offer.description,
            created_at: offer.created_at,
            updated_at: offer.updated_at,
            details: offer.details,
            min_price,
            min_delivery_time,
            user_details: owner.map(UserDetails::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_payload_parses_decimal_strings_and_numbers() {
        let json = r#"{
            "title": "Logo",
            "details": [
                {"title": "Basic", "revisions": 1, "delivery_time_in_days": 5,
                 "price": "10.50", "features": ["Logo"], "offer_type": "basic"},
                {"title": "Premium", "revisions": -1, "delivery_time_in_days": 2,
                 "price": 50, "offer_type": "premium"}
            ]
        }"#;
        let offer: NewOffer = serde_json::from_str(json).unwrap();
        assert_eq!(offer.details.len(), 2);
        assert_eq!(offer.details[0].price, "10.50".parse::<Decimal>().unwrap());
        assert_eq!(offer.details[1].price, Decimal::from(50));
        assert!(offer.details[1].features.is_empty());
        assert!(offer.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let json = r#"{"title": "Logo", "owner": 3}"#;
        assert!(serde_json::from_str::<NewOffer>(json).is_err());
    }

    #[test]
    fn test_tier_validation() {
        let tier = OfferDetailInput {
            title: String::new(),
            revisions: -2,
            delivery_time_in_days: 0,
            price: Decimal::ONE,
            features: vec![],
            offer_type: OfferType::Basic,
        };
        let errors = tier.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("revisions"));
        assert!(fields.contains_key("delivery_time_in_days"));
    }

    #[test]
    fn test_detail_patch_apply() {
        let mut detail = OfferDetail {
            id: 1,
            offer_id: 1,
            user: 1,
            title: "Basic".into(),
            revisions: 1,
            delivery_time_in_days: 5,
            price: Decimal::TEN,
            features: vec![],
            offer_type: OfferType::Basic,
        };
        let patch = OfferDetailPatch {
            price: Some(Decimal::ONE),
            offer_type: Some(OfferType::Standard),
            ..Default::default()
        };
        patch.apply(&mut detail);
        assert_eq!(detail.price, Decimal::ONE);
        assert_eq!(detail.offer_type, OfferType::Standard);
        assert_eq!(detail.title, "Basic");
    }
}
