//! Property tests for the computed offer fields and listing filters.

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use coderr::Actor;
use coderr::catalog::{NewOffer, OfferDetailInput, OfferListParams, OfferService};
use coderr::models::{OfferType, UserRole};
use coderr::pagination::PaginationConfig;
use coderr::store::{MarketStore, MemoryStore, NewUser};

const TYPES: [OfferType; 3] = [OfferType::Basic, OfferType::Standard, OfferType::Premium];

/// 1 to 3 tiers with distinct types: (price in cents, delivery days)
fn tiers() -> impl Strategy<Value = Vec<OfferDetailInput>> {
    prop::collection::vec((0i64..1_000_000, 1i32..90), 1..=3).prop_map(|raw| {
        raw.into_iter()
            .zip(TYPES)
            .map(|((cents, days), offer_type)| OfferDetailInput {
                title: format!("{} tier", offer_type),
                revisions: 1,
                delivery_time_in_days: days,
                price: Decimal::new(cents, 2),
                features: vec![],
                offer_type,
            })
            .collect()
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn seeded(details: Vec<OfferDetailInput>) -> (OfferService, Actor) {
    let store = Arc::new(MemoryStore::new());
    let user = store
        .create_user(NewUser {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password_hash: "unused".into(),
            role: UserRole::Business,
            is_admin: false,
        })
        .await
        .unwrap();
    let store: Arc<dyn MarketStore> = store;
    let service = OfferService::new(store, PaginationConfig::default());
    let business = Actor::User(user);
    service
        .create_offer(
            &business,
            NewOffer {
                title: "Logo".into(),
                description: String::new(),
                image: None,
                details,
            },
        )
        .await
        .unwrap();
    (service, business)
}

proptest! {
    #[test]
    fn prop_computed_fields_are_tier_minima(details in tiers()) {
        let expected_price = details.iter().map(|d| d.price).min();
        let expected_days = details.iter().map(|d| d.delivery_time_in_days).min();
        let tier_count = details.len();

        let (offer, listed) = runtime().block_on(async {
            let (service, business) = seeded(details).await;
            let page = service
                .list_offers(&Actor::Anonymous, &OfferListParams::default())
                .await
                .unwrap();
            let listed = page.results[0].clone();
            let offer = service.get_offer(&business, listed.id).await.unwrap();
            (offer, listed)
        });

        prop_assert_eq!(offer.details.len(), tier_count);
        prop_assert_eq!(offer.min_price, expected_price);
        prop_assert_eq!(offer.min_delivery_time, expected_days);
        prop_assert_eq!(listed.min_price, expected_price);
        prop_assert_eq!(listed.min_delivery_time, expected_days);
    }

    #[test]
    fn prop_min_price_filter_is_at_most(details in tiers(), bound_cents in 0i64..1_000_000) {
        let bound = Decimal::new(bound_cents, 2);
        let cheapest = details.iter().map(|d| d.price).min().unwrap();
        let fastest = details.iter().map(|d| d.delivery_time_in_days).min().unwrap();

        let (by_price, by_days) = runtime().block_on(async {
            let (service, _) = seeded(details).await;
            let by_price = service
                .list_offers(
                    &Actor::Anonymous,
                    &OfferListParams {
                        min_price: Some(bound.to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap()
                .count;
            let by_days = service
                .list_offers(
                    &Actor::Anonymous,
                    &OfferListParams {
                        max_delivery_time: Some(fastest.to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap()
                .count;
            (by_price, by_days)
        });

        prop_assert_eq!(by_price, u64::from(cheapest <= bound));
        prop_assert_eq!(by_days, 1);
    }
}
