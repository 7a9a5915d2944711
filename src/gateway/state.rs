use std::sync::Arc;

use crate::catalog::OfferService;
use crate::config::AppConfig;
use crate::db::Database;
use crate::orders::OrderService;
use crate::profiles::ProfileService;
use crate::reviews::ReviewService;
use crate::stats::StatsService;
use crate::store::MarketStore;
use crate::user_auth::UserAuthService;

/// Gateway application state (shared across handlers)
pub struct AppState {
    pub offers: OfferService,
    pub orders: OrderService,
    pub reviews: ReviewService,
    pub profiles: ProfileService,
    pub stats: StatsService,
    pub user_auth: UserAuthService,
    /// PostgreSQL pool, absent when running on the in-memory store
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketStore>, config: &AppConfig, pg_db: Option<Arc<Database>>) -> Self {
        Self {
            offers: OfferService::new(store.clone(), config.pagination),
            orders: OrderService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            profiles: ProfileService::new(store.clone()),
            stats: StatsService::new(store.clone()),
            user_auth: UserAuthService::new(
                store,
                config.auth.jwt_secret.clone(),
                config.auth.token_ttl_hours,
            ),
            pg_db,
        }
    }
}
