//! PostgreSQL schema bootstrap
//!
//! Idempotent DDL applied at startup. Uniqueness that guards an invariant
//! (usernames, emails, one tier per type, one review per pair) is a named
//! constraint so violations can be mapped back to a logical key.

use sqlx::PgPool;

pub const USERS_USERNAME_KEY: &str = "users_tb_username_key";
pub const USERS_EMAIL_KEY: &str = "users_tb_email_key";
pub const OFFER_DETAILS_TYPE_KEY: &str = "offer_details_tb_offer_type_key";
pub const REVIEWS_PAIR_KEY: &str = "reviews_tb_pair_key";

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users_tb (
        id              BIGSERIAL PRIMARY KEY,
        username        VARCHAR(150) NOT NULL,
        email           VARCHAR(254) NOT NULL,
        password_hash   TEXT NOT NULL,
        first_name      VARCHAR(150) NOT NULL DEFAULT '',
        last_name       VARCHAR(150) NOT NULL DEFAULT '',
        file            TEXT,
        location        VARCHAR(255) NOT NULL DEFAULT '',
        tel             VARCHAR(50) NOT NULL DEFAULT '',
        description     TEXT NOT NULL DEFAULT '',
        working_hours   VARCHAR(100) NOT NULL DEFAULT '',
        role            VARCHAR(16) NOT NULL CHECK (role IN ('business', 'customer')),
        is_admin        BOOLEAN NOT NULL DEFAULT FALSE,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_tb_username_key UNIQUE (username),
        CONSTRAINT users_tb_email_key UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS offers_tb (
        id              BIGSERIAL PRIMARY KEY,
        user_id         BIGINT NOT NULL REFERENCES users_tb(id) ON DELETE CASCADE,
        title           VARCHAR(255) NOT NULL,
        image           TEXT,
        description     TEXT NOT NULL DEFAULT '',
        created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_offers_user ON offers_tb(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_offers_updated ON offers_tb(updated_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS offer_details_tb (
        id                      BIGSERIAL PRIMARY KEY,
        offer_id                BIGINT NOT NULL REFERENCES offers_tb(id) ON DELETE CASCADE,
        user_id                 BIGINT NOT NULL REFERENCES users_tb(id) ON DELETE CASCADE,
        title                   VARCHAR(255) NOT NULL,
        revisions               INTEGER NOT NULL CHECK (revisions >= -1),
        delivery_time_in_days   INTEGER NOT NULL CHECK (delivery_time_in_days >= 1),
        price                   NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
        features                TEXT[] NOT NULL DEFAULT '{}',
        offer_type              VARCHAR(16) NOT NULL
                                CHECK (offer_type IN ('basic', 'standard', 'premium')),
        CONSTRAINT offer_details_tb_offer_type_key UNIQUE (offer_id, offer_type)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders_tb (
        id                      BIGSERIAL PRIMARY KEY,
        customer_user_id        BIGINT NOT NULL REFERENCES users_tb(id) ON DELETE CASCADE,
        business_user_id        BIGINT NOT NULL REFERENCES users_tb(id) ON DELETE CASCADE,
        title                   VARCHAR(255) NOT NULL,
        revisions               INTEGER NOT NULL,
        delivery_time_in_days   INTEGER NOT NULL,
        price                   NUMERIC(10, 2) NOT NULL,
        features                TEXT[] NOT NULL DEFAULT '{}',
        offer_type              VARCHAR(16) NOT NULL,
        status                  VARCHAR(16) NOT NULL DEFAULT 'in_progress'
                                CHECK (status IN ('in_progress', 'completed', 'cancelled')),
        created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_orders_business_status ON orders_tb(business_user_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders_tb(customer_user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS reviews_tb (
        id                  BIGSERIAL PRIMARY KEY,
        business_user_id    BIGINT NOT NULL REFERENCES users_tb(id) ON DELETE CASCADE,
        reviewer_id         BIGINT NOT NULL REFERENCES users_tb(id) ON DELETE CASCADE,
        rating              INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        description         TEXT NOT NULL DEFAULT '',
        created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT reviews_tb_pair_key UNIQUE (business_user_id, reviewer_id)
    )
    "#,
];

/// Create missing tables and indexes
pub async fn bootstrap(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(statements = STATEMENTS.len(), "database schema ready");
    Ok(())
}

/// Logical key reported for a violated unique constraint
pub fn unique_key(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(USERS_USERNAME_KEY) => "username",
        Some(USERS_EMAIL_KEY) => "email",
        Some(OFFER_DETAILS_TYPE_KEY) => "offer_type",
        Some(REVIEWS_PAIR_KEY) => "review",
        _ => "unique",
    }
}
