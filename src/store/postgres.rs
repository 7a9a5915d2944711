//! PostgreSQL store
//!
//! Runtime-checked `sqlx` queries. Guarded writes either run in one
//! transaction with `SELECT ... FOR UPDATE`, or carry their precondition
//! in the `WHERE` clause (compare-and-set).

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use super::{MarketStore, NewUser, OrderScope, StoreError, StoreResult};
use crate::catalog::query::{OfferOrdering, OfferQuery};
use crate::catalog::types::{NewOffer, OfferDetailInput, OfferDetailPatch, OfferPatch};
use crate::core_types::{OfferDetailId, OfferId, OrderId, ReviewId, UserId};
use crate::models::{NewOrder, Offer, OfferDetail, Order, Review, User, UserRole};
use crate::orders::state::OrderStatus;
use crate::profiles::ProfilePatch;
use crate::reviews::query::{ReviewOrdering, ReviewQuery};
use crate::reviews::{NewReview, ReviewPatch};
use crate::stats::BaseInfo;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, file, location, tel, \
     description, working_hours, role, is_admin, created_at";

const OFFER_COLUMNS: &str = "id, user_id, title, image, description, created_at, updated_at";

const DETAIL_COLUMNS: &str =
    "id, offer_id, user_id, title, revisions, delivery_time_in_days, price, features, offer_type";

const ORDER_COLUMNS: &str = "id, customer_user_id, business_user_id, title, revisions, \
     delivery_time_in_days, price, features, offer_type, status, created_at, updated_at";

const REVIEW_COLUMNS: &str =
    "id, business_user_id, reviewer_id, rating, description, created_at, updated_at";

/// Filters shared by the offer page and count queries.
/// `$1` creator, `$2` price bound, `$3` delivery bound, `$4` ILIKE pattern.
const OFFER_FILTER: &str = r#"
    WITH agg AS (
        SELECT o.id, o.user_id, o.title, o.image, o.description, o.created_at, o.updated_at,
               MIN(d.price) AS min_price,
               MIN(d.delivery_time_in_days) AS min_delivery_time
        FROM offers_tb o
        LEFT JOIN offer_details_tb d ON d.offer_id = o.id
        GROUP BY o.id
    )
    SELECT {columns} FROM agg
    WHERE ($1::BIGINT IS NULL OR user_id = $1)
      AND ($2::NUMERIC IS NULL OR min_price <= $2)
      AND ($3::INTEGER IS NULL OR min_delivery_time <= $3)
      AND ($4::TEXT IS NULL OR title ILIKE $4 OR description ILIKE $4)
"#;

fn decode_error(column: &str, value: &str) -> StoreError {
    StoreError::Database(sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unexpected value '{}'", value).into(),
    })
}

fn parse_column<T: std::str::FromStr>(row: &PgRow, column: &str) -> StoreResult<T> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|_| decode_error(column, &raw))
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        file: row.try_get("file")?,
        location: row.try_get("location")?,
        tel: row.try_get("tel")?,
        description: row.try_get("description")?,
        working_hours: row.try_get("working_hours")?,
        role: parse_column(row, "role")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
    })
}

fn detail_from_row(row: &PgRow) -> StoreResult<OfferDetail> {
    Ok(OfferDetail {
        id: row.try_get("id")?,
        offer_id: row.try_get("offer_id")?,
        user: row.try_get("user_id")?,
        title: row.try_get("title")?,
        revisions: row.try_get("revisions")?,
        delivery_time_in_days: row.try_get("delivery_time_in_days")?,
        price: row.try_get("price")?,
        features: row.try_get("features")?,
        offer_type: parse_column(row, "offer_type")?,
    })
}

fn offer_from_row(row: &PgRow) -> StoreResult<Offer> {
    Ok(Offer {
        id: row.try_get("id")?,
        user: row.try_get("user_id")?,
        title: row.try_get("title")?,
        image: row.try_get("image")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        details: Vec::new(),
    })
}

fn order_from_row(row: &PgRow) -> StoreResult<Order> {
    Ok(Order {
        id: row.try_get("id")?,
        customer_user: row.try_get("customer_user_id")?,
        business_user: row.try_get("business_user_id")?,
        title: row.try_get("title")?,
        revisions: row.try_get("revisions")?,
        delivery_time_in_days: row.try_get("delivery_time_in_days")?,
        price: row.try_get("price")?,
        features: row.try_get("features")?,
        offer_type: parse_column(row, "offer_type")?,
        status: parse_column(row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn review_from_row(row: &PgRow) -> StoreResult<Review> {
    Ok(Review {
        id: row.try_get("id")?,
        business_user: row.try_get("business_user_id")?,
        reviewer: row.try_get("reviewer_id")?,
        rating: row.try_get("rating")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// `%term%` with LIKE wildcards escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn offer_order_by(ordering: OfferOrdering) -> &'static str {
    match ordering {
        OfferOrdering::UpdatedAtAsc => "updated_at ASC, id ASC",
        OfferOrdering::UpdatedAtDesc => "updated_at DESC, id ASC",
        OfferOrdering::MinPriceAsc => "min_price ASC NULLS LAST, id ASC",
        OfferOrdering::MinPriceDesc => "min_price DESC NULLS LAST, id ASC",
    }
}

fn review_order_by(ordering: ReviewOrdering) -> &'static str {
    match ordering {
        ReviewOrdering::UpdatedAtAsc => "updated_at ASC, id ASC",
        ReviewOrdering::UpdatedAtDesc => "updated_at DESC, id ASC",
        ReviewOrdering::RatingAsc => "rating ASC, id ASC",
        ReviewOrdering::RatingDesc => "rating DESC, id ASC",
    }
}

/// Insert or replace tiers keyed by `(offer_id, offer_type)`
async fn upsert_tiers(
    conn: &mut PgConnection,
    offer_id: OfferId,
    owner: UserId,
    tiers: &[OfferDetailInput],
) -> StoreResult<()> {
    for tier in tiers {
        sqlx::query(
            r#"
            INSERT INTO offer_details_tb
                (offer_id, user_id, title, revisions, delivery_time_in_days, price, features, offer_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (offer_id, offer_type) DO UPDATE SET
                title = EXCLUDED.title,
                revisions = EXCLUDED.revisions,
                delivery_time_in_days = EXCLUDED.delivery_time_in_days,
                price = EXCLUDED.price,
                features = EXCLUDED.features
            "#,
        )
        .bind(offer_id)
        .bind(owner)
        .bind(&tier.title)
        .bind(tier.revisions)
        .bind(tier.delivery_time_in_days)
        .bind(tier.price)
        .bind(&tier.features)
        .bind(tier.offer_type.as_str())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach tiers to offers, ordered basic, standard, premium
    async fn with_details(&self, mut offers: Vec<Offer>) -> StoreResult<Vec<Offer>> {
        if offers.is_empty() {
            return Ok(offers);
        }
        let ids: Vec<OfferId> = offers.iter().map(|o| o.id).collect();
        let rows = sqlx::query(&format!(
            "SELECT {} FROM offer_details_tb WHERE offer_id = ANY($1)",
            DETAIL_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_offer: HashMap<OfferId, Vec<OfferDetail>> = HashMap::new();
        for row in &rows {
            let detail = detail_from_row(row)?;
            by_offer.entry(detail.offer_id).or_default().push(detail);
        }
        for offer in &mut offers {
            let mut details = by_offer.remove(&offer.id).unwrap_or_default();
            details.sort_by_key(|d| d.offer_type);
            offer.details = details;
        }
        Ok(offers)
    }
}

#[async_trait]
impl MarketStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users_tb (username, email, password_hash, role, is_admin) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await?;
        user_from_row(&row)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users_tb WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users_tb WHERE id = ANY($1) ORDER BY id",
            USER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users_tb WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users_tb WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn user_credentials(&self, username: &str) -> StoreResult<Option<(User, String)>> {
        let row = sqlx::query(&format!(
            "SELECT {}, password_hash FROM users_tb WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some((user_from_row(&row)?, row.try_get("password_hash")?))),
            None => Ok(None),
        }
    }

    async fn update_profile(&self, id: UserId, patch: &ProfilePatch) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users_tb SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                file = CASE WHEN $4::TEXT IS NULL THEN file ELSE NULLIF($4, '') END,
                location = COALESCE($5, location),
                tel = COALESCE($6, tel),
                description = COALESCE($7, description),
                working_hours = COALESCE($8, working_hours),
                email = COALESCE($9, email)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.file)
        .bind(&patch.location)
        .bind(&patch.tel)
        .bind(&patch.description)
        .bind(&patch.working_hours)
        .bind(&patch.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        user_from_row(&row)
    }

    async fn list_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users_tb WHERE role = $1 ORDER BY id",
            USER_COLUMNS
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(user_from_row).collect()
    }

    async fn create_offer(&self, owner: UserId, offer: &NewOffer) -> StoreResult<Offer> {
        let mut tx = self.pool.begin().await?;
        let id: OfferId = sqlx::query_scalar(
            "INSERT INTO offers_tb (user_id, title, image, description) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(owner)
        .bind(&offer.title)
        .bind(&offer.image)
        .bind(&offer.description)
        .fetch_one(&mut *tx)
        .await?;
        upsert_tiers(&mut tx, id, owner, &offer.details).await?;
        tx.commit().await?;

        self.get_offer(id).await?.ok_or(StoreError::NotFound)
    }

    async fn get_offer(&self, id: OfferId) -> StoreResult<Option<Offer>> {
        let row = sqlx::query(&format!("SELECT {} FROM offers_tb WHERE id = $1", OFFER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let offers = self.with_details(vec![offer_from_row(&row)?]).await?;
        Ok(offers.into_iter().next())
    }

    async fn update_offer(
        &self,
        id: OfferId,
        expected_owner: Option<UserId>,
        patch: &OfferPatch,
    ) -> StoreResult<Offer> {
        let mut tx = self.pool.begin().await?;
        let owner: UserId =
            sqlx::query_scalar("SELECT user_id FROM offers_tb WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound)?;
        if expected_owner.is_some_and(|expected| expected != owner) {
            return Err(StoreError::PreconditionFailed("owner"));
        }

        sqlx::query(
            r#"
            UPDATE offers_tb SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                image = CASE WHEN $4::TEXT IS NULL THEN image ELSE NULLIF($4, '') END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(&patch.image)
        .execute(&mut *tx)
        .await?;

        if let Some(details) = &patch.details {
            upsert_tiers(&mut tx, id, owner, details).await?;
        }
        tx.commit().await?;

        self.get_offer(id).await?.ok_or(StoreError::NotFound)
    }

    async fn delete_offer(&self, id: OfferId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM offers_tb WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_offers(&self, query: &OfferQuery) -> StoreResult<(u64, Vec<Offer>)> {
        let pattern = query.search.as_deref().map(like_pattern);

        let count_sql = OFFER_FILTER.replace("{columns}", "COUNT(*)");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(query.creator_id)
            .bind(query.min_price)
            .bind(query.max_delivery_time)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let page_sql = format!(
            "{} ORDER BY {} LIMIT $5 OFFSET $6",
            OFFER_FILTER.replace("{columns}", OFFER_COLUMNS),
            offer_order_by(query.ordering)
        );
        let rows = sqlx::query(&page_sql)
            .bind(query.creator_id)
            .bind(query.min_price)
            .bind(query.max_delivery_time)
            .bind(&pattern)
            .bind(query.page.limit() as i64)
            .bind(query.page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
        let offers = rows
            .iter()
            .map(offer_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((total as u64, self.with_details(offers).await?))
    }

    async fn get_offer_detail(&self, id: OfferDetailId) -> StoreResult<Option<OfferDetail>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM offer_details_tb WHERE id = $1",
            DETAIL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(detail_from_row).transpose()
    }

    async fn update_offer_detail(
        &self,
        id: OfferDetailId,
        patch: &OfferDetailPatch,
    ) -> StoreResult<OfferDetail> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!(
            r#"
            UPDATE offer_details_tb SET
                title = COALESCE($2, title),
                revisions = COALESCE($3, revisions),
                delivery_time_in_days = COALESCE($4, delivery_time_in_days),
                price = COALESCE($5, price),
                features = COALESCE($6, features),
                offer_type = COALESCE($7, offer_type)
            WHERE id = $1
            RETURNING {}
            "#,
            DETAIL_COLUMNS
        ))
        .bind(id)
        .bind(&patch.title)
        .bind(patch.revisions)
        .bind(patch.delivery_time_in_days)
        .bind(patch.price)
        .bind(&patch.features)
        .bind(patch.offer_type.map(|t| t.as_str()))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;
        let detail = detail_from_row(&row)?;

        sqlx::query("UPDATE offers_tb SET updated_at = NOW() WHERE id = $1")
            .bind(detail.offer_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(detail)
    }

    async fn delete_offer_detail(&self, id: OfferDetailId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let offer_id: OfferId =
            sqlx::query_scalar("DELETE FROM offer_details_tb WHERE id = $1 RETURNING offer_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound)?;
        sqlx::query("UPDATE offers_tb SET updated_at = NOW() WHERE id = $1")
            .bind(offer_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn create_order(&self, order: &NewOrder) -> StoreResult<Order> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders_tb
                (customer_user_id, business_user_id, title, revisions, delivery_time_in_days,
                 price, features, offer_type, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(order.customer_user)
        .bind(order.business_user)
        .bind(&order.title)
        .bind(order.revisions)
        .bind(order.delivery_time_in_days)
        .bind(order.price)
        .bind(&order.features)
        .bind(order.offer_type.as_str())
        .bind(OrderStatus::InProgress.as_str())
        .fetch_one(&self.pool)
        .await?;
        order_from_row(&row)
    }

    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {} FROM orders_tb WHERE id = $1", ORDER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn list_orders(&self, scope: OrderScope) -> StoreResult<Vec<Order>> {
        let (filter, user) = match scope {
            OrderScope::All => ("TRUE", None),
            OrderScope::Customer(id) => ("customer_user_id = $1", Some(id)),
            OrderScope::Business(id) => ("business_user_id = $1", Some(id)),
        };
        let sql = format!(
            "SELECT {} FROM orders_tb WHERE {} ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS, filter
        );
        let mut query = sqlx::query(&sql);
        if let Some(user) = user {
            query = query.bind(user);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(order_from_row).collect()
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        business_user: UserId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Order> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders_tb SET status = $4, updated_at = NOW()
            WHERE id = $1 AND business_user_id = $2 AND status = $3
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(id)
        .bind(business_user)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => order_from_row(&row),
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders_tb WHERE id = $1)")
                        .bind(id)
                        .fetch_one(&self.pool)
                        .await?;
                Err(if exists {
                    StoreError::PreconditionFailed("status")
                } else {
                    StoreError::NotFound
                })
            }
        }
    }

    async fn delete_order(&self, id: OrderId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM orders_tb WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_orders(&self, business_user: UserId, status: OrderStatus) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders_tb WHERE business_user_id = $1 AND status = $2",
        )
        .bind(business_user)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    async fn create_review(&self, reviewer: UserId, review: &NewReview) -> StoreResult<Review> {
        let row = sqlx::query(&format!(
            "INSERT INTO reviews_tb (business_user_id, reviewer_id, rating, description) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(review.business_user)
        .bind(reviewer)
        .bind(review.rating)
        .bind(&review.description)
        .fetch_one(&self.pool)
        .await?;
        review_from_row(&row)
    }

    async fn get_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        let row = sqlx::query(&format!("SELECT {} FROM reviews_tb WHERE id = $1", REVIEW_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(review_from_row).transpose()
    }

    async fn update_review(
        &self,
        id: ReviewId,
        reviewer: UserId,
        patch: &ReviewPatch,
    ) -> StoreResult<Review> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE reviews_tb SET
                rating = COALESCE($3, rating),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1 AND reviewer_id = $2
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(id)
        .bind(reviewer)
        .bind(patch.rating)
        .bind(&patch.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        review_from_row(&row)
    }

    async fn delete_review(&self, id: ReviewId, reviewer: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM reviews_tb WHERE id = $1 AND reviewer_id = $2")
            .bind(id)
            .bind(reviewer)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_reviews(&self, query: &ReviewQuery) -> StoreResult<Vec<Review>> {
        let sql = format!(
            "SELECT {} FROM reviews_tb \
             WHERE ($1::BIGINT IS NULL OR business_user_id = $1) \
               AND ($2::BIGINT IS NULL OR reviewer_id = $2) \
             ORDER BY {}",
            REVIEW_COLUMNS,
            review_order_by(query.ordering)
        );
        let rows = sqlx::query(&sql)
            .bind(query.business_user)
            .bind(query.reviewer)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(review_from_row).collect()
    }

    async fn base_info(&self) -> StoreResult<BaseInfo> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM reviews_tb) AS review_count,
                (SELECT COALESCE(SUM(rating), 0)::BIGINT FROM reviews_tb) AS rating_sum,
                (SELECT COUNT(*) FROM users_tb WHERE role = 'business') AS business_count,
                (SELECT COUNT(*) FROM offers_tb) AS offer_count
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        let review_count: i64 = row.try_get("review_count")?;
        let rating_sum: i64 = row.try_get("rating_sum")?;
        let business_count: i64 = row.try_get("business_count")?;
        let offer_count: i64 = row.try_get("offer_count")?;
        Ok(BaseInfo::from_totals(
            review_count as u64,
            rating_sum,
            business_count as u64,
            offer_count as u64,
        ))
    }
}
