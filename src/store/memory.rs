//! In-process store
//!
//! Every operation runs under one mutex, so each trait method is atomic
//! the same way a PostgreSQL transaction is. Used by the test suites and
//! by storage-less development runs (no `postgres_url` configured).

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{MarketStore, NewUser, OrderScope, StoreError, StoreResult};
use crate::catalog::query::OfferQuery;
use crate::catalog::types::{NewOffer, OfferDetailInput, OfferDetailPatch, OfferPatch};
use crate::core_types::{OfferDetailId, OfferId, OrderId, ReviewId, UserId};
use crate::models::{NewOrder, Offer, OfferDetail, Order, Review, User, UserRole};
use crate::orders::state::OrderStatus;
use crate::profiles::ProfilePatch;
use crate::reviews::query::ReviewQuery;
use crate::reviews::{NewReview, ReviewPatch};
use crate::stats::BaseInfo;

#[derive(Default)]
struct Tables {
    /// User plus password hash
    users: BTreeMap<UserId, (User, String)>,
    offers: BTreeMap<OfferId, Offer>,
    orders: BTreeMap<OrderId, Order>,
    reviews: BTreeMap<ReviewId, Review>,
    next_user_id: UserId,
    next_offer_id: OfferId,
    next_detail_id: OfferDetailId,
    next_order_id: OrderId,
    next_review_id: ReviewId,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn offer_of_detail(&mut self, id: OfferDetailId) -> Option<&mut Offer> {
        self.offers
            .values_mut()
            .find(|o| o.details.iter().any(|d| d.id == id))
    }

    /// Insert or replace tiers keyed by `offer_type`
    fn upsert_tiers(&mut self, offer_id: OfferId, inputs: &[OfferDetailInput]) {
        let mut next = self.next_detail_id;
        if let Some(offer) = self.offers.get_mut(&offer_id) {
            for input in inputs {
                match offer
                    .details
                    .iter_mut()
                    .find(|d| d.offer_type == input.offer_type)
                {
                    Some(existing) => {
                        existing.title = input.title.clone();
                        existing.revisions = input.revisions;
                        existing.delivery_time_in_days = input.delivery_time_in_days;
                        existing.price = input.price;
                        existing.features = input.features.clone();
                    }
                    None => offer.details.push(OfferDetail {
                        id: next_id(&mut next),
                        offer_id,
                        user: offer.user,
                        title: input.title.clone(),
                        revisions: input.revisions,
                        delivery_time_in_days: input.delivery_time_in_days,
                        price: input.price,
                        features: input.features.clone(),
                        offer_type: input.offer_type,
                    }),
                }
            }
            offer.details.sort_by_key(|d| d.offer_type);
        }
        self.next_detail_id = next;
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.lock();
        if t.users.values().any(|(u, _)| u.username == user.username) {
            return Err(StoreError::Conflict("username"));
        }
        if t.users.values().any(|(u, _)| u.email == user.email) {
            return Err(StoreError::Conflict("email"));
        }
        let id = next_id(&mut t.next_user_id);
        let created = User {
            id,
            username: user.username,
            email: user.email,
            first_name: String::new(),
            last_name: String::new(),
            file: None,
            location: String::new(),
            tel: String::new(),
            description: String::new(),
            working_hours: String::new(),
            role: user.role,
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        t.users.insert(id, (created.clone(), user.password_hash));
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn get_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let t = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| t.users.get(id).map(|(u, _)| u.clone()))
            .collect())
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        Ok(self
            .lock()
            .users
            .values()
            .any(|(u, _)| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.lock().users.values().any(|(u, _)| u.email == email))
    }

    async fn user_credentials(&self, username: &str) -> StoreResult<Option<(User, String)>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|(u, _)| u.username == username)
            .cloned())
    }

    async fn update_profile(&self, id: UserId, patch: &ProfilePatch) -> StoreResult<User> {
        let mut t = self.lock();
        if let Some(email) = &patch.email
            && t.users.values().any(|(u, _)| u.id != id && &u.email == email)
        {
            return Err(StoreError::Conflict("email"));
        }
        let (user, _) = t.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        patch.apply(user);
        Ok(user.clone())
    }

    async fn list_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|(u, _)| u.role == role)
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn create_offer(&self, owner: UserId, offer: &NewOffer) -> StoreResult<Offer> {
        let mut t = self.lock();
        if !t.users.contains_key(&owner) {
            return Err(StoreError::ForeignKey(format!("user {}", owner)));
        }
        let id = next_id(&mut t.next_offer_id);
        let now = Utc::now();
        t.offers.insert(
            id,
            Offer {
                id,
                user: owner,
                title: offer.title.clone(),
                image: offer.image.clone(),
                description: offer.description.clone(),
                created_at: now,
                updated_at: now,
                details: Vec::new(),
            },
        );
        t.upsert_tiers(id, &offer.details);
        t.offers.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_offer(&self, id: OfferId) -> StoreResult<Option<Offer>> {
        Ok(self.lock().offers.get(&id).cloned())
    }

    async fn update_offer(
        &self,
        id: OfferId,
        expected_owner: Option<UserId>,
        patch: &OfferPatch,
    ) -> StoreResult<Offer> {
        let mut t = self.lock();
        let offer = t.offers.get_mut(&id).ok_or(StoreError::NotFound)?;
        if expected_owner.is_some_and(|owner| owner != offer.user) {
            return Err(StoreError::PreconditionFailed("owner"));
        }
        if let Some(title) = &patch.title {
            offer.title = title.clone();
        }
        if let Some(description) = &patch.description {
            offer.description = description.clone();
        }
        if let Some(image) = &patch.image {
            offer.image = Some(image.clone()).filter(|i| !i.is_empty());
        }
        offer.updated_at = Utc::now();
        if let Some(details) = &patch.details {
            t.upsert_tiers(id, details);
        }
        t.offers.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn delete_offer(&self, id: OfferId) -> StoreResult<()> {
        self.lock()
            .offers
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_offers(&self, query: &OfferQuery) -> StoreResult<(u64, Vec<Offer>)> {
        let t = self.lock();
        let mut matched: Vec<&Offer> = t.offers.values().filter(|o| query.matches(o)).collect();
        matched.sort_by(|a, b| query.compare(a, b));
        let count = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .cloned()
            .collect();
        Ok((count, page))
    }

    async fn get_offer_detail(&self, id: OfferDetailId) -> StoreResult<Option<OfferDetail>> {
        let t = self.lock();
        Ok(t
            .offers
            .values()
            .flat_map(|o| o.details.iter())
            .find(|d| d.id == id)
            .cloned())
    }

    async fn update_offer_detail(
        &self,
        id: OfferDetailId,
        patch: &OfferDetailPatch,
    ) -> StoreResult<OfferDetail> {
        let mut t = self.lock();
        let offer = t.offer_of_detail(id).ok_or(StoreError::NotFound)?;
        if let Some(offer_type) = patch.offer_type
            && offer
                .details
                .iter()
                .any(|d| d.id != id && d.offer_type == offer_type)
        {
            return Err(StoreError::Conflict("offer_type"));
        }
        let detail = offer
            .details
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound)?;
        patch.apply(detail);
        let updated = detail.clone();
        offer.details.sort_by_key(|d| d.offer_type);
        offer.updated_at = Utc::now();
        Ok(updated)
    }

    async fn delete_offer_detail(&self, id: OfferDetailId) -> StoreResult<()> {
        let mut t = self.lock();
        let offer = t.offer_of_detail(id).ok_or(StoreError::NotFound)?;
        offer.details.retain(|d| d.id != id);
        offer.updated_at = Utc::now();
        Ok(())
    }

    async fn create_order(&self, order: &NewOrder) -> StoreResult<Order> {
        let mut t = self.lock();
        for user in [order.customer_user, order.business_user] {
            if !t.users.contains_key(&user) {
                return Err(StoreError::ForeignKey(format!("user {}", user)));
            }
        }
        let id = next_id(&mut t.next_order_id);
        let now = Utc::now();
        let created = Order {
            id,
            customer_user: order.customer_user,
            business_user: order.business_user,
            title: order.title.clone(),
            revisions: order.revisions,
            delivery_time_in_days: order.delivery_time_in_days,
            price: order.price,
            features: order.features.clone(),
            offer_type: order.offer_type,
            status: OrderStatus::InProgress,
            created_at: now,
            updated_at: now,
        };
        t.orders.insert(id, created.clone());
        Ok(created)
    }

    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    async fn list_orders(&self, scope: OrderScope) -> StoreResult<Vec<Order>> {
        let t = self.lock();
        let mut orders: Vec<Order> = t
            .orders
            .values()
            .filter(|o| scope.includes(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        business_user: UserId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Order> {
        let mut t = self.lock();
        let order = t.orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        if order.business_user != business_user || order.status != from {
            return Err(StoreError::PreconditionFailed("status"));
        }
        order.status = to;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: OrderId) -> StoreResult<()> {
        self.lock()
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn count_orders(&self, business_user: UserId, status: OrderStatus) -> StoreResult<u64> {
        Ok(self
            .lock()
            .orders
            .values()
            .filter(|o| o.business_user == business_user && o.status == status)
            .count() as u64)
    }

    async fn create_review(&self, reviewer: UserId, review: &NewReview) -> StoreResult<Review> {
        let mut t = self.lock();
        if !t.users.contains_key(&review.business_user) {
            return Err(StoreError::ForeignKey(format!("user {}", review.business_user)));
        }
        if t
            .reviews
            .values()
            .any(|r| r.business_user == review.business_user && r.reviewer == reviewer)
        {
            return Err(StoreError::Conflict("review"));
        }
        let id = next_id(&mut t.next_review_id);
        let now = Utc::now();
        let created = Review {
            id,
            business_user: review.business_user,
            reviewer,
            rating: review.rating,
            description: review.description.clone(),
            created_at: now,
            updated_at: now,
        };
        t.reviews.insert(id, created.clone());
        Ok(created)
    }

    async fn get_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        Ok(self.lock().reviews.get(&id).cloned())
    }

    async fn update_review(
        &self,
        id: ReviewId,
        reviewer: UserId,
        patch: &ReviewPatch,
    ) -> StoreResult<Review> {
        let mut t = self.lock();
        let review = t
            .reviews
            .get_mut(&id)
            .filter(|r| r.reviewer == reviewer)
            .ok_or(StoreError::NotFound)?;
        patch.apply(review);
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn delete_review(&self, id: ReviewId, reviewer: UserId) -> StoreResult<()> {
        let mut t = self.lock();
        if !t.reviews.get(&id).is_some_and(|r| r.reviewer == reviewer) {
            return Err(StoreError::NotFound);
        }
        t.reviews.remove(&id);
        Ok(())
    }

    async fn list_reviews(&self, query: &ReviewQuery) -> StoreResult<Vec<Review>> {
        let t = self.lock();
        let mut reviews: Vec<Review> = t
            .reviews
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| query.compare(a, b));
        Ok(reviews)
    }

    async fn base_info(&self) -> StoreResult<BaseInfo> {
        let t = self.lock();
        let rating_sum: i64 = t.reviews.values().map(|r| i64::from(r.rating)).sum();
        let business_count = t
            .users
            .values()
            .filter(|(u, _)| u.role == UserRole::Business)
            .count();
        Ok(BaseInfo::from_totals(
            t.reviews.len() as u64,
            rating_sum,
            business_count as u64,
            t.offers.len() as u64,
        ))
    }
}
