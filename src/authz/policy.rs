//! Route policy table
//!
//! Explicit mapping from `(resource, action)` to the ordered checks that
//! guard it. Every service names its policy constant directly; the
//! [`ROUTE_POLICIES`] table is the complete list and backs
//! [`policy_for`].

use super::{Check, Verb};
use crate::models::UserRole;

use Action::*;
use Check::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Offer,
    OfferDetail,
    Order,
    OrderStatus,
    OrderCount,
    Profile,
    ProfileListing,
    Review,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const fn verb(&self) -> Verb {
        match self {
            Action::List | Action::Retrieve => Verb::Get,
            Action::Create => Verb::Post,
            Action::Update => Verb::Patch,
            Action::Delete => Verb::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub resource: Resource,
    pub action: Action,
    pub checks: &'static [Check],
}

impl Policy {
    pub const fn new(resource: Resource, action: Action, checks: &'static [Check]) -> Self {
        Self {
            resource,
            action,
            checks,
        }
    }

    pub const fn verb(&self) -> Verb {
        self.action.verb()
    }
}

const BUSINESS_OWNER: &[Check] = &[
    Authenticated,
    RoleIs(UserRole::Business),
    IsOwnerOrAdmin,
];

// Offers
pub const OFFER_LIST: Policy = Policy::new(Resource::Offer, List, &[AuthenticatedOrReadOnly]);
pub const OFFER_RETRIEVE: Policy = Policy::new(Resource::Offer, Retrieve, &[Authenticated]);
pub const OFFER_CREATE: Policy = Policy::new(
    Resource::Offer,
    Create,
    &[Authenticated, RoleIs(UserRole::Business)],
);
pub const OFFER_UPDATE: Policy = Policy::new(Resource::Offer, Update, BUSINESS_OWNER);
pub const OFFER_DELETE: Policy = Policy::new(Resource::Offer, Delete, BUSINESS_OWNER);

// Single tiers: no owner self-service
pub const OFFER_DETAIL_RETRIEVE: Policy = Policy::new(Resource::OfferDetail, Retrieve, &[IsAdmin]);
pub const OFFER_DETAIL_UPDATE: Policy = Policy::new(Resource::OfferDetail, Update, &[IsAdmin]);
pub const OFFER_DETAIL_DELETE: Policy = Policy::new(Resource::OfferDetail, Delete, &[IsAdmin]);

// Orders
pub const ORDER_LIST: Policy = Policy::new(Resource::Order, List, &[Authenticated]);
pub const ORDER_RETRIEVE: Policy = Policy::new(Resource::Order, Retrieve, &[Authenticated]);
pub const ORDER_CREATE: Policy = Policy::new(
    Resource::Order,
    Create,
    &[Authenticated, RoleIs(UserRole::Customer)],
);
/// Status changes belong to the business participant
pub const ORDER_STATUS_UPDATE: Policy =
    Policy::new(Resource::OrderStatus, Update, &[Authenticated, IsOwner]);
pub const ORDER_DELETE: Policy = Policy::new(Resource::Order, Delete, &[IsAdmin]);
pub const ORDER_COUNT: Policy = Policy::new(Resource::OrderCount, Retrieve, &[Authenticated]);

// Profiles
pub const PROFILE_RETRIEVE: Policy = Policy::new(Resource::Profile, Retrieve, &[Authenticated]);
pub const PROFILE_UPDATE: Policy =
    Policy::new(Resource::Profile, Update, &[Authenticated, IsSelfOrAdmin]);
pub const PROFILE_LIST_BY_TYPE: Policy = Policy::new(Resource::ProfileListing, List, &[IsAdmin]);

// Reviews: reviewer only, no admin override
pub const REVIEW_LIST: Policy = Policy::new(Resource::Review, List, &[Authenticated]);
pub const REVIEW_CREATE: Policy = Policy::new(
    Resource::Review,
    Create,
    &[Authenticated, RoleIs(UserRole::Customer)],
);
pub const REVIEW_UPDATE: Policy = Policy::new(Resource::Review, Update, &[Authenticated, IsOwner]);
pub const REVIEW_DELETE: Policy = Policy::new(Resource::Review, Delete, &[Authenticated, IsOwner]);

// Platform stats are public
pub const STATS_LIST: Policy = Policy::new(Resource::Stats, List, &[]);

pub const ROUTE_POLICIES: &[Policy] = &[
    OFFER_LIST,
    OFFER_RETRIEVE,
    OFFER_CREATE,
    OFFER_UPDATE,
    OFFER_DELETE,
    OFFER_DETAIL_RETRIEVE,
    OFFER_DETAIL_UPDATE,
    OFFER_DETAIL_DELETE,
    ORDER_LIST,
    ORDER_RETRIEVE,
    ORDER_CREATE,
    ORDER_STATUS_UPDATE,
    ORDER_DELETE,
    ORDER_COUNT,
    PROFILE_RETRIEVE,
    PROFILE_UPDATE,
    PROFILE_LIST_BY_TYPE,
    REVIEW_LIST,
    REVIEW_CREATE,
    REVIEW_UPDATE,
    REVIEW_DELETE,
    STATS_LIST,
];

/// Look up the policy guarding `(resource, action)`; `None` means the
/// action is not exposed at all.
pub fn policy_for(resource: Resource, action: Action) -> Option<&'static Policy> {
    ROUTE_POLICIES
        .iter()
        .find(|p| p.resource == resource && p.action == action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_has_no_duplicate_routes() {
        let mut seen = HashSet::new();
        for p in ROUTE_POLICIES {
            assert!(
                seen.insert((p.resource, p.action)),
                "duplicate policy for {:?} {:?}",
                p.resource,
                p.action
            );
        }
    }

    #[test]
    fn test_unexposed_actions() {
        assert!(policy_for(Resource::OfferDetail, Action::Create).is_none());
        assert!(policy_for(Resource::Stats, Action::Delete).is_none());
        assert!(policy_for(Resource::Order, Action::Update).is_none());
    }

    #[test]
    fn test_lookup_matches_constants() {
        assert_eq!(policy_for(Resource::Order, Action::Delete), Some(&ORDER_DELETE));
        assert_eq!(
            policy_for(Resource::Offer, Action::Update).map(|p| p.checks),
            Some(BUSINESS_OWNER)
        );
    }

    #[test]
    fn test_authentication_is_evaluated_first() {
        for p in ROUTE_POLICIES {
            if let Some(pos) = p.checks.iter().position(|c| matches!(c, RoleIs(_))) {
                assert!(
                    p.checks[..pos]
                        .iter()
                        .any(|c| matches!(c, Authenticated | AuthenticatedOrReadOnly)),
                    "{:?} {:?} checks role before authentication",
                    p.resource,
                    p.action
                );
            }
        }
    }

    #[test]
    fn test_action_verbs() {
        assert_eq!(List.verb(), Verb::Get);
        assert_eq!(Create.verb(), Verb::Post);
        assert_eq!(Update.verb(), Verb::Patch);
        assert_eq!(Delete.verb(), Verb::Delete);
    }
}
