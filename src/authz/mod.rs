//! Authorization engine
//!
//! Composable permission checks over `(actor, verb, target)`. A [`Policy`]
//! is an ordered list of checks that must all pass; the first failing
//! check decides the error. Checks run in two phases, mirroring how a
//! request is served:
//!
//! 1. [`Policy::check`] before the target is loaded (collection level);
//! 2. [`Policy::check_object`] once the target is known.
//!
//! A failure for an anonymous actor is reported as `Unauthenticated`,
//! a failure for a logged-in actor as `Forbidden`.

pub mod policy;

use crate::core_types::UserId;
use crate::error::{DomainError, DomainResult};
use crate::models::{Offer, OfferDetail, Order, Review, User, UserRole};

pub use policy::{Action, Policy, ROUTE_POLICIES, Resource, policy_for};

// ============================================================================
// Verbs and actors
// ============================================================================

/// HTTP-style verb of the attempted action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    /// Safe verbs only read
    #[inline]
    pub fn is_safe(&self) -> bool {
        matches!(self, Verb::Get | Verb::Head)
    }
}

/// Who is making the request, resolved by the authentication gate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    User(User),
}

impl Actor {
    pub fn user(&self) -> Option<&User> {
        match self {
            Actor::User(user) => Some(user),
            Actor::Anonymous => None,
        }
    }

    pub fn id(&self) -> Option<UserId> {
        self.user().map(|u| u.id)
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_admin)
    }

    /// The logged-in user, or `Unauthenticated`
    pub fn require_user(&self) -> DomainResult<&User> {
        self.user().ok_or_else(DomainError::credentials_missing)
    }
}

/// A resource with an owning user for object-level checks
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

impl Owned for Offer {
    fn owner_id(&self) -> UserId {
        self.user
    }
}

impl Owned for OfferDetail {
    fn owner_id(&self) -> UserId {
        self.user
    }
}

/// The business side owns the order's status
impl Owned for Order {
    fn owner_id(&self) -> UserId {
        self.business_user
    }
}

impl Owned for Review {
    fn owner_id(&self) -> UserId {
        self.reviewer
    }
}

impl Owned for User {
    fn owner_id(&self) -> UserId {
        self.id
    }
}

// ============================================================================
// Checks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Actor must be logged in
    Authenticated,
    /// Anonymous actors may read, writes need a login
    AuthenticatedOrReadOnly,
    /// Writes need this role (admins pass)
    RoleIs(UserRole),
    /// Writes on a target need its owner (admins pass)
    IsOwnerOrAdmin,
    /// Target user must be the actor (admins pass), any verb
    IsSelfOrAdmin,
    /// Admins only, reads included
    IsAdmin,
    /// Target owner only, no admin override, any verb
    IsOwner,
}

impl Check {
    /// Collection-level phase
    pub fn has_permission(&self, actor: &Actor, verb: Verb) -> bool {
        match self {
            Check::Authenticated => actor.user().is_some(),
            Check::AuthenticatedOrReadOnly => verb.is_safe() || actor.user().is_some(),
            Check::RoleIs(role) => {
                verb.is_safe()
                    || actor
                        .user()
                        .is_some_and(|u| u.role == *role || u.is_admin)
            }
            Check::IsAdmin => actor.is_admin(),
            Check::IsOwnerOrAdmin | Check::IsSelfOrAdmin | Check::IsOwner => true,
        }
    }

    /// Object-level phase
    pub fn has_object_permission(&self, actor: &Actor, verb: Verb, target: &dyn Owned) -> bool {
        let is_owner = actor.id() == Some(target.owner_id());
        match self {
            Check::IsOwnerOrAdmin => verb.is_safe() || is_owner || actor.is_admin(),
            Check::IsSelfOrAdmin => is_owner || actor.is_admin(),
            Check::IsOwner => is_owner,
            Check::Authenticated
            | Check::AuthenticatedOrReadOnly
            | Check::RoleIs(_)
            | Check::IsAdmin => true,
        }
    }

    fn denial_message(&self) -> String {
        match self {
            Check::Authenticated | Check::AuthenticatedOrReadOnly => {
                "Authentication credentials were not provided".to_string()
            }
            Check::RoleIs(role) => format!("Only {} users may perform this action", role),
            Check::IsOwnerOrAdmin | Check::IsOwner => {
                "You are not the owner of this resource".to_string()
            }
            Check::IsSelfOrAdmin => "You may only modify your own profile".to_string(),
            Check::IsAdmin => "Admin privileges required".to_string(),
        }
    }

    fn deny(&self, actor: &Actor) -> DomainError {
        match actor {
            Actor::Anonymous => DomainError::credentials_missing(),
            Actor::User(_) => DomainError::forbidden(self.denial_message()),
        }
    }
}

impl Policy {
    /// Run the collection-level phase of every check in order
    pub fn check(&self, actor: &Actor) -> DomainResult<()> {
        let verb = self.verb();
        for check in self.checks {
            if !check.has_permission(actor, verb) {
                self.log_denial(actor, check, None);
                return Err(check.deny(actor));
            }
        }
        Ok(())
    }

    /// Run both phases against a loaded target
    pub fn check_object(&self, actor: &Actor, target: &dyn Owned) -> DomainResult<()> {
        self.check(actor)?;
        let verb = self.verb();
        for check in self.checks {
            if !check.has_object_permission(actor, verb, target) {
                self.log_denial(actor, check, Some(target.owner_id()));
                return Err(check.deny(actor));
            }
        }
        Ok(())
    }

    fn log_denial(&self, actor: &Actor, check: &Check, owner: Option<UserId>) {
        tracing::warn!(
            resource = ?self.resource,
            action = ?self.action,
            check = ?check,
            actor_id = ?actor.id(),
            owner_id = ?owner,
            "authorization denied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn user(id: UserId, role: UserRole, is_admin: bool) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            first_name: String::new(),
            last_name: String::new(),
            file: None,
            location: String::new(),
            tel: String::new(),
            description: String::new(),
            working_hours: String::new(),
            role,
            is_admin,
            created_at: Utc::now(),
        }
    }

    struct Thing(UserId);

    impl Owned for Thing {
        fn owner_id(&self) -> UserId {
            self.0
        }
    }

    fn business(id: UserId) -> Actor {
        Actor::User(user(id, UserRole::Business, false))
    }

    fn customer(id: UserId) -> Actor {
        Actor::User(user(id, UserRole::Customer, false))
    }

    fn admin(id: UserId) -> Actor {
        Actor::User(user(id, UserRole::Customer, true))
    }

    #[test]
    fn test_safe_verbs() {
        assert!(Verb::Get.is_safe());
        assert!(Verb::Head.is_safe());
        assert!(!Verb::Post.is_safe());
        assert!(!Verb::Patch.is_safe());
        assert!(!Verb::Delete.is_safe());
    }

    #[test]
    fn test_read_only_variant_admits_anonymous_reads() {
        let check = Check::AuthenticatedOrReadOnly;
        assert!(check.has_permission(&Actor::Anonymous, Verb::Get));
        assert!(!check.has_permission(&Actor::Anonymous, Verb::Post));
        assert!(check.has_permission(&customer(1), Verb::Post));
    }

    #[test]
    fn test_role_check_admin_override_and_safe_pass() {
        let check = Check::RoleIs(UserRole::Business);
        assert!(check.has_permission(&business(1), Verb::Post));
        assert!(!check.has_permission(&customer(2), Verb::Post));
        assert!(check.has_permission(&admin(3), Verb::Post));
        assert!(check.has_permission(&customer(2), Verb::Get));
    }

    #[test]
    fn test_owner_or_admin() {
        let check = Check::IsOwnerOrAdmin;
        let thing = Thing(1);
        assert!(check.has_object_permission(&business(1), Verb::Patch, &thing));
        assert!(!check.has_object_permission(&business(2), Verb::Patch, &thing));
        assert!(check.has_object_permission(&business(2), Verb::Get, &thing));
        assert!(check.has_object_permission(&admin(9), Verb::Delete, &thing));
    }

    #[test]
    fn test_is_owner_has_no_admin_override() {
        let check = Check::IsOwner;
        let thing = Thing(1);
        assert!(check.has_object_permission(&customer(1), Verb::Patch, &thing));
        assert!(!check.has_object_permission(&admin(9), Verb::Patch, &thing));
    }

    #[test]
    fn test_is_admin_gates_reads_too() {
        assert!(!Check::IsAdmin.has_permission(&business(1), Verb::Get));
        assert!(Check::IsAdmin.has_permission(&admin(1), Verb::Get));
    }

    #[test]
    fn test_self_or_admin() {
        let target = user(5, UserRole::Customer, false);
        assert!(Check::IsSelfOrAdmin.has_object_permission(&customer(5), Verb::Patch, &target));
        assert!(!Check::IsSelfOrAdmin.has_object_permission(&customer(6), Verb::Patch, &target));
        assert!(Check::IsSelfOrAdmin.has_object_permission(&admin(7), Verb::Patch, &target));
    }

    #[test]
    fn test_anonymous_denial_is_unauthenticated() {
        let err = policy::OFFER_CREATE.check(&Actor::Anonymous).unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[test]
    fn test_wrong_role_is_forbidden() {
        let err = policy::OFFER_CREATE.check(&customer(1)).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn test_first_failure_wins() {
        // Customer, not the owner: the role check fails before ownership.
        let err = policy::OFFER_UPDATE
            .check_object(&customer(2), &Thing(1))
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::forbidden("Only business users may perform this action")
        );
    }

    #[test]
    fn test_owner_passes_both_phases() {
        assert!(policy::OFFER_UPDATE.check_object(&business(1), &Thing(1)).is_ok());
        assert!(policy::OFFER_UPDATE.check_object(&business(2), &Thing(1)).is_err());
    }
}
