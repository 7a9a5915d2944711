use std::sync::Arc;

use validator::Validate;

use super::{ProfileListItem, ProfilePatch, ProfileView};
use crate::authz::{Actor, policy};
use crate::core_types::UserId;
use crate::error::{DomainError, DomainResult};
use crate::models::{User, UserRole};
use crate::store::{MarketStore, StoreError};

pub struct ProfileService {
    store: Arc<dyn MarketStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, actor: &Actor, id: UserId) -> DomainResult<ProfileView> {
        policy::PROFILE_RETRIEVE.check(actor)?;
        Ok(self.load(id).await?.into())
    }

    pub async fn update_profile(
        &self,
        actor: &Actor,
        id: UserId,
        patch: ProfilePatch,
    ) -> DomainResult<ProfileView> {
        policy::PROFILE_UPDATE.check(actor)?;
        let target = self.load(id).await?;
        policy::PROFILE_UPDATE.check_object(actor, &target)?;
        patch
            .validate()
            .map_err(|e| DomainError::from_validation(&e))?;

        if let Some(email) = &patch.email
            && *email != target.email
            && self.store.email_exists(email).await?
        {
            return Err(DomainError::validation("email", "is already registered"));
        }

        let updated = self
            .store
            .update_profile(id, &patch)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => DomainError::not_found("Profile not found"),
                StoreError::Conflict(_) => {
                    DomainError::validation("email", "is already registered")
                }
                other => other.into(),
            })?;
        tracing::info!(user_id = id, actor_id = ?actor.id(), "profile updated");
        Ok(updated.into())
    }

    /// Admin listing by account type; an unknown type yields no entries
    pub async fn list_by_type(
        &self,
        actor: &Actor,
        profile_type: &str,
    ) -> DomainResult<Vec<ProfileListItem>> {
        policy::PROFILE_LIST_BY_TYPE.check(actor)?;
        let Ok(role) = profile_type.parse::<UserRole>() else {
            return Ok(Vec::new());
        };
        let users = self.store.list_users_by_role(role).await?;
        Ok(users.into_iter().map(ProfileListItem::from).collect())
    }

    async fn load(&self, id: UserId) -> DomainResult<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Profile not found"))
    }
}
