//! User profiles
//!
//! Every account has exactly one profile, stored on the user row. The
//! account type and username are fixed at registration and never patched.

pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::UserId;
use crate::models::{User, UserRole};

pub use service::ProfileService;

/// PATCH /api/profile/{id}/
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub last_name: Option<String>,
    /// Profile picture URL
    pub file: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub location: Option<String>,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub tel: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub working_hours: Option<String>,
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 254, message = "must be at most 254 characters")
    )]
    pub email: Option<String>,
}

impl ProfilePatch {
    pub fn apply(&self, user: &mut User) {
        let fields = [
            (&self.first_name, &mut user.first_name),
            (&self.last_name, &mut user.last_name),
            (&self.location, &mut user.location),
            (&self.tel, &mut user.tel),
            (&self.description, &mut user.description),
            (&self.working_hours, &mut user.working_hours),
            (&self.email, &mut user.email),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        if let Some(file) = &self.file {
            user.file = Some(file.clone()).filter(|f| !f.is_empty());
        }
    }
}

/// Full profile of one user
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProfileView {
    pub user: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: Option<String>,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileView {
    fn from(user: User) -> Self {
        Self {
            user: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            file: user.file,
            location: user.location,
            tel: user.tel,
            description: user.description,
            working_hours: user.working_hours,
            role: user.role,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Account summary nested in the by-type listings
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProfileUser {
    pub pk: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for ProfileUser {
    fn from(user: &User) -> Self {
        Self {
            pk: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BusinessProfileView {
    pub user: ProfileUser,
    pub file: Option<String>,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CustomerProfileView {
    pub user: ProfileUser,
    pub file: Option<String>,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// One entry of GET /api/profiles/{type}/
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ProfileListItem {
    Business(BusinessProfileView),
    Customer(CustomerProfileView),
}

impl From<User> for ProfileListItem {
    fn from(user: User) -> Self {
        let summary = ProfileUser::from(&user);
        match user.role {
            UserRole::Business => ProfileListItem::Business(BusinessProfileView {
                user: summary,
                file: user.file,
                location: user.location,
                tel: user.tel,
                description: user.description,
                working_hours: user.working_hours,
                role: user.role,
            }),
            UserRole::Customer => ProfileListItem::Customer(CustomerProfileView {
                user: summary,
                file: user.file,
                role: user.role,
                created_at: user.created_at,
            }),
        }
    }
}
