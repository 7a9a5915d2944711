use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::UserId;
use crate::error::{DomainError, DomainResult};
use crate::models::{User, UserRole};
use crate::store::{MarketStore, NewUser, StoreError};

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

impl Claims {
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

/// User Registration Request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150, message = "must be 1-150 characters"))]
    #[schema(example = "jane_design")]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    #[schema(example = "password123")]
    pub password: String,
    #[schema(example = "password123")]
    pub repeated_password: String,
    #[serde(rename = "type")]
    pub role: UserRole,
}

/// User Login Request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[schema(example = "jane_design")]
    pub username: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Auth Response (JWT)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    pub user_id: UserId,
}

pub struct UserAuthService {
    store: Arc<dyn MarketStore>,
    jwt_secret: String,
    token_ttl_hours: i64,
}

impl UserAuthService {
    pub fn new(store: Arc<dyn MarketStore>, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            store,
            jwt_secret,
            token_ttl_hours,
        }
    }

    /// Register a new account and log it in
    pub async fn register(&self, req: RegisterRequest) -> DomainResult<AuthResponse> {
        req.validate()
            .map_err(|e| DomainError::from_validation(&e))?;
        if req.password != req.repeated_password {
            return Err(DomainError::validation(
                "repeated_password",
                "passwords do not match",
            ));
        }
        if self.store.email_exists(&req.email).await? {
            return Err(DomainError::validation("email", "is already registered"));
        }
        if self.store.username_exists(&req.username).await? {
            return Err(DomainError::validation("username", "is already taken"));
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .store
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                role: req.role,
                is_admin: false,
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict("email") => {
                    DomainError::validation("email", "is already registered")
                }
                StoreError::Conflict(key) => DomainError::validation(key, "is already taken"),
                other => other.into(),
            })?;
        tracing::info!(user_id = user.id, role = %user.role, "user registered");

        self.auth_response(&user)
    }

    /// Login user and issue JWT
    pub async fn login(&self, req: LoginRequest) -> DomainResult<AuthResponse> {
        match self.authenticate(&req.username, &req.password).await? {
            Some(user) => {
                tracing::info!(user_id = user.id, "user logged in");
                self.auth_response(&user)
            }
            None => {
                tracing::warn!(username = %req.username, "login failed");
                Err(DomainError::unauthenticated("Invalid credentials"))
            }
        }
    }

    /// The user behind a username/password pair, if the pair is valid
    pub async fn authenticate(&self, username: &str, password: &str) -> DomainResult<Option<User>> {
        let Some((user, password_hash)) = self.store.user_credentials(username).await? else {
            return Ok(None);
        };
        let Ok(parsed_hash) = PasswordHash::new(&password_hash) else {
            tracing::error!(user_id = user.id, "stored password hash is malformed");
            return Ok(None);
        };
        let verified = Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();
        Ok(verified.then_some(user))
    }

    /// Sign a bearer token for `user`
    pub fn issue_token(&self, user: &User) -> DomainResult<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(self.token_ttl_hours))
            .ok_or_else(|| DomainError::internal("token expiry out of range"))?;

        let claims = Claims {
            sub: user.id.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| DomainError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Load the account a verified token points at
    pub async fn resolve_user(&self, claims: &Claims) -> DomainResult<Option<User>> {
        match claims.user_id() {
            Some(id) => Ok(self.store.get_user(id).await?),
            None => Ok(None),
        }
    }

    fn auth_response(&self, user: &User) -> DomainResult<AuthResponse> {
        Ok(AuthResponse {
            token: self.issue_token(user)?,
            username: user.username.clone(),
            email: user.email.clone(),
            user_id: user.id,
        })
    }
}

/// Argon2 PHC string for `password`
pub fn hash_password(password: &str) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::internal(format!("Hashing failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> UserAuthService {
        let store: Arc<dyn MarketStore> = Arc::new(MemoryStore::new());
        UserAuthService::new(store, "test-secret".into(), 24)
    }

    fn registration(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: "password123".into(),
            repeated_password: "password123".into(),
            role: UserRole::Customer,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let svc = service();
        let registered = svc.register(registration("jane", "jane@example.com")).await.unwrap();
        assert_eq!(registered.username, "jane");
        assert_eq!(registered.email, "jane@example.com");

        let claims = svc.verify_token(&registered.token).unwrap();
        assert_eq!(claims.user_id(), Some(registered.user_id));

        let logged_in = svc
            .login(LoginRequest {
                username: "jane".into(),
                password: "password123".into(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user_id, registered.user_id);
    }

    #[tokio::test]
    async fn test_register_checks_run_in_order() {
        let svc = service();

        let mut bad_email = registration("jane", "not-an-email");
        bad_email.repeated_password = "different".into();
        let err = svc.register(bad_email).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "email"));

        let mut mismatch = registration("jane", "jane@example.com");
        mismatch.repeated_password = "password124".into();
        let err = svc.register(mismatch).await.unwrap_err();
        assert!(
            matches!(err, DomainError::Validation { ref field, .. } if field == "repeated_password")
        );

        svc.register(registration("jane", "jane@example.com")).await.unwrap();

        // Email is checked before username
        let err = svc
            .register(registration("jane", "jane@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::validation("email", "is already registered"));

        let err = svc
            .register(registration("jane", "other@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::validation("username", "is already taken"));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let svc = service();
        let mut req = registration("jane", "jane@example.com");
        req.password = "short".into();
        req.repeated_password = "short".into();
        let err = svc.register(req).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "password"));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let svc = service();
        svc.register(registration("jane", "jane@example.com")).await.unwrap();

        let wrong_password = svc
            .login(LoginRequest {
                username: "jane".into(),
                password: "password999".into(),
            })
            .await
            .unwrap_err();
        let unknown_user = svc
            .login(LoginRequest {
                username: "nobody".into(),
                password: "password123".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(wrong_password, DomainError::unauthenticated("Invalid credentials"));
        assert_eq!(wrong_password, unknown_user);
    }

    #[tokio::test]
    async fn test_token_from_other_secret_rejected() {
        let svc = service();
        let auth = svc.register(registration("jane", "jane@example.com")).await.unwrap();

        let other = UserAuthService::new(Arc::new(MemoryStore::new()), "other-secret".into(), 24);
        assert!(other.verify_token(&auth.token).is_err());
        assert!(svc.verify_token("not-a-jwt").is_err());
    }

    #[tokio::test]
    async fn test_resolve_user() {
        let svc = service();
        let auth = svc.register(registration("jane", "jane@example.com")).await.unwrap();
        let claims = svc.verify_token(&auth.token).unwrap();
        let user = svc.resolve_user(&claims).await.unwrap().unwrap();
        assert_eq!(user.username, "jane");
        assert!(!user.is_admin);

        let dangling = Claims {
            sub: "999".into(),
            exp: claims.exp,
            iat: claims.iat,
        };
        assert!(svc.resolve_user(&dangling).await.unwrap().is_none());
    }
}
