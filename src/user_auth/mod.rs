//! Registration, login and bearer-token authentication
//!
//! Passwords are stored as Argon2 PHC strings; sessions are stateless
//! HS256 JWTs whose subject is the user id.

pub mod handlers;
pub mod middleware;
pub mod service;

pub use service::{AuthResponse, Claims, LoginRequest, RegisterRequest, UserAuthService};
