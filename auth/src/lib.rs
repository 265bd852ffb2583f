//! Credential primitives library
//!
//! Provides the building blocks services use to issue and check credentials:
//! - Password hashing (bcrypt, configurable cost)
//! - HS256 JWT issuing and validation bound to an issuer and audience
//!
//! Services own the policy (which secret signs which token kind, lifetimes,
//! how failures are reported) and adapt these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(4).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.verify("my_password", "not-a-hash").unwrap());
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{JwtHandler, TokenClaims};
//! use chrono::Duration;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Payload {
//!     sub: String,
//! }
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!", "issuer", "audience").unwrap();
//! let token = handler.issue(Payload { sub: "user123".into() }, Duration::minutes(15)).unwrap();
//! let decoded: TokenClaims<Payload> = handler.decode(&token).unwrap();
//! assert_eq!(decoded.payload.sub, "user123");
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::StandardClaims;
pub use jwt::TokenClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
