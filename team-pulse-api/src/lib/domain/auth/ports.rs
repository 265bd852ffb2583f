use async_trait::async_trait;

use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::RefreshToken;
use crate::domain::auth::models::SessionTokens;
use crate::domain::auth::models::UserCredentials;
use crate::domain::auth::models::UserId;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::RepositoryError;

/// Port for session use cases (login, refresh, logout).
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Authenticate with email and password and open a session.
    ///
    /// # Returns
    /// Fresh access token and persisted refresh token
    ///
    /// # Errors
    /// * `Authentication` - Unknown email or wrong password (indistinguishable)
    /// * `Repository` - Storage or hashing failed
    async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, ApplicationError>;

    /// Exchange a refresh token for a new token pair, invalidating the old one.
    ///
    /// # Errors
    /// * `Authentication` - Token invalid, expired, revoked or already rotated
    /// * `Repository` - Storage failed
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, ApplicationError>;

    /// Revoke a refresh token.
    ///
    /// # Returns
    /// Whether a stored token was removed
    ///
    /// # Errors
    /// * `Repository` - Storage failed
    async fn logout(&self, refresh_token: &str) -> Result<bool, ApplicationError>;

    /// Revoke every refresh token of a user.
    ///
    /// # Returns
    /// Number of tokens removed
    ///
    /// # Errors
    /// * `Repository` - Storage failed
    async fn logout_all(&self, user_id: &UserId) -> Result<u64, ApplicationError>;

    /// Remove refresh tokens whose expiry has passed.
    ///
    /// # Returns
    /// Number of tokens removed
    ///
    /// # Errors
    /// * `Repository` - Storage failed
    async fn purge_expired(&self) -> Result<u64, ApplicationError>;
}

/// Persistence operations for refresh tokens.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    /// Retrieve a refresh token by its signed string.
    ///
    /// # Returns
    /// Optional refresh token (None if not found)
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError>;

    /// Retrieve every refresh token of a user.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<RefreshToken>, RepositoryError>;

    /// Insert or replace a refresh token, keyed by its id.
    ///
    /// # Returns
    /// Stored refresh token
    async fn save(&self, refresh_token: RefreshToken) -> Result<RefreshToken, RepositoryError>;

    /// Remove a refresh token by its signed string.
    ///
    /// # Returns
    /// Whether a token was removed
    async fn delete_by_token(&self, token: &str) -> Result<bool, RepositoryError>;

    /// Remove every refresh token of a user.
    ///
    /// # Returns
    /// Number of tokens removed
    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<u64, RepositoryError>;

    /// Remove every refresh token whose expiry has passed.
    ///
    /// # Returns
    /// Number of tokens removed
    async fn delete_expired(&self) -> Result<u64, RepositoryError>;
}

/// Read access to the accounts sessions are opened for.
#[async_trait]
pub trait UserCredentialsRepository: Send + Sync + 'static {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, RepositoryError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserCredentials>, RepositoryError>;
}

/// Salted, adaptive password hashing.
#[async_trait]
pub trait PasswordHasher: Send + Sync + 'static {
    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    /// * `RepositoryError` - Hashing failed
    async fn hash(&self, password: &str) -> Result<String, RepositoryError>;

    /// Check a password against a stored hash.
    ///
    /// # Returns
    /// False on mismatch and for malformed hashes
    ///
    /// # Errors
    /// * `RepositoryError` - I/O or scheduling failure
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, RepositoryError>;
}
