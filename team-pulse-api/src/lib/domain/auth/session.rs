use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::SessionTokens;
use crate::domain::auth::models::UserCredentials;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::PasswordHasher;
use crate::domain::auth::ports::RefreshTokenRepository;
use crate::domain::auth::ports::SessionServicePort;
use crate::domain::auth::ports::UserCredentialsRepository;
use crate::domain::auth::token_factory::TokenFactory;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthenticationError;

/// Input hashed once to give failed lookups a real hash to verify against.
const DUMMY_PASSWORD: &str = "team-pulse-dummy-password";

/// Domain service implementation for session operations.
///
/// Refresh tokens are single use: every successful refresh deletes the
/// presented token and persists a newly minted one. Deleting is the claim,
/// so of two concurrent refreshes of one token only the one whose delete
/// removed it opens a session.
pub struct SessionService<R, U, H>
where
    R: RefreshTokenRepository,
    U: UserCredentialsRepository,
    H: PasswordHasher,
{
    refresh_tokens: Arc<R>,
    users: Arc<U>,
    password_hasher: Arc<H>,
    token_factory: Arc<TokenFactory>,
    dummy_hash: OnceCell<String>,
}

impl<R, U, H> SessionService<R, U, H>
where
    R: RefreshTokenRepository,
    U: UserCredentialsRepository,
    H: PasswordHasher,
{
    /// Create a new session service with injected dependencies.
    pub fn new(
        refresh_tokens: Arc<R>,
        users: Arc<U>,
        password_hasher: Arc<H>,
        token_factory: Arc<TokenFactory>,
    ) -> Self {
        Self {
            refresh_tokens,
            users,
            password_hasher,
            token_factory,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Spend the same hashing work as a real verification when no account matched.
    async fn verify_against_dummy(&self, password: &str) -> Result<(), ApplicationError> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| self.password_hasher.hash(DUMMY_PASSWORD))
            .await?;
        self.password_hasher.verify(password, dummy_hash).await?;

        Ok(())
    }

    async fn open_session(&self, user: &UserCredentials) -> Result<SessionTokens, ApplicationError> {
        let access_token = self
            .token_factory
            .create_access_token(&user.email, user.role, user.id)?;
        let refresh_token = self.token_factory.create_refresh_token(user.id)?;
        let refresh_token = self.refresh_tokens.save(refresh_token).await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }
}

fn invalid_credentials() -> ApplicationError {
    AuthenticationError::for_field("credentials", "Invalid credentials").into()
}

fn invalid_refresh_token() -> ApplicationError {
    AuthenticationError::for_field("refreshToken", "Invalid or expired token").into()
}

#[async_trait]
impl<R, U, H> SessionServicePort for SessionService<R, U, H>
where
    R: RefreshTokenRepository,
    U: UserCredentialsRepository,
    H: PasswordHasher,
{
    async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, ApplicationError> {
        let user = match EmailAddress::new(email.to_string()) {
            Ok(email) => self.users.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            self.verify_against_dummy(password).await?;
            tracing::info!(email, "Login rejected: unknown email");
            return Err(invalid_credentials());
        };

        if !self
            .password_hasher
            .verify(password, &user.password_hash)
            .await?
        {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(invalid_credentials());
        }

        let session = self.open_session(&user).await?;
        tracing::info!(
            user_id = %user.id,
            refresh_token_id = %session.refresh_token.id(),
            "Session opened"
        );

        Ok(session)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, ApplicationError> {
        let payload = self.token_factory.verify_refresh_token(refresh_token)?;

        let Some(stored) = self.refresh_tokens.find_by_token(refresh_token).await? else {
            tracing::warn!(
                user_id = %payload.user_id,
                refresh_token_id = %payload.token_id,
                "Refresh rejected: token revoked or already rotated"
            );
            return Err(invalid_refresh_token());
        };

        if stored.id() != payload.token_id || stored.user_id() != payload.user_id {
            tracing::warn!(
                user_id = %payload.user_id,
                refresh_token_id = %payload.token_id,
                "Refresh rejected: stored token does not match claims"
            );
            return Err(invalid_refresh_token());
        }

        if stored.is_expired() {
            self.refresh_tokens.delete_by_token(refresh_token).await?;
            tracing::info!(refresh_token_id = %stored.id(), "Refresh rejected: token expired");
            return Err(invalid_refresh_token());
        }

        let Some(user) = self.users.find_by_id(&payload.user_id).await? else {
            self.refresh_tokens.delete_by_token(refresh_token).await?;
            tracing::warn!(user_id = %payload.user_id, "Refresh rejected: account no longer exists");
            return Err(invalid_refresh_token());
        };

        if !self.refresh_tokens.delete_by_token(refresh_token).await? {
            tracing::warn!(
                user_id = %payload.user_id,
                refresh_token_id = %payload.token_id,
                "Refresh rejected: token already claimed by a concurrent refresh"
            );
            return Err(invalid_refresh_token());
        }
        let session = self.open_session(&user).await?;
        tracing::info!(
            user_id = %user.id,
            previous_token_id = %stored.id(),
            refresh_token_id = %session.refresh_token.id(),
            "Refresh token rotated"
        );

        Ok(session)
    }

    async fn logout(&self, refresh_token: &str) -> Result<bool, ApplicationError> {
        let removed = self.refresh_tokens.delete_by_token(refresh_token).await?;
        tracing::debug!(removed, "Logout processed");

        Ok(removed)
    }

    async fn logout_all(&self, user_id: &UserId) -> Result<u64, ApplicationError> {
        let removed = self.refresh_tokens.delete_by_user_id(user_id).await?;
        tracing::info!(user_id = %user_id, removed, "All sessions revoked");

        Ok(removed)
    }

    async fn purge_expired(&self) -> Result<u64, ApplicationError> {
        let removed = self.refresh_tokens.delete_expired().await?;
        tracing::info!(removed, "Expired refresh tokens purged");

        Ok(removed)
    }
}
