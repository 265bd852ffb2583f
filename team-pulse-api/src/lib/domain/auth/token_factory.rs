use auth::JwtError;
use auth::JwtHandler;
use auth::TokenClaims;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::auth::models::AccessTokenPayload;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::RefreshToken;
use crate::domain::auth::models::RefreshTokenId;
use crate::domain::auth::models::RefreshTokenPayload;
use crate::domain::auth::models::Role;
use crate::domain::auth::models::UserId;
use crate::domain::errors::AuthenticationError;
use crate::domain::errors::ValidationError;

pub const TOKEN_ISSUER: &str = "team-pulse-api";
pub const TOKEN_AUDIENCE: &str = "team-pulse-app";

const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessClaims {
    user_id: UserId,
    email: EmailAddress,
    role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshClaims {
    user_id: UserId,
    token_id: RefreshTokenId,
}

/// Issues and verifies access and refresh tokens.
///
/// Access and refresh tokens are signed with two distinct secrets, so a token
/// of one kind never verifies as the other. Verification failures are
/// collapsed into a single generic `AuthenticationError`; the precise cause is
/// only logged.
pub struct TokenFactory {
    access: JwtHandler,
    refresh: JwtHandler,
}

impl TokenFactory {
    pub const ACCESS_TOKEN_LIFETIME_MINUTES: i64 = 15;
    pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 7;

    /// Create a token factory from the two signing secrets.
    ///
    /// # Arguments
    /// * `access_secret` - Secret for access tokens (at least 32 bytes)
    /// * `refresh_secret` - Secret for refresh tokens (at least 32 bytes, different from `access_secret`)
    ///
    /// # Errors
    /// * `ValidationError` - A secret is too short or both secrets are equal
    pub fn new(access_secret: &str, refresh_secret: &str) -> Result<Self, ValidationError> {
        if access_secret == refresh_secret {
            return Err(ValidationError::for_field(
                "refreshSecret",
                "Access and refresh token secrets must differ",
            ));
        }

        let access = JwtHandler::new(access_secret.as_bytes(), TOKEN_ISSUER, TOKEN_AUDIENCE)
            .map_err(|e| ValidationError::for_field("accessSecret", e.to_string()))?;
        let refresh = JwtHandler::new(refresh_secret.as_bytes(), TOKEN_ISSUER, TOKEN_AUDIENCE)
            .map_err(|e| ValidationError::for_field("refreshSecret", e.to_string()))?;

        Ok(Self { access, refresh })
    }

    pub fn access_token_lifetime() -> Duration {
        Duration::minutes(Self::ACCESS_TOKEN_LIFETIME_MINUTES)
    }

    pub fn refresh_token_lifetime() -> Duration {
        Duration::days(Self::REFRESH_TOKEN_LIFETIME_DAYS)
    }

    /// Sign an access token for a user.
    ///
    /// # Returns
    /// Compact three-segment token string
    ///
    /// # Errors
    /// * `ValidationError` (field `accessToken`) - Token could not be signed
    pub fn create_access_token(
        &self,
        email: &EmailAddress,
        role: Role,
        user_id: UserId,
    ) -> Result<String, ValidationError> {
        let claims = AccessClaims {
            user_id,
            email: email.clone(),
            role,
        };

        self.access
            .issue(claims, Self::access_token_lifetime())
            .map_err(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Failed to sign access token");
                ValidationError::for_field("accessToken", "Failed to create access token")
            })
    }

    /// Mint a new refresh token for a user.
    ///
    /// Every call draws a fresh token id, so repeated calls for the same user
    /// yield distinct ids and distinct token strings.
    ///
    /// # Errors
    /// * `ValidationError` (field `refreshToken`) - Token could not be signed
    pub fn create_refresh_token(&self, user_id: UserId) -> Result<RefreshToken, ValidationError> {
        let token_id = RefreshTokenId::new();
        let created_at = Utc::now();
        let lifetime = Self::refresh_token_lifetime();

        let token = self
            .refresh
            .issue(RefreshClaims { user_id, token_id }, lifetime)
            .map_err(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Failed to sign refresh token");
                ValidationError::for_field("refreshToken", "Failed to create refresh token")
            })?;

        RefreshToken::new(token_id, token, user_id, created_at + lifetime, created_at)
    }

    /// Verify an access token's signature, issuer, audience and expiry.
    ///
    /// # Errors
    /// * `AuthenticationError` (field `accessToken`) - Any verification failure
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenPayload, AuthenticationError> {
        let claims: TokenClaims<AccessClaims> = self
            .access
            .decode(token)
            .map_err(|e| rejected("accessToken", &e))?;

        Ok(AccessTokenPayload {
            user_id: claims.payload.user_id,
            email: claims.payload.email,
            role: claims.payload.role,
            iat: claims.standard.iat,
            exp: claims.standard.exp,
            iss: claims.standard.iss,
            aud: claims.standard.aud,
        })
    }

    /// Verify a refresh token's signature, issuer, audience and expiry.
    ///
    /// # Errors
    /// * `AuthenticationError` (field `refreshToken`) - Any verification failure
    pub fn verify_refresh_token(
        &self,
        token: &str,
    ) -> Result<RefreshTokenPayload, AuthenticationError> {
        let claims: TokenClaims<RefreshClaims> = self
            .refresh
            .decode(token)
            .map_err(|e| rejected("refreshToken", &e))?;

        Ok(RefreshTokenPayload {
            user_id: claims.payload.user_id,
            token_id: claims.payload.token_id,
            iat: claims.standard.iat,
            exp: claims.standard.exp,
            iss: claims.standard.iss,
            aud: claims.standard.aud,
        })
    }

    /// Expiry instant of a refresh token minted now.
    pub fn get_refresh_token_expiration_date(&self) -> DateTime<Utc> {
        Utc::now() + Self::refresh_token_lifetime()
    }
}

fn rejected(field: &str, cause: &JwtError) -> AuthenticationError {
    tracing::debug!(token = field, reason = %cause, "Token rejected");
    AuthenticationError::for_field(field, INVALID_TOKEN_MESSAGE)
}
