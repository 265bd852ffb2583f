use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::ValidationError;

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `ValidationError` (field `userId`) - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| ValidationError::for_field("userId", format!("Invalid user ID: {}", e)))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Refresh token unique identifier, carried as the `tokenId` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshTokenId(Uuid);

impl RefreshTokenId {
    /// Generate a fresh random identifier. Every call yields a distinct value.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// # Errors
    /// * `ValidationError` (field `id`) - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(s).map(RefreshTokenId).map_err(|e| {
            ValidationError::for_field("id", format!("Invalid refresh token ID: {}", e))
        })
    }
}

impl Default for RefreshTokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RefreshTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `ValidationError` (field `email`) - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, ValidationError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| ValidationError::for_field("email", format!("Invalid email: {}", e)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User role. Roles are ordered: `User` < `Admin` < `SuperAdmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn level(&self) -> u8 {
        match self {
            Role::User => 1,
            Role::Admin => 2,
            Role::SuperAdmin => 3,
        }
    }

    /// True when this role ranks at least as high as `other`.
    pub fn has_level_of(&self, other: Role) -> bool {
        self.level() >= other.level()
    }

    /// True when this role may perform an action requiring `required`.
    pub fn can_perform(&self, required: Role) -> bool {
        self.has_level_of(required)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            other => Err(ValidationError::for_field(
                "role",
                format!("Invalid role: {}", other),
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted session artifact wrapping a signed refresh JWT.
///
/// Never mutated: rotation replaces the whole entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    id: RefreshTokenId,
    token: String,
    user_id: UserId,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Build a refresh token from validated parts.
    ///
    /// # Errors
    /// * `ValidationError` (field `token`) - Token string is empty
    pub fn new(
        id: RefreshTokenId,
        token: String,
        user_id: UserId,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if token.trim().is_empty() {
            return Err(ValidationError::for_field(
                "token",
                "Refresh token must not be empty",
            ));
        }

        Ok(Self {
            id,
            token,
            user_id,
            expires_at,
            created_at,
        })
    }

    /// Rebuild a refresh token from raw stored values.
    ///
    /// # Errors
    /// * `ValidationError` - Stored id, user id or token is invalid
    pub fn from_persistence(
        id: &str,
        token: String,
        user_id: &str,
        expires_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            RefreshTokenId::from_string(id)?,
            token,
            UserId::from_string(user_id)?,
            expires_at,
            created_at,
        )
    }

    pub fn id(&self) -> RefreshTokenId {
        self.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// True iff `now` is at or past the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Claims of a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Claims of a verified refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenPayload {
    pub user_id: UserId,
    pub token_id: RefreshTokenId,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Account data needed to authenticate a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub id: UserId,
    pub email: EmailAddress,
    pub role: Role,
    pub password_hash: String,
}

/// Tokens handed out by a login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: RefreshToken,
}
