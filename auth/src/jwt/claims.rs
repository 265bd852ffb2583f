use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Registered claims carried by every token this crate issues.
///
/// All four are mandatory: tokens missing any of them are rejected on decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandardClaims {
    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,
}

impl StandardClaims {
    /// Create claims issued now and expiring after `lifetime`.
    ///
    /// # Arguments
    /// * `issuer` - Value of the `iss` claim
    /// * `audience` - Value of the `aud` claim
    /// * `lifetime` - Time until the token expires
    ///
    /// # Returns
    /// Claims with iat, exp, iss and aud set
    pub fn issued_now(issuer: impl ToString, audience: impl ToString, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }

    /// Check if token is expired. A token is expired from its `exp` second onwards.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}

/// Full token body: an application payload flattened next to the standard claims.
///
/// The payload type decides the custom claim names, e.g. `userId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims<P> {
    #[serde(flatten)]
    pub payload: P,

    #[serde(flatten)]
    pub standard: StandardClaims,
}

impl<P> TokenClaims<P> {
    /// Wrap a payload with the given standard claims.
    pub fn new(payload: P, standard: StandardClaims) -> Self {
        Self { payload, standard }
    }
}
