use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::StandardClaims;
use super::claims::TokenClaims;
use super::errors::JwtError;

/// JWT token handler bound to one secret, issuer and audience.
///
/// Generic over the payload type so each token kind defines its own claims.
/// Uses HS256 (HMAC with SHA-256). Tokens are only accepted when signature,
/// `exp`, `iss` and `aud` all check out.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
}

impl JwtHandler {
    /// Minimum secret length for HS256 (256 bits).
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a new JWT handler.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    /// * `issuer` - Value written to and required in the `iss` claim
    /// * `audience` - Value written to and required in the `aud` claim
    ///
    /// # Errors
    /// * `WeakSecret` - Secret is shorter than 32 bytes
    pub fn new(
        secret: &[u8],
        issuer: impl ToString,
        audience: impl ToString,
    ) -> Result<Self, JwtError> {
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(JwtError::WeakSecret {
                min: Self::MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Sign a payload, stamping it with this handler's issuer and audience.
    ///
    /// # Arguments
    /// * `payload` - Custom claims
    /// * `lifetime` - Time until the token expires
    ///
    /// # Returns
    /// Compact `header.payload.signature` token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue<P: Serialize>(&self, payload: P, lifetime: Duration) -> Result<String, JwtError> {
        let standard = StandardClaims::issued_now(&self.issuer, &self.audience, lifetime);
        self.encode(&TokenClaims::new(payload, standard))
    }

    /// Encode claims into a JWT token as-is.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded payload and standard claims
    ///
    /// # Errors
    /// * `TokenExpired` - `exp` is not in the future
    /// * `InvalidSignature` - Signed with another secret or tampered with
    /// * `InvalidClaim` - Wrong issuer or audience
    /// * `MissingClaim` - `exp`, `iss` or `aud` absent
    /// * `DecodingFailed` - Token is malformed or the payload does not deserialize
    pub fn decode<P: DeserializeOwned>(&self, token: &str) -> Result<TokenClaims<P>, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data =
            decode::<TokenClaims<P>>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    ErrorKind::InvalidIssuer => JwtError::InvalidClaim("iss".to_string()),
                    ErrorKind::InvalidAudience => JwtError::InvalidClaim("aud".to_string()),
                    ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
                    _ => JwtError::DecodingFailed(e.to_string()),
                }
            })?;

        // jsonwebtoken treats `exp == now` as still valid
        if token_data
            .claims
            .standard
            .is_expired(chrono::Utc::now().timestamp())
        {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}
