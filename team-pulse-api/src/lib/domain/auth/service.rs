use std::sync::Arc;

use crate::domain::auth::models::AccessTokenPayload;
use crate::domain::auth::models::Role;
use crate::domain::auth::token_factory::TokenFactory;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::ValidationError;

const AUTHORIZATION_FIELD: &str = "authorization";
const BEARER_SCHEME: &str = "Bearer";

/// Bearer credential checks for incoming requests.
pub struct AuthService {
    token_factory: Arc<TokenFactory>,
}

impl AuthService {
    pub fn new(token_factory: Arc<TokenFactory>) -> Self {
        Self { token_factory }
    }

    /// Parse an `Authorization` header value and verify its access token.
    ///
    /// The header must be exactly `Bearer <token>`: one space, case-sensitive
    /// scheme, non-empty token, nothing after it.
    ///
    /// # Errors
    /// * `Validation` (field `authorization`) - Header missing or malformed
    /// * `Authentication` (field `accessToken`) - Token failed verification
    pub fn verify_auth_header(
        &self,
        auth_header: Option<&str>,
    ) -> Result<AccessTokenPayload, ApplicationError> {
        let header = match auth_header {
            Some(header) if !header.is_empty() => header,
            _ => {
                return Err(ValidationError::for_field(
                    AUTHORIZATION_FIELD,
                    "Missing authorization header",
                )
                .into())
            }
        };

        let token = match header.split(' ').collect::<Vec<_>>().as_slice() {
            [BEARER_SCHEME, token] if !token.is_empty() => *token,
            _ => {
                return Err(ValidationError::for_field(
                    AUTHORIZATION_FIELD,
                    "Invalid authorization header format. Expected: Bearer <token>",
                )
                .into())
            }
        };

        Ok(self.token_factory.verify_access_token(token)?)
    }

    /// Whether `user` holds one of `allowed_roles`.
    ///
    /// Exact membership, not hierarchy: a `SuperAdmin` is not implicitly
    /// allowed where only `Admin` is listed. Absent user or empty list is `false`.
    pub fn check_user_role(&self, user: Option<&AccessTokenPayload>, allowed_roles: &[Role]) -> bool {
        match user {
            Some(user) => allowed_roles.contains(&user.role),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::models::EmailAddress;
    use crate::domain::auth::models::UserId;
    use crate::domain::errors::ErrorCategory;

    fn service() -> (AuthService, String) {
        let factory = Arc::new(
            TokenFactory::new(
                "access-secret-for-tests-at-least-32-bytes",
                "refresh-secret-for-tests-at-least-32-bytes",
            )
            .unwrap(),
        );
        let token = factory
            .create_access_token(
                &EmailAddress::new("alice@example.com".to_string()).unwrap(),
                Role::Admin,
                UserId::new(),
            )
            .unwrap();

        (AuthService::new(factory), token)
    }

    fn payload(role: Role) -> AccessTokenPayload {
        AccessTokenPayload {
            user_id: UserId::new(),
            email: EmailAddress::new("bob@example.com".to_string()).unwrap(),
            role,
            iat: 0,
            exp: 0,
            iss: "team-pulse-api".to_string(),
            aud: "team-pulse-app".to_string(),
        }
    }

    fn assert_header_rejected(result: Result<AccessTokenPayload, ApplicationError>) {
        let err = result.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.field(), Some("authorization"));
    }

    #[test]
    fn test_missing_header() {
        let (service, _) = service();

        assert_header_rejected(service.verify_auth_header(None));
        assert_header_rejected(service.verify_auth_header(Some("")));
    }

    #[test]
    fn test_valid_bearer_header() {
        let (service, token) = service();

        let payload = service
            .verify_auth_header(Some(&format!("Bearer {}", token)))
            .unwrap();
        assert_eq!(payload.role, Role::Admin);
        assert_eq!(payload.email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_malformed_headers() {
        let (service, token) = service();

        for header in [
            format!("Basic {}", token),
            format!("bearer {}", token),
            "Bearer".to_string(),
            "Bearer ".to_string(),
            format!("Bearer  {}", token),
            format!("Bearer {} extra", token),
            format!(" Bearer {}", token),
            token.clone(),
        ] {
            assert_header_rejected(service.verify_auth_header(Some(&header)));
        }
    }

    #[test]
    fn test_invalid_token_propagates_authentication_error() {
        let (service, _) = service();

        let err = service
            .verify_auth_header(Some("Bearer not.a.token"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.field(), Some("accessToken"));
    }

    #[test]
    fn test_check_user_role() {
        let (service, _) = service();

        assert!(!service.check_user_role(None, &[Role::User]));
        assert!(!service.check_user_role(Some(&payload(Role::Admin)), &[]));
        assert!(service.check_user_role(
            Some(&payload(Role::Admin)),
            &[Role::Admin, Role::SuperAdmin]
        ));
        assert!(!service.check_user_role(Some(&payload(Role::User)), &[Role::Admin]));
        assert!(!service.check_user_role(Some(&payload(Role::SuperAdmin)), &[Role::Admin]));
    }
}
