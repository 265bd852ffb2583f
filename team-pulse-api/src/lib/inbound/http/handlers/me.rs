use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use crate::domain::auth::models::AccessTokenPayload;

/// Claims of the caller's access token.
pub async fn me(Extension(user): Extension<AccessTokenPayload>) -> ApiSuccess<AccessTokenPayload> {
    ApiSuccess::new(StatusCode::OK, user)
}
