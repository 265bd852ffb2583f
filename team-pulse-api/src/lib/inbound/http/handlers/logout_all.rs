use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::auth::models::AccessTokenPayload;
use crate::domain::auth::ports::SessionServicePort;
use crate::domain::errors::ApplicationError;
use crate::inbound::http::router::AppState;

pub async fn logout_all(
    State(state): State<AppState>,
    Extension(user): Extension<AccessTokenPayload>,
) -> Result<ApiSuccess<RevokedSessionsData>, ApplicationError> {
    let revoked = state.session_service.logout_all(&user.user_id).await?;

    Ok(ApiSuccess::new(StatusCode::OK, RevokedSessionsData { revoked }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevokedSessionsData {
    pub revoked: u64,
}
