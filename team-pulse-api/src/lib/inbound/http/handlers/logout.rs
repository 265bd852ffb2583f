use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::json_body;
use super::refresh::RefreshRequestBody;
use crate::domain::auth::ports::SessionServicePort;
use crate::domain::errors::ApplicationError;
use crate::inbound::http::router::AppState;

/// Revoke a refresh token. Unknown tokens are not an error.
pub async fn logout(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequestBody>, JsonRejection>,
) -> Result<StatusCode, ApplicationError> {
    let body = json_body(payload)?;

    state.session_service.logout(&body.refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
