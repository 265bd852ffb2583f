use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::json_body;
use super::ApiSuccess;
use super::SessionData;
use crate::domain::auth::ports::SessionServicePort;
use crate::domain::errors::ApplicationError;
use crate::inbound::http::router::AppState;

/// Exchange a refresh token for a new token pair. The presented token is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<SessionData>, ApplicationError> {
    let body = json_body(payload)?;

    let tokens = state.session_service.refresh(&body.refresh_token).await?;

    Ok(ApiSuccess::new(StatusCode::OK, tokens.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshRequestBody {
    pub refresh_token: String,
}
