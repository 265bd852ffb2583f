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

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<SessionData>, ApplicationError> {
    let body = json_body(payload)?;

    let tokens = state
        .session_service
        .login(&body.email, &body.password)
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, tokens.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}
