use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::auth::models::AccessTokenPayload;
use crate::domain::auth::models::Role;
use crate::domain::auth::ports::SessionServicePort;
use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthorizationError;
use crate::inbound::http::router::AppState;

const ALLOWED_ROLES: [Role; 2] = [Role::Admin, Role::SuperAdmin];

pub async fn purge_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AccessTokenPayload>,
) -> Result<ApiSuccess<PurgedSessionsData>, ApplicationError> {
    if !state.auth_service.check_user_role(Some(&user), &ALLOWED_ROLES) {
        return Err(AuthorizationError::new("Insufficient permissions").into());
    }

    let removed = state.session_service.purge_expired().await?;
    tracing::info!(removed, requested_by = %user.user_id, "Expired sessions purged");

    Ok(ApiSuccess::new(StatusCode::OK, PurgedSessionsData { removed }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgedSessionsData {
    pub removed: u64,
}
