use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::errors::ApplicationError;
use crate::domain::errors::ValidationError;
use crate::inbound::http::router::AppState;

/// Middleware that verifies the bearer access token and stores its
/// `AccessTokenPayload` in the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApplicationError> {
    let payload = {
        let auth_header = match req.headers().get(header::AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                ValidationError::for_field("authorization", "Invalid authorization header")
            })?),
            None => None,
        };

        state.auth_service.verify_auth_header(auth_header)?
    };

    tracing::debug!(user_id = %payload.user_id, role = %payload.role, "Request authenticated");
    req.extensions_mut().insert(payload);

    Ok(next.run(req).await)
}
