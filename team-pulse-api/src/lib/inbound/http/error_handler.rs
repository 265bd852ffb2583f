use std::error::Error as StdError;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::domain::errors::ApplicationError;
use crate::domain::errors::AuthenticationError;
use crate::domain::errors::AuthorizationError;
use crate::domain::errors::BusinessRuleError;
use crate::domain::errors::ConflictError;
use crate::domain::errors::ErrorCategory;
use crate::domain::errors::ErrorMetadata;
use crate::domain::errors::ErrorSeverity;
use crate::domain::errors::ExternalServiceError;
use crate::domain::errors::InternalError;
use crate::domain::errors::NotFoundError;
use crate::domain::errors::RepositoryError;
use crate::domain::errors::ValidationError;

const SANITIZED_MESSAGE: &str = "An unexpected error occurred";
const INVALID_REQUEST_MESSAGE: &str = "Invalid request data";

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub name: String,
    pub code: String,
    pub message: String,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ErrorMetadata>,
}

/// Transport-level rendering of an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status_code: StatusCode,
    pub body: ErrorBody,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.body)).into_response()
    }
}

/// Turns errors into responses at the HTTP boundary.
///
/// Operational errors are reported verbatim. Non-operational errors are
/// logged in full and replaced by a generic 500.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, error: &ApplicationError) -> ErrorResponse {
        log_error(error);

        if !error.is_operational() {
            tracing::error!(
                name = error.name(),
                code = error.code(),
                category = %error.category(),
                message = error.message(),
                "Non-operational error detected"
            );
            return sanitized(error);
        }

        let status_code = StatusCode::from_u16(error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let metadata = Some(error.metadata().clone()).filter(|m| !m.is_empty());

        ErrorResponse {
            status_code,
            body: ErrorBody {
                name: error.name().to_string(),
                code: error.code().to_string(),
                message: error.message().to_string(),
                category: error.category(),
                severity: error.severity(),
                timestamp: error.timestamp(),
                metadata,
            },
        }
    }

    /// Handle an error of any type, normalising foreign errors first.
    pub fn handle_unknown(&self, error: &(dyn StdError + 'static)) -> ErrorResponse {
        self.handle(&normalize(error))
    }
}

/// Map any error onto the application taxonomy.
///
/// Application errors pass through unchanged, request-body parsing failures
/// become a `ValidationError` and everything else an `InternalError`.
pub fn normalize(error: &(dyn StdError + 'static)) -> ApplicationError {
    if let Some(recognized) = recognize(error) {
        return recognized;
    }

    if error.downcast_ref::<JsonRejection>().is_some()
        || error.downcast_ref::<serde_json::Error>().is_some()
    {
        let mut context = ErrorMetadata::new();
        context.insert("details".to_string(), Value::from(error.to_string()));
        return ValidationError::new(INVALID_REQUEST_MESSAGE)
            .with_context(context)
            .into();
    }

    InternalError::new(error.to_string()).into()
}

fn recognize(error: &(dyn StdError + 'static)) -> Option<ApplicationError> {
    if let Some(application_error) = error.downcast_ref::<ApplicationError>() {
        return Some(application_error.clone());
    }

    downcast::<ValidationError>(error)
        .or_else(|| downcast::<AuthenticationError>(error))
        .or_else(|| downcast::<AuthorizationError>(error))
        .or_else(|| downcast::<NotFoundError>(error))
        .or_else(|| downcast::<ConflictError>(error))
        .or_else(|| downcast::<BusinessRuleError>(error))
        .or_else(|| downcast::<ExternalServiceError>(error))
        .or_else(|| downcast::<RepositoryError>(error))
        .or_else(|| downcast::<InternalError>(error))
}

fn downcast<E>(error: &(dyn StdError + 'static)) -> Option<ApplicationError>
where
    E: StdError + Clone + Into<ApplicationError> + 'static,
{
    error.downcast_ref::<E>().cloned().map(Into::into)
}

fn log_error(error: &ApplicationError) {
    let metadata = Value::Object(error.metadata().clone());

    match error.severity() {
        ErrorSeverity::Low => tracing::info!(
            code = error.code(),
            category = %error.category(),
            severity = %error.severity(),
            timestamp = %error.timestamp(),
            metadata = %metadata,
            "{}",
            error.message()
        ),
        ErrorSeverity::Medium => tracing::warn!(
            code = error.code(),
            category = %error.category(),
            severity = %error.severity(),
            timestamp = %error.timestamp(),
            metadata = %metadata,
            "{}",
            error.message()
        ),
        ErrorSeverity::High | ErrorSeverity::Critical => tracing::error!(
            code = error.code(),
            category = %error.category(),
            severity = %error.severity(),
            timestamp = %error.timestamp(),
            metadata = %metadata,
            "{}",
            error.message()
        ),
    }
}

fn sanitized(error: &ApplicationError) -> ErrorResponse {
    ErrorResponse {
        status_code: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorBody {
            name: InternalError::NAME.to_string(),
            code: InternalError::DEFAULT_CODE.to_string(),
            message: SANITIZED_MESSAGE.to_string(),
            category: ErrorCategory::Internal,
            severity: ErrorSeverity::Critical,
            timestamp: error.timestamp(),
            metadata: None,
        },
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        ErrorHandler::new().handle(&self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::Mutex;

    use serde_json::json;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    fn one_of_each() -> Vec<ApplicationError> {
        vec![
            ValidationError::new("v").into(),
            AuthenticationError::new("a").into(),
            AuthorizationError::new("z").into(),
            NotFoundError::new("n").into(),
            ConflictError::new("c").into(),
            BusinessRuleError::new("b").into(),
            ExternalServiceError::new("e").into(),
            RepositoryError::new("r").into(),
        ]
    }

    #[test]
    fn test_operational_errors_use_category_status() {
        let handler = ErrorHandler::new();
        let expected = [400, 401, 403, 404, 409, 422, 502, 500];

        for (error, status) in one_of_each().iter().zip(expected) {
            let response = handler.handle(error);
            assert_eq!(response.status_code.as_u16(), status, "{}", error.name());
            assert_eq!(response.body.message, error.message());
            assert_eq!(response.body.code, error.code());
            assert_eq!(response.body.category, error.category());
        }
    }

    #[test]
    fn test_non_operational_errors_are_sanitized() {
        let handler = ErrorHandler::new();

        for error in one_of_each() {
            let error = error.with_context(ErrorMetadata::from_iter([(
                "secret".to_string(),
                json!("do not leak"),
            )]));
            let error = match error {
                ApplicationError::Validation(e) => e.non_operational().into(),
                ApplicationError::Authentication(e) => e.non_operational().into(),
                ApplicationError::Authorization(e) => e.non_operational().into(),
                ApplicationError::NotFound(e) => e.non_operational().into(),
                ApplicationError::Conflict(e) => e.non_operational().into(),
                ApplicationError::BusinessRule(e) => e.non_operational().into(),
                ApplicationError::External(e) => e.non_operational().into(),
                ApplicationError::Repository(e) => e.non_operational().into(),
                ApplicationError::Internal(e) => e.into(),
            };

            let response = handler.handle(&error);
            assert_eq!(response.status_code, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(response.body.message, "An unexpected error occurred");
            assert_eq!(response.body.code, "INTERNAL_ERROR");
            assert!(response.body.metadata.is_none());
        }
    }

    #[test]
    fn test_metadata_only_when_present() {
        let handler = ErrorHandler::new();

        let bare = handler.handle(&ValidationError::new("bad").into());
        let body = serde_json::to_value(&bare.body).unwrap();
        assert!(body.get("metadata").is_none());

        let tagged = handler.handle(&ValidationError::for_field("authorization", "bad").into());
        let body = serde_json::to_value(&tagged.body).unwrap();
        assert_eq!(body["metadata"], json!({ "field": "authorization" }));
        assert_eq!(body["name"], json!("ValidationError"));
        assert_eq!(body["category"], json!("validation"));
        assert_eq!(body["severity"], json!("low"));
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn test_schema_errors_become_validation_errors() {
        let parse_error = serde_json::from_str::<Value>("{not json").unwrap_err();

        let response = ErrorHandler::new().handle_unknown(&parse_error);

        assert_eq!(response.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(response.body.message, "Invalid request data");
        assert_eq!(response.body.name, "ValidationError");
    }

    #[test]
    fn test_foreign_errors_become_internal_errors() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");

        let response = ErrorHandler::new().handle_unknown(&io_error);

        assert_eq!(response.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body.message, "An unexpected error occurred");
        assert!(!response.body.message.contains("disk"));
    }

    #[test]
    fn test_recognized_errors_pass_through_normalize() {
        let error = AuthenticationError::for_field("accessToken", "Invalid or expired token");

        let normalized = normalize(&error);

        assert_eq!(normalized, ApplicationError::Authentication(error));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn handle_and_capture(error: &ApplicationError) -> Vec<String> {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            ErrorHandler::new().handle(error);
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        output.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_severity_selects_log_level() {
        let cases: Vec<(ApplicationError, &str)> = vec![
            (ValidationError::new("low severity").into(), "INFO"),
            (ConflictError::new("medium severity").into(), "WARN"),
            (ExternalServiceError::new("high severity").into(), "ERROR"),
            (
                ValidationError::new("raised severity")
                    .with_severity(ErrorSeverity::Critical)
                    .into(),
                "ERROR",
            ),
        ];

        for (error, level) in cases {
            let lines = handle_and_capture(&error);

            assert_eq!(lines.len(), 1, "{:?}", lines);
            assert!(lines[0].contains(level), "{}", lines[0]);
            assert!(lines[0].contains(error.message()), "{}", lines[0]);
            assert!(lines[0].contains(error.code()), "{}", lines[0]);
        }
    }

    #[test]
    fn test_non_operational_error_logged_twice() {
        let error: ApplicationError = InternalError::new("null pointer in team roster").into();

        let lines = handle_and_capture(&error);

        assert_eq!(lines.len(), 2, "{:?}", lines);
        assert!(lines[0].contains("ERROR"));
        assert!(lines[0].contains("null pointer in team roster"));
        assert!(lines[1].contains("ERROR"));
        assert!(lines[1].contains("Non-operational error detected"));
    }
}
