use std::fmt;
use std::marker::PhantomData;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Open key/value bag attached to every application error.
pub type ErrorMetadata = serde_json::Map<String, Value>;

/// Metadata key naming the input that caused a failure.
pub const FIELD_KEY: &str = "field";

/// Failure category. Decides the transport status of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    BusinessRule,
    External,
    Internal,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 8] = [
        ErrorCategory::Validation,
        ErrorCategory::Authentication,
        ErrorCategory::Authorization,
        ErrorCategory::NotFound,
        ErrorCategory::Conflict,
        ErrorCategory::BusinessRule,
        ErrorCategory::External,
        ErrorCategory::Internal,
    ];

    /// HTTP status code errors of this category are reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorCategory::Validation => 400,
            ErrorCategory::Authentication => 401,
            ErrorCategory::Authorization => 403,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::BusinessRule => 422,
            ErrorCategory::External => 502,
            ErrorCategory::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::BusinessRule => "business_rule",
            ErrorCategory::External => "external",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How loudly an error is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Low => "low",
            ErrorSeverity::Medium => "medium",
            ErrorSeverity::High => "high",
            ErrorSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every application error.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    code: String,
    message: String,
    severity: ErrorSeverity,
    timestamp: DateTime<Utc>,
    metadata: ErrorMetadata,
    is_operational: bool,
}

impl ErrorDetails {
    fn new(code: &str, message: String, severity: ErrorSeverity, is_operational: bool) -> Self {
        Self {
            code: code.to_string(),
            message,
            severity,
            timestamp: Utc::now(),
            metadata: ErrorMetadata::new(),
            is_operational,
        }
    }

    /// Stable machine-readable code, e.g. `VALIDATION_ERROR`.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn metadata(&self) -> &ErrorMetadata {
        &self.metadata
    }

    /// False for bugs and unexpected failures whose details must not reach clients.
    pub fn is_operational(&self) -> bool {
        self.is_operational
    }

    /// Value of `metadata.field`, when the error concerns a specific input.
    pub fn field(&self) -> Option<&str> {
        self.metadata.get(FIELD_KEY).and_then(Value::as_str)
    }

    fn merged(&self, context: ErrorMetadata) -> Self {
        let mut details = self.clone();
        details.metadata.extend(context);
        details
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Static description of one kind of application error.
pub trait ErrorKind: fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    const NAME: &'static str;
    const CATEGORY: ErrorCategory;
    const CODE: &'static str;
    const SEVERITY: ErrorSeverity;
    const OPERATIONAL: bool = true;

    fn wrap(err: CategorizedError<Self>) -> ApplicationError;
}

/// Error of kind `K`. Use the aliases below (`ValidationError`, ...).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{details}")]
pub struct CategorizedError<K: ErrorKind> {
    details: ErrorDetails,
    kind: PhantomData<K>,
}

impl<K: ErrorKind> CategorizedError<K> {
    pub const NAME: &'static str = K::NAME;
    pub const CATEGORY: ErrorCategory = K::CATEGORY;
    pub const DEFAULT_CODE: &'static str = K::CODE;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            details: ErrorDetails::new(K::CODE, message.into(), K::SEVERITY, K::OPERATIONAL),
            kind: PhantomData,
        }
    }

    /// Error tagged with the offending input in `metadata.field`.
    pub fn for_field(field: &str, message: impl Into<String>) -> Self {
        let mut context = ErrorMetadata::new();
        context.insert(FIELD_KEY.to_string(), Value::from(field));
        Self::new(message).with_context(context)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.details.code = code.into();
        self
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.details.severity = severity;
        self
    }

    /// Mark as a bug rather than an expected failure.
    pub fn non_operational(mut self) -> Self {
        self.details.is_operational = false;
        self
    }

    /// Copy of this error with `context` merged over its metadata.
    pub fn with_context(&self, context: ErrorMetadata) -> Self {
        Self {
            details: self.details.merged(context),
            kind: PhantomData,
        }
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub fn code(&self) -> &str {
        self.details.code()
    }

    pub fn message(&self) -> &str {
        self.details.message()
    }

    pub fn field(&self) -> Option<&str> {
        self.details.field()
    }
}

impl<K: ErrorKind> From<CategorizedError<K>> for ApplicationError {
    fn from(err: CategorizedError<K>) -> Self {
        K::wrap(err)
    }
}

/// Marker types naming each error kind.
pub mod kind {
    use super::ApplicationError;
    use super::CategorizedError;
    use super::ErrorCategory;
    use super::ErrorKind;
    use super::ErrorSeverity;

    /// Malformed or missing input.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Validation;

    impl ErrorKind for Validation {
        const NAME: &'static str = "ValidationError";
        const CATEGORY: ErrorCategory = ErrorCategory::Validation;
        const CODE: &'static str = "VALIDATION_ERROR";
        const SEVERITY: ErrorSeverity = ErrorSeverity::Low;

        fn wrap(err: CategorizedError<Self>) -> ApplicationError {
            ApplicationError::Validation(err)
        }
    }

    /// Credentials absent, invalid or expired.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Authentication;

    impl ErrorKind for Authentication {
        const NAME: &'static str = "AuthenticationError";
        const CATEGORY: ErrorCategory = ErrorCategory::Authentication;
        const CODE: &'static str = "AUTHENTICATION_ERROR";
        const SEVERITY: ErrorSeverity = ErrorSeverity::Medium;

        fn wrap(err: CategorizedError<Self>) -> ApplicationError {
            ApplicationError::Authentication(err)
        }
    }

    /// Authenticated caller lacks the required role.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Authorization;

    impl ErrorKind for Authorization {
        const NAME: &'static str = "AuthorizationError";
        const CATEGORY: ErrorCategory = ErrorCategory::Authorization;
        const CODE: &'static str = "AUTHORIZATION_ERROR";
        const SEVERITY: ErrorSeverity = ErrorSeverity::Medium;

        fn wrap(err: CategorizedError<Self>) -> ApplicationError {
            ApplicationError::Authorization(err)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NotFound;

    impl ErrorKind for NotFound {
        const NAME: &'static str = "NotFoundError";
        const CATEGORY: ErrorCategory = ErrorCategory::NotFound;
        const CODE: &'static str = "NOT_FOUND";
        const SEVERITY: ErrorSeverity = ErrorSeverity::Low;

        fn wrap(err: CategorizedError<Self>) -> ApplicationError {
            ApplicationError::NotFound(err)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Conflict;

    impl ErrorKind for Conflict {
        const NAME: &'static str = "ConflictError";
        const CATEGORY: ErrorCategory = ErrorCategory::Conflict;
        const CODE: &'static str = "CONFLICT";
        const SEVERITY: ErrorSeverity = ErrorSeverity::Medium;

        fn wrap(err: CategorizedError<Self>) -> ApplicationError {
            ApplicationError::Conflict(err)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BusinessRule;

    impl ErrorKind for BusinessRule {
        const NAME: &'static str = "BusinessRuleError";
        const CATEGORY: ErrorCategory = ErrorCategory::BusinessRule;
        const CODE: &'static str = "BUSINESS_RULE_VIOLATION";
        const SEVERITY: ErrorSeverity = ErrorSeverity::Medium;

        fn wrap(err: CategorizedError<Self>) -> ApplicationError {
            ApplicationError::BusinessRule(err)
        }
    }

    /// A downstream service failed or answered with garbage.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExternalService;

    impl ErrorKind for ExternalService {
        const NAME: &'static str = "ExternalServiceError";
        const CATEGORY: ErrorCategory = ErrorCategory::External;
        const CODE: &'static str = "EXTERNAL_SERVICE_ERROR";
        const SEVERITY: ErrorSeverity = ErrorSeverity::High;

        fn wrap(err: CategorizedError<Self>) -> ApplicationError {
            ApplicationError::External(err)
        }
    }

    /// Storage or other infrastructure failure below the domain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Repository;

    impl ErrorKind for Repository {
        const NAME: &'static str = "RepositoryError";
        const CATEGORY: ErrorCategory = ErrorCategory::Internal;
        const CODE: &'static str = "REPOSITORY_ERROR";
        const SEVERITY: ErrorSeverity = ErrorSeverity::High;

        fn wrap(err: CategorizedError<Self>) -> ApplicationError {
            ApplicationError::Repository(err)
        }
    }

    /// Unexpected failure. Never exposed verbatim.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Internal;

    impl ErrorKind for Internal {
        const NAME: &'static str = "InternalError";
        const CATEGORY: ErrorCategory = ErrorCategory::Internal;
        const CODE: &'static str = "INTERNAL_ERROR";
        const SEVERITY: ErrorSeverity = ErrorSeverity::Critical;
        const OPERATIONAL: bool = false;

        fn wrap(err: CategorizedError<Self>) -> ApplicationError {
            ApplicationError::Internal(err)
        }
    }
}

pub type ValidationError = CategorizedError<kind::Validation>;
pub type AuthenticationError = CategorizedError<kind::Authentication>;
pub type AuthorizationError = CategorizedError<kind::Authorization>;
pub type NotFoundError = CategorizedError<kind::NotFound>;
pub type ConflictError = CategorizedError<kind::Conflict>;
pub type BusinessRuleError = CategorizedError<kind::BusinessRule>;
pub type ExternalServiceError = CategorizedError<kind::ExternalService>;
pub type RepositoryError = CategorizedError<kind::Repository>;
pub type InternalError = CategorizedError<kind::Internal>;

/// Closed set of failures the application reports.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Validation(ValidationError),

    #[error(transparent)]
    Authentication(AuthenticationError),

    #[error(transparent)]
    Authorization(AuthorizationError),

    #[error(transparent)]
    NotFound(NotFoundError),

    #[error(transparent)]
    Conflict(ConflictError),

    #[error(transparent)]
    BusinessRule(BusinessRuleError),

    #[error(transparent)]
    External(ExternalServiceError),

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Internal(InternalError),
}

impl ApplicationError {
    /// Type name reported in response bodies, e.g. `ValidationError`.
    pub fn name(&self) -> &'static str {
        match self {
            ApplicationError::Validation(_) => ValidationError::NAME,
            ApplicationError::Authentication(_) => AuthenticationError::NAME,
            ApplicationError::Authorization(_) => AuthorizationError::NAME,
            ApplicationError::NotFound(_) => NotFoundError::NAME,
            ApplicationError::Conflict(_) => ConflictError::NAME,
            ApplicationError::BusinessRule(_) => BusinessRuleError::NAME,
            ApplicationError::External(_) => ExternalServiceError::NAME,
            ApplicationError::Repository(_) => RepositoryError::NAME,
            ApplicationError::Internal(_) => InternalError::NAME,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ApplicationError::Validation(_) => ValidationError::CATEGORY,
            ApplicationError::Authentication(_) => AuthenticationError::CATEGORY,
            ApplicationError::Authorization(_) => AuthorizationError::CATEGORY,
            ApplicationError::NotFound(_) => NotFoundError::CATEGORY,
            ApplicationError::Conflict(_) => ConflictError::CATEGORY,
            ApplicationError::BusinessRule(_) => BusinessRuleError::CATEGORY,
            ApplicationError::External(_) => ExternalServiceError::CATEGORY,
            ApplicationError::Repository(_) => RepositoryError::CATEGORY,
            ApplicationError::Internal(_) => InternalError::CATEGORY,
        }
    }

    pub fn details(&self) -> &ErrorDetails {
        match self {
            ApplicationError::Validation(e) => e.details(),
            ApplicationError::Authentication(e) => e.details(),
            ApplicationError::Authorization(e) => e.details(),
            ApplicationError::NotFound(e) => e.details(),
            ApplicationError::Conflict(e) => e.details(),
            ApplicationError::BusinessRule(e) => e.details(),
            ApplicationError::External(e) => e.details(),
            ApplicationError::Repository(e) => e.details(),
            ApplicationError::Internal(e) => e.details(),
        }
    }

    pub fn code(&self) -> &str {
        self.details().code()
    }

    pub fn message(&self) -> &str {
        self.details().message()
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.details().severity()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.details().timestamp()
    }

    pub fn metadata(&self) -> &ErrorMetadata {
        self.details().metadata()
    }

    pub fn is_operational(&self) -> bool {
        self.details().is_operational()
    }

    pub fn field(&self) -> Option<&str> {
        self.details().field()
    }

    pub fn status_code(&self) -> u16 {
        self.category().status_code()
    }

    /// Copy of this error with `context` merged over its metadata.
    pub fn with_context(&self, context: ErrorMetadata) -> Self {
        match self {
            ApplicationError::Validation(e) => e.with_context(context).into(),
            ApplicationError::Authentication(e) => e.with_context(context).into(),
            ApplicationError::Authorization(e) => e.with_context(context).into(),
            ApplicationError::NotFound(e) => e.with_context(context).into(),
            ApplicationError::Conflict(e) => e.with_context(context).into(),
            ApplicationError::BusinessRule(e) => e.with_context(context).into(),
            ApplicationError::External(e) => e.with_context(context).into(),
            ApplicationError::Repository(e) => e.with_context(context).into(),
            ApplicationError::Internal(e) => e.with_context(context).into(),
        }
    }
}
