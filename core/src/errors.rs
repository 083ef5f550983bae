//! Error types for Flashgen core operations

use thiserror::Error;

/// Generic message shown to end users for every failure except input validation
pub const GENERIC_USER_MESSAGE: &str =
    "Flashcard generation failed. Please try again later.";

/// Top-level error returned by the generation orchestrator
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl GenerationError {
    /// Stable machine-readable code, stored in generation error records
    pub fn error_code(&self) -> String {
        match self {
            GenerationError::InvalidInput(_) => "invalid_input".to_string(),
            GenerationError::Gateway(e) => e.error_code(),
            GenerationError::Schema(e) => e.code().to_string(),
            GenerationError::Persistence(_) => "persistence_error".to_string(),
        }
    }

    /// Message safe to show to the end user.
    ///
    /// Only input validation failures are shown verbatim; everything else
    /// collapses into a generic retry hint.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::InvalidInput(msg) => msg.clone(),
            _ => GENERIC_USER_MESSAGE.to_string(),
        }
    }
}

/// Errors raised by the chat-completion gateway client
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed - invalid API key")]
    Auth { body: Option<String> },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error(transparent)]
    Transient(#[from] TransientError),

    #[error("Request failed after {attempts} attempts: {last}")]
    MaxRetriesExceeded {
        attempts: u32,
        last: Box<GatewayError>,
    },

    #[error("Failed to decode structured response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Code of this error alone
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Config(_) => "config_error",
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::Auth { .. } => "auth_error",
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::Transient(e) => e.kind.code(),
            GatewayError::MaxRetriesExceeded { .. } => "max_retries_exceeded",
            GatewayError::Decode(_) => "decode_error",
        }
    }

    /// Code including the wrapped cause, e.g. `max_retries_exceeded:rate_limit`
    pub fn error_code(&self) -> String {
        match self {
            GatewayError::MaxRetriesExceeded { last, .. } => {
                format!("{}:{}", self.code(), last.error_code())
            }
            _ => self.code().to_string(),
        }
    }

    /// Whether the retry loop may attempt the request again
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transient(_))
    }

    /// HTTP status attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Auth { .. } => Some(401),
            GatewayError::Transient(e) => e.status,
            GatewayError::MaxRetriesExceeded { last, .. } => last.status(),
            _ => None,
        }
    }
}

/// Classes of failure that are considered likely to succeed on retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// HTTP 429
    RateLimit,
    /// Any other non-2xx status
    ApiError,
    /// 2xx reply without usable candidates
    InvalidResponse,
    /// Connection-level failure other than a timeout
    Network,
}

impl TransientKind {
    pub fn code(&self) -> &'static str {
        match self {
            TransientKind::RateLimit => "rate_limit",
            TransientKind::ApiError => "api_error",
            TransientKind::InvalidResponse => "invalid_response",
            TransientKind::Network => "network_error",
        }
    }
}

impl std::fmt::Display for TransientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A retryable gateway failure with its diagnostics
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}")]
pub struct TransientError {
    pub kind: TransientKind,
    pub status: Option<u16>,
    pub message: String,
    /// Raw response body, kept for diagnostics
    pub body: Option<String>,
}

impl TransientError {
    pub fn new(kind: TransientKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            body: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Violations of the flashcard output contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("response has no `flashcards` list")]
    MissingField,

    #[error("expected at least {min} flashcards, got {found}")]
    TooFew { found: usize, min: usize },

    #[error("flashcard {index} has an empty `{field}`")]
    EmptyField { index: usize, field: &'static str },
}

impl SchemaError {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::MissingField => "missing_field",
            SchemaError::TooFew { .. } => "too_few",
            SchemaError::EmptyField { .. } => "empty_field",
        }
    }
}

/// Errors raised by persistence port implementations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors raised while validating generator settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

impl From<ConfigError> for GatewayError {
    fn from(err: ConfigError) -> Self {
        GatewayError::Config(err.to_string())
    }
}

/// Result type alias for orchestrator operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type alias for persistence operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_retries_code_reflects_cause() {
        let err = GatewayError::MaxRetriesExceeded {
            attempts: 2,
            last: Box::new(GatewayError::Transient(TransientError::new(
                TransientKind::InvalidResponse,
                "no choices returned",
            ))),
        };
        assert_eq!(err.code(), "max_retries_exceeded");
        assert_eq!(err.error_code(), "max_retries_exceeded:invalid_response");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_user_message_policy() {
        let input = GenerationError::InvalidInput("Source text must be at least 1000 characters long".into());
        assert_eq!(input.user_message(), "Source text must be at least 1000 characters long");

        let gateway = GenerationError::Gateway(GatewayError::Timeout { timeout_ms: 10 });
        assert_eq!(gateway.user_message(), GENERIC_USER_MESSAGE);
        assert_eq!(gateway.error_code(), "timeout");
    }

    #[test]
    fn test_status_passthrough() {
        let err = GatewayError::Transient(
            TransientError::new(TransientKind::ApiError, "bad gateway").with_status(502),
        );
        assert_eq!(err.status(), Some(502));
        assert!(err.is_retryable());
        assert_eq!(GatewayError::Auth { body: None }.status(), Some(401));
    }
}
