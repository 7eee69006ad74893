//! Error types for Brand Pulse.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::notify::Notification;
use crate::wizard::WizardStep;

/// Startup error returned from `main`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Outbound mail errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Transport(String),
}

/// Sign-in, sign-up and session errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access denied for {email}")]
    AccessDenied { email: String },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Full name is required to sign up")]
    MissingName,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code expired")]
    CodeExpired,

    #[error("Too many attempts, request a new code")]
    TooManyAttempts,

    #[error("No verification code was requested for {email}")]
    NoPendingCode { email: String },

    #[error("Not signed in")]
    Unauthenticated,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

/// Wizard navigation and editing errors.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Wizard {id} not found")]
    NotFound { id: Uuid },

    /// Step-local validation failed; the wizard did not move.
    #[error("{notification}")]
    Blocked {
        step: WizardStep,
        notification: Notification,
    },

    #[error("No step {direction} {step}")]
    AtBoundary {
        step: WizardStep,
        direction: &'static str,
    },

    #[error("{kind} can only be edited on the {owner} step (currently on {current})")]
    WrongStep {
        kind: String,
        owner: WizardStep,
        current: WizardStep,
    },

    #[error("Wizard can only be submitted from the review step (currently on {current})")]
    NotOnReview { current: WizardStep },

    #[error("Wizard was already submitted")]
    AlreadySubmitted,

    #[error("Unknown wizard item kind: {0}")]
    UnknownKind(String),

    #[error("{kind} {id} not found")]
    ItemNotFound { kind: String, id: String },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

/// Marketing copy store errors.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Invalid content key: {0}")]
    InvalidKey(String),

    #[error("No content stored under {0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Mock search and sandbox errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown sentiment: {0}")]
    UnknownSentiment(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by HTTP handlers.
///
/// Every failure reaches the client as a notification the UI can show as a
/// toast: `{"notification": {"level": "error", "title": ..., "description": ...}}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub notification: Notification,
}

impl ApiError {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            status,
            notification: Notification::error(title),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.notification = self.notification.with_description(description);
        self
    }

    pub fn bad_request(title: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, title)
    }

    pub fn not_found(title: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, title)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "notification": self.notification })),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            AuthError::InvalidEmail(_) | AuthError::MissingName => StatusCode::BAD_REQUEST,
            AuthError::InvalidCode
            | AuthError::CodeExpired
            | AuthError::TooManyAttempts
            | AuthError::NoPendingCode { .. }
            | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Database(_) | AuthError::Mail(_) => {
                tracing::error!(error = %err, "Auth request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            notification: Notification::from(&err),
        }
    }
}

impl From<WizardError> for ApiError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Blocked { notification, .. } => Self {
                status: StatusCode::CONFLICT,
                notification,
            },
            WizardError::NotFound { .. } | WizardError::ItemNotFound { .. } => {
                Self::not_found(err.to_string())
            }
            WizardError::UnknownKind(_) | WizardError::InvalidField { .. } => {
                Self::bad_request(err.to_string())
            }
            WizardError::AtBoundary { .. }
            | WizardError::WrongStep { .. }
            | WizardError::NotOnReview { .. }
            | WizardError::AlreadySubmitted => Self::new(StatusCode::CONFLICT, err.to_string()),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::InvalidKey(_) => Self::bad_request(err.to_string()),
            ContentError::NotFound(_) => Self::not_found(err.to_string()),
            ContentError::Database(e) => Self::from(e),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let title = match &err {
            SearchError::EmptyPrompt => "Prompt required",
            SearchError::UnknownModel(_) => "Unknown model",
            SearchError::UnknownSentiment(_) => "Unknown sentiment",
        };
        Self::bad_request(title).with_description(err.to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        tracing::error!(error = %err, "Store error while handling request");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            .with_description("Please try again in a moment.")
    }
}
