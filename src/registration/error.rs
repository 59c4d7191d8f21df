//! Error types for user registration

use crate::registration::ports::UserId;
use crate::registration::validation::ValidationRejection;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(ValidationRejection),

    #[error(transparent)]
    Credential(ProviderError),

    #[error("{source}{compensation}")]
    Persistence {
        user_id: UserId,
        #[source]
        source: StoreError,
        compensation: Compensation,
    },

    #[error("A registration is already in progress")]
    AlreadySubmitting,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RegistrationError {
    /// Text shown to the user when an attempt fails.
    pub fn failure_message(&self) -> String {
        format!("Signup Failed: {}", self)
    }
}

/// Failure reported by the identity provider. The orchestrator never branches
/// on `code`; it is kept for logs and for the surfaced message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}] {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        ProviderError::new("transport", err.to_string())
    }
}

/// Failure reported by the document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}] {message}")]
pub struct StoreError {
    pub code: String,
    pub message: String,
}

impl StoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<TransportError> for StoreError {
    fn from(err: TransportError) -> Self {
        StoreError::new("transport", err.to_string())
    }
}

/// What happened to the credential after a failed profile write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Compensation disabled; the credential is left orphaned.
    NotAttempted,
    RolledBack,
    RollbackFailed(ProviderError),
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compensation::NotAttempted => Ok(()),
            Compensation::RolledBack => write!(f, " (account creation rolled back)"),
            Compensation::RollbackFailed(err) => write!(f, " (account rollback failed: {})", err),
        }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build request: {0}")]
    InvalidRequest(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}
