//! Unified error type for the scheduling engine.
//!
//! Every failure carries a kind plus a human-readable message so that an HTTP layer
//! can map it onto a status code without inspecting strings.

use thiserror::Error;

/// Coarse classification of an [`Error`], stable across message wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input
    Validation,
    /// Missing record, or a record owned by someone else
    NotFound,
    /// Operation not allowed in the record's current status
    InvalidState,
    /// Unknown recurrence frequency value
    UnsupportedFrequency,
    /// Everything else (storage, configuration, dispatch)
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Cannot {operation} scheduled transaction {id}: status is {status}")]
    InvalidState {
        id: i64,
        status: String,
        operation: &'static str,
    },

    #[error("Unsupported frequency: {value}")]
    UnsupportedFrequency { value: String },

    #[error("Date out of range: {message}")]
    DateOutOfRange { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Notification dispatch failed: {message}")]
    Dispatch { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::UnsupportedFrequency { .. } => ErrorKind::UnsupportedFrequency,
            Self::DateOutOfRange { .. }
            | Self::Config { .. }
            | Self::Dispatch { .. }
            | Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// True for failures caused by the caller's input rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::InvalidState
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
