// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion error types
//!
//! This module defines error types for the completion engine.

use sqlcomplete_catalog::CatalogError;

/// Errors that can occur during completion
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The session has no usable database connection
    #[error("No database connection available")]
    ConnectionUnavailable,

    /// Catalog-related error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// No engine is registered under the session id
    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

impl CompletionError {
    /// Check if this error should result in an empty completion list
    /// (vs. propagating the error to the client)
    pub fn should_return_empty(&self) -> bool {
        matches!(
            self,
            CompletionError::Catalog(
                CatalogError::QueryFailed(_) | CatalogError::SerializationError(_)
            )
        )
    }
}

pub type CompletionResult<T> = Result<T, CompletionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_error_display() {
        let err = CompletionError::ConnectionUnavailable;
        assert_eq!(err.to_string(), "No database connection available");

        let err = CompletionError::Configuration("bad pattern".to_string());
        assert!(err.to_string().contains("bad pattern"));

        let err: CompletionError = CatalogError::QueryFailed("timeout".to_string()).into();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_should_return_empty() {
        assert!(!CompletionError::ConnectionUnavailable.should_return_empty());
        assert!(!CompletionError::Configuration("x".into()).should_return_empty());
        assert!(!CompletionError::UnknownSession("s1".into()).should_return_empty());

        let query_err = CatalogError::QueryFailed("syntax".to_string());
        assert!(CompletionError::Catalog(query_err).should_return_empty());

        // Connection errors propagate
        let conn_err = CatalogError::ConnectionFailed("refused".to_string());
        assert!(!CompletionError::Catalog(conn_err).should_return_empty());
    }
}
