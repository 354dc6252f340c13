// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types used throughout the catalog layer.
//! Lookups that find nothing return `Ok(None)`; an error always means the
//! operation itself could not be carried out.

use serde::Serialize;
use thiserror::Error;
use xugu_host::SqlFailure;

use crate::sql::{EC_FEATURE_NOT_SUPPORTED, EC_PASSWORD_EXPIRED};

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, Serialize)]
pub enum CatalogError {
    /// A statement or session failed; `context` names what was being done
    #[error("{context}: {source}")]
    Sql {
        context: String,
        #[source]
        source: SqlFailure,
    },

    /// Failed to connect to the database
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// The caller passed an object of the wrong kind
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The password expired and was not changed
    #[error("Password has expired for user '{0}'")]
    PasswordExpired(String),

    /// A catalog row lacked a required column
    #[error("Column '{column}' missing while reading {object}")]
    MissingColumn { object: String, column: String },

    /// Invalid catalog configuration
    #[error("Invalid catalog configuration: {0}")]
    ConfigurationError(String),

    /// Failed to serialize or persist configuration
    #[error("Failed to serialize preferences: {0}")]
    SerializationError(String),

    /// Server output could not be written to the sink
    #[error("Failed to write server output: {0}")]
    OutputFailed(String),

    /// The specified feature is not supported by this catalog implementation
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}

impl CatalogError {
    /// Wrap a SQL failure with what was being attempted
    pub fn sql(context: impl Into<String>, source: SqlFailure) -> Self {
        CatalogError::Sql {
            context: context.into(),
            source,
        }
    }

    /// The SQL failure at the bottom of this error, if any
    pub fn sql_failure(&self) -> Option<&SqlFailure> {
        match self {
            CatalogError::Sql { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Vendor error code of the underlying SQL failure
    pub fn error_code(&self) -> Option<i32> {
        self.sql_failure().map(|f| f.code)
    }
}

/// Coarse classification of an error for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorType {
    Normal,
    FeatureUnsupported,
    PasswordExpired,
}

/// Classify an error by its root SQL error code
pub fn discover_error_type(error: &CatalogError) -> ErrorType {
    match error {
        CatalogError::PasswordExpired(_) => ErrorType::PasswordExpired,
        _ => match error.error_code() {
            Some(EC_FEATURE_NOT_SUPPORTED) => ErrorType::FeatureUnsupported,
            Some(EC_PASSWORD_EXPIRED) => ErrorType::PasswordExpired,
            _ => ErrorType::Normal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_error_display_keeps_context() {
        let err = CatalogError::sql(
            "Failed to load schemas",
            SqlFailure::new("ORA-00942: table or view does not exist"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to load schemas: ORA-00942: table or view does not exist"
        );
        assert!(err.sql_failure().is_some());
    }

    #[test]
    fn test_discover_error_type() {
        let unsupported = CatalogError::sql(
            "x",
            SqlFailure::new("unsupported").with_code(EC_FEATURE_NOT_SUPPORTED),
        );
        assert_eq!(discover_error_type(&unsupported), ErrorType::FeatureUnsupported);

        let expired = CatalogError::sql("x", SqlFailure::new("expired").with_code(EC_PASSWORD_EXPIRED));
        assert_eq!(discover_error_type(&expired), ErrorType::PasswordExpired);

        let plain = CatalogError::InvalidArgument("nope".into());
        assert_eq!(discover_error_type(&plain), ErrorType::Normal);
    }
}
