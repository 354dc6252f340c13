// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL failures
//!
//! The structured failure every executor reports instead of a bare message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known SQLSTATE values
pub mod sql_state {
    /// Syntax error or access rule violation
    pub const SYNTAX_ERROR: &str = "42000";
    /// Connection does not exist
    pub const CONNECTION_DOES_NOT_EXIST: &str = "08003";
}

/// Native error raised by the underlying driver
///
/// Some drivers report the character offset of a parse error alongside the
/// message; executors surface it through `error_position` when they have it.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
    pub error_position: Option<i64>,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_position: None,
        }
    }

    /// Builder method: attach the parse error offset
    pub fn with_error_position(mut self, position: i64) -> Self {
        self.error_position = Some(position);
        self
    }
}

/// A failed statement or session operation
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct SqlFailure {
    /// Vendor error code (0 when unknown)
    pub code: i32,
    /// Five character SQLSTATE, if the driver reported one
    pub sql_state: Option<String>,
    pub message: String,
    #[source]
    pub cause: Option<DriverError>,
}

impl SqlFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: 0,
            sql_state: None,
            message: message.into(),
            cause: None,
        }
    }

    /// Builder method: set the vendor error code
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    /// Builder method: set the SQLSTATE
    pub fn with_sql_state(mut self, state: impl Into<String>) -> Self {
        self.sql_state = Some(state.into());
        self
    }

    /// Builder method: attach the native driver error
    pub fn with_cause(mut self, cause: DriverError) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn is_syntax_error(&self) -> bool {
        self.sql_state.as_deref() == Some(sql_state::SYNTAX_ERROR)
    }
}
