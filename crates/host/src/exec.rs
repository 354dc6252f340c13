// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query execution contracts
//!
//! A [`QueryExecutor`] owns the low-level connection and a small set of
//! [`ExecutionContext`]s. Every unit of work opens a short-lived [`Session`]
//! against one context; the session is released when it is dropped, so every
//! exit path (including `?`) gives it back.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::failure::SqlFailure;
use crate::statement::Statement;
use crate::value::{Row, SqlValue};

/// Why a session is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPurpose {
    /// Catalog metadata reads
    Meta,
    /// Utility statements issued on behalf of the user (schema switch, output buffer)
    Util,
    /// User-issued queries
    User,
}

impl fmt::Display for SessionPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionPurpose::Meta => "META",
            SessionPurpose::Util => "UTIL",
            SessionPurpose::User => "USER",
        };
        f.write_str(s)
    }
}

/// A scoped session on one execution context
#[async_trait]
pub trait Session: Send {
    /// Run a row-returning statement
    async fn query(&mut self, stmt: &Statement) -> Result<Vec<Row>, SqlFailure>;

    /// Run a statement that returns no rows, reporting the affected row count
    async fn execute(&mut self, stmt: &Statement) -> Result<u64, SqlFailure>;

    /// Run a callable statement, returning output parameters in registration order
    async fn call(&mut self, stmt: &Statement) -> Result<Vec<SqlValue>, SqlFailure>;

    /// First column of the first row, `None` when the query returned no rows
    async fn query_string(&mut self, stmt: &Statement) -> Result<Option<String>, SqlFailure> {
        let rows = self.query(stmt).await?;
        Ok(rows.first().and_then(|row| row.string_at(0)))
    }
}

/// One connection-bound context sessions are opened against
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    /// Human readable context name, used in logs
    fn name(&self) -> &str;

    /// Open a scoped session; it is released on drop
    async fn open_session(
        &self,
        purpose: SessionPurpose,
        task: &str,
    ) -> Result<Box<dyn Session>, SqlFailure>;

    /// Whether the driver can cancel the statement currently running on this context
    fn supports_statement_cancel(&self) -> bool {
        true
    }

    /// Cancel the statement currently running on this context
    async fn cancel_statement(&self) -> Result<(), SqlFailure>;

    /// Cancel everything running on the underlying connection
    async fn cancel_connection(&self) -> Result<(), SqlFailure>;
}

/// The connection-level collaborator
pub trait QueryExecutor: Send + Sync {
    /// Context used for metadata reads
    fn default_context(&self) -> Arc<dyn ExecutionContext>;

    /// Every context currently open on the connection
    fn all_contexts(&self) -> Vec<Arc<dyn ExecutionContext>>;

    /// Server `(major, minor)` version, when known
    fn server_version(&self) -> Option<(u32, u32)> {
        None
    }
}
