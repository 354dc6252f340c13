// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Xugu Catalog - Host Contracts
//!
//! This crate defines what the Xugu catalog consumes from the application that
//! hosts it. None of it talks to a database by itself:
//!
//! - **Query execution**: [`QueryExecutor`], [`ExecutionContext`] and [`Session`]
//!   run [`Statement`]s and hand back [`Row`]s or a structured [`SqlFailure`]
//! - **Preferences**: a flat key/value [`PreferenceStore`], with in-memory and
//!   JSON-file implementations
//! - **User interaction**: [`UserInteraction`] for confirmations, error reports and
//!   the expired-password prompt
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xugu_host::{ExecutionContext, SessionPurpose, Statement};
//!
//! async fn current_schema(ctx: &dyn ExecutionContext) -> Result<Option<String>, xugu_host::SqlFailure> {
//!     let mut session = ctx.open_session(SessionPurpose::Meta, "Read current schema").await?;
//!     let rows = session
//!         .query(&Statement::new("SELECT SYS_CONTEXT('USERENV', 'CURRENT_SCHEMA') FROM DUAL"))
//!         .await?;
//!     Ok(rows.first().and_then(|row| row.string_at(0)))
//! }
//! ```

pub mod exec;
pub mod failure;
pub mod interaction;
pub mod prefs;
pub mod statement;
pub mod value;

// Re-exports
pub use exec::{ExecutionContext, QueryExecutor, Session, SessionPurpose};
pub use failure::{DriverError, SqlFailure, sql_state};
pub use interaction::{NoInteraction, PasswordChange, UserInteraction};
pub use prefs::{
    JsonFilePreferenceStore, MemoryPreferenceStore, PrefValue, PreferenceError, PreferenceStore,
};
pub use statement::{Param, SqlType, Statement};
pub use value::{Row, SqlValue};
