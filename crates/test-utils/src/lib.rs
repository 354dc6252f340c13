// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for the Xugu catalog
//!
//! This crate provides common testing components including:
//! - A scripted mock query executor with session accounting
//! - Scripted user interaction
//! - Catalog view row fixtures

pub mod fixtures;
pub mod mock_executor;
pub mod mock_interaction;

// Re-exports for convenience
pub use fixtures::RowFixtures;
pub use mock_executor::{ExecutedStatement, MockContext, MockExecutor, MockSession};
pub use mock_interaction::RecordingInteraction;
