// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # User interaction
//!
//! The few places the catalog needs a person: confirming an action, reporting
//! an error, and asking for a new password when the old one expired.

use async_trait::async_trait;
use std::error::Error;
use tracing::error;

/// Answer to an expired-password prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub user_name: String,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// Host-side dialogs
#[async_trait]
pub trait UserInteraction: Send + Sync {
    /// Ask a yes/no question
    async fn confirm(&self, title: &str, message: &str) -> bool;

    /// Report an error to the user
    fn show_error(&self, title: &str, message: &str, error: &(dyn Error + Send + Sync));

    /// Ask for a new password; `None` when the user declines
    async fn prompt_password_change(
        &self,
        message: &str,
        user_name: &str,
        password: Option<&str>,
    ) -> Option<PasswordChange>;
}

/// Headless interaction: declines every question and logs errors
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInteraction;

#[async_trait]
impl UserInteraction for NoInteraction {
    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        false
    }

    fn show_error(&self, title: &str, message: &str, err: &(dyn Error + Send + Sync)) {
        error!("{}: {}: {}", title, message, err);
    }

    async fn prompt_password_change(
        &self,
        _message: &str,
        _user_name: &str,
        _password: Option<&str>,
    ) -> Option<PasswordChange> {
        None
    }
}
