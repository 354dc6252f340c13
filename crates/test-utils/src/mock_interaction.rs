// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Scripted user interaction for testing

use async_trait::async_trait;
use parking_lot::Mutex;
use std::error::Error;
use xugu_host::{PasswordChange, UserInteraction};

/// Answers dialogs from a script and records what it was asked
#[derive(Debug, Default)]
pub struct RecordingInteraction {
    confirm_answer: bool,
    new_password: Option<String>,
    confirmations: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    password_prompts: Mutex<Vec<String>>,
}

impl RecordingInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: answer every confirmation with `answer`
    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirm_answer = answer;
        self
    }

    /// Builder method: answer password prompts with `password`
    pub fn with_new_password(mut self, password: impl Into<String>) -> Self {
        self.new_password = Some(password.into());
        self
    }

    /// Titles of the confirmations asked so far
    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.lock().clone()
    }

    /// Rendered error reports shown so far
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    /// User names the password prompt was shown for
    pub fn password_prompts(&self) -> Vec<String> {
        self.password_prompts.lock().clone()
    }
}

#[async_trait]
impl UserInteraction for RecordingInteraction {
    async fn confirm(&self, title: &str, _message: &str) -> bool {
        self.confirmations.lock().push(title.to_string());
        self.confirm_answer
    }

    fn show_error(&self, title: &str, message: &str, error: &(dyn Error + Send + Sync)) {
        self.errors
            .lock()
            .push(format!("{}: {}: {}", title, message, error));
    }

    async fn prompt_password_change(
        &self,
        _message: &str,
        user_name: &str,
        password: Option<&str>,
    ) -> Option<PasswordChange> {
        self.password_prompts.lock().push(user_name.to_string());
        let new_password = self.new_password.clone()?;
        Some(PasswordChange {
            user_name: user_name.to_string(),
            old_password: password.map(str::to_string),
            new_password: Some(new_password),
        })
    }
}
