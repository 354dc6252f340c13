// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock query executor for testing
//!
//! Responds to statements by substring rules, records every statement it runs
//! and keeps count of open sessions so tests can check that sessions are
//! released on every path.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use xugu_host::{
    ExecutionContext, QueryExecutor, Row, Session, SessionPurpose, SqlFailure, SqlValue,
    Statement,
};

/// A statement the mock executed
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub context: String,
    pub purpose: SessionPurpose,
    pub sql: String,
    pub inputs: Vec<SqlValue>,
}

#[derive(Debug, Clone)]
enum Response {
    Rows(Vec<Row>),
    Outputs(VecDeque<Vec<SqlValue>>),
    Fail(SqlFailure),
}

#[derive(Debug)]
struct Rule {
    pattern: String,
    response: Response,
}

#[derive(Debug, Default)]
struct MockState {
    rules: Mutex<Vec<Rule>>,
    log: Mutex<Vec<ExecutedStatement>>,
    open_sessions: AtomicUsize,
    sessions_opened: AtomicUsize,
    session_failure: Mutex<Option<SqlFailure>>,
    delay: Mutex<Option<Duration>>,
    statement_cancel_supported: AtomicBool,
    statement_cancels: AtomicUsize,
    connection_cancels: AtomicUsize,
    server_version: Mutex<Option<(u32, u32)>>,
}

impl MockState {
    /// Newest matching rule wins so tests can override earlier setup
    fn respond(&self, sql: &str) -> Option<Response> {
        let mut rules = self.rules.lock();
        let rule = rules.iter_mut().rev().find(|r| sql.contains(&r.pattern))?;
        match &mut rule.response {
            Response::Outputs(seq) if seq.len() > 1 => {
                let next = seq.pop_front().unwrap_or_default();
                Some(Response::Outputs(VecDeque::from([next])))
            }
            other => Some(other.clone()),
        }
    }

    fn record(&self, context: &str, purpose: SessionPurpose, stmt: &Statement) {
        self.log.lock().push(ExecutedStatement {
            context: context.to_string(),
            purpose,
            sql: stmt.sql.clone(),
            inputs: stmt.inputs().cloned().collect(),
        });
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Scripted executor with one or more contexts
#[derive(Clone)]
pub struct MockExecutor {
    state: Arc<MockState>,
    contexts: Arc<Vec<Arc<MockContext>>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    /// Executor with a single context named "Main"
    pub fn new() -> Self {
        Self::with_contexts(&["Main"])
    }

    /// Executor with the given context names; the first one is the default
    pub fn with_contexts(names: &[&str]) -> Self {
        let state = Arc::new(MockState::default());
        state.statement_cancel_supported.store(true, Ordering::SeqCst);
        let contexts = names
            .iter()
            .map(|name| {
                Arc::new(MockContext {
                    name: name.to_string(),
                    state: state.clone(),
                })
            })
            .collect();
        Self {
            state,
            contexts: Arc::new(contexts),
        }
    }

    /// Return `rows` for statements containing `pattern`
    pub fn on_query(&self, pattern: &str, rows: Vec<Row>) -> &Self {
        self.push_rule(pattern, Response::Rows(rows))
    }

    /// Fail statements containing `pattern`
    pub fn on_fail(&self, pattern: &str, failure: SqlFailure) -> &Self {
        self.push_rule(pattern, Response::Fail(failure))
    }

    /// Return output parameters for calls containing `pattern`
    pub fn on_call(&self, pattern: &str, outputs: Vec<SqlValue>) -> &Self {
        self.on_call_sequence(pattern, vec![outputs])
    }

    /// Return successive output parameter sets; the last one repeats
    pub fn on_call_sequence(&self, pattern: &str, outputs: Vec<Vec<SqlValue>>) -> &Self {
        self.push_rule(pattern, Response::Outputs(outputs.into()))
    }

    /// Make every `open_session` fail
    pub fn fail_sessions(&self, failure: SqlFailure) -> &Self {
        *self.state.session_failure.lock() = Some(failure);
        self
    }

    /// Sleep before answering each statement
    pub fn with_delay(&self, delay: Duration) -> &Self {
        *self.state.delay.lock() = Some(delay);
        self
    }

    pub fn set_statement_cancel_supported(&self, supported: bool) -> &Self {
        self.state
            .statement_cancel_supported
            .store(supported, Ordering::SeqCst);
        self
    }

    pub fn set_server_version(&self, major: u32, minor: u32) -> &Self {
        *self.state.server_version.lock() = Some((major, minor));
        self
    }

    fn push_rule(&self, pattern: &str, response: Response) -> &Self {
        self.state.rules.lock().push(Rule {
            pattern: pattern.to_string(),
            response,
        });
        self
    }

    /// Every statement executed so far, in order
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.state.log.lock().clone()
    }

    /// Number of executed statements whose SQL contains `pattern`
    pub fn query_count(&self, pattern: &str) -> usize {
        self.state
            .log
            .lock()
            .iter()
            .filter(|s| s.sql.contains(pattern))
            .count()
    }

    pub fn clear_log(&self) {
        self.state.log.lock().clear();
    }

    /// Sessions opened and not yet dropped
    pub fn open_sessions(&self) -> usize {
        self.state.open_sessions.load(Ordering::SeqCst)
    }

    /// Sessions opened over the executor's lifetime
    pub fn sessions_opened(&self) -> usize {
        self.state.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn statement_cancels(&self) -> usize {
        self.state.statement_cancels.load(Ordering::SeqCst)
    }

    pub fn connection_cancels(&self) -> usize {
        self.state.connection_cancels.load(Ordering::SeqCst)
    }

    /// Context by name, for tests that open sessions directly
    pub fn context(&self, name: &str) -> Option<Arc<dyn ExecutionContext>> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.clone() as Arc<dyn ExecutionContext>)
    }
}

impl QueryExecutor for MockExecutor {
    fn default_context(&self) -> Arc<dyn ExecutionContext> {
        self.contexts[0].clone()
    }

    fn all_contexts(&self) -> Vec<Arc<dyn ExecutionContext>> {
        self.contexts
            .iter()
            .map(|c| c.clone() as Arc<dyn ExecutionContext>)
            .collect()
    }

    fn server_version(&self) -> Option<(u32, u32)> {
        *self.state.server_version.lock()
    }
}

/// Context handed out by [`MockExecutor`]
#[derive(Debug)]
pub struct MockContext {
    name: String,
    state: Arc<MockState>,
}

#[async_trait]
impl ExecutionContext for MockContext {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open_session(
        &self,
        purpose: SessionPurpose,
        _task: &str,
    ) -> Result<Box<dyn Session>, SqlFailure> {
        if let Some(failure) = self.state.session_failure.lock().clone() {
            return Err(failure);
        }
        self.state.open_sessions.fetch_add(1, Ordering::SeqCst);
        self.state.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            context: self.name.clone(),
            purpose,
            state: self.state.clone(),
        }))
    }

    fn supports_statement_cancel(&self) -> bool {
        self.state.statement_cancel_supported.load(Ordering::SeqCst)
    }

    async fn cancel_statement(&self) -> Result<(), SqlFailure> {
        self.state.statement_cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn cancel_connection(&self) -> Result<(), SqlFailure> {
        self.state.connection_cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Session handed out by [`MockContext`]
pub struct MockSession {
    context: String,
    purpose: SessionPurpose,
    state: Arc<MockState>,
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.state.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Session for MockSession {
    async fn query(&mut self, stmt: &Statement) -> Result<Vec<Row>, SqlFailure> {
        self.state.record(&self.context, self.purpose, stmt);
        self.state.pause().await;
        match self.state.respond(&stmt.sql) {
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::Fail(failure)) => Err(failure),
            Some(Response::Outputs(_)) | None => Ok(Vec::new()),
        }
    }

    async fn execute(&mut self, stmt: &Statement) -> Result<u64, SqlFailure> {
        self.state.record(&self.context, self.purpose, stmt);
        self.state.pause().await;
        match self.state.respond(&stmt.sql) {
            Some(Response::Fail(failure)) => Err(failure),
            Some(Response::Rows(rows)) => Ok(rows.len() as u64),
            Some(Response::Outputs(_)) | None => Ok(0),
        }
    }

    async fn call(&mut self, stmt: &Statement) -> Result<Vec<SqlValue>, SqlFailure> {
        self.state.record(&self.context, self.purpose, stmt);
        self.state.pause().await;
        match self.state.respond(&stmt.sql) {
            Some(Response::Outputs(mut seq)) => Ok(seq.pop_front().unwrap_or_default()),
            Some(Response::Fail(failure)) => Err(failure),
            Some(Response::Rows(_)) | None => Ok(vec![SqlValue::Null; stmt.output_count()]),
        }
    }
}
