// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Statements
//!
//! SQL text plus positional parameters. Output parameters are used by
//! anonymous blocks and procedure calls executed through [`Session::call`](crate::Session::call).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::SqlValue;

/// Declared type of an output parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Varchar,
    Integer,
}

/// A positional statement parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Param {
    /// Input value bound to the placeholder
    In(SqlValue),
    /// Output parameter registered with its type
    Out(SqlType),
}

/// SQL text with positional `?` parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Param>,
    /// Row fetch size hint for the driver
    pub fetch_size: Option<u32>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            fetch_size: None,
        }
    }

    /// Builder method: bind the next input parameter
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(Param::In(value.into()));
        self
    }

    /// Builder method: register the next output parameter
    pub fn out(mut self, sql_type: SqlType) -> Self {
        self.params.push(Param::Out(sql_type));
        self
    }

    /// Builder method: set the fetch size hint
    pub fn with_fetch_size(mut self, rows: u32) -> Self {
        self.fetch_size = Some(rows);
        self
    }

    /// Input values in placeholder order
    pub fn inputs(&self) -> impl Iterator<Item = &SqlValue> {
        self.params.iter().filter_map(|p| match p {
            Param::In(v) => Some(v),
            Param::Out(_) => None,
        })
    }

    /// Number of registered output parameters
    pub fn output_count(&self) -> usize {
        self.params
            .iter()
            .filter(|p| matches!(p, Param::Out(_)))
            .count()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Statement::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Statement::new(sql)
    }
}
