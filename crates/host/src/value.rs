// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Result values
//!
//! Rows returned by a [`Session`](crate::Session) and the scalar values they hold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A single scalar value read from or bound to a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Double(f64),
    Text(String),
    Boolean(bool),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Textual rendering, `None` for NULL
    pub fn as_string(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Integer(v) => Some(v.to_string()),
            SqlValue::Double(v) => Some(v.to_string()),
            SqlValue::Text(v) => Some(v.clone()),
            SqlValue::Boolean(v) => Some(if *v { "YES" } else { "NO" }.to_string()),
        }
    }

    /// Integer rendering; text values are parsed, doubles truncated
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            SqlValue::Double(v) => Some(*v as i64),
            SqlValue::Text(v) => v.trim().parse().ok(),
            SqlValue::Boolean(v) => Some(i64::from(*v)),
            SqlValue::Null => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_string() {
            Some(s) => f.write_str(&s),
            None => f.write_str("NULL"),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Boolean(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One result row
///
/// Column labels are shared between all rows of a result. Lookups by label are
/// case-insensitive, matching how catalog views report their columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Create a row over shared column labels
    ///
    /// Missing trailing values read as NULL.
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Build a standalone row from `(label, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        let (columns, values): (Vec<String>, Vec<SqlValue>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column label, ignoring case
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Raw value of a column, `None` when the column is absent
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        let idx = self.column_index(column)?;
        Some(self.values.get(idx).unwrap_or(&SqlValue::Null))
    }

    /// Value at a position, `None` when out of range
    pub fn value_at(&self, idx: usize) -> Option<&SqlValue> {
        self.values.get(idx)
    }

    pub fn string(&self, column: &str) -> Option<String> {
        self.get(column).and_then(SqlValue::as_string)
    }

    pub fn string_at(&self, idx: usize) -> Option<String> {
        self.value_at(idx).and_then(SqlValue::as_string)
    }

    pub fn i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(SqlValue::as_i64)
    }
}
