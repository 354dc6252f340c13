// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error positions
//!
//! Recovers where in the query text a failed statement went wrong. Strategies
//! are tried in order and the first one that yields anything wins:
//!
//! 1. Patterns in the error message (`line L, column C`, `at line L`,
//!    `at position: P`), converted from 1-based to 0-based.
//! 2. A position reported by the driver error itself, used as-is.
//! 3. For syntax errors (SQLSTATE `42000`), a server-side re-parse of the query
//!    that reports the last error position.
//!
//! Finding nothing is not an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;
use xugu_host::{ExecutionContext, SessionPurpose, SqlFailure, SqlType, Statement};

use crate::error::CatalogError;

static LINE_COLUMN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+\s+line ([0-9]+), column ([0-9]+)").expect("valid pattern"));
static AT_LINE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+\s+at line ([0-9]+)").expect("valid pattern"));
static AT_POSITION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+\s+at position: ([0-9]+)").expect("valid pattern"));

const PARSE_POSITION_BLOCK: &str = "declare
  l_cursor integer default dbms_sql.open_cursor;
begin
  begin
    dbms_sql.parse(l_cursor, ?, dbms_sql.native);
  exception
    when others then ? := dbms_sql.last_error_position;
  end;
  dbms_sql.close_cursor(l_cursor);
end;";

/// A location in the query text; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorPosition {
    /// 0-based line
    pub line: Option<u32>,
    /// 0-based column within `line`
    pub column: Option<u32>,
    /// Offset from the start of the query
    pub position: Option<u32>,
    /// The text the position was read from
    pub info: Option<String>,
}

fn zero_based(text: &str) -> Option<u32> {
    text.parse::<u32>().ok().map(|n| n.saturating_sub(1))
}

/// Positions named in an error message
pub fn positions_from_message(message: &str) -> Vec<ErrorPosition> {
    let positions: Vec<ErrorPosition> = LINE_COLUMN_PATTERN
        .captures_iter(message)
        .map(|caps| ErrorPosition {
            line: zero_based(&caps[1]),
            column: zero_based(&caps[2]),
            info: Some(caps[1].to_string()),
            ..Default::default()
        })
        .collect();
    if !positions.is_empty() {
        return positions;
    }

    let positions: Vec<ErrorPosition> = AT_LINE_PATTERN
        .captures_iter(message)
        .map(|caps| ErrorPosition {
            line: zero_based(&caps[1]),
            info: Some(caps[1].to_string()),
            ..Default::default()
        })
        .collect();
    if !positions.is_empty() {
        return positions;
    }

    AT_POSITION_PATTERN
        .captures_iter(message)
        .map(|caps| ErrorPosition {
            position: zero_based(&caps[1]),
            info: Some(caps[1].to_string()),
            ..Default::default()
        })
        .collect()
}

/// Locates errors in query text
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorAssistant;

impl ErrorAssistant {
    /// Positions for a catalog-level error
    pub async fn error_position(
        &self,
        context: &dyn ExecutionContext,
        query: &str,
        error: &CatalogError,
    ) -> Vec<ErrorPosition> {
        match error.sql_failure() {
            Some(failure) => self.failure_position(context, query, failure).await,
            None => positions_from_message(&error.to_string()),
        }
    }

    /// Positions for a raw SQL failure
    pub async fn failure_position(
        &self,
        context: &dyn ExecutionContext,
        query: &str,
        failure: &SqlFailure,
    ) -> Vec<ErrorPosition> {
        if !failure.message.is_empty() {
            let positions = positions_from_message(&failure.message);
            if !positions.is_empty() {
                return positions;
            }
        }

        let reported = failure
            .cause
            .as_ref()
            .and_then(|cause| cause.error_position)
            .and_then(|pos| u32::try_from(pos).ok());
        if let Some(position) = reported {
            return vec![ErrorPosition {
                position: Some(position),
                ..Default::default()
            }];
        }

        if failure.is_syntax_error() {
            if let Some(position) = parse_error_position(context, query).await {
                return vec![ErrorPosition {
                    position: Some(position),
                    ..Default::default()
                }];
            }
        }

        Vec::new()
    }
}

/// Ask the server to re-parse `query` and report where parsing failed
async fn parse_error_position(context: &dyn ExecutionContext, query: &str) -> Option<u32> {
    let mut session = match context
        .open_session(SessionPurpose::Util, "Extract last error position")
        .await
    {
        Ok(session) => session,
        Err(e) => {
            debug!("Can't open session to extract parse error info: {}", e);
            return None;
        }
    };

    let stmt = Statement::new(PARSE_POSITION_BLOCK)
        .bind(query)
        .out(SqlType::Integer);
    match session.call(&stmt).await {
        Ok(outputs) => outputs
            .first()
            .and_then(|v| v.as_i64())
            .filter(|&pos| pos > 0)
            .and_then(|pos| u32::try_from(pos).ok()),
        Err(e) => {
            debug!("Can't extract parse error info: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column() {
        let positions = positions_from_message("ORA-06550: error in line 10, column 5");
        assert_eq!(
            positions,
            vec![ErrorPosition {
                line: Some(9),
                column: Some(4),
                position: None,
                info: Some("10".into()),
            }]
        );
    }

    #[test]
    fn test_at_line() {
        let positions = positions_from_message("PLS-00103: unexpected symbol at line 7");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].line, Some(6));
        assert_eq!(positions[0].column, None);
    }

    #[test]
    fn test_at_position() {
        let positions = positions_from_message("syntax error at position: 42");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].position, Some(41));
        assert_eq!(positions[0].line, None);
    }

    #[test]
    fn test_line_column_takes_precedence() {
        let positions = positions_from_message("failed at line 3 near x line 4, column 2");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].line, Some(3));
        assert_eq!(positions[0].column, Some(1));
    }

    #[test]
    fn test_one_position_per_line_of_message() {
        let positions = positions_from_message("first error at line 2\nsecond error at line 5");
        let lines: Vec<_> = positions.iter().map(|p| p.line).collect();
        assert_eq!(lines, vec![Some(1), Some(4)]);
    }

    #[test]
    fn test_no_match() {
        assert!(positions_from_message("ORA-00942: table or view does not exist").is_empty());
        assert!(positions_from_message("").is_empty());
    }
}
