// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Server output
//!
//! Captures what PL/SQL blocks print through `DBMS_OUTPUT`. The buffer is
//! enabled per context and drained after a statement completes.

use std::io::Write;
use std::sync::Arc;
use tracing::debug;
use xugu_host::{ExecutionContext, PreferenceStore, SessionPurpose, SqlType, Statement};

use crate::error::{CatalogError, CatalogResult};
use crate::preferences::PREF_DBMS_OUTPUT;
use crate::sql::MAXIMUM_DBMS_OUTPUT_SIZE;

const GET_LINE_CALL: &str = "{CALL DBMS_OUTPUT.GET_LINE(?, ?)}";

/// Reads the `DBMS_OUTPUT` buffer of a context
#[derive(Clone)]
pub struct ServerOutputReader {
    preferences: Arc<dyn PreferenceStore>,
}

impl ServerOutputReader {
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { preferences }
    }

    /// Whether output capture is switched on for this data source
    pub fn is_enabled(&self) -> bool {
        self.preferences.get_bool(PREF_DBMS_OUTPUT)
    }

    /// Output is only available after a statement finishes
    pub fn is_async_read_supported(&self) -> bool {
        false
    }

    /// Enable or disable the output buffer on `context`
    pub async fn set_enabled(&self, context: &dyn ExecutionContext, enable: bool) -> CatalogResult<()> {
        let (sql, task) = if enable {
            (
                format!("BEGIN DBMS_OUTPUT.ENABLE({}); END;", MAXIMUM_DBMS_OUTPUT_SIZE),
                "Enable DBMS output",
            )
        } else {
            ("BEGIN DBMS_OUTPUT.DISABLE; END;".to_string(), "Disable DBMS output")
        };

        let mut session = context
            .open_session(SessionPurpose::Util, task)
            .await
            .map_err(|e| CatalogError::sql(task, e))?;
        session
            .execute(&Statement::new(sql))
            .await
            .map_err(|e| CatalogError::sql(task, e))?;
        debug!("{} on '{}'", task, context.name());
        Ok(())
    }

    /// Drain every pending line into `output`, one line per `\n`
    ///
    /// Stops at the first non-zero status. Lines written before a failure stay
    /// written.
    pub async fn drain(
        &self,
        context: &dyn ExecutionContext,
        output: &mut dyn Write,
    ) -> CatalogResult<Vec<String>> {
        let mut session = context
            .open_session(SessionPurpose::Util, "Read DBMS output")
            .await
            .map_err(|e| CatalogError::sql("Failed to read DBMS output", e))?;
        let stmt = Statement::new(GET_LINE_CALL)
            .out(SqlType::Varchar)
            .out(SqlType::Integer);

        let mut lines = Vec::new();
        loop {
            let outputs = session
                .call(&stmt)
                .await
                .map_err(|e| CatalogError::sql("Failed to read DBMS output", e))?;
            // A missing status counts as "no more lines"
            let status = outputs.get(1).and_then(|v| v.as_i64()).unwrap_or(1);
            if status != 0 {
                break;
            }

            let line = outputs.first().and_then(|v| v.as_string()).unwrap_or_default();
            output
                .write_all(line.as_bytes())
                .and_then(|_| output.write_all(b"\n"))
                .map_err(|e| CatalogError::OutputFailed(e.to_string()))?;
            lines.push(line);
        }

        debug!("Read {} lines of DBMS output", lines.len());
        Ok(lines)
    }
}
