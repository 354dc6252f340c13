// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Catalog view rows for testing
//!
//! Each builder produces a row shaped like the catalog view the corresponding
//! cache reads from.

use xugu_host::{Row, SqlValue};

/// Row builders for catalog views
pub struct RowFixtures;

impl RowFixtures {
    // ===== Users and schemas =====

    /// `ALL_USERS` row as read by the schema cache
    pub fn schema(name: &str, id: i64) -> Row {
        Row::from_pairs([
            ("USERNAME", SqlValue::from(name)),
            ("USER_ID", SqlValue::from(id)),
            ("CREATED", SqlValue::from("2024-01-01 00:00:00")),
        ])
    }

    /// Schema rows with ids assigned in order
    pub fn schemas(names: &[&str]) -> Vec<Row> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Self::schema(name, i as i64 + 10))
            .collect()
    }

    /// `DBA_USERS` row
    pub fn user(name: &str, id: i64, status: &str) -> Row {
        Row::from_pairs([
            ("USERNAME", SqlValue::from(name)),
            ("USER_ID", SqlValue::from(id)),
            ("ACCOUNT_STATUS", SqlValue::from(status)),
            ("DEFAULT_TABLESPACE", SqlValue::from("USERS")),
            ("TEMPORARY_TABLESPACE", SqlValue::from("TEMP")),
            ("CREATED", SqlValue::from("2024-01-01 00:00:00")),
            ("PROFILE", SqlValue::from("DEFAULT")),
        ])
    }

    /// `DBA_ROLES` row
    pub fn role(name: &str) -> Row {
        Row::from_pairs([
            ("ROLE", SqlValue::from(name)),
            ("PASSWORD_REQUIRED", SqlValue::from("NO")),
            ("AUTHENTICATION_TYPE", SqlValue::from("NONE")),
        ])
    }

    // ===== Storage =====

    /// `DBA_TABLESPACES` row
    pub fn tablespace(name: &str, block_size: i64) -> Row {
        Row::from_pairs([
            ("TABLESPACE_NAME", SqlValue::from(name)),
            ("BLOCK_SIZE", SqlValue::from(block_size)),
            ("STATUS", SqlValue::from("ONLINE")),
            ("CONTENTS", SqlValue::from("PERMANENT")),
            ("LOGGING", SqlValue::from("LOGGING")),
        ])
    }

    // ===== Profiles =====

    /// `DBA_PROFILES` distinct profile row
    pub fn profile(name: &str) -> Row {
        Row::from_pairs([("PROFILE", SqlValue::from(name))])
    }

    /// `DBA_PROFILES` resource limit row
    pub fn profile_resource(profile: &str, resource: &str, kind: &str, limit: &str) -> Row {
        Row::from_pairs([
            ("PROFILE", SqlValue::from(profile)),
            ("RESOURCE_NAME", SqlValue::from(resource)),
            ("RESOURCE_TYPE", SqlValue::from(kind)),
            ("LIMIT", SqlValue::from(limit)),
        ])
    }

    // ===== Schema contents =====

    /// `ALL_TYPES` row
    pub fn data_type(owner: Option<&str>, name: &str, type_code: &str) -> Row {
        Row::from_pairs([
            ("TYPE_NAME", SqlValue::from(name)),
            ("OWNER", SqlValue::from(owner)),
            ("TYPECODE", SqlValue::from(type_code)),
        ])
    }

    /// `ALL_SYNONYMS` row
    pub fn synonym(name: &str, table_owner: &str, table_name: &str) -> Row {
        Row::from_pairs([
            ("SYNONYM_NAME", SqlValue::from(name)),
            ("TABLE_OWNER", SqlValue::from(table_owner)),
            ("TABLE_NAME", SqlValue::from(table_name)),
            ("DB_LINK", SqlValue::Null),
        ])
    }

    /// `ALL_DB_LINKS` row
    pub fn db_link(name: &str, user: &str, host: &str) -> Row {
        Row::from_pairs([
            ("DB_LINK", SqlValue::from(name)),
            ("USERNAME", SqlValue::from(user)),
            ("HOST", SqlValue::from(host)),
            ("CREATED", SqlValue::from("2024-01-01 00:00:00")),
        ])
    }

    /// `RECYCLEBIN` row
    pub fn recycled_object(name: &str, original: &str, kind: &str) -> Row {
        Row::from_pairs([
            ("OBJECT_NAME", SqlValue::from(name)),
            ("ORIGINAL_NAME", SqlValue::from(original)),
            ("OPERATION", SqlValue::from("DROP")),
            ("TYPE", SqlValue::from(kind)),
            ("DROPTIME", SqlValue::from("2024-02-01:10:00:00")),
        ])
    }

    // ===== Session probes =====

    /// Single-column, single-row result
    pub fn scalar(column: &str, value: impl Into<SqlValue>) -> Vec<Row> {
        vec![Row::from_pairs([(column.to_string(), value.into())])]
    }
}
