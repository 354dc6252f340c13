// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Xugu SQL constants and session helpers

use xugu_host::{Session, SqlFailure, Statement};

/// Name of the schema that holds public synonyms and links
pub const USER_PUBLIC: &str = "PUBLIC";
/// Owner of the data dictionary views
pub const SCHEMA_SYS: &str = "SYS";

/// Error code reported when logging in with an expired password
pub const EC_PASSWORD_EXPIRED: i32 = 28001;
/// Error code reported for driver features the server does not implement
pub const EC_FEATURE_NOT_SUPPORTED: i32 = 17023;

/// Buffer size requested when enabling DBMS output
pub const MAXIMUM_DBMS_OUTPUT_SIZE: u32 = 1_000_000;
/// Longest string the server stores in a VARCHAR column
pub const MAX_STRING_LENGTH: u32 = 4000;

pub const TYPE_NAME_XML: &str = "XMLTYPE";
pub const TYPE_FQ_XML: &str = "SYS.XMLTYPE";

/// Separator between a schema and an object name
pub const STRUCT_SEPARATOR: char = '.';

/// DDL for a plan table; `${TABLE_NAME}` is substituted
pub const PLAN_TABLE_DEFINITION: &str = "CREATE GLOBAL TEMPORARY TABLE ${TABLE_NAME} (
    STATEMENT_ID VARCHAR2(30),
    PLAN_ID NUMBER,
    TIMESTAMP DATE,
    REMARKS VARCHAR2(4000),
    OPERATION VARCHAR2(30),
    OPTIONS VARCHAR2(255),
    OBJECT_NODE VARCHAR2(128),
    OBJECT_OWNER VARCHAR2(30),
    OBJECT_NAME VARCHAR2(30),
    OBJECT_ALIAS VARCHAR2(65),
    OBJECT_INSTANCE NUMERIC,
    OBJECT_TYPE VARCHAR2(30),
    OPTIMIZER VARCHAR2(255),
    SEARCH_COLUMNS NUMBER,
    ID NUMERIC,
    PARENT_ID NUMERIC,
    DEPTH NUMERIC,
    POSITION NUMERIC,
    COST NUMERIC,
    CARDINALITY NUMERIC,
    BYTES NUMERIC,
    OTHER_TAG VARCHAR2(255),
    PARTITION_START VARCHAR2(255),
    PARTITION_STOP VARCHAR2(255),
    PARTITION_ID NUMERIC,
    OTHER LONG,
    DISTRIBUTION VARCHAR2(30),
    CPU_COST NUMERIC,
    IO_COST NUMERIC,
    TEMP_SPACE NUMERIC,
    ACCESS_PREDICATES VARCHAR2(4000),
    FILTER_PREDICATES VARCHAR2(4000),
    PROJECTION VARCHAR2(4000),
    TIME NUMERIC,
    QBLOCK_NAME VARCHAR2(30)
) ON COMMIT PRESERVE ROWS";

/// Quote an identifier unless it is a plain upper-case name
pub fn quote_identifier(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '_' | '$' | '#'));
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Escape a value for use inside a single-quoted literal
pub fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// `<schema>.<object>` with both parts quoted as needed
pub fn qualified_name(schema: &str, object: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(object))
}

/// Read the session's current schema; an empty name reads as `None`
pub async fn current_schema(session: &mut dyn Session) -> Result<Option<String>, SqlFailure> {
    let schema = session
        .query_string(&Statement::new(
            "SELECT SYS_CONTEXT('USERENV', 'CURRENT_SCHEMA') FROM DUAL",
        ))
        .await?;
    Ok(schema.filter(|s| !s.is_empty()))
}

/// Switch the session's current schema
pub async fn set_current_schema(session: &mut dyn Session, schema: &str) -> Result<(), SqlFailure> {
    session
        .execute(&Statement::new(format!(
            "ALTER SESSION SET CURRENT_SCHEMA={}",
            quote_identifier(schema)
        )))
        .await?;
    Ok(())
}
