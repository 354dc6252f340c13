// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Data types
//!
//! Built-in types are registered from a fixed table without querying; user
//! defined types are read per schema from `ALL_TYPES`.

use serde::{Deserialize, Serialize};
use xugu_host::Row;

use super::required_string;
use crate::cache::CatalogObject;
use crate::error::CatalogResult;
use crate::sql::{TYPE_FQ_XML, TYPE_NAME_XML};

/// How values of a type are handled by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    Boolean,
    Numeric,
    String,
    Datetime,
    Binary,
    Content,
    Rowid,
    Object,
}

/// Description of a built-in type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDesc {
    pub kind: DataKind,
    /// Maximum precision (digits or length), when bounded
    pub precision: Option<u32>,
}

const fn desc(kind: DataKind, precision: Option<u32>) -> TypeDesc {
    TypeDesc { kind, precision }
}

/// Types the server always provides
pub const PREDEFINED_TYPES: &[(&str, TypeDesc)] = &[
    ("BFILE", desc(DataKind::Content, None)),
    ("BIGINT", desc(DataKind::Numeric, Some(19))),
    ("BINARY", desc(DataKind::Binary, Some(2000))),
    ("BINARY_DOUBLE", desc(DataKind::Numeric, Some(63))),
    ("BINARY_FLOAT", desc(DataKind::Numeric, Some(63))),
    ("BLOB", desc(DataKind::Content, None)),
    ("BOOLEAN", desc(DataKind::Boolean, None)),
    ("CHAR", desc(DataKind::String, Some(2000))),
    ("CLOB", desc(DataKind::Content, None)),
    ("DATE", desc(DataKind::Datetime, None)),
    ("DATETIME", desc(DataKind::Datetime, None)),
    ("DOUBLE", desc(DataKind::Numeric, Some(63))),
    ("FLOAT", desc(DataKind::Numeric, Some(63))),
    ("GUID", desc(DataKind::String, Some(32))),
    ("INTEGER", desc(DataKind::Numeric, Some(10))),
    ("INTERVAL DAY TO SECOND", desc(DataKind::String, None)),
    ("INTERVAL YEAR TO MONTH", desc(DataKind::String, None)),
    ("LONG", desc(DataKind::String, None)),
    ("LONG RAW", desc(DataKind::Binary, None)),
    ("NCHAR", desc(DataKind::String, Some(2000))),
    ("NCLOB", desc(DataKind::Content, None)),
    ("NUMBER", desc(DataKind::Numeric, Some(38))),
    ("NUMERIC", desc(DataKind::Numeric, Some(38))),
    ("NVARCHAR2", desc(DataKind::String, Some(4000))),
    ("RAW", desc(DataKind::Binary, Some(2000))),
    ("ROWID", desc(DataKind::Rowid, None)),
    ("SMALLINT", desc(DataKind::Numeric, Some(5))),
    ("TIME", desc(DataKind::Datetime, None)),
    ("TIMESTAMP", desc(DataKind::Datetime, None)),
    ("TIMESTAMP WITH LOCAL TIME ZONE", desc(DataKind::Datetime, None)),
    ("TIMESTAMP WITH TIME ZONE", desc(DataKind::Datetime, None)),
    ("TINYINT", desc(DataKind::Numeric, Some(3))),
    ("UROWID", desc(DataKind::Rowid, None)),
    ("VARCHAR", desc(DataKind::String, Some(4000))),
    ("VARCHAR2", desc(DataKind::String, Some(4000))),
    ("XMLTYPE", desc(DataKind::Content, None)),
];

/// Built-in type description by name, ignoring case
pub fn predefined_type(name: &str) -> Option<&'static TypeDesc> {
    PREDEFINED_TYPES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, d)| d)
}

/// Data kind of a type name; XML is always content
pub fn data_kind_of(type_name: &str) -> Option<DataKind> {
    if type_name == TYPE_NAME_XML || type_name == TYPE_FQ_XML {
        return Some(DataKind::Content);
    }
    predefined_type(type_name).map(|d| d.kind)
}

/// A built-in or user-defined type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataType {
    pub name: String,
    /// Owning schema; `None` for system types
    pub owner: Option<String>,
    pub type_code: Option<String>,
    pub predefined: bool,
    pub kind: DataKind,
    pub precision: Option<u32>,
}

impl DataType {
    /// A built-in type from the predefined table
    pub fn predefined(name: &str, desc: &TypeDesc) -> Self {
        Self {
            name: name.to_string(),
            owner: None,
            type_code: None,
            predefined: true,
            kind: desc.kind,
            precision: desc.precision,
        }
    }

    /// Every built-in type
    pub fn all_predefined() -> Vec<Self> {
        PREDEFINED_TYPES
            .iter()
            .map(|(name, desc)| Self::predefined(name, desc))
            .collect()
    }

    /// An `ALL_TYPES` row
    pub fn from_row(row: &Row) -> CatalogResult<Self> {
        let name = required_string(row, "TYPE_NAME", "data type")?;
        let builtin = predefined_type(&name);
        Ok(Self {
            kind: builtin.map(|d| d.kind).unwrap_or(DataKind::Object),
            precision: builtin.and_then(|d| d.precision),
            owner: row.string("OWNER"),
            type_code: row.string("TYPECODE"),
            predefined: false,
            name,
        })
    }

    /// `OWNER.NAME` for user types, plain name otherwise
    pub fn full_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.name),
            None => self.name.clone(),
        }
    }
}

impl CatalogObject for DataType {
    fn name(&self) -> &str {
        &self.name
    }
}
