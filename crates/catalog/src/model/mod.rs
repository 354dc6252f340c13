// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog entities
//!
//! The objects the catalog caches: schemas and what they contain, data types,
//! tablespaces, users, roles and profiles.

use xugu_host::Row;

use crate::error::{CatalogError, CatalogResult};

pub mod data_type;
pub mod entity;
pub mod profile;
pub mod schema;
pub mod schema_objects;
pub mod security;
pub mod tablespace;

pub use data_type::{DataKind, DataType, TypeDesc};
pub use entity::{CatalogEntity, EntityKind};
pub use profile::{Profile, ProfileResource};
pub use schema::Schema;
pub use schema_objects::{DbLink, RecycledObject, Synonym};
pub use security::{Grantee, Role, User};
pub use tablespace::Tablespace;

/// Read a column that must be present and non-null
pub(crate) fn required_string(row: &Row, column: &str, object: &str) -> CatalogResult<String> {
    row.string(column).ok_or_else(|| CatalogError::MissingColumn {
        object: object.to_string(),
        column: column.to_string(),
    })
}
