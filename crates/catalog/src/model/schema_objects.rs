// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Objects listed per schema: synonyms, database links and recycle bin entries.

use serde::{Deserialize, Serialize};
use xugu_host::Row;

use super::required_string;
use crate::cache::CatalogObject;
use crate::error::CatalogResult;

/// Alternate name for an object, possibly across a database link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synonym {
    pub name: String,
    pub owner: String,
    pub target_owner: Option<String>,
    pub target_name: Option<String>,
    pub db_link: Option<String>,
}

impl Synonym {
    pub fn from_row(owner: &str, row: &Row) -> CatalogResult<Self> {
        Ok(Self {
            name: required_string(row, "SYNONYM_NAME", "synonym")?,
            owner: owner.to_string(),
            target_owner: row.string("TABLE_OWNER"),
            target_name: row.string("TABLE_NAME"),
            db_link: row.string("DB_LINK"),
        })
    }

    /// `OWNER.NAME[@LINK]` of the object this synonym points at
    pub fn target(&self) -> Option<String> {
        let name = self.target_name.as_deref()?;
        let mut target = match &self.target_owner {
            Some(owner) => format!("{}.{}", owner, name),
            None => name.to_string(),
        };
        if let Some(link) = &self.db_link {
            target.push('@');
            target.push_str(link);
        }
        Some(target)
    }
}

impl CatalogObject for Synonym {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbLink {
    pub name: String,
    pub user_name: Option<String>,
    pub host: Option<String>,
    pub created: Option<String>,
}

impl DbLink {
    pub fn from_row(row: &Row) -> CatalogResult<Self> {
        Ok(Self {
            name: required_string(row, "DB_LINK", "database link")?,
            user_name: row.string("USERNAME"),
            host: row.string("HOST"),
            created: row.string("CREATED"),
        })
    }
}

impl CatalogObject for DbLink {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A dropped object still held in the recycle bin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecycledObject {
    /// System-generated bin name
    pub name: String,
    pub original_name: Option<String>,
    pub operation: Option<String>,
    pub object_type: Option<String>,
    pub drop_time: Option<String>,
}

impl RecycledObject {
    pub fn from_row(row: &Row) -> CatalogResult<Self> {
        Ok(Self {
            name: required_string(row, "OBJECT_NAME", "recycled object")?,
            original_name: row.string("ORIGINAL_NAME"),
            operation: row.string("OPERATION"),
            object_type: row.string("TYPE"),
            drop_time: row.string("DROPTIME"),
        })
    }
}

impl CatalogObject for RecycledObject {
    fn name(&self) -> &str {
        &self.name
    }
}
