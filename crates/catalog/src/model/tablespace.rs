// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use serde::{Deserialize, Serialize};
use xugu_host::Row;

use super::required_string;
use crate::cache::CatalogObject;
use crate::error::CatalogResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tablespace {
    pub name: String,
    pub block_size: Option<i64>,
    pub status: Option<String>,
    pub contents: Option<String>,
    pub logging: Option<String>,
}

impl Tablespace {
    pub fn from_row(row: &Row) -> CatalogResult<Self> {
        Ok(Self {
            name: required_string(row, "TABLESPACE_NAME", "tablespace")?,
            block_size: row.i64("BLOCK_SIZE"),
            status: row.string("STATUS"),
            contents: row.string("CONTENTS"),
            logging: row.string("LOGGING"),
        })
    }

    pub fn is_online(&self) -> bool {
        self.status.as_deref() == Some("ONLINE")
    }
}

impl CatalogObject for Tablespace {
    fn name(&self) -> &str {
        &self.name
    }
}
