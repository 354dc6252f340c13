// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Profiles and their resource limits.

use serde::{Deserialize, Serialize};
use xugu_host::Row;

use super::required_string;
use crate::cache::{CatalogObject, ChildList, StructObject};
use crate::error::CatalogResult;

/// A named set of resource limits
#[derive(Debug, Default)]
pub struct Profile {
    pub name: String,
    resources: ChildList<ProfileResource>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: ChildList::default(),
        }
    }

    pub fn from_row(row: &Row) -> CatalogResult<Self> {
        Ok(Self::new(required_string(row, "PROFILE", "profile")?))
    }
}

impl CatalogObject for Profile {
    fn name(&self) -> &str {
        &self.name
    }
}

impl StructObject for Profile {
    type Child = ProfileResource;

    fn child_list(&self) -> &ChildList<ProfileResource> {
        &self.resources
    }
}

/// One resource limit of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResource {
    pub name: String,
    /// `KERNEL` or `PASSWORD`
    pub resource_type: Option<String>,
    pub limit: Option<String>,
}

impl ProfileResource {
    pub fn from_row(row: &Row) -> CatalogResult<Self> {
        Ok(Self {
            name: required_string(row, "RESOURCE_NAME", "profile resource")?,
            resource_type: row.string("RESOURCE_TYPE"),
            limit: row.string("LIMIT"),
        })
    }
}

impl CatalogObject for ProfileResource {
    fn name(&self) -> &str {
        &self.name
    }
}
