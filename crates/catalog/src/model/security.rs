// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Users, roles, and the grantee union of the two.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use xugu_host::Row;

use super::required_string;
use crate::cache::CatalogObject;
use crate::error::CatalogResult;

/// A database account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub account_status: Option<String>,
    pub default_tablespace: Option<String>,
    pub temporary_tablespace: Option<String>,
    pub created: Option<String>,
    pub profile: Option<String>,
}

impl User {
    pub fn from_row(row: &Row) -> CatalogResult<Self> {
        Ok(Self {
            id: row.i64("USER_ID").unwrap_or_default(),
            name: required_string(row, "USERNAME", "user")?,
            account_status: row.string("ACCOUNT_STATUS"),
            default_tablespace: row.string("DEFAULT_TABLESPACE"),
            temporary_tablespace: row.string("TEMPORARY_TABLESPACE"),
            created: row.string("CREATED"),
            profile: row.string("PROFILE"),
        })
    }

    pub fn is_locked(&self) -> bool {
        self.account_status
            .as_deref()
            .is_some_and(|status| status.contains("LOCKED"))
    }
}

impl CatalogObject for User {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub password_required: bool,
    pub authentication_type: Option<String>,
}

impl Role {
    pub fn from_row(row: &Row) -> CatalogResult<Self> {
        Ok(Self {
            name: required_string(row, "ROLE", "role")?,
            password_required: row.string("PASSWORD_REQUIRED").as_deref() == Some("YES"),
            authentication_type: row.string("AUTHENTICATION_TYPE"),
        })
    }
}

impl CatalogObject for Role {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Anything privileges can be granted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grantee {
    User(Arc<User>),
    Role(Arc<Role>),
}

impl Grantee {
    pub fn name(&self) -> &str {
        match self {
            Grantee::User(user) => &user.name,
            Grantee::Role(role) => &role.name,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Grantee::User(_))
    }
}
