// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{DataType, Profile, Role, Schema, Tablespace, User};
use crate::cache::CatalogObject;

/// Kinds of entity the catalog caches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Schema,
    DataType,
    Tablespace,
    User,
    Role,
    Profile,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Schema => "schema",
            EntityKind::DataType => "data type",
            EntityKind::Tablespace => "tablespace",
            EntityKind::User => "user",
            EntityKind::Role => "role",
            EntityKind::Profile => "profile",
        };
        f.write_str(name)
    }
}

/// Any cached catalog entity; identity is `(kind, name)`
#[derive(Debug, Clone)]
pub enum CatalogEntity {
    Schema(Arc<Schema>),
    DataType(Arc<DataType>),
    Tablespace(Arc<Tablespace>),
    User(Arc<User>),
    Role(Arc<Role>),
    Profile(Arc<Profile>),
}

impl CatalogEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            CatalogEntity::Schema(_) => EntityKind::Schema,
            CatalogEntity::DataType(_) => EntityKind::DataType,
            CatalogEntity::Tablespace(_) => EntityKind::Tablespace,
            CatalogEntity::User(_) => EntityKind::User,
            CatalogEntity::Role(_) => EntityKind::Role,
            CatalogEntity::Profile(_) => EntityKind::Profile,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogEntity::Schema(s) => s.name(),
            CatalogEntity::DataType(t) => t.name(),
            CatalogEntity::Tablespace(t) => t.name(),
            CatalogEntity::User(u) => u.name(),
            CatalogEntity::Role(r) => r.name(),
            CatalogEntity::Profile(p) => p.name(),
        }
    }

    pub fn as_schema(&self) -> Option<&Arc<Schema>> {
        match self {
            CatalogEntity::Schema(schema) => Some(schema),
            _ => None,
        }
    }
}

impl From<Arc<Schema>> for CatalogEntity {
    fn from(schema: Arc<Schema>) -> Self {
        CatalogEntity::Schema(schema)
    }
}

impl From<Arc<User>> for CatalogEntity {
    fn from(user: Arc<User>) -> Self {
        CatalogEntity::User(user)
    }
}

impl From<Arc<Role>> for CatalogEntity {
    fn from(role: Arc<Role>) -> Self {
        CatalogEntity::Role(role)
    }
}
