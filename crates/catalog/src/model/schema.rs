// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schemas
//!
//! A schema owns lazily loaded collections of its own: synonyms, database links,
//! recycle bin entries and user-defined data types. None of them are read until
//! asked for.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use xugu_host::{ExecutionContext, Row, Statement};

use super::data_type::DataType;
use super::required_string;
use super::schema_objects::{DbLink, RecycledObject, Synonym};
use crate::cache::{CacheOwner, CatalogObject, ObjectCache, ObjectLoader};
use crate::error::CatalogResult;
use crate::handle::CatalogHandle;
use crate::preferences::PREF_DBMS_READ_ALL_SYNONYMS;
use crate::sql::USER_PUBLIC;

/// A database schema (one per user that owns objects)
pub struct Schema {
    id: i64,
    name: String,
    created: Option<String>,
    handle: CatalogHandle,
    synonyms: ObjectCache<Schema, SynonymLoader>,
    db_links: ObjectCache<Schema, DbLinkLoader>,
    recycled: ObjectCache<Schema, RecycledObjectLoader>,
    data_types: ObjectCache<Schema, SchemaTypeLoader>,
}

impl Schema {
    pub fn new(handle: CatalogHandle, id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created: None,
            handle,
            synonyms: ObjectCache::new(SynonymLoader),
            db_links: ObjectCache::new(DbLinkLoader),
            recycled: ObjectCache::new(RecycledObjectLoader),
            data_types: ObjectCache::new(SchemaTypeLoader),
        }
    }

    /// An `ALL_USERS` / `DBA_USERS` row
    pub fn from_row(handle: CatalogHandle, row: &Row) -> CatalogResult<Self> {
        let name = required_string(row, "USERNAME", "schema")?;
        let mut schema = Self::new(handle, row.i64("USER_ID").unwrap_or_default(), name);
        schema.created = row.string("CREATED");
        Ok(schema)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn created(&self) -> Option<&str> {
        self.created.as_deref()
    }

    pub fn is_public(&self) -> bool {
        self.name == USER_PUBLIC
    }

    pub async fn synonyms(&self) -> CatalogResult<Vec<Arc<Synonym>>> {
        self.synonyms.get_all_objects(self).await
    }

    pub async fn get_synonym(&self, name: &str) -> CatalogResult<Option<Arc<Synonym>>> {
        self.synonyms.get_object(self, name).await
    }

    pub async fn database_links(&self) -> CatalogResult<Vec<Arc<DbLink>>> {
        self.db_links.get_all_objects(self).await
    }

    pub async fn get_database_link(&self, name: &str) -> CatalogResult<Option<Arc<DbLink>>> {
        self.db_links.get_object(self, name).await
    }

    pub async fn recycled_objects(&self) -> CatalogResult<Vec<Arc<RecycledObject>>> {
        self.recycled.get_all_objects(self).await
    }

    /// User-defined types owned by this schema
    pub async fn data_types(&self) -> CatalogResult<Vec<Arc<DataType>>> {
        self.data_types.get_all_objects(self).await
    }

    pub async fn get_data_type(&self, name: &str) -> CatalogResult<Option<Arc<DataType>>> {
        self.data_types.get_object(self, name).await
    }

    /// Forget everything read for this schema
    pub fn refresh(&self) {
        self.synonyms.clear_cache();
        self.db_links.clear_cache();
        self.recycled.clear_cache();
        self.data_types.clear_cache();
    }
}

impl CatalogObject for Schema {
    fn name(&self) -> &str {
        &self.name
    }
}

impl CacheOwner for Schema {
    fn meta_context(&self) -> Arc<dyn ExecutionContext> {
        self.handle.meta_context()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

struct SynonymLoader;

#[async_trait]
impl ObjectLoader<Schema> for SynonymLoader {
    type Object = Synonym;

    fn describe(&self) -> &'static str {
        "synonyms"
    }

    async fn prepare_statement(&self, schema: &Schema) -> CatalogResult<Statement> {
        let read_all = schema.handle.preferences().get_bool(PREF_DBMS_READ_ALL_SYNONYMS);
        let sql = if read_all {
            "SELECT * FROM ALL_SYNONYMS WHERE OWNER=? ORDER BY SYNONYM_NAME"
        } else {
            // Only synonyms whose target is an object of a kind we list
            "SELECT S.* FROM ALL_SYNONYMS S WHERE S.OWNER=? AND NOT EXISTS (\
             SELECT 1 FROM ALL_OBJECTS O WHERE O.OWNER=S.TABLE_OWNER AND O.OBJECT_NAME=S.TABLE_NAME \
             AND O.OBJECT_TYPE IN ('JAVA CLASS','PACKAGE BODY')) ORDER BY S.SYNONYM_NAME"
        };
        Ok(Statement::new(sql).bind(schema.name()))
    }

    fn fetch_object(&self, schema: &Schema, row: &Row) -> CatalogResult<Synonym> {
        Synonym::from_row(schema.name(), row)
    }
}

struct DbLinkLoader;

#[async_trait]
impl ObjectLoader<Schema> for DbLinkLoader {
    type Object = DbLink;

    fn describe(&self) -> &'static str {
        "database links"
    }

    async fn prepare_statement(&self, schema: &Schema) -> CatalogResult<Statement> {
        Ok(Statement::new("SELECT * FROM ALL_DB_LINKS WHERE OWNER=? ORDER BY DB_LINK").bind(schema.name()))
    }

    fn fetch_object(&self, _schema: &Schema, row: &Row) -> CatalogResult<DbLink> {
        DbLink::from_row(row)
    }
}

struct RecycledObjectLoader;

#[async_trait]
impl ObjectLoader<Schema> for RecycledObjectLoader {
    type Object = RecycledObject;

    fn describe(&self) -> &'static str {
        "recycled objects"
    }

    async fn prepare_statement(&self, schema: &Schema) -> CatalogResult<Statement> {
        // The public schema stands for the connected user's own bin
        if schema.is_public() {
            Ok(Statement::new("SELECT * FROM RECYCLEBIN ORDER BY OBJECT_NAME"))
        } else {
            Ok(Statement::new("SELECT * FROM DBA_RECYCLEBIN WHERE OWNER=? ORDER BY OBJECT_NAME")
                .bind(schema.name()))
        }
    }

    fn fetch_object(&self, _schema: &Schema, row: &Row) -> CatalogResult<RecycledObject> {
        RecycledObject::from_row(row)
    }
}

struct SchemaTypeLoader;

#[async_trait]
impl ObjectLoader<Schema> for SchemaTypeLoader {
    type Object = DataType;

    fn describe(&self) -> &'static str {
        "schema data types"
    }

    async fn prepare_statement(&self, schema: &Schema) -> CatalogResult<Statement> {
        Ok(Statement::new("SELECT * FROM ALL_TYPES WHERE OWNER=? ORDER BY TYPE_NAME").bind(schema.name()))
    }

    fn fetch_object(&self, _schema: &Schema, row: &Row) -> CatalogResult<DataType> {
        DataType::from_row(row)
    }
}
