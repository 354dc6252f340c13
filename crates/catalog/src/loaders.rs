// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Catalog queries for the coordinator's own caches.

use async_trait::async_trait;
use std::sync::Arc;
use xugu_host::{Row, Statement};

use crate::cache::{CatalogObject, ObjectLoader, StructLoader};
use crate::catalog::XuguCatalog;
use crate::error::CatalogResult;
use crate::model::{DataType, Profile, ProfileResource, Role, Schema, Tablespace, User};

/// Id given to the active schema when the schema query did not return it
pub(crate) const ACTIVE_SCHEMA_PLACEHOLDER_ID: i64 = 100;

pub(crate) struct SchemaLoader;

#[async_trait]
impl ObjectLoader<XuguCatalog> for SchemaLoader {
    type Object = Schema;

    fn describe(&self) -> &'static str {
        "schemas"
    }

    async fn prepare_statement(&self, owner: &XuguCatalog) -> CatalogResult<Statement> {
        let users = owner.admin_all_view("USERS").await;
        // Listing every account is noisy on servers with many users
        let condition = if owner.settings().check_schema_content {
            format!(
                "U.USERNAME IN (SELECT DISTINCT OWNER FROM {})",
                owner.admin_all_view("OBJECTS").await
            )
        } else {
            "U.USERNAME IS NOT NULL".to_string()
        };
        Ok(Statement::new(format!(
            "SELECT U.* FROM {} U\nWHERE ({})",
            users, condition
        )))
    }

    fn fetch_object(&self, owner: &XuguCatalog, row: &Row) -> CatalogResult<Schema> {
        Schema::from_row(owner.handle().clone(), row)
    }

    fn invalidate_objects(&self, owner: &XuguCatalog, objects: &mut Vec<Arc<Schema>>) {
        let Some(active) = owner.active_schema_name() else {
            return;
        };
        if !objects.iter().any(|s| s.name() == active) {
            objects.push(Arc::new(Schema::new(
                owner.handle().clone(),
                ACTIVE_SCHEMA_PLACEHOLDER_ID,
                active,
            )));
        }
    }
}

pub(crate) struct DataTypeLoader;

#[async_trait]
impl ObjectLoader<XuguCatalog> for DataTypeLoader {
    type Object = DataType;

    fn describe(&self) -> &'static str {
        "data types"
    }

    async fn prepare_statement(&self, owner: &XuguCatalog) -> CatalogResult<Statement> {
        let hint = owner.sys_catalog_hint();
        let select = if hint.is_empty() {
            "SELECT *".to_string()
        } else {
            format!("SELECT {} *", hint)
        };
        Ok(Statement::new(format!(
            "{} FROM {} WHERE OWNER IS NULL ORDER BY TYPE_NAME",
            select,
            owner.admin_all_view("TYPES").await
        )))
    }

    fn fetch_object(&self, _owner: &XuguCatalog, row: &Row) -> CatalogResult<DataType> {
        DataType::from_row(row)
    }
}

pub(crate) struct TablespaceLoader;

#[async_trait]
impl ObjectLoader<XuguCatalog> for TablespaceLoader {
    type Object = Tablespace;

    fn describe(&self) -> &'static str {
        "tablespaces"
    }

    async fn prepare_statement(&self, owner: &XuguCatalog) -> CatalogResult<Statement> {
        Ok(Statement::new(format!(
            "SELECT * FROM {} ORDER BY TABLESPACE_NAME",
            owner.sys_user_view("TABLESPACES").await
        )))
    }

    fn fetch_object(&self, _owner: &XuguCatalog, row: &Row) -> CatalogResult<Tablespace> {
        Tablespace::from_row(row)
    }
}

pub(crate) struct UserLoader;

#[async_trait]
impl ObjectLoader<XuguCatalog> for UserLoader {
    type Object = User;

    fn describe(&self) -> &'static str {
        "users"
    }

    async fn prepare_statement(&self, owner: &XuguCatalog) -> CatalogResult<Statement> {
        Ok(Statement::new(format!(
            "SELECT * FROM {} ORDER BY USERNAME",
            owner.admin_all_view("USERS").await
        )))
    }

    fn fetch_object(&self, _owner: &XuguCatalog, row: &Row) -> CatalogResult<User> {
        User::from_row(row)
    }
}

pub(crate) struct RoleLoader;

#[async_trait]
impl ObjectLoader<XuguCatalog> for RoleLoader {
    type Object = Role;

    fn describe(&self) -> &'static str {
        "roles"
    }

    async fn prepare_statement(&self, _owner: &XuguCatalog) -> CatalogResult<Statement> {
        Ok(Statement::new("SELECT * FROM DBA_ROLES ORDER BY ROLE"))
    }

    fn fetch_object(&self, _owner: &XuguCatalog, row: &Row) -> CatalogResult<Role> {
        Role::from_row(row)
    }
}

pub(crate) struct ProfileLoader;

#[async_trait]
impl ObjectLoader<XuguCatalog> for ProfileLoader {
    type Object = Profile;

    fn describe(&self) -> &'static str {
        "profiles"
    }

    async fn prepare_statement(&self, _owner: &XuguCatalog) -> CatalogResult<Statement> {
        Ok(Statement::new("SELECT DISTINCT PROFILE FROM DBA_PROFILES ORDER BY PROFILE"))
    }

    fn fetch_object(&self, _owner: &XuguCatalog, row: &Row) -> CatalogResult<Profile> {
        Profile::from_row(row)
    }
}

#[async_trait]
impl StructLoader<XuguCatalog> for ProfileLoader {
    fn parent_column(&self) -> &'static str {
        "PROFILE"
    }

    async fn prepare_children_statement(
        &self,
        _owner: &XuguCatalog,
        parent: Option<&Profile>,
    ) -> CatalogResult<Statement> {
        let base = "SELECT PROFILE,RESOURCE_NAME,RESOURCE_TYPE,LIMIT FROM DBA_PROFILES";
        Ok(match parent {
            Some(profile) => {
                Statement::new(format!("{} WHERE PROFILE=? ORDER BY RESOURCE_NAME", base))
                    .bind(profile.name())
            }
            None => Statement::new(format!("{} ORDER BY RESOURCE_NAME", base)),
        })
    }

    fn fetch_child(
        &self,
        _owner: &XuguCatalog,
        _parent: &Profile,
        row: &Row,
    ) -> CatalogResult<ProfileResource> {
        ProfileResource::from_row(row)
    }
}
