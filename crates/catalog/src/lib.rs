// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Xugu Catalog
//!
//! Metadata caching and synchronization for Xugu (Oracle-family) databases.
//! The catalog introspects schemas, users, roles, tablespaces, data types and
//! profiles, and keeps them cached for the lifetime of a connection.
//!
//! ## Architecture
//!
//! - [`cache`]: generic lazy caches. One [`ObjectCache`] per entity kind, plus
//!   [`StructCache`] for entities with children
//! - [`XuguCatalog`]: owns the caches, tracks the active schema and resolves
//!   cross-cache lookups
//! - [`error_position`]: locates errors in query text
//! - [`server_output`]: `DBMS_OUTPUT` capture
//! - [`connection`]: connecting with expired-password recovery
//!
//! Everything that touches the database goes through the collaborators in
//! `xugu-host`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xugu_catalog::{CatalogResult, XuguCatalog};
//!
//! async fn print_schemas(catalog: &XuguCatalog) -> CatalogResult<()> {
//!     catalog.initialize().await?;
//!     for schema in catalog.schemas().await? {
//!         println!("{}", schema.name());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod catalog;
pub mod connection;
pub mod error;
pub mod error_position;
pub mod handle;
mod loaders;
pub mod model;
pub mod plan;
pub mod preferences;
pub mod server_output;
pub mod sql;

// Re-exports
pub use cache::{
    CacheOwner, CatalogObject, ChildList, ObjectCache, ObjectLoader, StructCache, StructLoader,
    StructObject,
};
pub use catalog::{Capability, CapabilityRef, Feature, ObjectSelectListener, XuguCatalog};
pub use connection::{Connector, open_connection};
pub use error::{CatalogError, CatalogResult, ErrorType, discover_error_type};
pub use error_position::{ErrorAssistant, ErrorPosition};
pub use handle::CatalogHandle;
pub use model::{
    CatalogEntity, DataKind, DataType, DbLink, EntityKind, Grantee, Profile, ProfileResource,
    RecycledObject, Role, Schema, Synonym, Tablespace, User,
};
pub use plan::{ExecutionPlan, PlanStyle, PlanTablePlanner, QueryPlanner};
pub use preferences::{ConnectionSettings, XuguPreferences};
pub use server_output::ServerOutputReader;
