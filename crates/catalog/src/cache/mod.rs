// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Lazy catalog caches
//!
//! Every kind of catalog entity is held by one generic [`ObjectCache`], configured
//! with an [`ObjectLoader`] that knows how to build the catalog query, turn a row
//! into an entity, and patch the freshly loaded list. [`StructCache`] adds lazily
//! loaded per-parent children on top of it.
//!
//! A cache is either unloaded or fully loaded. Loads are built off to the side and
//! published with a single assignment, and only one load runs at a time per cache,
//! so readers never see a partial list.

use std::cmp::Ordering;
use std::sync::Arc;
use xugu_host::ExecutionContext;

pub mod object;
pub mod structure;

pub use object::{ObjectCache, ObjectLoader};
pub use structure::{ChildList, StructCache, StructLoader, StructObject};

/// Anything a cache can hold
pub trait CatalogObject: Send + Sync + 'static {
    /// Name as returned by the database (case-sensitive)
    fn name(&self) -> &str;
}

/// The object a cache loads on behalf of
pub trait CacheOwner: Send + Sync {
    /// Context catalog sessions are opened against
    fn meta_context(&self) -> Arc<dyn ExecutionContext>;
}

/// Default list order: by name
pub fn name_order<T: CatalogObject>(a: &T, b: &T) -> Ordering {
    a.name().cmp(b.name())
}
