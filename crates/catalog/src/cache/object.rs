// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Object cache
//!
//! Lazily loads the full collection of one entity kind for one owner.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tracing::debug;
use xugu_host::{Row, SessionPurpose, Statement};

use super::{CacheOwner, CatalogObject, name_order};
use crate::error::{CatalogError, CatalogResult};

/// How one entity kind is read from the catalog
#[async_trait]
pub trait ObjectLoader<O: CacheOwner + ?Sized>: Send + Sync {
    type Object: CatalogObject;

    /// Plural noun for logs and errors, e.g. "schemas"
    fn describe(&self) -> &'static str;

    /// Build the query that lists every object of this kind for `owner`
    async fn prepare_statement(&self, owner: &O) -> CatalogResult<Statement>;

    /// Translate one result row into an entity
    fn fetch_object(&self, owner: &O, row: &Row) -> CatalogResult<Self::Object>;

    /// Patch a freshly loaded list before it is published
    ///
    /// May add synthetic entities; the list is re-sorted afterwards.
    fn invalidate_objects(&self, _owner: &O, _objects: &mut Vec<Arc<Self::Object>>) {}
}

/// A published, immutable view of a loaded cache
struct Snapshot<T> {
    objects: Vec<Arc<T>>,
    index: HashMap<String, usize>,
}

impl<T: CatalogObject> Snapshot<T> {
    fn new(objects: Vec<Arc<T>>) -> Self {
        let mut index = HashMap::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            index.entry(object.name().to_string()).or_insert(i);
        }
        Self { objects, index }
    }

    fn get(&self, name: &str) -> Option<Arc<T>> {
        self.index.get(name).map(|&i| self.objects[i].clone())
    }
}

/// Lazily loaded collection of one entity kind
pub struct ObjectCache<O: ?Sized, L: ObjectLoader<O>>
where
    O: CacheOwner,
{
    loader: L,
    order: fn(&L::Object, &L::Object) -> Ordering,
    snapshot: RwLock<Option<Arc<Snapshot<L::Object>>>>,
    /// Bumped on every clear so an in-flight load can tell it went stale
    epoch: AtomicU64,
    load_lock: tokio::sync::Mutex<()>,
    _owner: PhantomData<fn(&O)>,
}

impl<O, L> ObjectCache<O, L>
where
    O: CacheOwner + ?Sized,
    L: ObjectLoader<O>,
{
    /// Create an empty cache ordered by name
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            order: name_order::<L::Object>,
            snapshot: RwLock::new(None),
            epoch: AtomicU64::new(0),
            load_lock: tokio::sync::Mutex::new(()),
            _owner: PhantomData,
        }
    }

    /// Builder method: expose entities in `order` instead of by name
    pub fn with_order(mut self, order: fn(&L::Object, &L::Object) -> Ordering) -> Self {
        self.order = order;
        self
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// All objects, loading them on first use
    pub async fn get_all_objects(&self, owner: &O) -> CatalogResult<Vec<Arc<L::Object>>> {
        Ok(self.load(owner).await?.objects.clone())
    }

    /// Object by exact name, loading the cache on first use
    pub async fn get_object(&self, owner: &O, name: &str) -> CatalogResult<Option<Arc<L::Object>>> {
        Ok(self.load(owner).await?.get(name))
    }

    /// Object by exact name from memory only; never queries
    pub fn get_cached_object(&self, name: &str) -> Option<Arc<L::Object>> {
        self.current().and_then(|s| s.get(name))
    }

    /// Every object in memory; empty while unloaded
    pub fn get_cached_objects(&self) -> Vec<Arc<L::Object>> {
        self.current()
            .map(|s| s.objects.clone())
            .unwrap_or_default()
    }

    pub fn is_fully_cached(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Drop everything and return to the unloaded state
    pub fn clear_cache(&self) {
        let mut slot = self.snapshot.write();
        self.epoch.fetch_add(1, AtomicOrdering::SeqCst);
        if slot.take().is_some() {
            debug!("Cleared {} cache", self.loader.describe());
        }
    }

    /// Install an explicit list without querying
    pub fn set_cache(&self, objects: Vec<L::Object>) {
        let mut objects: Vec<Arc<L::Object>> = objects.into_iter().map(Arc::new).collect();
        objects.sort_by(|a, b| (self.order)(a, b));
        let snapshot = Arc::new(Snapshot::new(objects));
        let mut slot = self.snapshot.write();
        self.epoch.fetch_add(1, AtomicOrdering::SeqCst);
        *slot = Some(snapshot);
    }

    fn current(&self) -> Option<Arc<Snapshot<L::Object>>> {
        self.snapshot.read().clone()
    }

    async fn load(&self, owner: &O) -> CatalogResult<Arc<Snapshot<L::Object>>> {
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }

        let _guard = self.load_lock.lock().await;
        // Another caller may have finished loading while we waited
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }

        let epoch = self.epoch.load(AtomicOrdering::SeqCst);
        let objects = self.load_objects(owner).await?;
        let snapshot = Arc::new(Snapshot::new(objects));

        let mut slot = self.snapshot.write();
        if self.epoch.load(AtomicOrdering::SeqCst) == epoch {
            *slot = Some(snapshot.clone());
        } else {
            debug!(
                "{} cache was cleared during load, result not published",
                self.loader.describe()
            );
        }
        Ok(snapshot)
    }

    async fn load_objects(&self, owner: &O) -> CatalogResult<Vec<Arc<L::Object>>> {
        let what = self.loader.describe();
        let stmt = self.loader.prepare_statement(owner).await?;

        let rows = {
            let context = owner.meta_context();
            let mut session = context
                .open_session(SessionPurpose::Meta, &format!("Load {}", what))
                .await
                .map_err(|e| CatalogError::sql(format!("Failed to open session to load {}", what), e))?;
            session
                .query(&stmt)
                .await
                .map_err(|e| CatalogError::sql(format!("Failed to load {}", what), e))?
        };

        let mut objects = rows
            .iter()
            .map(|row| self.loader.fetch_object(owner, row).map(Arc::new))
            .collect::<CatalogResult<Vec<_>>>()?;

        self.loader.invalidate_objects(owner, &mut objects);
        objects.sort_by(|a, b| (self.order)(a, b));

        debug!("Loaded {} {}", objects.len(), what);
        Ok(objects)
    }
}
