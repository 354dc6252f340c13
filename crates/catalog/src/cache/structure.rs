// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Struct cache
//!
//! An [`ObjectCache`] whose entities own a list of children (resource limits of
//! a profile, for example). Children are read per parent on first request, or
//! for every parent at once with [`StructCache::load_all_children`].

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use xugu_host::{Row, SessionPurpose, Statement};

use super::object::{ObjectCache, ObjectLoader};
use super::{CacheOwner, CatalogObject};
use crate::error::{CatalogError, CatalogResult};

/// Lazily filled child list stored on the parent entity
pub struct ChildList<C> {
    children: RwLock<Option<Arc<Vec<Arc<C>>>>>,
}

impl<C> Default for ChildList<C> {
    fn default() -> Self {
        Self {
            children: RwLock::new(None),
        }
    }
}

impl<C> fmt::Debug for ChildList<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded = self.children.read().as_ref().map(|c| c.len());
        f.debug_struct("ChildList").field("loaded", &loaded).finish()
    }
}

impl<C> ChildList<C> {
    pub fn get(&self) -> Option<Arc<Vec<Arc<C>>>> {
        self.children.read().clone()
    }

    pub fn set(&self, children: Vec<Arc<C>>) {
        *self.children.write() = Some(Arc::new(children));
    }

    pub fn clear(&self) {
        *self.children.write() = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.children.read().is_some()
    }
}

/// An entity that carries children
pub trait StructObject: CatalogObject {
    type Child: CatalogObject;

    fn child_list(&self) -> &ChildList<Self::Child>;
}

/// How the children of one entity kind are read
#[async_trait]
pub trait StructLoader<O: CacheOwner + ?Sized>: ObjectLoader<O, Object: StructObject> {
    /// Column of a child row naming its parent
    fn parent_column(&self) -> &'static str;

    /// Children of `parent`, or of every parent when `None`
    async fn prepare_children_statement(
        &self,
        owner: &O,
        parent: Option<&Self::Object>,
    ) -> CatalogResult<Statement>;

    /// Translate one child row
    fn fetch_child(
        &self,
        owner: &O,
        parent: &Self::Object,
        row: &Row,
    ) -> CatalogResult<<Self::Object as StructObject>::Child>;
}

type ChildOf<O, L> = <<L as ObjectLoader<O>>::Object as StructObject>::Child;

/// Object cache with per-parent children
pub struct StructCache<O: ?Sized, L: StructLoader<O>>
where
    O: CacheOwner,
{
    objects: ObjectCache<O, L>,
    children_lock: tokio::sync::Mutex<()>,
}

impl<O, L> StructCache<O, L>
where
    O: CacheOwner + ?Sized,
    L: StructLoader<O>,
{
    pub fn new(loader: L) -> Self {
        Self {
            objects: ObjectCache::new(loader),
            children_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The underlying parent cache
    pub fn objects(&self) -> &ObjectCache<O, L> {
        &self.objects
    }

    pub async fn get_all_objects(&self, owner: &O) -> CatalogResult<Vec<Arc<L::Object>>> {
        self.objects.get_all_objects(owner).await
    }

    pub async fn get_object(&self, owner: &O, name: &str) -> CatalogResult<Option<Arc<L::Object>>> {
        self.objects.get_object(owner, name).await
    }

    pub fn get_cached_object(&self, name: &str) -> Option<Arc<L::Object>> {
        self.objects.get_cached_object(name)
    }

    /// Drop parents together with every child list they carry
    pub fn clear_cache(&self) {
        for parent in self.objects.get_cached_objects() {
            parent.child_list().clear();
        }
        self.objects.clear_cache();
    }

    /// Children of `parent`, read on first request
    pub async fn get_children(
        &self,
        owner: &O,
        parent: &L::Object,
    ) -> CatalogResult<Vec<Arc<ChildOf<O, L>>>> {
        if let Some(children) = parent.child_list().get() {
            return Ok(children.as_ref().clone());
        }

        let _guard = self.children_lock.lock().await;
        if let Some(children) = parent.child_list().get() {
            return Ok(children.as_ref().clone());
        }

        let loader = self.objects.loader();
        let stmt = loader.prepare_children_statement(owner, Some(parent)).await?;
        let rows = self.query_children(owner, &stmt).await?;
        let children = rows
            .iter()
            .map(|row| loader.fetch_child(owner, parent, row).map(Arc::new))
            .collect::<CatalogResult<Vec<_>>>()?;

        debug!(
            "Loaded {} children of {} '{}'",
            children.len(),
            loader.describe(),
            parent.name()
        );
        parent.child_list().set(children.clone());
        Ok(children)
    }

    /// Read the children of every parent with a single query
    pub async fn load_all_children(&self, owner: &O) -> CatalogResult<()> {
        let parents = self.objects.get_all_objects(owner).await?;

        let _guard = self.children_lock.lock().await;
        let loader = self.objects.loader();
        let stmt = loader.prepare_children_statement(owner, None).await?;
        let rows = self.query_children(owner, &stmt).await?;

        let by_name: HashMap<&str, &Arc<L::Object>> =
            parents.iter().map(|p| (p.name(), p)).collect();
        let mut grouped: HashMap<&str, Vec<Arc<ChildOf<O, L>>>> = HashMap::new();

        for row in &rows {
            let Some(parent_name) = row.string(loader.parent_column()) else {
                return Err(CatalogError::MissingColumn {
                    object: loader.describe().to_string(),
                    column: loader.parent_column().to_string(),
                });
            };
            let Some(parent) = by_name.get(parent_name.as_str()) else {
                debug!("Skipping child of unknown parent '{}'", parent_name);
                continue;
            };
            let child = loader.fetch_child(owner, parent, row)?;
            grouped.entry(parent.name()).or_default().push(Arc::new(child));
        }

        for parent in &parents {
            let children = grouped.remove(parent.name()).unwrap_or_default();
            parent.child_list().set(children);
        }
        Ok(())
    }

    async fn query_children(&self, owner: &O, stmt: &Statement) -> CatalogResult<Vec<Row>> {
        let what = self.objects.loader().describe();
        let context = owner.meta_context();
        let mut session = context
            .open_session(SessionPurpose::Meta, &format!("Load {} children", what))
            .await
            .map_err(|e| CatalogError::sql(format!("Failed to open session to load {} children", what), e))?;
        session
            .query(stmt)
            .await
            .map_err(|e| CatalogError::sql(format!("Failed to load {} children", what), e))
    }
}
