// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Connection handle shared by the coordinator and the entities it creates.

use std::fmt;
use std::sync::Arc;
use xugu_host::{ExecutionContext, PreferenceStore, QueryExecutor};

use crate::cache::CacheOwner;

/// The live connection plus its preferences
#[derive(Clone)]
pub struct CatalogHandle {
    executor: Arc<dyn QueryExecutor>,
    preferences: Arc<dyn PreferenceStore>,
}

impl CatalogHandle {
    pub fn new(executor: Arc<dyn QueryExecutor>, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self {
            executor,
            preferences,
        }
    }

    pub fn executor(&self) -> &Arc<dyn QueryExecutor> {
        &self.executor
    }

    pub fn preferences(&self) -> &Arc<dyn PreferenceStore> {
        &self.preferences
    }
}

impl CacheOwner for CatalogHandle {
    fn meta_context(&self) -> Arc<dyn ExecutionContext> {
        self.executor.default_context()
    }
}

impl fmt::Debug for CatalogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogHandle")
            .field("default_context", &self.executor.default_context().name())
            .finish()
    }
}
