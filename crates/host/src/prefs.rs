// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Preference store
//!
//! A flat key/value configuration store. Every key may carry a default; an
//! explicit value overrides it until [`PreferenceStore::set_to_default`] drops it.
//!
//! Two implementations are provided:
//!
//! - [`MemoryPreferenceStore`]: process-local, used by tests and embedded hosts
//! - [`JsonFilePreferenceStore`]: persists explicit values to a JSON file on flush

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// A stored preference value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl PrefValue {
    pub fn as_string(&self) -> String {
        match self {
            PrefValue::Bool(b) => b.to_string(),
            PrefValue::Int(i) => i.to_string(),
            PrefValue::Text(s) => s.clone(),
        }
    }

    /// Boolean reading; unparseable text is `false`
    pub fn as_bool(&self) -> bool {
        match self {
            PrefValue::Bool(b) => *b,
            PrefValue::Int(i) => *i != 0,
            PrefValue::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        }
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue::Int(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::Text(value.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::Text(value)
    }
}

/// Errors raised while persisting preferences
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Failed to access preference file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed preference file '{path}': {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat key/value configuration interface
pub trait PreferenceStore: Send + Sync {
    /// Explicit value, falling back to the default
    fn get(&self, key: &str) -> Option<PrefValue>;

    /// Set an explicit value
    fn set_value(&self, key: &str, value: PrefValue);

    /// Register the default for a key
    fn set_default(&self, key: &str, value: PrefValue);

    /// Drop the explicit value so the default applies again
    fn set_to_default(&self, key: &str);

    /// Whether an explicit value is set
    fn contains(&self, key: &str) -> bool;

    /// Persist explicit values, if the store is backed by something durable
    fn flush(&self) -> Result<(), PreferenceError> {
        Ok(())
    }

    /// String reading; empty when neither value nor default is set
    fn get_string(&self, key: &str) -> String {
        self.get(key).map(|v| v.as_string()).unwrap_or_default()
    }

    /// Boolean reading; `false` when neither value nor default is set
    fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.as_bool())
    }
}

/// In-memory preference store
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    defaults: RwLock<BTreeMap<String, PrefValue>>,
    values: RwLock<BTreeMap<String, PrefValue>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set an explicit value
    pub fn with_value(self, key: &str, value: impl Into<PrefValue>) -> Self {
        self.set_value(key, value.into());
        self
    }

    /// Snapshot of all explicit values
    pub fn values(&self) -> BTreeMap<String, PrefValue> {
        self.values.read().clone()
    }

    fn replace_values(&self, values: BTreeMap<String, PrefValue>) {
        *self.values.write() = values;
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        if let Some(v) = self.values.read().get(key) {
            return Some(v.clone());
        }
        self.defaults.read().get(key).cloned()
    }

    fn set_value(&self, key: &str, value: PrefValue) {
        self.values.write().insert(key.to_string(), value);
    }

    fn set_default(&self, key: &str, value: PrefValue) {
        self.defaults.write().insert(key.to_string(), value);
    }

    fn set_to_default(&self, key: &str) {
        self.values.write().remove(key);
    }

    fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }
}

/// Preference store persisted as a JSON object of explicit values
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    inner: MemoryPreferenceStore,
}

impl JsonFilePreferenceStore {
    /// Open a store at `path`; a missing file yields an empty store
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();
        let inner = MemoryPreferenceStore::new();

        match fs::read_to_string(&path) {
            Ok(content) => {
                let values: BTreeMap<String, PrefValue> = serde_json::from_str(&content)
                    .map_err(|source| PreferenceError::Malformed {
                        path: path.clone(),
                        source,
                    })?;
                debug!("Loaded {} preferences from {}", values.len(), path.display());
                inner.replace_values(values);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(PreferenceError::Io { path, source }),
        }

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.inner.get(key)
    }

    fn set_value(&self, key: &str, value: PrefValue) {
        self.inner.set_value(key, value);
    }

    fn set_default(&self, key: &str, value: PrefValue) {
        self.inner.set_default(key, value);
    }

    fn set_to_default(&self, key: &str) {
        self.inner.set_to_default(key);
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    fn flush(&self) -> Result<(), PreferenceError> {
        let content = serde_json::to_string_pretty(&self.inner.values()).map_err(|source| {
            PreferenceError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, content).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
