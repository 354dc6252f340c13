// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Xugu Preferences
//!
//! Data-source preferences and per-connection settings.
//!
//! ## Preference Keys
//!
//! Data-source preferences are flat keys in a [`PreferenceStore`]:
//! - `xugu.explain.table`: explicit plan table name
//! - `xugu.rowid.support`: identify rows by ROWID
//! - `xugu.dbms.output`: capture DBMS output
//! - `xugu.dbms.synonyms.read.all`: list every synonym, including Java classes
//! - `xugu.script.escape.processing.disable`: no driver escape processing in scripts
//!
//! Connection settings live under `xugu.connection.*`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use xugu_catalog::preferences::{ConnectionSettings, XuguPreferences};
//!
//! let prefs = XuguPreferences::load(store.as_ref());
//! let settings = ConnectionSettings::from_store(store.as_ref())
//!     .with_credentials("SCOTT", "tiger");
//! settings.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use xugu_host::{PrefValue, PreferenceError, PreferenceStore};

use crate::error::CatalogError;

pub const PREF_EXPLAIN_TABLE_NAME: &str = "xugu.explain.table";
pub const PREF_SUPPORT_ROWID: &str = "xugu.rowid.support";
pub const PREF_DBMS_OUTPUT: &str = "xugu.dbms.output";
pub const PREF_DBMS_READ_ALL_SYNONYMS: &str = "xugu.dbms.synonyms.read.all";
pub const PREF_DISABLE_SCRIPT_ESCAPE_PROCESSING: &str = "xugu.script.escape.processing.disable";

pub const PROP_ALWAYS_SHOW_DBA: &str = "xugu.connection.always-show-dba";
pub const PROP_CHECK_SCHEMA_CONTENT: &str = "xugu.connection.check-schema-content";
pub const PROP_USE_RULE_HINT: &str = "xugu.connection.use-rule-hint";
pub const PROP_SESSION_LANGUAGE: &str = "xugu.connection.session-language";
pub const PROP_SESSION_TERRITORY: &str = "xugu.connection.session-territory";
pub const PROP_SESSION_NLS_DATE_FORMAT: &str = "xugu.connection.nls-date-format";
pub const PROP_INTERNAL_LOGON: &str = "xugu.connection.internal-logon";
pub const PROP_OS_AUTH: &str = "xugu.connection.os-auth";

/// Keys managed by the data-source preference page
const PAGE_KEYS: [&str; 5] = [
    PREF_EXPLAIN_TABLE_NAME,
    PREF_SUPPORT_ROWID,
    PREF_DBMS_OUTPUT,
    PREF_DBMS_READ_ALL_SYNONYMS,
    PREF_DISABLE_SCRIPT_ESCAPE_PROCESSING,
];

/// Data-source level preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XuguPreferences {
    /// Plan table override; empty means "search the defaults"
    pub explain_table: String,
    pub rowid_support: bool,
    pub dbms_output: bool,
    pub read_all_synonyms: bool,
    pub disable_script_escape_processing: bool,
}

impl Default for XuguPreferences {
    fn default() -> Self {
        Self {
            explain_table: String::new(),
            rowid_support: true,
            dbms_output: true,
            read_all_synonyms: true,
            disable_script_escape_processing: false,
        }
    }
}

impl XuguPreferences {
    /// Install the default values into `store`
    pub fn register_defaults(store: &dyn PreferenceStore) {
        let defaults = Self::default();
        store.set_default(PREF_EXPLAIN_TABLE_NAME, PrefValue::from(defaults.explain_table));
        store.set_default(PREF_SUPPORT_ROWID, defaults.rowid_support.into());
        store.set_default(PREF_DBMS_OUTPUT, defaults.dbms_output.into());
        store.set_default(PREF_DBMS_READ_ALL_SYNONYMS, defaults.read_all_synonyms.into());
        store.set_default(
            PREF_DISABLE_SCRIPT_ESCAPE_PROCESSING,
            defaults.disable_script_escape_processing.into(),
        );
    }

    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self {
            explain_table: store.get_string(PREF_EXPLAIN_TABLE_NAME),
            rowid_support: store.get_bool(PREF_SUPPORT_ROWID),
            dbms_output: store.get_bool(PREF_DBMS_OUTPUT),
            read_all_synonyms: store.get_bool(PREF_DBMS_READ_ALL_SYNONYMS),
            disable_script_escape_processing: store.get_bool(PREF_DISABLE_SCRIPT_ESCAPE_PROCESSING),
        }
    }

    /// Write every value and persist the store
    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), CatalogError> {
        store.set_value(PREF_EXPLAIN_TABLE_NAME, self.explain_table.clone().into());
        store.set_value(PREF_SUPPORT_ROWID, self.rowid_support.into());
        store.set_value(PREF_DBMS_OUTPUT, self.dbms_output.into());
        store.set_value(PREF_DBMS_READ_ALL_SYNONYMS, self.read_all_synonyms.into());
        store.set_value(
            PREF_DISABLE_SCRIPT_ESCAPE_PROCESSING,
            self.disable_script_escape_processing.into(),
        );
        store.flush().map_err(CatalogError::from)
    }

    /// Reset every page key to its default
    pub fn clear(store: &dyn PreferenceStore) {
        for key in PAGE_KEYS {
            store.set_to_default(key);
        }
    }

    /// Whether the store overrides any page key explicitly
    pub fn has_data_source_specific_options(store: &dyn PreferenceStore) -> bool {
        PAGE_KEYS.iter().any(|key| store.contains(key))
    }
}

impl From<PreferenceError> for CatalogError {
    fn from(err: PreferenceError) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

/// Settings used to open and initialize a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    pub user_name: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Role to log on as (`SYSDBA`, `SYSOPER`), if any
    pub internal_logon: Option<String>,

    /// Authenticate as the operating system user
    pub os_auth: bool,

    pub session_language: Option<String>,
    pub session_territory: Option<String>,
    pub nls_date_format: Option<String>,

    /// Show DBA views even without the DBA role
    pub always_show_dba: bool,

    /// List only users that own objects as schemas
    pub check_schema_content: bool,

    /// Prefix catalog queries with a RULE hint
    pub use_rule_hint: bool,

    /// Client program name reported to the server
    pub program_name: Option<String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            password: None,
            internal_logon: None,
            os_auth: false,
            session_language: None,
            session_territory: None,
            nls_date_format: None,
            always_show_dba: false,
            check_schema_content: true,
            use_rule_hint: false,
            program_name: None,
        }
    }
}

fn optional_text(store: &dyn PreferenceStore, key: &str) -> Option<String> {
    store
        .get(key)
        .map(|v| v.as_string())
        .filter(|s| !s.trim().is_empty())
}

impl ConnectionSettings {
    /// Read the connection options from a store; credentials are left empty
    pub fn from_store(store: &dyn PreferenceStore) -> Self {
        Self {
            internal_logon: optional_text(store, PROP_INTERNAL_LOGON),
            os_auth: store.get_bool(PROP_OS_AUTH),
            session_language: optional_text(store, PROP_SESSION_LANGUAGE),
            session_territory: optional_text(store, PROP_SESSION_TERRITORY),
            nls_date_format: optional_text(store, PROP_SESSION_NLS_DATE_FORMAT),
            always_show_dba: store.get_bool(PROP_ALWAYS_SHOW_DBA),
            check_schema_content: store
                .get(PROP_CHECK_SCHEMA_CONTENT)
                .map(|v| v.as_bool())
                .unwrap_or(true),
            use_rule_hint: store.get_bool(PROP_USE_RULE_HINT),
            ..Default::default()
        }
    }

    /// Parse settings from a client payload
    ///
    /// Expected shape:
    /// {
    ///   "xugu": { "userName": "...", "internalLogon": "SYSDBA", ... }
    /// }
    pub fn from_json(settings: &Value) -> Result<Self, CatalogError> {
        let section = settings
            .get("xugu")
            .ok_or_else(|| CatalogError::ConfigurationError("missing 'xugu' section".to_string()))?;
        serde_json::from_value(section.clone())
            .map_err(|e| CatalogError::ConfigurationError(e.to_string()))
    }

    /// Builder method: set the credentials
    pub fn with_credentials(mut self, user_name: impl Into<String>, password: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self.password = Some(password.into());
        self
    }

    /// Validate the settings
    ///
    /// A user name is required unless OS authentication is used; the internal
    /// logon role must be a single word.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.user_name.trim().is_empty() && !self.os_auth {
            return Err(CatalogError::ConfigurationError("user name is required".to_string()));
        }

        if let Some(role) = &self.internal_logon {
            if role.is_empty() || role.contains(char::is_whitespace) {
                return Err(CatalogError::ConfigurationError(format!(
                    "invalid internal logon role '{}'",
                    role
                )));
            }
        }

        if self.nls_date_format.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(CatalogError::ConfigurationError("empty NLS date format".to_string()));
        }

        Ok(())
    }

    /// User name as sent to the server: `<user> AS <role>` for internal logon
    pub fn connection_user_name(&self) -> String {
        match &self.internal_logon {
            Some(role) => format!("{} AS {}", self.user_name, role),
            None => self.user_name.clone(),
        }
    }
}
