// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog coordinator
//!
//! [`XuguCatalog`] owns one cache per top-level entity kind, tracks the active
//! schema of the connection and answers cross-cache lookups.
//!
//! ## Lifecycle
//!
//! 1. Construct with [`XuguCatalog::new`]; every cache starts unloaded.
//! 2. Call [`XuguCatalog::initialize`] once connected. It probes for the DBA
//!    role, reads the active schema and registers the built-in data types.
//! 3. Caches fill on first use.
//! 4. [`XuguCatalog::refresh`] drops everything and initializes again.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, warn};
use xugu_host::{
    ExecutionContext, NoInteraction, PreferenceStore, QueryExecutor, Session, SessionPurpose,
    Statement, UserInteraction,
};

use crate::cache::{CacheOwner, CatalogObject, ObjectCache, StructCache};
use crate::error::{CatalogError, CatalogResult};
use crate::error_position::{ErrorAssistant, ErrorPosition};
use crate::handle::CatalogHandle;
use crate::loaders::{
    DataTypeLoader, ProfileLoader, RoleLoader, SchemaLoader, TablespaceLoader, UserLoader,
};
use crate::model::data_type::data_kind_of;
use crate::model::schema_objects::{DbLink, RecycledObject, Synonym};
use crate::model::{
    CatalogEntity, DataKind, DataType, Grantee, Profile, ProfileResource, Role, Schema,
    Tablespace, User,
};
use crate::plan::{ExecutionPlan, PlanStyle, PlanTablePlanner, QueryPlanner};
use crate::preferences::{ConnectionSettings, PREF_EXPLAIN_TABLE_NAME, XuguPreferences};
use crate::server_output::ServerOutputReader;
use crate::sql::{
    self, MAX_STRING_LENGTH, PLAN_TABLE_DEFINITION, SCHEMA_SYS, STRUCT_SEPARATOR, USER_PUBLIC,
    quote_identifier, quote_literal,
};

/// Id of the always-present public schema
pub const PUBLIC_SCHEMA_ID: i64 = 1;

const DEFAULT_PLAN_TABLES: [&str; 2] = ["PLAN_TABLE", "TOAD_PLAN_TABLE"];

/// Receives default schema changes
pub trait ObjectSelectListener: Send + Sync {
    fn object_selected(&self, schema: &Schema, selected: bool);
}

/// Services the catalog exposes to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ServerOutputReader,
    QueryPlanner,
    ErrorAssistant,
}

/// A provider returned by [`XuguCatalog::capability`]
#[derive(Clone, Copy)]
pub enum CapabilityRef<'a> {
    ServerOutput(&'a ServerOutputReader),
    Planner(&'a dyn QueryPlanner),
    ErrorAssistant(&'a ErrorAssistant),
}

/// Data-source limits the host asks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    MaxStringLength,
}

/// Connection facts read during initialization
#[derive(Debug, Default)]
struct SessionState {
    active_schema: Option<String>,
    is_admin: bool,
    is_admin_visible: bool,
}

/// Catalog of one Xugu connection
pub struct XuguCatalog {
    handle: CatalogHandle,
    settings: ConnectionSettings,
    public_schema: Arc<Schema>,

    schemas: ObjectCache<XuguCatalog, SchemaLoader>,
    data_types: ObjectCache<XuguCatalog, DataTypeLoader>,
    tablespaces: ObjectCache<XuguCatalog, TablespaceLoader>,
    users: ObjectCache<XuguCatalog, UserLoader>,
    roles: ObjectCache<XuguCatalog, RoleLoader>,
    profiles: StructCache<XuguCatalog, ProfileLoader>,

    state: RwLock<SessionState>,
    /// Upper-cased view name to probe verdict; held across the probe
    available_views: tokio::sync::Mutex<HashMap<String, bool>>,
    plan_table: tokio::sync::Mutex<Option<String>>,

    listeners: Vec<Arc<dyn ObjectSelectListener>>,
    planner: Arc<dyn QueryPlanner>,
    interaction: Arc<dyn UserInteraction>,
    output_reader: ServerOutputReader,
    error_assistant: ErrorAssistant,
}

impl XuguCatalog {
    /// Create a catalog with every cache unloaded
    ///
    /// Preference defaults are registered in `preferences` and connection
    /// settings are read from it.
    pub fn new(executor: Arc<dyn QueryExecutor>, preferences: Arc<dyn PreferenceStore>) -> Self {
        XuguPreferences::register_defaults(preferences.as_ref());
        let handle = CatalogHandle::new(executor, preferences.clone());
        let settings = ConnectionSettings::from_store(preferences.as_ref());
        Self {
            public_schema: Arc::new(Schema::new(handle.clone(), PUBLIC_SCHEMA_ID, USER_PUBLIC)),
            output_reader: ServerOutputReader::new(preferences),
            handle,
            settings,
            schemas: ObjectCache::new(SchemaLoader),
            data_types: ObjectCache::new(DataTypeLoader),
            tablespaces: ObjectCache::new(TablespaceLoader),
            users: ObjectCache::new(UserLoader),
            roles: ObjectCache::new(RoleLoader),
            profiles: StructCache::new(ProfileLoader),
            state: RwLock::new(SessionState::default()),
            available_views: tokio::sync::Mutex::new(HashMap::new()),
            plan_table: tokio::sync::Mutex::new(None),
            listeners: Vec::new(),
            planner: Arc::new(PlanTablePlanner::new()),
            interaction: Arc::new(NoInteraction),
            error_assistant: ErrorAssistant,
        }
    }

    /// Builder method: use `settings` instead of the stored ones
    pub fn with_settings(mut self, settings: ConnectionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builder method: notify `listener` about default schema changes
    pub fn with_listener(mut self, listener: Arc<dyn ObjectSelectListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn with_planner(mut self, planner: Arc<dyn QueryPlanner>) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_interaction(mut self, interaction: Arc<dyn UserInteraction>) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn handle(&self) -> &CatalogHandle {
        &self.handle
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    fn preferences(&self) -> &Arc<dyn PreferenceStore> {
        self.handle.preferences()
    }

    // ===== Lifecycle =====

    /// Register built-in types and read connection facts
    ///
    /// Built-in types are registered before anything is queried. Probe
    /// failures are logged and leave the defaults in place. Failing to open
    /// the metadata session is an error.
    pub async fn initialize(&self) -> CatalogResult<()> {
        // Built-in types never need the server
        self.data_types.set_cache(DataType::all_predefined());

        let context = self.handle.meta_context();
        let mut session = context
            .open_session(SessionPurpose::Meta, "Load data source meta info")
            .await
            .map_err(|e| CatalogError::sql("Failed to open session to load data source info", e))?;

        let is_admin = match session
            .query_string(&Statement::new(
                "SELECT 'YES' FROM USER_ROLE_PRIVS WHERE GRANTED_ROLE='DBA'",
            ))
            .await
        {
            Ok(value) => value.as_deref() == Some("YES"),
            Err(e) => {
                warn!("Can't check DBA role: {}", e);
                false
            }
        };

        let active_schema = match sql::current_schema(session.as_mut()).await {
            Ok(schema) => schema,
            Err(e) => {
                warn!("Can't read active schema: {}", e);
                None
            }
        };
        drop(session);

        {
            let mut state = self.state.write();
            state.is_admin = is_admin;
            state.is_admin_visible = is_admin || self.settings.always_show_dba;
            state.active_schema = active_schema;
        }

        info!(
            "Initialized catalog (admin: {}, active schema: {:?})",
            is_admin,
            self.active_schema_name()
        );
        Ok(())
    }

    /// Drop every cache and the active schema, then initialize again
    pub async fn refresh(&self) -> CatalogResult<()> {
        self.schemas.clear_cache();
        self.data_types.clear_cache();
        self.tablespaces.clear_cache();
        self.users.clear_cache();
        self.roles.clear_cache();
        self.profiles.clear_cache();
        self.public_schema.refresh();
        self.state.write().active_schema = None;

        debug!("Catalog caches cleared");
        self.initialize().await
    }

    /// Apply per-session settings to a freshly opened context
    ///
    /// Toggles DBMS output, optionally switches to the default schema, then
    /// applies NLS overrides. An NLS override that fails is only logged.
    pub async fn initialize_context_state(
        &self,
        context: &dyn ExecutionContext,
        set_active_object: bool,
    ) -> CatalogResult<()> {
        self.output_reader
            .set_enabled(context, self.output_reader.is_enabled())
            .await?;

        if set_active_object {
            match self.default_object() {
                Some(schema) => set_current_schema(context, &schema).await?,
                None => debug!("Null current schema"),
            }
        }

        let overrides = [
            ("NLS_LANGUAGE", &self.settings.session_language, "session language"),
            ("NLS_TERRITORY", &self.settings.session_territory, "session territory"),
            ("NLS_DATE_FORMAT", &self.settings.nls_date_format, "session NLS date format"),
        ];
        if overrides.iter().all(|(_, value, _)| value.is_none()) {
            return Ok(());
        }

        let mut session = context
            .open_session(SessionPurpose::Meta, "Set connection parameters")
            .await
            .map_err(|e| CatalogError::sql("Failed to set connection parameters", e))?;
        for (parameter, value, what) in overrides {
            let Some(value) = value else { continue };
            let stmt = Statement::new(format!(
                "ALTER SESSION SET {}='{}'",
                parameter,
                quote_literal(value)
            ));
            if let Err(e) = session.execute(&stmt).await {
                warn!("Can't set {}: {}", what, e);
            }
        }
        Ok(())
    }

    // ===== Connection facts =====

    pub fn is_admin(&self) -> bool {
        self.state.read().is_admin
    }

    /// Admin, or configured to always show DBA objects
    pub fn is_admin_visible(&self) -> bool {
        self.state.read().is_admin_visible
    }

    pub fn is_use_rule_hint(&self) -> bool {
        self.settings.use_rule_hint
    }

    pub fn active_schema_name(&self) -> Option<String> {
        self.state.read().active_schema.clone()
    }

    /// Whether the server major version is at least `major`
    pub fn is_at_least(&self, major: u32) -> bool {
        self.handle
            .executor()
            .server_version()
            .is_some_and(|(server_major, _)| server_major >= major)
    }

    // ===== Catalog views =====

    /// Whether `schema.view` can be selected from; probed once per view name
    pub async fn is_view_available(&self, schema: &str, view: &str) -> bool {
        let view = view.to_uppercase();
        let mut views = self.available_views.lock().await;
        if let Some(&available) = views.get(&view) {
            return available;
        }

        let available = self.probe_view(schema, &view).await;
        debug!("View {}.{} available: {}", schema, view, available);
        views.insert(view, available);
        available
    }

    async fn probe_view(&self, schema: &str, view: &str) -> bool {
        let context = self.handle.meta_context();
        let mut session = match context
            .open_session(SessionPurpose::Meta, "Check view existence")
            .await
        {
            Ok(session) => session,
            Err(_) => return false,
        };
        let stmt = Statement::new(format!(
            "SELECT 1 FROM {}.{} WHERE 1<>1",
            quote_identifier(schema),
            quote_identifier(view)
        ))
        .with_fetch_size(1);
        session.query(&stmt).await.is_ok()
    }

    /// `SYS.DBA_<view>` for admins when it exists, `SYS.ALL_<view>` otherwise
    pub async fn admin_all_view(&self, view: &str) -> String {
        if self.is_admin() {
            let dba_view = format!("DBA_{}", view);
            if self.is_view_available(SCHEMA_SYS, &dba_view).await {
                return format!("{}.{}", SCHEMA_SYS, dba_view);
            }
        }
        format!("{}.ALL_{}", SCHEMA_SYS, view)
    }

    /// `SYS.DBA_<view>` when it exists, `SYS.USER_<view>` otherwise
    pub async fn sys_user_view(&self, view: &str) -> String {
        let dba_view = format!("DBA_{}", view);
        if self.is_view_available(SCHEMA_SYS, &dba_view).await {
            format!("{}.{}", SCHEMA_SYS, dba_view)
        } else {
            format!("{}.USER_{}", SCHEMA_SYS, view)
        }
    }

    /// Optimizer hint for dictionary queries, empty unless configured
    pub fn sys_catalog_hint(&self) -> &'static str {
        if self.is_use_rule_hint() { "/*+RULE*/" } else { "" }
    }

    // ===== Schemas =====

    pub fn public_schema(&self) -> &Arc<Schema> {
        &self.public_schema
    }

    pub async fn schemas(&self) -> CatalogResult<Vec<Arc<Schema>>> {
        self.schemas.get_all_objects(self).await
    }

    /// Schema by name; the public schema never needs a query
    pub async fn get_schema(&self, name: &str) -> CatalogResult<Option<Arc<Schema>>> {
        if name == self.public_schema.name() {
            return Ok(Some(self.public_schema.clone()));
        }
        self.schemas.get_object(self, name).await
    }

    pub async fn public_synonyms(&self) -> CatalogResult<Vec<Arc<Synonym>>> {
        self.public_schema.synonyms().await
    }

    pub async fn public_database_links(&self) -> CatalogResult<Vec<Arc<DbLink>>> {
        self.public_schema.database_links().await
    }

    pub async fn user_recycled_objects(&self) -> CatalogResult<Vec<Arc<RecycledObject>>> {
        self.public_schema.recycled_objects().await
    }

    // ===== Default schema =====

    /// The active schema if it is already cached; never queries
    pub fn default_object(&self) -> Option<Arc<Schema>> {
        let name = self.active_schema_name()?;
        self.schemas.get_cached_object(&name)
    }

    /// Make `object` the active schema on every context
    ///
    /// Only schemas are accepted. Listeners hear about the old schema being
    /// deselected before the new one is selected.
    pub async fn set_default_object(&self, object: &CatalogEntity) -> CatalogResult<()> {
        let Some(schema) = object.as_schema() else {
            return Err(CatalogError::InvalidArgument(format!(
                "Invalid object type: {} '{}'",
                object.kind(),
                object.name()
            )));
        };
        let old = self.default_object();

        for context in self.handle.executor().all_contexts() {
            set_current_schema(context.as_ref(), schema).await?;
        }
        self.state.write().active_schema = Some(schema.name().to_string());
        info!("Active schema changed to '{}'", schema.name());

        if let Some(old) = old {
            for listener in &self.listeners {
                listener.object_selected(&old, false);
            }
        }
        for listener in &self.listeners {
            listener.object_selected(schema, true);
        }
        Ok(())
    }

    /// Follow a schema change made directly in `session`
    ///
    /// Returns `true` when the active schema changed. A current schema that is
    /// not cached is not promoted.
    pub async fn refresh_default_object(&self, session: &mut dyn Session) -> CatalogResult<bool> {
        let current = sql::current_schema(session)
            .await
            .map_err(|e| CatalogError::sql("Failed to read current schema", e))?;
        let Some(current) = current else {
            return Ok(false);
        };
        if self.active_schema_name().as_deref() == Some(current.as_str()) {
            return Ok(false);
        }
        match self.schemas.get_cached_object(&current) {
            Some(schema) => {
                self.set_default_object(&CatalogEntity::Schema(schema)).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ===== Data types =====

    pub async fn data_types(&self) -> CatalogResult<Vec<Arc<DataType>>> {
        self.data_types.get_all_objects(self).await
    }

    /// Types registered in memory; never queries
    pub fn local_data_types(&self) -> Vec<Arc<DataType>> {
        self.data_types.get_cached_objects()
    }

    pub fn local_data_type(&self, name: &str) -> Option<Arc<DataType>> {
        self.data_types.get_cached_object(name)
    }

    /// Type by full name: `NAME` is local, `SCHEMA.NAME` is read from the schema
    pub async fn resolve_data_type(&self, full_name: &str) -> CatalogResult<Option<Arc<DataType>>> {
        let Some((schema_name, type_name)) = full_name.split_once(STRUCT_SEPARATOR) else {
            return Ok(self.local_data_type(full_name));
        };
        match self.get_schema(schema_name).await? {
            Some(schema) => schema.get_data_type(type_name).await,
            None => Ok(None),
        }
    }

    /// How values of `type_name` are handled; unknown types are objects
    pub fn resolve_data_kind(&self, type_name: &str) -> DataKind {
        data_kind_of(type_name).unwrap_or(DataKind::Object)
    }

    // ===== Storage and security =====

    pub async fn tablespaces(&self) -> CatalogResult<Vec<Arc<Tablespace>>> {
        self.tablespaces.get_all_objects(self).await
    }

    pub async fn get_tablespace(&self, name: &str) -> CatalogResult<Option<Arc<Tablespace>>> {
        self.tablespaces.get_object(self, name).await
    }

    pub async fn users(&self) -> CatalogResult<Vec<Arc<User>>> {
        self.users.get_all_objects(self).await
    }

    pub async fn get_user(&self, name: &str) -> CatalogResult<Option<Arc<User>>> {
        self.users.get_object(self, name).await
    }

    pub async fn roles(&self) -> CatalogResult<Vec<Arc<Role>>> {
        self.roles.get_all_objects(self).await
    }

    pub async fn get_role(&self, name: &str) -> CatalogResult<Option<Arc<Role>>> {
        self.roles.get_object(self, name).await
    }

    /// User or role by name; a user wins over a role of the same name
    pub async fn get_grantee(&self, name: &str) -> CatalogResult<Option<Grantee>> {
        if let Some(user) = self.users.get_object(self, name).await? {
            return Ok(Some(Grantee::User(user)));
        }
        Ok(self.roles.get_object(self, name).await?.map(Grantee::Role))
    }

    pub async fn profiles(&self) -> CatalogResult<Vec<Arc<Profile>>> {
        self.profiles.get_all_objects(self).await
    }

    pub async fn get_profile(&self, name: &str) -> CatalogResult<Option<Arc<Profile>>> {
        self.profiles.get_object(self, name).await
    }

    /// Resource limits of `profile`, read on first request
    pub async fn profile_resources(&self, profile: &Profile) -> CatalogResult<Vec<Arc<ProfileResource>>> {
        self.profiles.get_children(self, profile).await
    }

    /// Read the resource limits of every profile with one query
    pub async fn load_all_profile_resources(&self) -> CatalogResult<()> {
        self.profiles.load_all_children(self).await
    }

    // ===== Execution =====

    /// Cancel what runs on `context`, falling back to cancelling the connection
    pub async fn cancel_statement_execute(&self, context: &dyn ExecutionContext) -> CatalogResult<()> {
        if context.supports_statement_cancel() {
            return context
                .cancel_statement()
                .await
                .map_err(|e| CatalogError::sql("Failed to cancel statement", e));
        }
        context
            .cancel_connection()
            .await
            .map_err(|e| CatalogError::sql("Can't cancel session queries", e))
    }

    pub fn plan_style(&self) -> PlanStyle {
        PlanStyle::Plan
    }

    /// Explain `query` through the configured planner
    pub async fn plan_query_execution(
        &self,
        session: &mut dyn Session,
        query: &str,
    ) -> CatalogResult<Box<dyn ExecutionPlan>> {
        let Some(plan_table) = self.plan_table_name(session).await? else {
            return Err(CatalogError::NotSupported("Plan table not found".to_string()));
        };
        self.planner.plan(session, query, &plan_table).await
    }

    /// Name of a usable plan table, creating one if the user agrees
    ///
    /// The configured table is tried alone; otherwise the usual names are
    /// tried in order. `None` when no table exists and creation was declined.
    pub async fn plan_table_name(&self, session: &mut dyn Session) -> CatalogResult<Option<String>> {
        let mut plan_table = self.plan_table.lock().await;
        if let Some(name) = plan_table.as_ref() {
            return Ok(Some(name.clone()));
        }

        let configured = self.preferences().get_string(PREF_EXPLAIN_TABLE_NAME);
        let candidates: Vec<String> = if configured.trim().is_empty() {
            DEFAULT_PLAN_TABLES.iter().map(|s| s.to_string()).collect()
        } else {
            vec![configured.trim().to_string()]
        };

        for candidate in &candidates {
            let probe = Statement::new(format!("SELECT 1 FROM {}", candidate));
            if session.query(&probe).await.is_ok() {
                *plan_table = Some(candidate.clone());
                return Ok(Some(candidate.clone()));
            }
        }

        let new_table = &candidates[0];
        let confirmed = self
            .interaction
            .confirm(
                "PLAN_TABLE missing",
                &format!(
                    "PLAN_TABLE not found in current user's session. Do you want to create new PLAN_TABLE ({})?",
                    new_table
                ),
            )
            .await;
        if !confirmed {
            return Ok(None);
        }

        let ddl = PLAN_TABLE_DEFINITION.replace("${TABLE_NAME}", new_table);
        session
            .execute(&Statement::new(ddl))
            .await
            .map_err(|e| CatalogError::sql("Error creating PLAN table", e))?;
        info!("Created plan table {}", new_table);
        *plan_table = Some(new_table.clone());
        Ok(Some(new_table.clone()))
    }

    // ===== Host services =====

    pub fn output_reader(&self) -> &ServerOutputReader {
        &self.output_reader
    }

    /// Drain DBMS output of `context` into `output`
    pub async fn read_server_output(
        &self,
        context: &dyn ExecutionContext,
        output: &mut dyn Write,
    ) -> CatalogResult<Vec<String>> {
        self.output_reader.drain(context, output).await
    }

    /// Where in `query` the failure `error` points
    pub async fn error_position(
        &self,
        context: &dyn ExecutionContext,
        query: &str,
        error: &CatalogError,
    ) -> Vec<ErrorPosition> {
        self.error_assistant.error_position(context, query, error).await
    }

    pub fn capability(&self, capability: Capability) -> Option<CapabilityRef<'_>> {
        Some(match capability {
            Capability::ServerOutputReader => CapabilityRef::ServerOutput(&self.output_reader),
            Capability::QueryPlanner => CapabilityRef::Planner(self.planner.as_ref()),
            Capability::ErrorAssistant => CapabilityRef::ErrorAssistant(&self.error_assistant),
        })
    }

    pub fn feature(&self, feature: Feature) -> Option<u32> {
        match feature {
            Feature::MaxStringLength => Some(MAX_STRING_LENGTH),
        }
    }
}

impl CacheOwner for XuguCatalog {
    fn meta_context(&self) -> Arc<dyn ExecutionContext> {
        self.handle.meta_context()
    }
}

impl fmt::Debug for XuguCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XuguCatalog")
            .field("handle", &self.handle)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

async fn set_current_schema(context: &dyn ExecutionContext, schema: &Schema) -> CatalogResult<()> {
    let mut session = context
        .open_session(SessionPurpose::Util, "Set active schema")
        .await
        .map_err(|e| CatalogError::sql("Failed to set active schema", e))?;
    sql::set_current_schema(session.as_mut(), schema.name())
        .await
        .map_err(|e| CatalogError::sql(format!("Failed to set active schema '{}'", schema.name()), e))
}
