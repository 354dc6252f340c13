// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the catalog coordinator

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use xugu_catalog::preferences::{PREF_DBMS_OUTPUT, PREF_DBMS_READ_ALL_SYNONYMS, PREF_EXPLAIN_TABLE_NAME};
use xugu_catalog::{
    Capability, CapabilityRef, CatalogEntity, CatalogError, CatalogObject, ConnectionSettings,
    DataKind, Feature, Grantee, ObjectSelectListener, PlanStyle, Schema, StructObject, XuguCatalog,
    XuguPreferences,
};
use xugu_host::{MemoryPreferenceStore, QueryExecutor, SessionPurpose, SqlFailure, SqlValue};
use xugu_test_utils::{MockExecutor, RecordingInteraction, RowFixtures};

const SCHEMA_QUERY: &str = "SELECT U.* FROM";
const CURRENT_SCHEMA: &str = "SYS_CONTEXT";
const ADMIN_PROBE: &str = "USER_ROLE_PRIVS";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn catalog_with(executor: &MockExecutor, prefs: MemoryPreferenceStore) -> XuguCatalog {
    init_tracing();
    XuguCatalog::new(Arc::new(executor.clone()), Arc::new(prefs))
}

fn setup() -> (MockExecutor, XuguCatalog) {
    let executor = MockExecutor::new();
    let catalog = catalog_with(&executor, MemoryPreferenceStore::new());
    (executor, catalog)
}

#[derive(Default)]
struct RecordingListener {
    events: Mutex<Vec<(String, bool)>>,
}

impl ObjectSelectListener for RecordingListener {
    fn object_selected(&self, schema: &Schema, selected: bool) {
        self.events.lock().push((schema.name().to_string(), selected));
    }
}

// ===== Initialization =====

#[tokio::test]
async fn test_initialize_reads_connection_facts() {
    let (executor, catalog) = setup();
    executor.on_query(ADMIN_PROBE, RowFixtures::scalar("'YES'", "YES"));
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "APP"));

    catalog.initialize().await.unwrap();

    assert!(catalog.is_admin());
    assert!(catalog.is_admin_visible());
    assert_eq!(catalog.active_schema_name().as_deref(), Some("APP"));
    assert!(catalog.local_data_type("VARCHAR2").is_some());
    assert!(catalog.local_data_types().iter().all(|t| t.predefined));
    assert_eq!(executor.query_count("TYPES"), 0);
    assert_eq!(executor.open_sessions(), 0);
}

#[tokio::test]
async fn test_initialize_swallows_probe_failures() {
    let executor = MockExecutor::new();
    executor.on_fail(ADMIN_PROBE, SqlFailure::new("ORA-00942: table or view does not exist"));
    executor.on_fail(CURRENT_SCHEMA, SqlFailure::new("ORA-00904: invalid identifier"));
    let settings = ConnectionSettings {
        always_show_dba: true,
        ..Default::default()
    };
    let catalog = catalog_with(&executor, MemoryPreferenceStore::new()).with_settings(settings);

    catalog.initialize().await.unwrap();

    assert!(!catalog.is_admin());
    assert!(catalog.is_admin_visible());
    assert_eq!(catalog.active_schema_name(), None);
    assert!(catalog.local_data_type("NUMBER").is_some());
}

#[tokio::test]
async fn test_initialize_normalizes_empty_schema() {
    let (executor, catalog) = setup();
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", ""));

    catalog.initialize().await.unwrap();
    assert_eq!(catalog.active_schema_name(), None);
}

#[tokio::test]
async fn test_initialize_fails_without_session() {
    let (executor, catalog) = setup();
    executor.fail_sessions(SqlFailure::new("IO error: connection reset"));

    let err = catalog.initialize().await.unwrap_err();
    assert!(err.sql_failure().is_some());
    assert!(catalog.local_data_type("NUMBER").is_some());
}

#[tokio::test]
async fn test_failed_refresh_keeps_builtin_types() {
    let (executor, catalog) = setup();
    catalog.initialize().await.unwrap();

    executor.fail_sessions(SqlFailure::new("IO error: connection reset"));
    assert!(catalog.refresh().await.is_err());

    assert!(catalog.local_data_type("NUMBER").is_some());
    let resolved = catalog.resolve_data_type("NUMBER").await.unwrap().unwrap();
    assert!(resolved.predefined);
    assert!(!catalog.local_data_types().is_empty());
}

#[tokio::test]
async fn test_refresh_clears_and_reinitializes() {
    let (executor, catalog) = setup();
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["APP", "HR"]));
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "APP"));
    executor.on_query("DBA_ROLES", vec![RowFixtures::role("CONNECT")]);
    catalog.initialize().await.unwrap();

    catalog.schemas().await.unwrap();
    catalog.roles().await.unwrap();
    assert!(catalog.default_object().is_some());

    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "HR"));
    catalog.refresh().await.unwrap();
    assert_eq!(catalog.active_schema_name().as_deref(), Some("HR"));
    assert!(catalog.default_object().is_none());
    assert!(catalog.local_data_type("DATE").is_some());

    catalog.schemas().await.unwrap();
    catalog.roles().await.unwrap();
    assert_eq!(executor.query_count(SCHEMA_QUERY), 2);
    assert_eq!(executor.query_count("DBA_ROLES"), 2);

    // Safe to repeat
    catalog.refresh().await.unwrap();
    catalog.refresh().await.unwrap();
    assert_eq!(catalog.active_schema_name().as_deref(), Some("HR"));
}

// ===== Schemas =====

#[tokio::test]
async fn test_schemas_sorted_and_loaded_once() {
    let (executor, catalog) = setup();
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["SCOTT", "APP", "HR"]));

    let schemas = catalog.schemas().await.unwrap();
    let names: Vec<_> = schemas.iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["APP", "HR", "SCOTT"]);

    catalog.schemas().await.unwrap();
    assert!(catalog.get_schema("HR").await.unwrap().is_some());
    assert!(catalog.get_schema("NOBODY").await.unwrap().is_none());
    assert_eq!(executor.query_count(SCHEMA_QUERY), 1);
}

#[tokio::test]
async fn test_schema_query_depends_on_content_check() {
    let (executor, catalog) = setup();
    catalog.schemas().await.unwrap();
    assert_eq!(
        executor.query_count("U.USERNAME IN (SELECT DISTINCT OWNER FROM SYS.ALL_OBJECTS)"),
        1
    );

    let executor = MockExecutor::new();
    let settings = ConnectionSettings {
        check_schema_content: false,
        ..Default::default()
    };
    let catalog = catalog_with(&executor, MemoryPreferenceStore::new()).with_settings(settings);
    catalog.schemas().await.unwrap();
    assert_eq!(executor.query_count("U.USERNAME IS NOT NULL"), 1);
}

#[tokio::test]
async fn test_active_schema_placeholder_is_injected() {
    let (executor, catalog) = setup();
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "HIDDEN"));
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["APP", "ZED"]));
    catalog.initialize().await.unwrap();

    let schemas = catalog.schemas().await.unwrap();
    let names: Vec<_> = schemas.iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["APP", "HIDDEN", "ZED"]);

    let default = catalog.default_object().unwrap();
    assert_eq!(default.name(), "HIDDEN");
    assert_eq!(default.id(), 100);
}

#[tokio::test]
async fn test_public_schema_needs_no_query() {
    let (executor, catalog) = setup();

    let public = catalog.get_schema("PUBLIC").await.unwrap().unwrap();
    assert!(public.is_public());
    assert_eq!(public.id(), 1);
    assert_eq!(executor.query_count(SCHEMA_QUERY), 0);
}

#[tokio::test]
async fn test_admin_uses_dba_views_when_available() {
    let (executor, catalog) = setup();
    executor.on_query(ADMIN_PROBE, RowFixtures::scalar("'YES'", "YES"));
    catalog.initialize().await.unwrap();

    assert_eq!(catalog.admin_all_view("USERS").await, "SYS.DBA_USERS");

    executor.on_fail("SYS.DBA_TYPES WHERE 1<>1", SqlFailure::new("ORA-00942"));
    assert_eq!(catalog.admin_all_view("TYPES").await, "SYS.ALL_TYPES");
}

#[tokio::test]
async fn test_non_admin_uses_all_views_without_probe() {
    let (executor, catalog) = setup();
    catalog.initialize().await.unwrap();

    assert_eq!(catalog.admin_all_view("USERS").await, "SYS.ALL_USERS");
    assert_eq!(executor.query_count("WHERE 1<>1"), 0);
}

#[tokio::test]
async fn test_sys_user_view_falls_back_to_user_view() {
    let (executor, catalog) = setup();
    executor.on_fail("DBA_TABLESPACES WHERE 1<>1", SqlFailure::new("ORA-00942"));
    executor.on_query(
        "USER_TABLESPACES",
        vec![RowFixtures::tablespace("USERS", 8192), RowFixtures::tablespace("SYSTEM", 8192)],
    );

    let tablespaces = catalog.tablespaces().await.unwrap();
    assert_eq!(tablespaces.len(), 2);
    assert_eq!(tablespaces[0].name, "SYSTEM");
    assert!(tablespaces[0].is_online());
    assert_eq!(executor.query_count("SELECT * FROM SYS.USER_TABLESPACES"), 1);
}

#[tokio::test]
async fn test_rule_hint_in_type_query() {
    let executor = MockExecutor::new();
    let settings = ConnectionSettings {
        use_rule_hint: true,
        ..Default::default()
    };
    let catalog = catalog_with(&executor, MemoryPreferenceStore::new()).with_settings(settings);
    executor.on_query("WHERE OWNER IS NULL", vec![RowFixtures::data_type(None, "XMLTYPE", "OBJECT")]);

    let types = catalog.data_types().await.unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].kind, DataKind::Content);
    assert_eq!(executor.query_count("SELECT /*+RULE*/ * FROM SYS.ALL_TYPES"), 1);
}

// ===== View availability =====

#[tokio::test]
async fn test_view_probe_runs_once_per_view() {
    let (executor, catalog) = setup();

    assert!(catalog.is_view_available("SYS", "dba_users").await);
    assert!(catalog.is_view_available("SYS", "DBA_USERS").await);
    assert_eq!(executor.query_count("WHERE 1<>1"), 1);
    assert_eq!(executor.query_count("SELECT 1 FROM SYS.DBA_USERS WHERE 1<>1"), 1);
}

#[tokio::test]
async fn test_missing_view_verdict_is_remembered() {
    let (executor, catalog) = setup();
    executor.on_fail("V$SESSION", SqlFailure::new("ORA-00942: table or view does not exist"));

    assert!(!catalog.is_view_available("SYS", "V$SESSION").await);
    assert!(!catalog.is_view_available("SYS", "v$session").await);
    assert_eq!(executor.query_count("V$SESSION"), 1);
    assert_eq!(executor.open_sessions(), 0);
}

#[tokio::test]
async fn test_concurrent_view_probes_converge() {
    let (executor, catalog) = setup();
    executor.with_delay(Duration::from_millis(20));

    let (a, b) = tokio::join!(
        catalog.is_view_available("SYS", "DBA_OBJECTS"),
        catalog.is_view_available("SYS", "dba_objects"),
    );
    assert_eq!(a, b);
    assert_eq!(executor.query_count("DBA_OBJECTS"), 1);
}

#[tokio::test]
async fn test_view_memo_survives_refresh() {
    let (executor, catalog) = setup();
    catalog.is_view_available("SYS", "DBA_USERS").await;
    catalog.refresh().await.unwrap();
    catalog.is_view_available("SYS", "DBA_USERS").await;
    assert_eq!(executor.query_count("WHERE 1<>1"), 1);
}

// ===== Default schema =====

#[tokio::test]
async fn test_default_object_is_a_pure_cache_read() {
    let (executor, catalog) = setup();
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "APP"));
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["APP"]));
    catalog.initialize().await.unwrap();

    assert!(catalog.default_object().is_none());
    assert_eq!(executor.query_count(SCHEMA_QUERY), 0);

    catalog.schemas().await.unwrap();
    assert_eq!(catalog.default_object().unwrap().name(), "APP");
}

#[tokio::test]
async fn test_set_default_rejects_non_schema() {
    let (executor, catalog) = setup();
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "APP"));
    executor.on_query("ALL_USERS ORDER BY USERNAME", vec![RowFixtures::user("APP", 42, "OPEN")]);
    catalog.initialize().await.unwrap();

    let user = catalog.get_user("APP").await.unwrap().unwrap();
    let err = catalog
        .set_default_object(&CatalogEntity::User(user))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::InvalidArgument(_)));
    assert_eq!(catalog.active_schema_name().as_deref(), Some("APP"));
    assert_eq!(executor.query_count("ALTER SESSION"), 0);
}

#[tokio::test]
async fn test_set_default_switches_every_context_and_notifies() {
    let executor = MockExecutor::with_contexts(&["Main", "Metadata", "Editor"]);
    let listener = Arc::new(RecordingListener::default());
    let catalog = catalog_with(&executor, MemoryPreferenceStore::new())
        .with_listener(listener.clone());
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "APP"));
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["APP", "HR"]));
    catalog.initialize().await.unwrap();

    let hr = catalog.get_schema("HR").await.unwrap().unwrap();
    catalog.set_default_object(&CatalogEntity::Schema(hr)).await.unwrap();

    let switched: Vec<_> = executor
        .executed()
        .into_iter()
        .filter(|s| s.sql == "ALTER SESSION SET CURRENT_SCHEMA=HR")
        .map(|s| (s.context, s.purpose))
        .collect();
    assert_eq!(
        switched,
        vec![
            ("Main".to_string(), SessionPurpose::Util),
            ("Metadata".to_string(), SessionPurpose::Util),
            ("Editor".to_string(), SessionPurpose::Util),
        ]
    );
    assert_eq!(catalog.active_schema_name().as_deref(), Some("HR"));
    assert_eq!(
        *listener.events.lock(),
        vec![("APP".to_string(), false), ("HR".to_string(), true)]
    );
    assert_eq!(executor.open_sessions(), 0);
}

#[tokio::test]
async fn test_failed_switch_keeps_marker() {
    let (executor, catalog) = setup();
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "APP"));
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["APP", "HR"]));
    executor.on_fail("ALTER SESSION SET CURRENT_SCHEMA", SqlFailure::new("ORA-01435: user does not exist"));
    catalog.initialize().await.unwrap();

    let hr = catalog.get_schema("HR").await.unwrap().unwrap();
    assert!(catalog.set_default_object(&hr.into()).await.is_err());
    assert_eq!(catalog.active_schema_name().as_deref(), Some("APP"));
    assert_eq!(executor.open_sessions(), 0);
}

#[tokio::test]
async fn test_refresh_default_object() {
    let (executor, catalog) = setup();
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "APP"));
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["APP", "HR"]));
    catalog.initialize().await.unwrap();
    catalog.schemas().await.unwrap();

    let context = executor.default_context();
    let mut session = context.open_session(SessionPurpose::User, "query").await.unwrap();

    // Unchanged
    assert!(!catalog.refresh_default_object(session.as_mut()).await.unwrap());

    // Changed to a cached schema
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "HR"));
    assert!(catalog.refresh_default_object(session.as_mut()).await.unwrap());
    assert_eq!(catalog.active_schema_name().as_deref(), Some("HR"));

    // Changed to an unknown schema
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "GHOST"));
    assert!(!catalog.refresh_default_object(session.as_mut()).await.unwrap());
    assert_eq!(catalog.active_schema_name().as_deref(), Some("HR"));

    // Failure is not "no change"
    executor.on_fail(CURRENT_SCHEMA, SqlFailure::new("ORA-03113: end-of-file on communication channel"));
    assert!(catalog.refresh_default_object(session.as_mut()).await.is_err());
}

// ===== Lookups =====

#[tokio::test]
async fn test_grantee_prefers_user() {
    let (executor, catalog) = setup();
    executor.on_query("ALL_USERS ORDER BY USERNAME", vec![RowFixtures::user("ADMIN", 5, "OPEN")]);
    executor.on_query(
        "DBA_ROLES",
        vec![RowFixtures::role("ADMIN"), RowFixtures::role("RESOURCE")],
    );

    let admin = catalog.get_grantee("ADMIN").await.unwrap().unwrap();
    assert!(matches!(admin, Grantee::User(_)));

    let resource = catalog.get_grantee("RESOURCE").await.unwrap().unwrap();
    assert!(matches!(resource, Grantee::Role(_)));
    assert_eq!(resource.name(), "RESOURCE");

    assert!(catalog.get_grantee("NOBODY").await.unwrap().is_none());
}

#[tokio::test]
async fn test_resolve_data_type() {
    let (executor, catalog) = setup();
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["APP"]));
    executor.on_query(
        "ALL_TYPES WHERE OWNER=?",
        vec![RowFixtures::data_type(Some("APP"), "ADDRESS_T", "OBJECT")],
    );
    catalog.initialize().await.unwrap();

    let local = catalog.resolve_data_type("NUMBER").await.unwrap().unwrap();
    assert!(local.predefined);

    let user_type = catalog.resolve_data_type("APP.ADDRESS_T").await.unwrap().unwrap();
    assert_eq!(user_type.full_name(), "APP.ADDRESS_T");

    assert!(catalog.resolve_data_type("MYSCHEMA.MYTYPE").await.unwrap().is_none());
    assert!(catalog.resolve_data_type("APP.NOPE").await.unwrap().is_none());
}

#[tokio::test]
async fn test_resolve_data_kind() {
    let (_, catalog) = setup();
    assert_eq!(catalog.resolve_data_kind("SYS.XMLTYPE"), DataKind::Content);
    assert_eq!(catalog.resolve_data_kind("VARCHAR2"), DataKind::String);
    assert_eq!(catalog.resolve_data_kind("APP.ADDRESS_T"), DataKind::Object);
}

// ===== Profiles =====

#[tokio::test]
async fn test_profile_resources_load_per_parent() {
    let (executor, catalog) = setup();
    executor.on_query(
        "SELECT DISTINCT PROFILE",
        vec![RowFixtures::profile("DEFAULT"), RowFixtures::profile("APP_PROFILE")],
    );
    executor.on_query(
        "WHERE PROFILE=?",
        vec![
            RowFixtures::profile_resource("DEFAULT", "CPU_PER_CALL", "KERNEL", "UNLIMITED"),
            RowFixtures::profile_resource("DEFAULT", "SESSIONS_PER_USER", "KERNEL", "UNLIMITED"),
        ],
    );

    let profile = catalog.get_profile("DEFAULT").await.unwrap().unwrap();
    let resources = catalog.profile_resources(&profile).await.unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0].name, "CPU_PER_CALL");

    catalog.profile_resources(&profile).await.unwrap();
    assert_eq!(executor.query_count("WHERE PROFILE=?"), 1);

    let executed = executor.executed();
    let child_query = executed
        .iter()
        .find(|s| s.sql.contains("WHERE PROFILE=?"))
        .unwrap();
    assert_eq!(child_query.inputs, vec![SqlValue::from("DEFAULT")]);
}

#[tokio::test]
async fn test_profile_resources_bulk_load() {
    let (executor, catalog) = setup();
    executor.on_query(
        "SELECT DISTINCT PROFILE",
        vec![RowFixtures::profile("DEFAULT"), RowFixtures::profile("EMPTY")],
    );
    executor.on_query(
        "RESOURCE_NAME,RESOURCE_TYPE",
        vec![
            RowFixtures::profile_resource("DEFAULT", "IDLE_TIME", "KERNEL", "30"),
            RowFixtures::profile_resource("DROPPED", "IDLE_TIME", "KERNEL", "10"),
        ],
    );

    catalog.load_all_profile_resources().await.unwrap();
    assert_eq!(executor.query_count("RESOURCE_NAME,RESOURCE_TYPE"), 1);
    assert_eq!(executor.query_count("WHERE PROFILE=?"), 0);

    let default = catalog.get_profile("DEFAULT").await.unwrap().unwrap();
    let empty = catalog.get_profile("EMPTY").await.unwrap().unwrap();
    assert_eq!(catalog.profile_resources(&default).await.unwrap().len(), 1);
    assert!(catalog.profile_resources(&empty).await.unwrap().is_empty());
    assert_eq!(executor.query_count("RESOURCE_NAME,RESOURCE_TYPE"), 1);
}

#[tokio::test]
async fn test_refresh_drops_profile_children() {
    let (executor, catalog) = setup();
    executor.on_query("SELECT DISTINCT PROFILE", vec![RowFixtures::profile("DEFAULT")]);

    let old = catalog.get_profile("DEFAULT").await.unwrap().unwrap();
    catalog.profile_resources(&old).await.unwrap();
    catalog.refresh().await.unwrap();

    assert!(!old.child_list().is_loaded());
    let fresh = catalog.get_profile("DEFAULT").await.unwrap().unwrap();
    assert!(!fresh.child_list().is_loaded());
}

// ===== Schema contents =====

#[tokio::test]
async fn test_public_synonyms_skip_java_unless_reading_all() {
    let executor = MockExecutor::new();
    let catalog = catalog_with(
        &executor,
        MemoryPreferenceStore::new().with_value(PREF_DBMS_READ_ALL_SYNONYMS, false),
    );
    executor.on_query("ALL_SYNONYMS", vec![RowFixtures::synonym("DUAL", "SYS", "DUAL")]);

    let synonyms = catalog.public_synonyms().await.unwrap();
    assert_eq!(synonyms.len(), 1);
    assert_eq!(synonyms[0].owner, "PUBLIC");
    assert_eq!(executor.query_count("'JAVA CLASS','PACKAGE BODY'"), 1);
}

#[tokio::test]
async fn test_read_all_synonyms_by_default() {
    let (executor, catalog) = setup();

    catalog.public_synonyms().await.unwrap();
    assert_eq!(
        executor.query_count("SELECT * FROM ALL_SYNONYMS WHERE OWNER=? ORDER BY SYNONYM_NAME"),
        1
    );
    assert_eq!(executor.query_count("JAVA CLASS"), 0);
}

#[tokio::test]
async fn test_public_links_and_recycle_bin() {
    let (executor, catalog) = setup();
    executor.on_query("ALL_DB_LINKS", vec![RowFixtures::db_link("REMOTE", "SCOTT", "db2")]);
    executor.on_query(
        "FROM RECYCLEBIN",
        vec![RowFixtures::recycled_object("BIN$abc==$0", "EMP", "TABLE")],
    );

    let links = catalog.public_database_links().await.unwrap();
    assert_eq!(links[0].host.as_deref(), Some("db2"));

    let recycled = catalog.user_recycled_objects().await.unwrap();
    assert_eq!(recycled[0].original_name.as_deref(), Some("EMP"));
    assert_eq!(executor.query_count("DBA_RECYCLEBIN"), 0);
}

#[tokio::test]
async fn test_other_schema_reads_dba_recycle_bin() {
    let (executor, catalog) = setup();
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["APP"]));

    let app = catalog.get_schema("APP").await.unwrap().unwrap();
    app.recycled_objects().await.unwrap();
    assert_eq!(executor.query_count("FROM DBA_RECYCLEBIN WHERE OWNER=?"), 1);
}

// ===== Execution services =====

#[tokio::test]
async fn test_cancel_uses_statement_cancel_when_supported() {
    let (executor, catalog) = setup();
    let context = executor.default_context();

    catalog.cancel_statement_execute(context.as_ref()).await.unwrap();
    assert_eq!(executor.statement_cancels(), 1);
    assert_eq!(executor.connection_cancels(), 0);

    executor.set_statement_cancel_supported(false);
    catalog.cancel_statement_execute(context.as_ref()).await.unwrap();
    assert_eq!(executor.statement_cancels(), 1);
    assert_eq!(executor.connection_cancels(), 1);
}

#[tokio::test]
async fn test_capabilities_and_features() {
    let (executor, catalog) = setup();

    assert!(matches!(
        catalog.capability(Capability::ServerOutputReader),
        Some(CapabilityRef::ServerOutput(_))
    ));
    assert!(matches!(
        catalog.capability(Capability::QueryPlanner),
        Some(CapabilityRef::Planner(_))
    ));
    assert!(matches!(
        catalog.capability(Capability::ErrorAssistant),
        Some(CapabilityRef::ErrorAssistant(_))
    ));
    assert_eq!(catalog.feature(Feature::MaxStringLength), Some(4000));
    assert_eq!(catalog.plan_style(), PlanStyle::Plan);

    assert!(!catalog.is_at_least(11));
    executor.set_server_version(12, 2);
    assert!(catalog.is_at_least(11));
    assert!(catalog.is_at_least(12));
    assert!(!catalog.is_at_least(18));
}

#[tokio::test]
async fn test_plan_table_search_order() {
    let (executor, catalog) = setup();
    executor.on_fail("SELECT 1 FROM PLAN_TABLE", SqlFailure::new("ORA-00942"));
    let context = executor.default_context();
    let mut session = context.open_session(SessionPurpose::Util, "plan").await.unwrap();

    let table = catalog.plan_table_name(session.as_mut()).await.unwrap();
    assert_eq!(table.as_deref(), Some("TOAD_PLAN_TABLE"));

    catalog.plan_table_name(session.as_mut()).await.unwrap();
    assert_eq!(executor.query_count("SELECT 1 FROM TOAD_PLAN_TABLE"), 1);
}

#[tokio::test]
async fn test_plan_table_created_on_confirmation() {
    let executor = MockExecutor::new();
    let interaction = Arc::new(RecordingInteraction::new().confirming(true));
    let catalog = catalog_with(&executor, MemoryPreferenceStore::new())
        .with_interaction(interaction.clone());
    executor.on_fail("SELECT 1 FROM", SqlFailure::new("ORA-00942"));
    let context = executor.default_context();
    let mut session = context.open_session(SessionPurpose::Util, "plan").await.unwrap();

    let table = catalog.plan_table_name(session.as_mut()).await.unwrap();
    assert_eq!(table.as_deref(), Some("PLAN_TABLE"));
    assert_eq!(interaction.confirmations().len(), 1);
    assert_eq!(executor.query_count("CREATE GLOBAL TEMPORARY TABLE PLAN_TABLE ("), 1);
}

#[tokio::test]
async fn test_plan_without_table_is_not_supported() {
    let (executor, catalog) = setup();
    executor.on_fail("SELECT 1 FROM", SqlFailure::new("ORA-00942"));
    let context = executor.default_context();
    let mut session = context.open_session(SessionPurpose::Util, "plan").await.unwrap();

    let err = catalog
        .plan_query_execution(session.as_mut(), "SELECT * FROM EMP")
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotSupported(_)));
    assert_eq!(executor.query_count("CREATE GLOBAL TEMPORARY TABLE"), 0);
}

#[tokio::test]
async fn test_configured_plan_table_is_used() {
    let executor = MockExecutor::new();
    let catalog = catalog_with(
        &executor,
        MemoryPreferenceStore::new().with_value(PREF_EXPLAIN_TABLE_NAME, "APP.MY_PLAN"),
    );
    let context = executor.default_context();
    let mut session = context.open_session(SessionPurpose::Util, "plan").await.unwrap();

    let plan = catalog
        .plan_query_execution(session.as_mut(), "SELECT * FROM EMP")
        .await
        .unwrap();
    assert_eq!(plan.query_string(), "SELECT * FROM EMP");
    assert_eq!(executor.query_count("INTO APP.MY_PLAN FOR SELECT * FROM EMP"), 1);
    assert_eq!(executor.query_count("PLAN_TABLE"), 0);
}

#[tokio::test]
async fn test_initialize_context_state() {
    let executor = MockExecutor::new();
    let settings = ConnectionSettings {
        session_language: Some("AMERICAN".into()),
        session_territory: Some("AMERICA".into()),
        nls_date_format: Some("YYYY-MM-DD".into()),
        ..Default::default()
    };
    let catalog = catalog_with(
        &executor,
        MemoryPreferenceStore::new().with_value(PREF_DBMS_OUTPUT, true),
    )
    .with_settings(settings);
    executor.on_query(CURRENT_SCHEMA, RowFixtures::scalar("SCHEMA", "APP"));
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["APP"]));
    executor.on_fail("NLS_TERRITORY", SqlFailure::new("ORA-12705: invalid NLS parameter"));
    catalog.initialize().await.unwrap();
    catalog.schemas().await.unwrap();

    let context = executor.default_context();
    catalog.initialize_context_state(context.as_ref(), true).await.unwrap();

    assert_eq!(executor.query_count("BEGIN DBMS_OUTPUT.ENABLE(1000000); END;"), 1);
    assert_eq!(executor.query_count("ALTER SESSION SET CURRENT_SCHEMA=APP"), 1);
    assert_eq!(executor.query_count("ALTER SESSION SET NLS_LANGUAGE='AMERICAN'"), 1);
    assert_eq!(executor.query_count("ALTER SESSION SET NLS_DATE_FORMAT='YYYY-MM-DD'"), 1);
    assert_eq!(executor.open_sessions(), 0);
}

#[tokio::test]
async fn test_initialize_context_state_disables_output() {
    let executor = MockExecutor::new();
    let catalog = catalog_with(
        &executor,
        MemoryPreferenceStore::new().with_value(PREF_DBMS_OUTPUT, false),
    );
    let context = executor.default_context();

    catalog.initialize_context_state(context.as_ref(), true).await.unwrap();
    assert_eq!(executor.query_count("BEGIN DBMS_OUTPUT.DISABLE; END;"), 1);
    assert_eq!(executor.query_count("ALTER SESSION"), 0);
}

#[tokio::test]
async fn test_concurrent_schema_listing() {
    let (executor, catalog) = setup();
    executor.on_query(SCHEMA_QUERY, RowFixtures::schemas(&["A", "B"]));
    executor.with_delay(Duration::from_millis(30));

    let (first, second) = tokio::join!(catalog.schemas(), catalog.schemas());
    assert_eq!(first.unwrap().len(), 2);
    assert_eq!(second.unwrap().len(), 2);
    assert_eq!(executor.query_count(SCHEMA_QUERY), 1);
    assert_eq!(executor.open_sessions(), 0);
}

#[tokio::test]
async fn test_fresh_store_gets_preference_defaults() {
    let executor = MockExecutor::new();
    let prefs = Arc::new(MemoryPreferenceStore::new());
    let catalog = XuguCatalog::new(Arc::new(executor.clone()), prefs.clone());

    assert!(catalog.output_reader().is_enabled());
    let loaded = XuguPreferences::load(prefs.as_ref());
    assert_eq!(loaded, XuguPreferences::default());
    assert!(!XuguPreferences::has_data_source_specific_options(prefs.as_ref()));

    let context = executor.default_context();
    catalog.initialize_context_state(context.as_ref(), false).await.unwrap();
    assert_eq!(executor.query_count("BEGIN DBMS_OUTPUT.ENABLE(1000000); END;"), 1);
}
