//! Integration tests for catalog adapters
//!
//! Mock adapter tests always run. Tests against a real PostgreSQL server are
//! marked with `#[ignore]` and read their connection from the usual libpq
//! environment variables:
//!
//! ```bash
//! PGHOST=localhost \
//! PGPORT=5432 \
//! PGDATABASE=postgres \
//! PGUSER=postgres \
//! PGPASSWORD=pass \
//! cargo test -p modelgen-catalog --test integration_tests -- --ignored
//! ```

mod fixtures;

use modelgen_catalog::{
    CatalogAdapter, CatalogConnector, CatalogError, ConnectionParams, MockAdapter, MockAdapterBuilder,
    PostgresAdapter, PostgresConnector, ReadinessProbe,
};
use pretty_assertions::assert_eq;

// =============================================================================
// Helper Functions
// =============================================================================

/// Connection parameters from PG* variables, if a server is configured
fn postgres_params() -> Option<ConnectionParams> {
    let host = std::env::var("PGHOST").ok()?;
    let port = std::env::var("PGPORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5432);
    let database = std::env::var("PGDATABASE").unwrap_or_else(|_| "postgres".to_string());
    let user = std::env::var("PGUSER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("PGPASSWORD").unwrap_or_default();

    Some(ConnectionParams::new(host, port, database, user, password))
}

/// Create a fresh schema for one test and return its name
async fn scratch_schema(adapter: &PostgresAdapter, name: &str) -> String {
    let schema = format!("modelgen_it_{}", name);
    adapter
        .execute_script(&format!(
            "DROP SCHEMA IF EXISTS {schema} CASCADE; CREATE SCHEMA {schema};"
        ))
        .await
        .unwrap();
    schema
}

async fn drop_schema(adapter: &PostgresAdapter, schema: &str) {
    let _ = adapter
        .execute_script(&format!("DROP SCHEMA IF EXISTS {} CASCADE;", schema))
        .await;
}

// =============================================================================
// Mock Adapter Tests
// =============================================================================

#[tokio::test]
async fn test_mock_lists_tables_in_insertion_order() {
    let adapter = MockAdapterBuilder::new()
        .with_table(fixtures::order_item_table())
        .with_table(fixtures::customer_table())
        .build();

    let tables = adapter.list_tables("public").await.unwrap();
    assert_eq!(tables, vec!["order_item", "customer"]);
}

#[tokio::test]
async fn test_mock_describe_preserves_ordinal_order() {
    let adapter = MockAdapter::new();
    adapter.add_table(fixtures::customer_table()).await;

    let table = adapter.describe_table("public", "customer").await.unwrap();
    assert_eq!(table.field_names(), vec!["id", "name", "created_at", "birthday"]);
    let ordinals: Vec<u32> = table.fields.iter().map(|f| f.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_mock_list_failure() {
    let adapter = MockAdapter::new()
        .with_list_failure(CatalogError::QueryError("permission denied for schema".to_string()));

    let result = adapter.list_tables("public").await;
    assert!(matches!(result, Err(CatalogError::QueryError(_))));
}

#[tokio::test]
async fn test_mock_table_error_added_later() {
    let adapter = MockAdapter::new();
    adapter.add_table(fixtures::order_item_table()).await;
    adapter
        .add_error_for_table(
            "public",
            "order_item",
            CatalogError::InvalidResponse("bad row".to_string()),
        )
        .await;

    let result = adapter.describe_table("public", "order_item").await;
    assert!(matches!(result, Err(CatalogError::InvalidResponse(_))));
}

// =============================================================================
// PostgreSQL Tests (require a server)
// =============================================================================

#[tokio::test]
#[ignore]
async fn test_postgres_describe_order_item() {
    let Some(params) = postgres_params() else {
        eprintln!("Skipping: PGHOST not set");
        return;
    };

    let adapter = PostgresAdapter::connect(&params).await.unwrap();
    let schema = scratch_schema(&adapter, "describe").await;

    adapter
        .execute_script(&format!(
            "SET search_path TO {schema}; {ddl} CREATE VIEW order_item_view AS SELECT id FROM order_item;",
            schema = schema,
            ddl = fixtures::ORDER_ITEM_DDL
        ))
        .await
        .unwrap();

    let tables = adapter.list_tables(&schema).await.unwrap();
    assert_eq!(tables, vec!["order_item"], "views must be excluded");

    let table = adapter.describe_table(&schema, "order_item").await.unwrap();
    let mut expected = fixtures::order_item_table();
    expected.schema_name = schema.clone();
    assert_eq!(table, expected);

    drop_schema(&adapter, &schema).await;
}

#[tokio::test]
#[ignore]
async fn test_postgres_failed_script_is_rolled_back() {
    let Some(params) = postgres_params() else {
        eprintln!("Skipping: PGHOST not set");
        return;
    };

    let adapter = PostgresAdapter::connect(&params).await.unwrap();
    let schema = scratch_schema(&adapter, "rollback").await;

    let result = adapter
        .execute_script(&format!(
            "CREATE TABLE {schema}.good (id integer); INSERT INTO {schema}.missing VALUES (1);",
            schema = schema
        ))
        .await;
    assert!(matches!(result, Err(CatalogError::ScriptFailed(_))));

    // The connection is usable again and nothing was committed.
    let tables = adapter.list_tables(&schema).await.unwrap();
    assert!(tables.is_empty());

    drop_schema(&adapter, &schema).await;
}

#[tokio::test]
#[ignore]
async fn test_postgres_connector_probe_and_connect() {
    let Some(params) = postgres_params() else {
        eprintln!("Skipping: PGHOST not set");
        return;
    };

    let connector = PostgresConnector::new(params);
    connector.probe().await.unwrap();

    let catalog = connector.connect().await.unwrap();
    assert_eq!(catalog.name(), "PostgreSQL");
}
