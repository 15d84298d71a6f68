//! Mock catalog adapter for testing
//!
//! Serves predefined table definitions without connecting to any database.
//! It's useful for:
//! - Unit testing the pipeline coordinator without Docker
//! - Simulating query and script failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modelgen_catalog::{CatalogAdapter, MockAdapter};
//! use modelgen_core::{FieldDefinition, TableDefinition};
//!
//! let adapter = MockAdapter::new();
//! adapter.add_table(TableDefinition::new("public", "users", vec![
//!     FieldDefinition::new(1, "id", "integer"),
//! ])).await;
//!
//! let tables = adapter.list_tables("public").await?;
//! ```

use crate::adapter::{CatalogAdapter, CatalogConnector, CatalogError, ReadinessProbe};
use modelgen_core::TableDefinition;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

fn table_key(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}

/// Mock catalog adapter for testing
///
/// Tables are returned from `list_tables` in insertion order, which lets tests
/// check that callers sort them. Scripts are "committed" only when they
/// succeed, mirroring a rolled-back transaction on failure.
pub struct MockAdapter {
    /// Predefined tables, in insertion order
    tables: Arc<RwLock<Vec<TableDefinition>>>,

    /// Errors to return for specific tables, keyed by `schema.table`
    errors: Arc<RwLock<HashMap<String, CatalogError>>>,

    /// Error returned by `list_tables`
    list_error: Option<CatalogError>,

    /// Error message returned by `execute_script`
    script_error: Option<String>,

    /// Scripts that ran to completion
    committed: Arc<RwLock<Vec<String>>>,

    /// Number of catalog calls made
    calls: Arc<AtomicU32>,
}

impl MockAdapter {
    /// Create a new mock adapter with no tables
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Vec::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            list_error: None,
            script_error: None,
            committed: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Add a table definition
    pub async fn add_table(&self, table: TableDefinition) {
        self.tables.write().await.push(table);
    }

    /// Configure an error to be returned when describing a specific table
    pub async fn add_error_for_table(&self, schema: &str, table: &str, error: CatalogError) {
        self.errors.write().await.insert(table_key(schema, table), error);
    }

    /// Make `list_tables` fail
    pub fn with_list_failure(mut self, error: CatalogError) -> Self {
        self.list_error = Some(error);
        self
    }

    /// Make every script fail (and roll back) with `message`
    pub fn with_script_failure(mut self, message: impl Into<String>) -> Self {
        self.script_error = Some(message.into());
        self
    }

    /// Scripts whose transaction committed
    pub async fn committed_scripts(&self) -> Vec<String> {
        self.committed.read().await.clone()
    }

    /// Number of catalog calls received (scripts, listings and descriptions)
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockAdapter {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            errors: Arc::clone(&self.errors),
            list_error: self.list_error.clone(),
            script_error: self.script_error.clone(),
            committed: Arc::clone(&self.committed),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait::async_trait]
impl CatalogAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn execute_script(&self, sql: &str) -> Result<(), CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.script_error {
            return Err(CatalogError::ScriptFailed(message.clone()));
        }

        self.committed.write().await.push(sql.to_string());
        Ok(())
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = &self.list_error {
            return Err(error.clone());
        }

        Ok(self
            .tables
            .read()
            .await
            .iter()
            .filter(|t| t.schema_name == schema)
            .map(|t| t.table_name.clone())
            .collect())
    }

    async fn describe_table(&self, schema: &str, table: &str) -> Result<TableDefinition, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.errors.read().await.get(&table_key(schema, table)) {
            return Err(error.clone());
        }

        // An unknown table has no columns, as with information_schema.
        let tables = self.tables.read().await;
        Ok(tables
            .iter()
            .find(|t| t.schema_name == schema && t.table_name == table)
            .cloned()
            .unwrap_or_else(|| TableDefinition::new(schema, table, Vec::new())))
    }
}

/// Builder for creating MockAdapter with multiple tables
///
/// ```rust,ignore
/// let adapter = MockAdapterBuilder::new()
///     .with_table(users_table())
///     .with_table(orders_table())
///     .build();
/// ```
pub struct MockAdapterBuilder {
    tables: Vec<TableDefinition>,
    errors: HashMap<String, CatalogError>,
    list_error: Option<CatalogError>,
    script_error: Option<String>,
}

impl MockAdapterBuilder {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            errors: HashMap::new(),
            list_error: None,
            script_error: None,
        }
    }

    /// Add a table definition
    pub fn with_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    /// Add an error for a specific table
    pub fn with_error(mut self, schema: &str, table: &str, error: CatalogError) -> Self {
        self.errors.insert(table_key(schema, table), error);
        self
    }

    /// Make `list_tables` fail
    pub fn with_list_failure(mut self, error: CatalogError) -> Self {
        self.list_error = Some(error);
        self
    }

    /// Make scripts fail
    pub fn with_script_failure(mut self, message: impl Into<String>) -> Self {
        self.script_error = Some(message.into());
        self
    }

    /// Build the MockAdapter
    pub fn build(self) -> MockAdapter {
        MockAdapter {
            tables: Arc::new(RwLock::new(self.tables)),
            errors: Arc::new(RwLock::new(self.errors)),
            list_error: self.list_error,
            script_error: self.script_error,
            committed: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl Default for MockAdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Readiness probe that fails a fixed number of times before succeeding
#[derive(Clone)]
pub struct MockProbe {
    failures_before_ready: Option<u32>,
    attempts: Arc<AtomicU32>,
}

impl MockProbe {
    /// Succeed on attempt `failures + 1`
    pub fn ready_after(failures: u32) -> Self {
        Self {
            failures_before_ready: Some(failures),
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Never succeed
    pub fn never_ready() -> Self {
        Self {
            failures_before_ready: None,
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ReadinessProbe for MockProbe {
    async fn probe(&self) -> Result<(), CatalogError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        match self.failures_before_ready {
            Some(failures) if attempt > failures => Ok(()),
            _ => Err(CatalogError::ConnectionError(format!(
                "Simulated connection refusal (attempt {})",
                attempt
            ))),
        }
    }
}

/// Connector handing out clones of a [`MockAdapter`]
#[derive(Clone)]
pub struct MockConnector {
    adapter: MockAdapter,
    probe: MockProbe,
    fail_connect: bool,
}

impl MockConnector {
    /// Ready immediately, serving `adapter`
    pub fn new(adapter: MockAdapter) -> Self {
        Self {
            adapter,
            probe: MockProbe::ready_after(0),
            fail_connect: false,
        }
    }

    /// Use `probe` for readiness checks
    pub fn with_probe(mut self, probe: MockProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Make `connect` fail even after the probe succeeds
    pub fn with_connect_failure(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn adapter(&self) -> &MockAdapter {
        &self.adapter
    }

    pub fn probe_attempts(&self) -> u32 {
        self.probe.attempts()
    }
}

#[async_trait::async_trait]
impl ReadinessProbe for MockConnector {
    async fn probe(&self) -> Result<(), CatalogError> {
        self.probe.probe().await
    }
}

#[async_trait::async_trait]
impl CatalogConnector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn CatalogAdapter>, CatalogError> {
        if self.fail_connect {
            return Err(CatalogError::ConnectionError("Simulated connection failure".to_string()));
        }
        Ok(Box::new(self.adapter.clone()))
    }
}
