//! Catalog adapter trait and connection parameters

use modelgen_core::{DatabaseSettings, TableDefinition};
use std::fmt;

/// Where and how to connect to the database
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Database name
    pub database: String,

    /// Username
    pub user: String,

    /// Password
    pub password: String,
}

impl ConnectionParams {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Parameters for the container described by `settings`, reached on localhost
    pub fn for_container(settings: &DatabaseSettings) -> Self {
        Self::new(
            "localhost",
            settings.host_port,
            &settings.name,
            &settings.user,
            &settings.password,
        )
    }

    /// Build the driver configuration
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.database)
            .user(&self.user)
            .password(&self.password);
        config
    }

    /// `host:port/database`
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

// Keeps the password out of logs.
impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.endpoint())
    }
}

/// Errors that can occur when talking to the catalog
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Script failed and was rolled back: {0}")]
    ScriptFailed(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),
}

/// Trait for catalogs that can apply DDL and describe base tables
#[async_trait::async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Get the adapter name (e.g., "PostgreSQL")
    fn name(&self) -> &'static str;

    /// Run `sql` as one batch inside a single transaction.
    ///
    /// On failure the transaction is rolled back before the error is returned,
    /// so none of the script's effects are committed.
    async fn execute_script(&self, sql: &str) -> Result<(), CatalogError>;

    /// List base tables (views excluded) in `schema`.
    ///
    /// Order is unspecified; callers sort before relying on it.
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError>;

    /// Describe one table, fields in ascending ordinal order.
    ///
    /// Either every column is returned or an error; never a partial list.
    async fn describe_table(&self, schema: &str, table: &str) -> Result<TableDefinition, CatalogError>;
}

/// A single connect-and-disconnect attempt used to detect readiness
#[async_trait::async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn probe(&self) -> Result<(), CatalogError>;
}

/// Opens catalog sessions against a database that may not be up yet
///
/// The probe side is used while waiting for readiness; `connect` is called
/// once the database accepts connections.
#[async_trait::async_trait]
pub trait CatalogConnector: ReadinessProbe {
    async fn connect(&self) -> Result<Box<dyn CatalogAdapter>, CatalogError>;
}
