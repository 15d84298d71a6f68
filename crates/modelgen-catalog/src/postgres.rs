//! PostgreSQL catalog adapter using information_schema
//!
//! One adapter owns exactly one connection. Every operation locks it for its
//! whole duration, so a script transaction (`BEGIN`, body, `COMMIT` or
//! `ROLLBACK`) can never interleave with another query.
//!
//! Reference: https://www.postgresql.org/docs/current/information-schema.html

use crate::adapter::{CatalogAdapter, CatalogConnector, CatalogError, ConnectionParams, ReadinessProbe};
use modelgen_core::{FieldDefinition, TableDefinition};
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls};

// information_schema columns are domain types; cast everything to plain
// types so the driver can decode them.
const LIST_TABLES_SQL: &str = r#"
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema::text = $1
      AND table_type::text = $2
"#;

const DESCRIBE_TABLE_SQL: &str = r#"
    SELECT
        ordinal_position::int4,
        column_name::text,
        data_type::text,
        is_nullable::text,
        column_default::text
    FROM information_schema.columns
    WHERE table_schema::text = $1
      AND table_name::text = $2
    ORDER BY ordinal_position ASC
"#;

const BASE_TABLE: &str = "BASE TABLE";

/// Render a driver error with the server's message when there is one
fn describe_pg_error(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => format!("{} ({})", db.message(), db.code().code()),
        None => err.to_string(),
    }
}

/// Build a field from one `information_schema.columns` row
fn field_from_catalog(
    ordinal: i32,
    field_name: String,
    data_type: String,
    is_nullable: &str,
    column_default: Option<String>,
) -> Result<FieldDefinition, CatalogError> {
    let ordinal = u32::try_from(ordinal)
        .ok()
        .filter(|o| *o > 0)
        .ok_or_else(|| CatalogError::InvalidResponse(format!(
            "column {} has invalid ordinal {}",
            field_name, ordinal
        )))?;

    Ok(FieldDefinition::new(ordinal, field_name, data_type)
        .nullable(is_nullable == "YES")
        .with_default(column_default.is_some()))
}

/// Open a connection and drive it on a background task
async fn open(params: &ConnectionParams) -> Result<Client, CatalogError> {
    let (client, connection) = params
        .pg_config()
        .connect(NoTls)
        .await
        .map_err(|e| CatalogError::ConnectionError(format!(
            "Failed to connect to PostgreSQL at {}: {}",
            params.endpoint(),
            describe_pg_error(&e)
        )))?;

    let endpoint = params.endpoint();
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::warn!("PostgreSQL connection error ({}): {}", endpoint, e);
        }
    });

    Ok(client)
}

/// PostgreSQL catalog adapter
pub struct PostgresAdapter {
    client: Mutex<Client>,
    params: ConnectionParams,
}

impl PostgresAdapter {
    /// Connect with the given parameters
    pub async fn connect(params: &ConnectionParams) -> Result<Self, CatalogError> {
        let client = open(params).await?;
        tracing::debug!("Connected to {}", params);

        Ok(Self {
            client: Mutex::new(client),
            params: params.clone(),
        })
    }

    /// Connection parameters this adapter was opened with
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }
}

#[async_trait::async_trait]
impl CatalogAdapter for PostgresAdapter {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    async fn execute_script(&self, sql: &str) -> Result<(), CatalogError> {
        let client = self.client.lock().await;

        client
            .batch_execute("BEGIN")
            .await
            .map_err(|e| CatalogError::TransactionError(format!(
                "Failed to begin transaction: {}",
                describe_pg_error(&e)
            )))?;

        if let Err(e) = client.batch_execute(sql).await {
            let cause = describe_pg_error(&e);
            if let Err(rollback) = client.batch_execute("ROLLBACK").await {
                return Err(CatalogError::TransactionError(format!(
                    "Script failed ({}) and rollback failed: {}",
                    cause,
                    describe_pg_error(&rollback)
                )));
            }
            return Err(CatalogError::ScriptFailed(cause));
        }

        client
            .batch_execute("COMMIT")
            .await
            .map_err(|e| CatalogError::TransactionError(format!(
                "Failed to commit: {}",
                describe_pg_error(&e)
            )))
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        let client = self.client.lock().await;

        let rows = client
            .query(LIST_TABLES_SQL, &[&schema, &BASE_TABLE])
            .await
            .map_err(|e| CatalogError::QueryError(format!(
                "Cannot list tables in schema {}: {}",
                schema,
                describe_pg_error(&e)
            )))?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row
                .try_get(0)
                .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
            tables.push(name);
        }

        Ok(tables)
    }

    async fn describe_table(&self, schema: &str, table: &str) -> Result<TableDefinition, CatalogError> {
        let client = self.client.lock().await;

        let rows = client
            .query(DESCRIBE_TABLE_SQL, &[&schema, &table])
            .await
            .map_err(|e| CatalogError::QueryError(format!(
                "Cannot describe {}.{}: {}",
                schema,
                table,
                describe_pg_error(&e)
            )))?;

        let mut fields = Vec::with_capacity(rows.len());

        for row in &rows {
            let decode = |e: tokio_postgres::Error| {
                CatalogError::InvalidResponse(format!("{}.{}: {}", schema, table, e))
            };

            let ordinal: i32 = row.try_get(0).map_err(decode)?;
            let field_name: String = row.try_get(1).map_err(decode)?;
            let data_type: String = row.try_get(2).map_err(decode)?;
            let is_nullable: String = row.try_get(3).map_err(decode)?;
            let column_default: Option<String> = row.try_get(4).map_err(decode)?;

            let field = field_from_catalog(ordinal, field_name, data_type, &is_nullable, column_default)
                .map_err(|e| match e {
                    CatalogError::InvalidResponse(msg) => {
                        CatalogError::InvalidResponse(format!("{}.{}: {}", schema, table, msg))
                    }
                    other => other,
                })?;
            fields.push(field);
        }

        Ok(TableDefinition::new(schema, table, fields))
    }
}

/// Connects to PostgreSQL described by fixed parameters
///
/// As a probe it opens a connection and closes it again.
pub struct PostgresConnector {
    params: ConnectionParams,
}

impl PostgresConnector {
    pub fn new(params: ConnectionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }
}

#[async_trait::async_trait]
impl ReadinessProbe for PostgresConnector {
    async fn probe(&self) -> Result<(), CatalogError> {
        let client = open(&self.params).await?;
        drop(client);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogConnector for PostgresConnector {
    async fn connect(&self) -> Result<Box<dyn CatalogAdapter>, CatalogError> {
        Ok(Box::new(PostgresAdapter::connect(&self.params).await?))
    }
}
