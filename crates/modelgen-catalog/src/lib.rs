//! Catalog access for schema introspection
//!
//! This crate talks to the disposable PostgreSQL instance: it applies DDL
//! scripts inside a transaction, lists base tables and reads column metadata
//! from `information_schema`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use modelgen_catalog::{CatalogAdapter, ConnectionParams, PostgresAdapter};
//!
//! let params = ConnectionParams::new("localhost", 45432, "setup", "setup", "s3cr3t");
//! let adapter = PostgresAdapter::connect(&params).await?;
//! let mut tables = adapter.list_tables("public").await?;
//! tables.sort();
//! let order_item = adapter.describe_table("public", "order_item").await?;
//! ```

pub mod adapter;
pub mod mock;
pub mod postgres;

pub use adapter::{CatalogAdapter, CatalogConnector, CatalogError, ConnectionParams, ReadinessProbe};
pub use mock::{MockAdapter, MockAdapterBuilder, MockConnector, MockProbe};
pub use postgres::{PostgresAdapter, PostgresConnector};
