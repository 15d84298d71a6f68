//! modelgen Core
//!
//! Shared domain model: pipeline configuration and the catalog metadata
//! types that flow from introspection into code generation.

pub mod config;
pub mod schema;

pub use config::{
    ConfigError, DatabaseSettings, InitMethod, PipelineConfig, ReadinessSettings,
    CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE,
};
pub use schema::{FieldDefinition, TableDefinition};
