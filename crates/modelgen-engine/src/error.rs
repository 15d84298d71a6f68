//! Pipeline error types

use crate::pipeline::PipelineState;
use modelgen_catalog::CatalogError;
use modelgen_codegen::EmitError;
use modelgen_container::ContainerError;
use modelgen_core::ConfigError;
use std::path::PathBuf;

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Errors raised while bringing the schema to its desired state
#[derive(Debug, thiserror::Error)]
pub enum SchemaInitError {
    #[error("Cannot read DDL script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("DDL script {path} failed: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },

    #[error("Cannot run migration command `{command}`: {source}")]
    MigrationSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration command `{command}` exited with {}", describe_exit(.exit_code))]
    MigrationFailed {
        command: String,
        exit_code: Option<i32>,
    },
}

/// Errors that abort a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Image pull, container creation or a lifecycle transition failed
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Database not ready after {attempts} attempts: {last_error}")]
    ReadinessTimeout { attempts: u32, last_error: String },

    #[error("Cannot connect to database: {0}")]
    Connection(#[source] CatalogError),

    #[error("Schema initialization failed: {0}")]
    SchemaInit(#[from] SchemaInitError),

    #[error("Introspection failed: {0}")]
    Introspection(#[source] CatalogError),

    #[error("Cannot write generated model: {0}")]
    Io(#[from] EmitError),

    #[error("Run cancelled in state {0}")]
    Cancelled(PipelineState),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_failure_reports_exit_code() {
        let err = SchemaInitError::MigrationFailed {
            command: "npm run migrate".to_string(),
            exit_code: Some(3),
        };
        assert_eq!(err.to_string(), "Migration command `npm run migrate` exited with status 3");

        let signalled = SchemaInitError::MigrationFailed {
            command: "make".to_string(),
            exit_code: None,
        };
        assert!(signalled.to_string().contains("terminated by signal"));
    }

    #[test]
    fn config_errors_convert() {
        let err: PipelineError = ConfigError::MissingInitMethod.into();
        assert!(matches!(err, PipelineError::Configuration(ConfigError::MissingInitMethod)));
        assert!(err.to_string().contains("no initialization method"));
    }
}
