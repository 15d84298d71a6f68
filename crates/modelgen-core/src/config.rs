//! Pipeline configuration (.tsooq.json)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file used when neither `--config` nor `CONFIG` is given
pub const DEFAULT_CONFIG_FILE: &str = "./.tsooq.json";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "CONFIG";

/// Disposable database container settings
///
/// The defaults pin the image and use a non-default host port so a developer's
/// own database on 5432 is left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Image name
    pub image: String,

    /// Image tag
    pub tag: String,

    /// Container name (fixed, so overlapping runs fail at creation)
    pub container_name: String,

    /// Host port bound to the container's 5432/tcp
    pub host_port: u16,

    /// Database user
    pub user: String,

    /// Database password
    pub password: String,

    /// Database name
    pub name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            image: "postgres".to_string(),
            tag: "12.4-alpine".to_string(),
            container_name: "db-setup".to_string(),
            host_port: 45432,
            user: "setup".to_string(),
            password: "s3cr3t".to_string(),
            name: "setup".to_string(),
        }
    }
}

impl DatabaseSettings {
    /// Full image reference (`name:tag`)
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }
}

/// Readiness polling bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadinessSettings {
    /// Delay between connection attempts, in milliseconds
    pub interval_ms: u64,

    /// Attempts before giving up
    pub max_attempts: u32,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: 60,
        }
    }
}

impl ReadinessSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// How the schema gets initialized, resolved first-match from the config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMethod<'a> {
    /// Run a DDL script inside a single transaction
    DdlScript(&'a Path),

    /// Run an external migration command as a subprocess
    MigrationCommand {
        command: &'a str,
        working_dir: &'a Path,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// DDL script applied in a transaction (takes priority over `migration_cmd`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddl_script: Option<PathBuf>,

    /// Shell command that migrates the database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_cmd: Option<String>,

    /// Working directory for `migration_cmd` (default: `.`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_working_dir: Option<PathBuf>,

    /// Directory receiving the generated file
    pub output_dir: PathBuf,

    /// Schema to introspect; also names the generated file
    pub schema_name: String,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub readiness: ReadinessSettings,
}

impl PipelineConfig {
    /// Create a config with no initialization method set
    pub fn new(output_dir: impl Into<PathBuf>, schema_name: impl Into<String>) -> Self {
        Self {
            ddl_script: None,
            migration_cmd: None,
            migration_working_dir: None,
            output_dir: output_dir.into(),
            schema_name: schema_name.into(),
            database: DatabaseSettings::default(),
            readiness: ReadinessSettings::default(),
        }
    }

    /// Set the DDL script
    pub fn with_ddl_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.ddl_script = Some(path.into());
        self
    }

    /// Set the migration command and its working directory
    pub fn with_migration_cmd(mut self, command: impl Into<String>, working_dir: Option<PathBuf>) -> Self {
        self.migration_cmd = Some(command.into());
        self.migration_working_dir = working_dir;
        self
    }

    /// Resolve the config file location: explicit path, then `CONFIG`, then the default
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        std::env::var_os(CONFIG_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load config from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_json(&contents)
    }

    /// Load config from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Pick the initialization method.
    ///
    /// `ddlScript` wins when both are present; empty values count as absent.
    pub fn init_method(&self) -> Result<InitMethod<'_>, ConfigError> {
        if let Some(script) = self.ddl_script.as_deref().filter(|p| !p.as_os_str().is_empty()) {
            return Ok(InitMethod::DdlScript(script));
        }

        if let Some(command) = self.migration_cmd.as_deref().filter(|c| !c.trim().is_empty()) {
            let working_dir = self
                .migration_working_dir
                .as_deref()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            return Ok(InitMethod::MigrationCommand { command, working_dir });
        }

        Err(ConfigError::MissingInitMethod)
    }

    /// Check everything a run needs before any resource is provisioned
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_name.trim().is_empty() {
            return Err(ConfigError::Invalid("schemaName must not be empty".to_string()));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("outputDir must not be empty".to_string()));
        }

        if self.readiness.max_attempts == 0 {
            return Err(ConfigError::Invalid("readiness.maxAttempts must be at least 1".to_string()));
        }

        self.init_method()?;
        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file {0} not found")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("no initialization method: either ddlScript or migrationCmd must be provided")]
    MissingInitMethod,
}
