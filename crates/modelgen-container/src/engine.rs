//! Container engine trait and container description

use modelgen_core::DatabaseSettings;
use std::fmt;

/// Port PostgreSQL listens on inside the container
pub const POSTGRES_PORT: u16 = 5432;

/// Everything needed to create the database container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Image name
    pub image: String,

    /// Image tag
    pub tag: String,

    /// Container name
    pub name: String,

    /// Environment assignments, in order
    pub env: Vec<(String, String)>,

    /// Port exposed by the container (tcp)
    pub container_port: u16,

    /// Host port bound to `container_port`
    pub host_port: u16,
}

impl ContainerSpec {
    /// PostgreSQL container configured from `settings`
    pub fn postgres(settings: &DatabaseSettings) -> Self {
        Self {
            image: settings.image.clone(),
            tag: settings.tag.clone(),
            name: settings.container_name.clone(),
            env: vec![
                ("POSTGRES_USER".to_string(), settings.user.clone()),
                ("POSTGRES_PASSWORD".to_string(), settings.password.clone()),
                ("POSTGRES_DB".to_string(), settings.name.clone()),
            ],
            container_port: POSTGRES_PORT,
            host_port: settings.host_port,
        }
    }

    /// `image:tag`
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    /// `KEY=value` strings as the engine expects them
    pub fn env_assignments(&self) -> Vec<String> {
        self.env.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
    }

    /// Port key such as `5432/tcp`
    pub fn port_key(&self) -> String {
        format!("{}/tcp", self.container_port)
    }
}

/// Identifies a created container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    id: String,
    name: String,
}

impl ContainerHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Engine-assigned id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Container name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.id.get(..12).unwrap_or(&self.id);
        write!(f, "{} ({})", self.name, short)
    }
}

/// Lifecycle step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleTransition {
    Start,
    Stop,
    Delete,
}

impl fmt::Display for LifecycleTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Errors that can occur when driving the container engine
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContainerError {
    #[error("Container engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Failed to pull image {image}: {cause}")]
    ImagePull { image: String, cause: String },

    #[error("Failed to create container {name}: {cause}")]
    Create { name: String, cause: String },

    #[error("Failed to {transition} container {container}: {cause}")]
    Lifecycle {
        transition: LifecycleTransition,
        container: String,
        cause: String,
    },
}

impl ContainerError {
    pub fn lifecycle(transition: LifecycleTransition, handle: &ContainerHandle, cause: impl fmt::Display) -> Self {
        Self::Lifecycle {
            transition,
            container: handle.name().to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Trait for container runtimes that can host the disposable database
///
/// Implementations perform no retries; a failed call is reported as is.
#[async_trait::async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Get the engine name (e.g., "Docker")
    fn name(&self) -> &'static str;

    /// Pull `image:tag`, returning once the registry reports completion
    async fn pull_image(&self, image: &str, tag: &str) -> Result<(), ContainerError>;

    /// Create (but do not start) a container
    async fn create_container(&self, spec: &ContainerSpec) -> Result<ContainerHandle, ContainerError>;

    async fn start(&self, handle: &ContainerHandle) -> Result<(), ContainerError>;

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), ContainerError>;

    /// Remove the container; `force` also kills it if still running
    async fn delete(&self, handle: &ContainerHandle, force: bool) -> Result<(), ContainerError>;
}
