//! Docker Engine API backend
//!
//! Connects to the host-local engine endpoint:
//! - `/var/run/docker.sock` on unix
//! - `//./pipe/docker_engine` on Windows

use crate::engine::{ContainerEngine, ContainerError, ContainerHandle, ContainerSpec, LifecycleTransition};
use bollard::container::{Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions};
use bollard::errors::Error as DockerError;
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, PortBinding};
use bollard::Docker;
use futures_util::TryStreamExt;
use std::collections::HashMap;

#[cfg(windows)]
const DEFAULT_ENDPOINT: &str = "//./pipe/docker_engine";

#[cfg(not(windows))]
const DEFAULT_ENDPOINT: &str = "/var/run/docker.sock";

/// Request timeout in seconds
const TIMEOUT_SECS: u64 = 120;

/// Docker-backed container engine
pub struct DockerEngine {
    docker: Docker,
    endpoint: String,
}

impl DockerEngine {
    /// Connect to the platform's default engine endpoint
    pub fn connect() -> Result<Self, ContainerError> {
        Self::connect_to(DEFAULT_ENDPOINT)
    }

    /// Connect to a specific socket (unix) or named pipe (Windows)
    pub fn connect_to(endpoint: &str) -> Result<Self, ContainerError> {
        let docker = Docker::connect_with_socket(endpoint, TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            .map_err(|e| ContainerError::EngineUnavailable(format!("{}: {}", endpoint, e)))?;

        Ok(Self {
            docker,
            endpoint: endpoint.to_string(),
        })
    }

    /// Endpoint this engine talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn container_config(spec: &ContainerSpec) -> Config<String> {
        let port_key = spec.port_key();

        let mut exposed_ports = HashMap::new();
        exposed_ports.insert(port_key.clone(), HashMap::new());

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            port_key,
            Some(vec![PortBinding {
                host_ip: None,
                host_port: Some(spec.host_port.to_string()),
            }]),
        );

        Config {
            image: Some(spec.image_ref()),
            env: Some(spec.env_assignments()),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl ContainerEngine for DockerEngine {
    fn name(&self) -> &'static str {
        "Docker"
    }

    async fn pull_image(&self, image: &str, tag: &str) -> Result<(), ContainerError> {
        let options = CreateImageOptions {
            from_image: image,
            tag,
            ..Default::default()
        };

        let mut progress = std::pin::pin!(self.docker.create_image(Some(options), None, None));

        // The pull is only complete once the progress stream ends.
        while let Some(info) = progress.try_next().await.map_err(|e| ContainerError::ImagePull {
            image: format!("{}:{}", image, tag),
            cause: e.to_string(),
        })? {
            if let Some(status) = info.status {
                tracing::debug!("{}: {}", image, status);
            }
        }

        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<ContainerHandle, ContainerError> {
        let options = CreateContainerOptions {
            name: spec.name.as_str(),
            platform: None,
        };

        let response = self
            .docker
            .create_container(Some(options), Self::container_config(spec))
            .await
            .map_err(|e| ContainerError::Create {
                name: spec.name.clone(),
                cause: e.to_string(),
            })?;

        for warning in &response.warnings {
            tracing::warn!("Container {}: {}", spec.name, warning);
        }

        Ok(ContainerHandle::new(response.id, &spec.name))
    }

    async fn start(&self, handle: &ContainerHandle) -> Result<(), ContainerError> {
        self.docker
            .start_container(handle.id(), None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| ContainerError::lifecycle(LifecycleTransition::Start, handle, e))
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), ContainerError> {
        match self.docker.stop_container(handle.id(), None).await {
            Ok(()) => Ok(()),
            // 304: already stopped
            Err(DockerError::DockerResponseServerError { status_code: 304, .. }) => Ok(()),
            Err(e) => Err(ContainerError::lifecycle(LifecycleTransition::Stop, handle, e)),
        }
    }

    async fn delete(&self, handle: &ContainerHandle, force: bool) -> Result<(), ContainerError> {
        let options = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.docker
            .remove_container(handle.id(), Some(options))
            .await
            .map_err(|e| ContainerError::lifecycle(LifecycleTransition::Delete, handle, e))
    }
}
