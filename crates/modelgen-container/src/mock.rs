//! In-memory container engine for testing
//!
//! Records every call so tests can assert on the exact lifecycle a pipeline
//! run went through, and can be told to fail any single step.

use crate::engine::{ContainerEngine, ContainerError, ContainerHandle, ContainerSpec, LifecycleTransition};
use std::sync::{Arc, Mutex};

/// A call received by [`MockEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    PullImage(String),
    Create(String),
    Start(String),
    Stop(String),
    Delete { container: String, force: bool },
}

#[derive(Debug, Clone, Default)]
struct Failures {
    pull: bool,
    create: bool,
    start: bool,
    stop: bool,
    delete: bool,
}

/// Container engine that records calls instead of running containers
#[derive(Clone, Default)]
pub struct MockEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    failures: Failures,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pull_failure(mut self) -> Self {
        self.failures.pull = true;
        self
    }

    pub fn with_create_failure(mut self) -> Self {
        self.failures.create = true;
        self
    }

    pub fn with_start_failure(mut self) -> Self {
        self.failures.start = true;
        self
    }

    pub fn with_stop_failure(mut self) -> Self {
        self.failures.stop = true;
        self
    }

    pub fn with_delete_failure(mut self) -> Self {
        self.failures.delete = true;
        self
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: EngineCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait::async_trait]
impl ContainerEngine for MockEngine {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn pull_image(&self, image: &str, tag: &str) -> Result<(), ContainerError> {
        let image_ref = format!("{}:{}", image, tag);
        self.record(EngineCall::PullImage(image_ref.clone()));

        if self.failures.pull {
            return Err(ContainerError::ImagePull {
                image: image_ref,
                cause: "simulated registry failure".to_string(),
            });
        }
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> Result<ContainerHandle, ContainerError> {
        self.record(EngineCall::Create(spec.name.clone()));

        if self.failures.create {
            return Err(ContainerError::Create {
                name: spec.name.clone(),
                cause: "simulated name conflict".to_string(),
            });
        }
        Ok(ContainerHandle::new(format!("mock-{}", spec.name), &spec.name))
    }

    async fn start(&self, handle: &ContainerHandle) -> Result<(), ContainerError> {
        self.record(EngineCall::Start(handle.name().to_string()));

        if self.failures.start {
            return Err(ContainerError::lifecycle(LifecycleTransition::Start, handle, "simulated failure"));
        }
        Ok(())
    }

    async fn stop(&self, handle: &ContainerHandle) -> Result<(), ContainerError> {
        self.record(EngineCall::Stop(handle.name().to_string()));

        if self.failures.stop {
            return Err(ContainerError::lifecycle(LifecycleTransition::Stop, handle, "simulated failure"));
        }
        Ok(())
    }

    async fn delete(&self, handle: &ContainerHandle, force: bool) -> Result<(), ContainerError> {
        self.record(EngineCall::Delete {
            container: handle.name().to_string(),
            force,
        });

        if self.failures.delete {
            return Err(ContainerError::lifecycle(LifecycleTransition::Delete, handle, "simulated failure"));
        }
        Ok(())
    }
}
