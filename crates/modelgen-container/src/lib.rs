//! Disposable database containers
//!
//! [`ContainerEngine`] is the seam between the pipeline and the container
//! runtime. [`DockerEngine`] talks to the local Docker Engine API;
//! [`MockEngine`] records calls for tests.

pub mod docker;
pub mod engine;
pub mod mock;

pub use docker::DockerEngine;
pub use engine::{ContainerEngine, ContainerError, ContainerHandle, ContainerSpec, LifecycleTransition};
pub use mock::{EngineCall, MockEngine};
