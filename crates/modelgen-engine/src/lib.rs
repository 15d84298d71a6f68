//! Pipeline orchestration
//!
//! Sequences one generation run: provision the database container, wait for
//! it to accept connections, initialize the schema, introspect it, emit the
//! model file and tear the container down again.

pub mod error;
pub mod initializer;
pub mod introspect;
pub mod pipeline;
pub mod readiness;

pub use tokio_util::sync::CancellationToken;
pub use error::{PipelineError, SchemaInitError};
pub use initializer::initialize_schema;
pub use introspect::introspect_schema;
pub use pipeline::{Pipeline, PipelineState, RunReport};
pub use readiness::ReadinessPoller;
