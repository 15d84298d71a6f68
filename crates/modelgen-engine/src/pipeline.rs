//! Pipeline coordinator
//!
//! A run walks through a fixed sequence of states:
//!
//! ```text
//! Init → ImagePulled → ContainerCreated → ContainerStarted → DatabaseReady
//!      → SchemaInitialized → Introspected → Emitted → TornDown
//! ```
//!
//! Once the container exists it is always stopped and deleted before `run`
//! returns, whether the steps in between succeeded, failed or were cancelled.
//!
//! Cancellation interrupts the step in flight. Container creation and
//! emission are the exceptions: an interrupted create could leave a container
//! nobody tracks, and the model file is either written whole or not at all.

use crate::error::PipelineError;
use crate::initializer::initialize_schema;
use crate::introspect::introspect_schema;
use crate::readiness::ReadinessPoller;
use modelgen_catalog::CatalogConnector;
use modelgen_container::{ContainerEngine, ContainerHandle, ContainerSpec};
use modelgen_core::PipelineConfig;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Progress of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    ImagePulled,
    ContainerCreated,
    ContainerStarted,
    DatabaseReady,
    SchemaInitialized,
    Introspected,
    Emitted,
    TornDown,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineState::Init => "init",
            PipelineState::ImagePulled => "image pulled",
            PipelineState::ContainerCreated => "container created",
            PipelineState::ContainerStarted => "container started",
            PipelineState::DatabaseReady => "database ready",
            PipelineState::SchemaInitialized => "schema initialized",
            PipelineState::Introspected => "introspected",
            PipelineState::Emitted => "emitted",
            PipelineState::TornDown => "torn down",
        };
        f.write_str(label)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The generated module
    pub output_file: PathBuf,

    /// Tables emitted, in output order
    pub tables: Vec<String>,

    pub final_state: PipelineState,
}

/// One generation run against a disposable database
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    engine: &'a dyn ContainerEngine,
    connector: &'a dyn CatalogConnector,
    cancel: CancellationToken,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        engine: &'a dyn ContainerEngine,
        connector: &'a dyn CatalogConnector,
    ) -> Self {
        Self {
            config,
            engine,
            connector,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort the run once `cancel` is tripped
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn checkpoint(&self, reached: PipelineState) -> Result<(), PipelineError> {
        if self.cancel.is_cancelled() {
            tracing::warn!("Cancellation requested after state {}", reached);
            return Err(PipelineError::Cancelled(reached));
        }
        Ok(())
    }

    /// Run `step`, abandoning it if the run is cancelled first
    async fn interruptible<T, F>(&self, reached: PipelineState, step: F) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::warn!("Cancelled in state {}", reached);
                Err(PipelineError::Cancelled(reached))
            }
            result = step => result,
        }
    }

    /// Execute the run.
    ///
    /// Configuration problems are reported before anything is provisioned.
    /// When both the run and the teardown fail, the run's error is returned
    /// and the teardown error is logged.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        self.config.validate()?;

        let database = &self.config.database;
        tracing::info!("Pulling image {}...", database.image_ref());
        self.interruptible(PipelineState::Init, async {
            self.engine
                .pull_image(&database.image, &database.tag)
                .await
                .map_err(PipelineError::from)
        })
        .await?;
        self.checkpoint(PipelineState::ImagePulled)?;

        let spec = ContainerSpec::postgres(database);
        tracing::info!("Creating container {}...", spec.name);
        let handle = self.engine.create_container(&spec).await?;

        let outcome = self.run_provisioned(&handle).await;
        let teardown = self.teardown(&handle).await;

        match (outcome, teardown) {
            (Ok(mut report), Ok(())) => {
                report.final_state = PipelineState::TornDown;
                tracing::info!("Done.");
                Ok(report)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(teardown_error)) => {
                tracing::warn!("Teardown after failed run also failed: {}", teardown_error);
                Err(e)
            }
        }
    }

    /// Steps that run while the container exists
    async fn run_provisioned(&self, handle: &ContainerHandle) -> Result<RunReport, PipelineError> {
        self.checkpoint(PipelineState::ContainerCreated)?;

        tracing::info!("Starting container {}...", handle);
        self.interruptible(PipelineState::ContainerCreated, async {
            self.engine.start(handle).await.map_err(PipelineError::from)
        })
        .await?;

        tracing::info!("Waiting for database...");
        ReadinessPoller::from_settings(&self.config.readiness)
            .wait_ready(self.connector, &self.cancel, PipelineState::ContainerStarted)
            .await?;

        let catalog = self
            .interruptible(PipelineState::ContainerStarted, async {
                self.connector.connect().await.map_err(PipelineError::Connection)
            })
            .await?;

        self.interruptible(
            PipelineState::DatabaseReady,
            initialize_schema(self.config, catalog.as_ref()),
        )
        .await?;

        let tables = self
            .interruptible(
                PipelineState::SchemaInitialized,
                introspect_schema(catalog.as_ref(), &self.config.schema_name),
            )
            .await?;
        self.checkpoint(PipelineState::Introspected)?;

        tracing::info!("Generating model for schema {}...", self.config.schema_name);
        let output_file = modelgen_codegen::emit(&tables, &self.config.output_dir, &self.config.schema_name)?;
        tracing::info!("Wrote {}", output_file.display());

        Ok(RunReport {
            output_file,
            tables: tables.into_iter().map(|t| t.table_name).collect(),
            final_state: PipelineState::Emitted,
        })
    }

    /// Stop, then force-delete even if stopping failed.
    ///
    /// A failed stop only matters when the forced delete fails too.
    async fn teardown(&self, handle: &ContainerHandle) -> Result<(), PipelineError> {
        tracing::info!("Stopping container {}...", handle);
        if let Err(e) = self.engine.stop(handle).await {
            tracing::warn!("{}; deleting it anyway", e);
        }

        tracing::info!("Deleting container {}...", handle);
        self.engine.delete(handle, true).await?;
        Ok(())
    }
}
