//! Schema initialization
//!
//! Brings the fresh database to its desired state using whichever method the
//! config selects: a DDL script applied in one transaction, or an external
//! migration command run as a subprocess.

use crate::error::{PipelineError, SchemaInitError};
use modelgen_catalog::CatalogAdapter;
use modelgen_core::{InitMethod, PipelineConfig};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Initialize the schema according to `config`.
///
/// A config without any initialization method fails here, before the
/// catalog is touched.
pub async fn initialize_schema(
    config: &PipelineConfig,
    catalog: &dyn CatalogAdapter,
) -> Result<(), PipelineError> {
    match config.init_method()? {
        InitMethod::DdlScript(path) => run_ddl_script(path, catalog).await?,
        InitMethod::MigrationCommand { command, working_dir } => {
            run_migration(command, working_dir).await?
        }
    }
    Ok(())
}

async fn run_ddl_script(path: &Path, catalog: &dyn CatalogAdapter) -> Result<(), SchemaInitError> {
    tracing::info!("Applying DDL script {}", path.display());

    let sql = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SchemaInitError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;

    catalog
        .execute_script(&sql)
        .await
        .map_err(|source| SchemaInitError::Script {
            path: path.to_path_buf(),
            source,
        })
}

fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }

    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Forward a child's output line by line to the log
async fn forward_lines<R>(reader: Option<R>, emit: fn(&str))
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => emit(&line),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("Stopped reading migration output: {}", e);
                break;
            }
        }
    }
}

async fn run_migration(command: &str, working_dir: &Path) -> Result<(), SchemaInitError> {
    tracing::info!("Running migration `{}` in {}", command, working_dir.display());

    let mut child = shell_command(command)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SchemaInitError::MigrationSpawn {
            command: command.to_string(),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (_, _, status) = tokio::join!(
        forward_lines(stdout, |line| tracing::info!(target: "migration", "{}", line)),
        forward_lines(stderr, |line| tracing::warn!(target: "migration", "{}", line)),
        child.wait(),
    );

    let status = status.map_err(|source| SchemaInitError::MigrationSpawn {
        command: command.to_string(),
        source,
    })?;

    if !status.success() {
        return Err(SchemaInitError::MigrationFailed {
            command: command.to_string(),
            exit_code: status.code(),
        });
    }

    Ok(())
}
