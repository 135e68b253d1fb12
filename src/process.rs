use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("could not start {}: {source}", .program.display())]
    Spawn { program: PathBuf, source: io::Error },
    #[error("error waiting for {}: {source}", .program.display())]
    Wait { program: PathBuf, source: io::Error },
    #[error("{} failed with {status}{}", .program.display(), stderr_suffix(.stderr))]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Runs `cmd` to completion with stdin closed and stderr captured.
///
/// Stdout is left as configured by the caller. No timeout is applied.
pub async fn run_command(cmd: &mut Command) -> Result<(), CommandError> {
    let program = PathBuf::from(cmd.as_std().get_program());
    cmd.stdin(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| CommandError::Spawn {
        program: program.clone(),
        source,
    })?;
    let output = child
        .wait_with_output()
        .await
        .map_err(|source| CommandError::Wait {
            program: program.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(CommandError::Failed {
            program,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
