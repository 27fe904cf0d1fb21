use std::process::Command;
use std::time::Duration;
use thiserror::Error;

use crate::engine::runner::{ProcessRunner, RunError, stderr_tail};

const VERSION_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to execute {tool}. Is it installed and in PATH? ({source})")]
    Missing {
        tool: &'static str,
        #[source]
        source: RunError,
    },

    #[error("{tool} command failed with status {exit_code:?}: {stderr}")]
    Failed {
        tool: &'static str,
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Check if ffmpeg is available and return its version
pub fn ffmpeg_version<R: ProcessRunner + ?Sized>(runner: &R) -> Result<String, ToolError> {
    tool_version(runner, "ffmpeg")
}

/// Check if ffprobe is available and return its version
pub fn ffprobe_version<R: ProcessRunner + ?Sized>(runner: &R) -> Result<String, ToolError> {
    tool_version(runner, "ffprobe")
}

fn tool_version<R: ProcessRunner + ?Sized>(
    runner: &R,
    tool: &'static str,
) -> Result<String, ToolError> {
    let mut cmd = Command::new(tool);
    cmd.arg("-version");

    let output = runner
        .run(cmd, Some(VERSION_TIMEOUT))
        .map_err(|source| ToolError::Missing { tool, source })?;

    if !output.success() {
        return Err(ToolError::Failed {
            tool,
            exit_code: output.exit_code,
            stderr: stderr_tail(&output.stderr, 5),
        });
    }

    Ok(output
        .stdout
        .lines()
        .next()
        .unwrap_or("Unknown version")
        .to_string())
}
