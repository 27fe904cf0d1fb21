//! Error taxonomy for a compression job.
//!
//! `ProbeError` and `PlanError` are fatal and abort a job before any output is
//! written. `EncodeError` is per segment: the segment is skipped and the job
//! carries on with the rest.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::runner::RunError;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run ffprobe: {0}")]
    Run(#[from] RunError),

    #[error("ffprobe exited with {exit_code:?} for {path}: {stderr}")]
    NonZeroExit {
        path: PathBuf,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    Parse(String),

    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    #[error("no video stream found in {0}")]
    NoVideoStream(PathBuf),

    #[error("invalid resolution {width}x{height}")]
    InvalidResolution { width: u64, height: u64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("duration must be positive, got {0}")]
    InvalidDuration(f64),

    #[error("target size must be positive, got {0} MB")]
    InvalidTargetSize(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("failed to start ffmpeg: {0}")]
    Spawn(String),

    #[error("ffmpeg exited with {exit_code:?}: {stderr_tail}")]
    Failed {
        exit_code: Option<i32>,
        stderr_tail: String,
    },

    #[error("ffmpeg timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("cancelled before start")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("planning infeasible: {0}")]
    PlanningInfeasible(#[from] PlanError),

    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
