//! A single compression run: probe → plan → encode.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use uuid::Uuid;

use super::core::{
    CompressionConfig, MediaInfo, SegmentPlan, default_output_dir, output_stem, plan_job,
};
use super::error::JobError;
use super::probe::probe_media;
use super::runner::{ProcessRunner, SystemRunner};
use super::worker::{CancelToken, EncodeOrchestrator, SegmentFailure, WorkerMessage};

/// Owns everything about one run. Nothing is shared between jobs.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub media: MediaInfo,
    pub plan: SegmentPlan,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<SegmentFailure>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl Job {
    /// True when not a single segment produced output
    pub fn produced_nothing(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn report(&self) -> JobReport {
        JobReport {
            id: self.id,
            source: self.source.clone(),
            output_dir: self.output_dir.clone(),
            media: self.media,
            plan: self.plan.clone(),
            outputs: self.outputs.clone(),
            failures: self
                .failures
                .iter()
                .map(|f| FailureReport {
                    part: f.index + 1,
                    output_path: f.output_path.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

/// Serializable summary of a finished job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub id: Uuid,
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub media: MediaInfo,
    pub plan: SegmentPlan,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<FailureReport>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub part: usize,
    pub output_path: PathBuf,
    pub error: String,
}

/// Runs compression jobs with a fixed config and process runner
pub struct Compressor<R: ProcessRunner> {
    runner: R,
    config: CompressionConfig,
    cancel: CancelToken,
    events: Option<Sender<WorkerMessage>>,
}

impl Compressor<SystemRunner> {
    /// Compressor backed by the real ffmpeg/ffprobe binaries
    pub fn system(config: CompressionConfig) -> Self {
        Self::new(SystemRunner, config)
    }
}

impl<R: ProcessRunner> Compressor<R> {
    pub fn new(runner: R, config: CompressionConfig) -> Self {
        Self {
            runner,
            config,
            cancel: CancelToken::new(),
            events: None,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_events(mut self, tx: Sender<WorkerMessage>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Probe and plan without encoding anything
    pub fn plan(&self, input_path: &Path) -> Result<(MediaInfo, SegmentPlan), JobError> {
        let media = probe_media(&self.runner, input_path)?;
        tracing::info!(
            "Source: {:.1}s, {}x{}",
            media.duration_seconds,
            media.width,
            media.height
        );

        let plan = plan_job(&media, self.config.target_size_mb)?;
        if plan.is_split() {
            tracing::warn!("Long source: splitting into {} parts", plan.len());
        }
        Ok((media, plan))
    }

    /// Compress one file. `output_dir` defaults to the source's directory.
    ///
    /// Probe and planning failures abort before anything is written. Segment
    /// failures are recorded on the returned job, whose `outputs` may be shorter
    /// than the plan or empty.
    pub fn run(&self, input_path: &Path, output_dir: Option<&Path>) -> Result<Job, JobError> {
        self.run_named(input_path, output_dir, &output_stem(input_path))
    }

    /// Like [`Compressor::run`], naming outputs `<stem>_compressed.mp4` /
    /// `<stem>_partN.mp4` after the given stem
    pub fn run_named(
        &self,
        input_path: &Path,
        output_dir: Option<&Path>,
        stem: &str,
    ) -> Result<Job, JobError> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("job", %id, source = %input_path.display());
        let _enter = span.enter();

        let started_at = Local::now();
        let output_dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_dir(input_path));

        let (media, plan) = self.plan(input_path).inspect_err(|e| {
            tracing::error!("{}", e);
        })?;

        fs::create_dir_all(&output_dir).map_err(|source| JobError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;

        let mut orchestrator =
            EncodeOrchestrator::new(&self.runner, &self.config).with_cancel_token(self.cancel.clone());
        if let Some(tx) = &self.events {
            orchestrator = orchestrator.with_events(tx.clone());
        }

        let outcome = orchestrator.encode_all_named(input_path, stem, &plan, &output_dir);

        if outcome.failures.is_empty() {
            tracing::info!("Done: {} file(s) written", outcome.outputs.len());
        } else {
            tracing::warn!(
                "Finished with {} of {} parts written",
                outcome.outputs.len(),
                plan.len()
            );
        }

        Ok(Job {
            id,
            source: input_path.to_path_buf(),
            output_dir,
            media,
            plan,
            outputs: outcome.outputs,
            failures: outcome.failures,
            started_at,
            finished_at: Local::now(),
        })
    }

    /// Compress one file and return only the output paths
    pub fn compress(&self, input_path: &Path, output_dir: Option<&Path>) -> Result<Vec<PathBuf>, JobError> {
        self.run(input_path, output_dir).map(|job| job.outputs)
    }
}

/// Entry point for a UI shell: compress `input_path` into `output_dir` using
/// the real ffmpeg/ffprobe. An empty list means nothing could be produced.
pub fn compress(
    input_path: &Path,
    output_dir: &Path,
    config: &CompressionConfig,
) -> Result<Vec<PathBuf>, JobError> {
    Compressor::system(config.clone()).compress(input_path, Some(output_dir))
}
