// Worker pool that encodes planned segments

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::core::{
    CompressionConfig, Segment, SegmentPlan, build_encode_cmd, format_ffmpeg_cmd,
    output_path_for_stem, output_stem,
};
use super::error::EncodeError;
use super::hardware::VideoCodec;
use super::runner::{ProcessRunner, RunError, stderr_tail};

/// Lines of ffmpeg stderr kept in a failure report
const STDERR_TAIL_LINES: usize = 20;

/// Shared cancellation flag, checked before each segment starts
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Message from a worker to whoever is watching the job
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Segment handed to a worker
    SegmentStarted { index: usize, worker_id: usize },

    /// Segment encoded successfully
    SegmentCompleted {
        index: usize,
        output_path: PathBuf,
        elapsed: Duration,
    },

    /// Segment failed and was skipped
    SegmentFailed { index: usize, error: String },

    /// Segment never started because the job was cancelled
    SegmentCancelled { index: usize },
}

/// One unit of work: a segment plus where it reads from and writes to
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeTask {
    pub segment: Segment,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

/// Turn a plan into the ordered task list for a source
pub fn build_tasks(source: &Path, plan: &SegmentPlan, output_dir: &Path) -> Vec<EncodeTask> {
    build_named_tasks(source, &output_stem(source), plan, output_dir)
}

/// Like [`build_tasks`], naming outputs after `stem` instead of the source
pub fn build_named_tasks(
    source: &Path,
    stem: &str,
    plan: &SegmentPlan,
    output_dir: &Path,
) -> Vec<EncodeTask> {
    let split = plan.is_split();
    plan.iter()
        .map(|segment| EncodeTask {
            segment: segment.clone(),
            input_path: source.to_path_buf(),
            output_path: output_path_for_stem(stem, output_dir, segment.index, split),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFailure {
    pub index: usize,
    pub output_path: PathBuf,
    pub error: EncodeError,
}

/// Result of encoding every task: successes and failures, both in planned order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeOutcome {
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<SegmentFailure>,
}

impl EncodeOutcome {
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Drives ffmpeg over a task list with a bounded number of concurrent encodes.
///
/// A failed segment never aborts the run: it is logged, its partial output is
/// removed and the remaining segments still encode.
pub struct EncodeOrchestrator<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    codec: VideoCodec,
    additional_args: String,
    timeout: Option<Duration>,
    max_workers: usize,
    cancel: CancelToken,
    events: Option<Sender<WorkerMessage>>,
}

impl<'a, R: ProcessRunner + ?Sized> EncodeOrchestrator<'a, R> {
    pub fn new(runner: &'a R, config: &CompressionConfig) -> Self {
        Self {
            runner,
            codec: config.codec,
            additional_args: config.additional_args.clone(),
            timeout: config.encode_timeout,
            max_workers: config.effective_workers(),
            cancel: CancelToken::new(),
            events: None,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Forward progress messages to `tx`
    pub fn with_events(mut self, tx: Sender<WorkerMessage>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Encode every segment of `plan` into `output_dir`
    pub fn encode_all(&self, source: &Path, plan: &SegmentPlan, output_dir: &Path) -> EncodeOutcome {
        self.run_tasks(&build_tasks(source, plan, output_dir))
    }

    /// Encode every segment of `plan`, naming outputs after `stem`
    pub fn encode_all_named(
        &self,
        source: &Path,
        stem: &str,
        plan: &SegmentPlan,
        output_dir: &Path,
    ) -> EncodeOutcome {
        self.run_tasks(&build_named_tasks(source, stem, plan, output_dir))
    }

    pub fn run_tasks(&self, tasks: &[EncodeTask]) -> EncodeOutcome {
        if tasks.is_empty() {
            return EncodeOutcome::default();
        }

        let workers = self.max_workers.min(tasks.len()).max(1);
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();

        if workers == 1 {
            self.worker_loop(0, tasks, &next, &tx);
        } else {
            tracing::debug!("Encoding {} segments on {} workers", tasks.len(), workers);
            thread::scope(|s| {
                for worker_id in 0..workers {
                    let tx = tx.clone();
                    let next = &next;
                    s.spawn(move || self.worker_loop(worker_id, tasks, next, &tx));
                }
            });
        }
        drop(tx);

        let mut results: Vec<Option<Result<(), EncodeError>>> = vec![None; tasks.len()];
        for (index, result) in rx {
            results[index] = Some(result);
        }

        let mut outcome = EncodeOutcome::default();
        for (task, result) in tasks.iter().zip(results) {
            let error = match result {
                Some(Ok(())) => {
                    outcome.outputs.push(task.output_path.clone());
                    continue;
                }
                Some(Err(e)) => e,
                None => {
                    self.notify(WorkerMessage::SegmentCancelled {
                        index: task.segment.index,
                    });
                    EncodeError::Cancelled
                }
            };
            outcome.failures.push(SegmentFailure {
                index: task.segment.index,
                output_path: task.output_path.clone(),
                error,
            });
        }

        outcome
    }

    fn worker_loop(
        &self,
        worker_id: usize,
        tasks: &[EncodeTask],
        next: &AtomicUsize,
        tx: &Sender<(usize, Result<(), EncodeError>)>,
    ) {
        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Worker {} stopping: job cancelled", worker_id);
                break;
            }

            let position = next.fetch_add(1, Ordering::SeqCst);
            let Some(task) = tasks.get(position) else {
                break;
            };

            self.notify(WorkerMessage::SegmentStarted {
                index: task.segment.index,
                worker_id,
            });

            let started = Instant::now();
            let result = self.encode_one(task);

            match &result {
                Ok(()) => self.notify(WorkerMessage::SegmentCompleted {
                    index: task.segment.index,
                    output_path: task.output_path.clone(),
                    elapsed: started.elapsed(),
                }),
                Err(e) => self.notify(WorkerMessage::SegmentFailed {
                    index: task.segment.index,
                    error: e.to_string(),
                }),
            }

            let _ = tx.send((position, result));
        }
    }

    fn encode_one(&self, task: &EncodeTask) -> Result<(), EncodeError> {
        let cmd = build_encode_cmd(
            &task.input_path,
            &task.output_path,
            &task.segment,
            self.codec,
            &self.additional_args,
        );

        tracing::info!(
            "Encoding segment {} → {} ({} kbps video, {} kbps audio)",
            task.segment.index + 1,
            task.output_path.display(),
            task.segment.video_bitrate_kbps,
            task.segment.audio_bitrate_kbps
        );
        tracing::debug!("{}", format_ffmpeg_cmd(&cmd));

        let error = match self.runner.run(cmd, self.timeout) {
            Ok(output) if output.success() => return Ok(()),
            Ok(output) => {
                tracing::debug!("ffmpeg stderr for segment {}:\n{}", task.segment.index + 1, output.stderr);
                EncodeError::Failed {
                    exit_code: output.exit_code,
                    stderr_tail: stderr_tail(&output.stderr, STDERR_TAIL_LINES),
                }
            }
            Err(RunError::TimedOut { timeout, .. }) => EncodeError::TimedOut(timeout),
            Err(e) => EncodeError::Spawn(e.to_string()),
        };

        tracing::warn!("Segment {} skipped: {}", task.segment.index + 1, error);
        remove_partial_output(&task.output_path);
        Err(error)
    }

    fn notify(&self, msg: WorkerMessage) {
        if let Some(tx) = &self.events {
            let _ = tx.send(msg);
        }
    }
}

/// A failed encode may leave a truncated file behind; never hand that to the caller
fn remove_partial_output(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Could not remove partial output {}: {}", path.display(), e);
        }
    }
}
