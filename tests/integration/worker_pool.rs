// Tests for the segment worker pool and its message stream

use crate::common::fake_runner::{FakeRunner, Response};
use crate::common::helpers::*;
use std::collections::HashSet;
use std::path::Path;
use std::process::Command;
use std::sync::mpsc;
use std::time::Duration;
use tempfile::TempDir;
use vidfit::engine::{
    CancelToken, EncodeError, EncodeOrchestrator, MediaInfo, ProcessOutput, ProcessRunner,
    RunError, WorkerMessage, plan_job,
};

fn five_hour_plan() -> vidfit::engine::SegmentPlan {
    let media = MediaInfo {
        duration_seconds: 18000.0,
        width: 1920,
        height: 1080,
    };
    plan_job(&media, 160.0).unwrap()
}

#[test]
fn test_hardware_codec_forces_single_worker() {
    let runner = FakeRunner::new();

    let hw = hardware_config(160.0).max_workers(4);
    assert_eq!(EncodeOrchestrator::new(&runner, &hw).max_workers(), 1);

    let sw = software_config(160.0).max_workers(4);
    assert_eq!(EncodeOrchestrator::new(&runner, &sw).max_workers(), 4);
}

#[test]
fn test_parallel_results_keep_planned_order() {
    let temp = TempDir::new().unwrap();
    let source = Path::new("/videos/long.mkv");
    let runner = FakeRunner::new().with_delay(Duration::from_millis(50));
    // Third part fails quickly, others take the delay
    runner.expect("long_part3.mp4", Response::fail(1, "boom"));

    let config = software_config(160.0).max_workers(3);
    let (tx, rx) = mpsc::channel();
    let orchestrator = EncodeOrchestrator::new(&runner, &config).with_events(tx);

    let outcome = orchestrator.encode_all(source, &five_hour_plan(), temp.path());
    drop(orchestrator);

    assert_eq!(
        outcome.outputs,
        vec![
            temp.path().join("long_part1.mp4"),
            temp.path().join("long_part2.mp4"),
            temp.path().join("long_part4.mp4"),
        ]
    );
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 2);
    assert_eq!(runner.encode_calls().len(), 4);

    let messages: Vec<WorkerMessage> = rx.iter().collect();
    let started: HashSet<usize> = messages
        .iter()
        .filter_map(|m| match m {
            WorkerMessage::SegmentStarted { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(started, HashSet::from([0, 1, 2, 3]));

    let completed = messages
        .iter()
        .filter(|m| matches!(m, WorkerMessage::SegmentCompleted { .. }))
        .count();
    assert_eq!(completed, 3);
    assert!(messages.iter().any(|m| matches!(
        m,
        WorkerMessage::SegmentFailed { index: 2, error } if error.contains("boom")
    )));

    let workers: HashSet<usize> = messages
        .iter()
        .filter_map(|m| match m {
            WorkerMessage::SegmentStarted { worker_id, .. } => Some(*worker_id),
            _ => None,
        })
        .collect();
    assert!(workers.iter().all(|w| *w < 3));
}

#[test]
fn test_cancelled_before_start_runs_nothing() {
    let temp = TempDir::new().unwrap();
    let runner = FakeRunner::new();
    let config = software_config(160.0);

    let cancel = CancelToken::new();
    cancel.cancel();
    let (tx, rx) = mpsc::channel();
    let orchestrator = EncodeOrchestrator::new(&runner, &config)
        .with_cancel_token(cancel)
        .with_events(tx);

    let outcome = orchestrator.encode_all(Path::new("a.mov"), &five_hour_plan(), temp.path());
    drop(orchestrator);

    assert!(outcome.is_empty());
    assert_eq!(outcome.failures.len(), 4);
    assert!(outcome
        .failures
        .iter()
        .all(|f| f.error == EncodeError::Cancelled));
    assert!(runner.calls().is_empty());

    let cancelled = rx
        .iter()
        .filter(|m| matches!(m, WorkerMessage::SegmentCancelled { .. }))
        .count();
    assert_eq!(cancelled, 4);
}

/// Cancels the job as soon as the first encode runs
struct CancelOnFirstCall {
    inner: FakeRunner,
    cancel: CancelToken,
}

impl ProcessRunner for CancelOnFirstCall {
    fn run(&self, cmd: Command, timeout: Option<Duration>) -> Result<ProcessOutput, RunError> {
        self.cancel.cancel();
        self.inner.run(cmd, timeout)
    }
}

#[test]
fn test_cancel_mid_job_keeps_finished_segment() {
    let temp = TempDir::new().unwrap();
    let cancel = CancelToken::new();
    let runner = CancelOnFirstCall {
        inner: FakeRunner::new(),
        cancel: cancel.clone(),
    };
    let config = software_config(160.0);

    let orchestrator = EncodeOrchestrator::new(&runner, &config).with_cancel_token(cancel);
    let outcome = orchestrator.encode_all(Path::new("/in/show.mp4"), &five_hour_plan(), temp.path());

    // The in-flight encode finishes; nothing new starts
    assert_eq!(outcome.outputs, vec![temp.path().join("show_part1.mp4")]);
    let indices: Vec<usize> = outcome.failures.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert!(outcome
        .failures
        .iter()
        .all(|f| f.error == EncodeError::Cancelled));
    assert_eq!(runner.inner.encode_calls().len(), 1);
}

#[test]
fn test_timeout_and_spawn_failures_are_per_segment() {
    let temp = TempDir::new().unwrap();
    let runner = FakeRunner::new();
    runner.expect("clip_part1.mp4", Response::TimedOut);
    runner.expect("clip_part2.mp4", Response::SpawnFails);

    let config = software_config(160.0).encode_timeout(Some(Duration::from_secs(1)));
    let orchestrator = EncodeOrchestrator::new(&runner, &config);
    let outcome = orchestrator.encode_all(Path::new("clip.mp4"), &five_hour_plan(), temp.path());

    assert_eq!(
        outcome.outputs,
        vec![
            temp.path().join("clip_part3.mp4"),
            temp.path().join("clip_part4.mp4"),
        ]
    );
    assert_eq!(
        outcome.failures[0].error,
        EncodeError::TimedOut(Duration::from_secs(1))
    );
    assert!(matches!(outcome.failures[1].error, EncodeError::Spawn(_)));
}

#[test]
fn test_worker_message_types() {
    let msg = WorkerMessage::SegmentCompleted {
        index: 0,
        output_path: "a_part1.mp4".into(),
        elapsed: Duration::from_secs(3),
    };
    match msg {
        WorkerMessage::SegmentCompleted { index, elapsed, .. } => {
            assert_eq!(index, 0);
            assert_eq!(elapsed.as_secs(), 3);
        }
        _ => panic!("wrong variant"),
    }
}
