// Compression engine - independent of any UI

pub mod core;
pub mod error;
pub mod hardware;
pub mod job;
pub mod probe;
pub mod runner;
pub mod worker;

pub use self::core::*;
pub use error::{EncodeError, JobError, PlanError, ProbeError};
pub use hardware::VideoCodec;
pub use job::{Compressor, FailureReport, Job, JobReport, compress};
pub use probe::probe_media;
pub use runner::{ProcessOutput, ProcessRunner, RunError, SystemRunner};
pub use worker::{CancelToken, EncodeOrchestrator, EncodeOutcome, SegmentFailure, WorkerMessage};
