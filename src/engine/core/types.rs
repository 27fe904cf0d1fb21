use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::engine::hardware::{VideoCodec, detect_codec};
use crate::engine::runner::ProcessRunner;

/// Container duration and primary video stream resolution of a source file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
}

/// Settings for one compression job. The codec is resolved once when the
/// config is built and never re-queried while the job runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionConfig {
    pub target_size_mb: f64,
    pub hardware_accel_preference: bool,
    pub codec: VideoCodec,

    /// Concurrent encodes for the software path (hardware always runs one)
    pub max_workers: usize,

    /// Per-invocation ffmpeg timeout
    pub encode_timeout: Option<Duration>,

    /// Extra ffmpeg arguments inserted before the output path
    pub additional_args: String,
}

impl CompressionConfig {
    /// Build a config, probing ffmpeg for the hardware encoder when it is preferred
    pub fn resolve<R: ProcessRunner + ?Sized>(
        target_size_mb: f64,
        hardware_accel_preference: bool,
        runner: &R,
    ) -> Self {
        let codec = detect_codec(runner, hardware_accel_preference);
        tracing::info!("Using codec: {}", codec.ffmpeg_name());
        Self::with_codec(target_size_mb, hardware_accel_preference, codec)
    }

    /// Build a config with an already-known codec (no capability probe)
    pub fn with_codec(target_size_mb: f64, hardware_accel_preference: bool, codec: VideoCodec) -> Self {
        Self {
            target_size_mb,
            hardware_accel_preference,
            codec,
            max_workers: 1,
            encode_timeout: None,
            additional_args: String::new(),
        }
    }

    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    pub fn encode_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.encode_timeout = timeout;
        self
    }

    pub fn additional_args(mut self, args: impl Into<String>) -> Self {
        self.additional_args = args.into();
        self
    }

    /// Worker limit actually used: a hardware encoder gets a single session
    pub fn effective_workers(&self) -> usize {
        if self.codec.is_hardware() {
            1
        } else {
            self.max_workers.max(1)
        }
    }
}

/// Video bitrate for a duration/size budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BitratePlan {
    pub video_bitrate_kbps: u32,
    /// May exceed the requested target when the bitrate floor was enforced
    pub effective_target_size_mb: f64,
}

impl BitratePlan {
    pub fn was_clamped(&self, requested_target_mb: f64) -> bool {
        self.effective_target_size_mb != requested_target_mb
    }
}

/// One planned encode. `None` start/duration means the whole file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub index: usize,
    pub start_offset_seconds: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub scale_filter: Option<String>,
}

impl Segment {
    /// ffmpeg `-maxrate`, 110% of the target bitrate
    pub fn maxrate_kbps(&self) -> u32 {
        (self.video_bitrate_kbps as f64 * 1.1) as u32
    }

    /// ffmpeg `-bufsize`, twice the target bitrate
    pub fn bufsize_kbps(&self) -> u32 {
        self.video_bitrate_kbps.saturating_mul(2)
    }

    pub fn is_trimmed(&self) -> bool {
        self.start_offset_seconds.is_some() || self.duration_seconds.is_some()
    }
}

/// Ordered list of segments for a job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentPlan {
    pub segments: Vec<Segment>,
}

impl SegmentPlan {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when the source is split into multiple trimmed parts
    pub fn is_split(&self) -> bool {
        self.segments.iter().any(Segment::is_trimmed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }
}
