//! Fit videos under a size budget.
//!
//! Probes a source with ffprobe, plans a video bitrate for the requested size,
//! splits sources that would exceed the 200 MB hard cap into equal parts, and
//! encodes each part to H.264/AAC MP4 with ffmpeg.
//!
//! ```no_run
//! use std::path::Path;
//! use vidfit::{CompressionConfig, SystemRunner, compress};
//!
//! let config = CompressionConfig::resolve(160.0, true, &SystemRunner);
//! let outputs = compress(Path::new("talk.mov"), Path::new("out"), &config)?;
//! if outputs.is_empty() {
//!     eprintln!("nothing was produced");
//! }
//! # Ok::<(), vidfit::JobError>(())
//! ```

pub mod config;
pub mod engine;

pub use engine::{
    CancelToken, CompressionConfig, Compressor, JobError, MediaInfo, SegmentPlan, SystemRunner,
    VideoCodec, compress,
};
