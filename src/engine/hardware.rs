//! H.264 encoder selection and hardware capability detection

use serde::{Deserialize, Serialize};
use std::process::Command;
use std::time::Duration;

use super::runner::ProcessRunner;

/// Preset passed to the software encoder
pub const SOFTWARE_PRESET: &str = "medium";

/// Capability probes should never take long; a hung ffmpeg means "unavailable"
const DETECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Supported video encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    HwH264, // VideoToolbox (Apple silicon / macOS)
    SwH264, // libx264
}

impl VideoCodec {
    /// Get the FFmpeg encoder name
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            Self::HwH264 => "h264_videotoolbox",
            Self::SwH264 => "libx264",
        }
    }

    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::HwH264)
    }

    /// Encoder preset, if the encoder takes one
    pub fn preset(&self) -> Option<&'static str> {
        match self {
            Self::HwH264 => None,
            Self::SwH264 => Some(SOFTWARE_PRESET),
        }
    }

    /// Get user-friendly display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HwH264 => "H.264 VideoToolbox (Hardware)",
            Self::SwH264 => "libx264 (Software)",
        }
    }
}

/// Output of `ffmpeg -encoders`, empty if ffmpeg could not be run
pub fn ffmpeg_encoders_output<R: ProcessRunner + ?Sized>(runner: &R) -> String {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-encoders"]);

    match runner.run(cmd, Some(DETECT_TIMEOUT)) {
        Ok(output) if output.success() => output.stdout,
        Ok(output) => {
            tracing::debug!("ffmpeg -encoders exited with {:?}", output.exit_code);
            String::new()
        }
        Err(e) => {
            tracing::debug!("ffmpeg -encoders failed: {}", e);
            String::new()
        }
    }
}

/// Whether this ffmpeg build lists the hardware H.264 encoder
pub fn check_h264_hw_available<R: ProcessRunner + ?Sized>(runner: &R) -> bool {
    encoders_list_contains(&ffmpeg_encoders_output(runner), VideoCodec::HwH264.ffmpeg_name())
}

/// Match an encoder by name in `ffmpeg -encoders` output.
///
/// Lines look like ` V....D h264_videotoolbox    VideoToolbox H.264 Encoder`;
/// the name is the second column.
pub fn encoders_list_contains(encoders_output: &str, name: &str) -> bool {
    encoders_output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|encoder| encoder == name)
}

/// Select the encoder from the user's preference and what ffmpeg offers.
/// Falls back to software when hardware is unavailable.
pub fn select_codec(use_hardware: bool, hw_available: bool) -> VideoCodec {
    if use_hardware && hw_available {
        VideoCodec::HwH264
    } else {
        VideoCodec::SwH264
    }
}

/// Resolve the codec, probing ffmpeg only when hardware is requested
pub fn detect_codec<R: ProcessRunner + ?Sized>(runner: &R, use_hardware: bool) -> VideoCodec {
    if !use_hardware {
        return VideoCodec::SwH264;
    }

    let available = check_h264_hw_available(runner);
    if !available {
        tracing::info!(
            "{} not available, falling back to {}",
            VideoCodec::HwH264.ffmpeg_name(),
            VideoCodec::SwH264.ffmpeg_name()
        );
    }
    select_codec(use_hardware, available)
}
