// Input probing using ffprobe

use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use super::core::MediaInfo;
use super::error::ProbeError;
use super::runner::{ProcessRunner, stderr_tail};

const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u64>,
    height: Option<u64>,
}

/// Build the ffprobe invocation: container format plus the first video stream
pub fn build_probe_cmd(path: &Path) -> Command {
    let mut cmd = Command::new("ffprobe");
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_format",
        "-show_streams",
        "-select_streams",
        "v:0", // First video stream only
    ])
    .arg(path);
    cmd
}

/// Probe a source file for duration and resolution. No retries.
pub fn probe_media<R: ProcessRunner + ?Sized>(
    runner: &R,
    path: &Path,
) -> Result<MediaInfo, ProbeError> {
    let output = runner.run(build_probe_cmd(path), Some(PROBE_TIMEOUT))?;

    if !output.success() {
        return Err(ProbeError::NonZeroExit {
            path: path.to_path_buf(),
            exit_code: output.exit_code,
            stderr: stderr_tail(&output.stderr, 5),
        });
    }

    parse_ffprobe_output(&output.stdout, path)
}

/// Parse ffprobe JSON into [`MediaInfo`]
pub fn parse_ffprobe_output(json: &str, path: &Path) -> Result<MediaInfo, ProbeError> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let duration_str = probe
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| ProbeError::InvalidDuration("missing".to_string()))?;
    let duration_seconds = parse_duration(&duration_str)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref().is_none_or(|t| t == "video"))
        .ok_or_else(|| ProbeError::NoVideoStream(path.to_path_buf()))?;

    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    if width == 0 || height == 0 || width > u32::MAX as u64 || height > u32::MAX as u64 {
        return Err(ProbeError::InvalidResolution { width, height });
    }

    Ok(MediaInfo {
        duration_seconds,
        width: width as u32,
        height: height as u32,
    })
}

fn parse_duration(s: &str) -> Result<f64, ProbeError> {
    match s.trim().parse::<f64>() {
        Ok(d) if d.is_finite() && d > 0.0 => Ok(d),
        _ => Err(ProbeError::InvalidDuration(s.to_string())),
    }
}
