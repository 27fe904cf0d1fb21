use std::path::Path;
use std::process::Command;

use super::types::Segment;
use crate::engine::hardware::VideoCodec;

/// Audio encoder for every output (MP4-compatible)
pub const AUDIO_CODEC: &str = "aac";

/// Format a time offset for `-ss` / `-t` (millisecond precision)
pub fn format_seconds(seconds: f64) -> String {
    format_millis(to_millis(seconds))
}

fn to_millis(seconds: f64) -> u64 {
    (seconds * 1000.0).round().max(0.0) as u64
}

fn format_millis(millis: u64) -> String {
    format!("{}.{:03}", millis / 1000, millis % 1000)
}

/// `-t` for a trimmed window. With a start offset the duration is taken
/// between the rounded start and rounded end, so consecutive windows share
/// their boundary on the command line too.
fn window_duration_arg(start: Option<f64>, duration: f64) -> String {
    match start {
        Some(start) => {
            let end = to_millis(start + duration);
            format_millis(end.saturating_sub(to_millis(start)))
        }
        None => format_seconds(duration),
    }
}

/// Build the ffmpeg invocation that encodes one planned segment.
///
/// The start offset goes before `-i` (input seeking, frame-accurate when
/// transcoding) and the duration after it. Output is always H.264 + AAC with
/// the moov atom moved to the front for progressive playback.
pub fn build_encode_cmd(
    input: &Path,
    output: &Path,
    segment: &Segment,
    codec: VideoCodec,
    additional_args: &str,
) -> Command {
    let mut cmd = Command::new("ffmpeg");

    cmd.arg("-hide_banner").arg("-nostdin").arg("-y");

    // Trim window
    if let Some(start) = segment.start_offset_seconds {
        cmd.arg("-ss").arg(format_seconds(start));
    }
    cmd.arg("-i").arg(input);
    if let Some(duration) = segment.duration_seconds {
        cmd.arg("-t")
            .arg(window_duration_arg(segment.start_offset_seconds, duration));
    }

    // Video codec and rate control
    cmd.arg("-c:v").arg(codec.ffmpeg_name());
    cmd.arg("-b:v").arg(format!("{}k", segment.video_bitrate_kbps));
    cmd.arg("-maxrate").arg(format!("{}k", segment.maxrate_kbps()));
    cmd.arg("-bufsize").arg(format!("{}k", segment.bufsize_kbps()));

    if let Some(preset) = codec.preset() {
        cmd.arg("-preset").arg(preset);
    }

    if let Some(filter) = &segment.scale_filter {
        cmd.arg("-vf").arg(filter);
    }

    // Audio
    cmd.arg("-c:a").arg(AUDIO_CODEC);
    cmd.arg("-b:a").arg(format!("{}k", segment.audio_bitrate_kbps));

    cmd.arg("-movflags").arg("+faststart");

    apply_additional_args(&mut cmd, additional_args);

    cmd.arg(output);
    cmd
}

/// Apply additional user-provided FFmpeg arguments to the command.
/// Uses shell-style parsing so quoted strings with spaces are preserved.
fn apply_additional_args(cmd: &mut Command, additional_args: &str) {
    if additional_args.trim().is_empty() {
        return;
    }

    if let Some(args) = shlex::split(additional_args) {
        cmd.args(args);
    } else {
        // Unbalanced quotes: fall back to a plain whitespace split
        tracing::warn!("Could not parse additional args, splitting on whitespace");
        cmd.args(additional_args.split_whitespace());
    }
}

/// Render a command as a copy-pasteable shell line
pub fn format_ffmpeg_cmd(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| {
            let s = arg.to_string_lossy();
            shlex::try_quote(&s)
                .map(|q| q.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}
