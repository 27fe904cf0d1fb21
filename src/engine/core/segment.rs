//! Segmentation planning: decides whether a source must be split to stay under
//! the hard output-size cap, and derives per-segment encode parameters.

use super::bitrate::plan_bitrate;
use super::types::{MediaInfo, Segment, SegmentPlan};
use crate::engine::error::PlanError;

/// Absolute per-file size ceiling (MB) that forces splitting
pub const HARD_CAP_MB: f64 = 200.0;

/// Sources at least this long get reduced audio and are considered for downscaling
pub const LONG_VIDEO_THRESHOLD_MIN: f64 = 60.0;

pub const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 128;
pub const LONG_VIDEO_AUDIO_BITRATE_KBPS: u32 = 64;

/// Output height for downscaled long videos
pub const DOWNSCALE_HEIGHT: u32 = 720;

pub fn is_long_video(duration_seconds: f64) -> bool {
    duration_seconds / 60.0 >= LONG_VIDEO_THRESHOLD_MIN
}

/// Audio bitrate for a source of the given length
pub fn select_audio_bitrate(duration_seconds: f64) -> u32 {
    if is_long_video(duration_seconds) {
        LONG_VIDEO_AUDIO_BITRATE_KBPS
    } else {
        DEFAULT_AUDIO_BITRATE_KBPS
    }
}

/// Scale filter for a source, decided on the original duration (not the segment's)
pub fn select_scale_filter(media: &MediaInfo) -> Option<String> {
    if is_long_video(media.duration_seconds) && media.height > DOWNSCALE_HEIGHT {
        // -2 keeps the aspect ratio with an even width
        Some(format!("scale=-2:{}", DOWNSCALE_HEIGHT))
    } else {
        None
    }
}

/// Number of parts needed for an oversized plan, or 1 if it fits under the cap
pub fn segment_count(effective_target_size_mb: f64, configured_target_size_mb: f64) -> usize {
    if effective_target_size_mb > HARD_CAP_MB {
        (effective_target_size_mb / configured_target_size_mb).floor() as usize + 1
    } else {
        1
    }
}

/// Build the segment plan for a source.
///
/// Splits into equal-width windows when `effective_target_size_mb` exceeds
/// [`HARD_CAP_MB`]. Each window's bitrate is re-planned for its own duration
/// against `configured_target_size_mb`. Starts are running sums and the last
/// window takes whatever remains, so the windows cover `[0, duration)` exactly.
pub fn segment(
    duration_seconds: f64,
    effective_target_size_mb: f64,
    configured_target_size_mb: f64,
    media: &MediaInfo,
    audio_bitrate_kbps: u32,
) -> Result<SegmentPlan, PlanError> {
    if !configured_target_size_mb.is_finite() || configured_target_size_mb <= 0.0 {
        return Err(PlanError::InvalidTargetSize(configured_target_size_mb));
    }

    let scale_filter = select_scale_filter(media);
    let count = segment_count(effective_target_size_mb, configured_target_size_mb);

    if count == 1 {
        let bitrate = plan_bitrate(duration_seconds, configured_target_size_mb, audio_bitrate_kbps)?;
        return Ok(SegmentPlan {
            segments: vec![Segment {
                index: 0,
                start_offset_seconds: None,
                duration_seconds: None,
                video_bitrate_kbps: bitrate.video_bitrate_kbps,
                audio_bitrate_kbps,
                scale_filter,
            }],
        });
    }

    let width = duration_seconds / count as f64;
    let mut segments = Vec::with_capacity(count);
    let mut start = 0.0;

    for index in 0..count {
        let length = if index + 1 == count {
            duration_seconds - start
        } else {
            width
        };

        let bitrate = plan_bitrate(length, configured_target_size_mb, audio_bitrate_kbps)?;
        segments.push(Segment {
            index,
            start_offset_seconds: Some(start),
            duration_seconds: Some(length),
            video_bitrate_kbps: bitrate.video_bitrate_kbps,
            audio_bitrate_kbps,
            scale_filter: scale_filter.clone(),
        });

        start += length;
    }

    Ok(SegmentPlan { segments })
}

/// Plan a whole job: audio selection, full-length bitrate, then segmentation
pub fn plan_job(media: &MediaInfo, configured_target_size_mb: f64) -> Result<SegmentPlan, PlanError> {
    let audio_bitrate_kbps = select_audio_bitrate(media.duration_seconds);
    let bitrate = plan_bitrate(
        media.duration_seconds,
        configured_target_size_mb,
        audio_bitrate_kbps,
    )?;

    tracing::debug!(
        "Full-length plan: {} kbps video, {} kbps audio, {:.1} MB effective",
        bitrate.video_bitrate_kbps,
        audio_bitrate_kbps,
        bitrate.effective_target_size_mb
    );

    segment(
        media.duration_seconds,
        bitrate.effective_target_size_mb,
        configured_target_size_mb,
        media,
        audio_bitrate_kbps,
    )
}
