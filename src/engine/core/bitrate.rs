//! Target-size bitrate planning.

use super::types::BitratePlan;
use crate::engine::error::PlanError;

/// Video bitrate floor. Plans that would go lower are clamped and the file grows.
pub const MIN_VIDEO_BITRATE_KBPS: u32 = 200;

/// Bits in one (binary) megabyte
const BITS_PER_MB: f64 = 8.0 * 1024.0 * 1024.0;

/// Derive the video bitrate that fits `target_size_mb` over `duration_seconds`
/// once `audio_bitrate_kbps` is reserved.
///
/// When the result would fall below [`MIN_VIDEO_BITRATE_KBPS`] the bitrate is
/// clamped to the floor and `effective_target_size_mb` reports the size the
/// clamped plan will actually produce.
pub fn plan_bitrate(
    duration_seconds: f64,
    target_size_mb: f64,
    audio_bitrate_kbps: u32,
) -> Result<BitratePlan, PlanError> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return Err(PlanError::InvalidDuration(duration_seconds));
    }
    if !target_size_mb.is_finite() || target_size_mb <= 0.0 {
        return Err(PlanError::InvalidTargetSize(target_size_mb));
    }

    let total_bitrate_bps = target_size_mb * BITS_PER_MB / duration_seconds;
    let audio_bitrate_bps = audio_bitrate_kbps as f64 * 1024.0;
    let video_bitrate_kbps = ((total_bitrate_bps - audio_bitrate_bps) / 1024.0).floor();

    if video_bitrate_kbps < MIN_VIDEO_BITRATE_KBPS as f64 {
        let required_bps = MIN_VIDEO_BITRATE_KBPS as f64 * 1024.0 + audio_bitrate_bps;
        return Ok(BitratePlan {
            video_bitrate_kbps: MIN_VIDEO_BITRATE_KBPS,
            effective_target_size_mb: required_bps * duration_seconds / BITS_PER_MB,
        });
    }

    Ok(BitratePlan {
        // Saturates for absurdly short clips with huge budgets
        video_bitrate_kbps: video_bitrate_kbps as u32,
        effective_target_size_mb: target_size_mb,
    })
}
