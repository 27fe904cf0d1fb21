mod bitrate;
mod ffmpeg_cmd;
mod ffmpeg_info;
mod output;
mod scan;
mod segment;
mod types;

pub use bitrate::{MIN_VIDEO_BITRATE_KBPS, plan_bitrate};
pub use ffmpeg_cmd::{AUDIO_CODEC, build_encode_cmd, format_ffmpeg_cmd, format_seconds};
pub use ffmpeg_info::{ToolError, ffmpeg_version, ffprobe_version};
pub use output::{
    OUTPUT_EXTENSION, assign_output_stems, default_output_dir, derive_output_path, output_path_for_stem,
    output_stem,
};
pub use scan::{SUPPORTED_EXTENSIONS, collect_inputs, is_compressed_output, is_video_file, scan};
pub use segment::{
    DEFAULT_AUDIO_BITRATE_KBPS, DOWNSCALE_HEIGHT, HARD_CAP_MB, LONG_VIDEO_AUDIO_BITRATE_KBPS,
    LONG_VIDEO_THRESHOLD_MIN, is_long_video, plan_job, segment, segment_count,
    select_audio_bitrate, select_scale_filter,
};
pub use types::{BitratePlan, CompressionConfig, MediaInfo, Segment, SegmentPlan};
