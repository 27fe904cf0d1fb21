// Probing and encoder detection through the process runner

use crate::common::fake_runner::{FakeRunner, Response, probe_json};
use std::path::Path;
use vidfit::engine::hardware::{check_h264_hw_available, detect_codec};
use vidfit::engine::{
    CompressionConfig, ProbeError, ToolError, VideoCodec, ffmpeg_version, ffprobe_version,
    probe_media,
};

const MAC_ENCODERS: &str = "\
Encoders:
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10 (codec h264)
 V....D h264_videotoolbox    VideoToolbox H.264 Encoder (codec h264)
";

const LINUX_ENCODERS: &str = "\
Encoders:
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10 (codec h264)
 V....D h264_vaapi           H.264/AVC (VAAPI) (codec h264)
";

#[test]
fn test_probe_media_reads_duration_and_resolution() {
    let runner = FakeRunner::new().with_probe(5400.25, 3840, 2160);
    let media = probe_media(&runner, Path::new("/videos/concert.mkv")).unwrap();

    assert_eq!(media.duration_seconds, 5400.25);
    assert_eq!(media.width, 3840);
    assert_eq!(media.height, 2160);

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][0], "ffprobe");
    assert!(calls[0].contains(&"json".to_string()));
    assert_eq!(calls[0].last().unwrap(), "/videos/concert.mkv");
}

#[test]
fn test_probe_spawn_failure() {
    let runner = FakeRunner::new();
    runner.expect("ffprobe", Response::SpawnFails);

    let err = probe_media(&runner, Path::new("x.mp4")).unwrap_err();
    assert!(matches!(err, ProbeError::Run(_)));
}

#[test]
fn test_probe_garbage_output() {
    let runner = FakeRunner::new();
    runner.expect("ffprobe", Response::ok("not json"));

    let err = probe_media(&runner, Path::new("x.mp4")).unwrap_err();
    assert!(matches!(err, ProbeError::Parse(_)));
}

#[test]
fn test_probe_audio_only_file() {
    let runner = FakeRunner::new();
    runner.expect(
        "ffprobe",
        Response::ok(r#"{"streams":[],"format":{"duration":"180.0"}}"#),
    );

    let err = probe_media(&runner, Path::new("song.mp4")).unwrap_err();
    assert!(matches!(err, ProbeError::NoVideoStream(_)));
}

#[test]
fn test_probe_json_helper_round_trips() {
    let runner = FakeRunner::new();
    runner.expect("ffprobe", Response::ok(probe_json(90.5, 640, 360)));
    let media = probe_media(&runner, Path::new("a.mp4")).unwrap();
    assert_eq!(media.duration_seconds, 90.5);
}

#[test]
fn test_hardware_detected_from_encoder_list() {
    let runner = FakeRunner::new();
    runner.expect("-encoders", Response::ok(MAC_ENCODERS));
    assert!(check_h264_hw_available(&runner));
    assert_eq!(detect_codec(&runner, true), VideoCodec::HwH264);

    let config = CompressionConfig::resolve(160.0, true, &runner);
    assert_eq!(config.codec, VideoCodec::HwH264);
    assert_eq!(config.effective_workers(), 1);
}

#[test]
fn test_hardware_missing_falls_back_to_software() {
    let runner = FakeRunner::new();
    runner.expect("-encoders", Response::ok(LINUX_ENCODERS));
    assert!(!check_h264_hw_available(&runner));
    assert_eq!(detect_codec(&runner, true), VideoCodec::SwH264);
}

#[test]
fn test_ffmpeg_unavailable_means_software() {
    let runner = FakeRunner::new();
    runner.expect("ffmpeg", Response::SpawnFails);
    assert_eq!(detect_codec(&runner, true), VideoCodec::SwH264);
}

#[test]
fn test_software_preference_skips_capability_probe() {
    let runner = FakeRunner::new();
    let config = CompressionConfig::resolve(160.0, false, &runner);

    assert_eq!(config.codec, VideoCodec::SwH264);
    assert!(!config.hardware_accel_preference);
    assert!(runner.calls().is_empty());
}

#[test]
fn test_tool_versions() {
    let runner = FakeRunner::new();
    runner.expect(
        "ffmpeg -version",
        Response::ok("ffmpeg version 7.1 Copyright (c) 2000-2024\nbuilt with clang"),
    );
    runner.expect("ffprobe -version", Response::SpawnFails);

    assert_eq!(
        ffmpeg_version(&runner).unwrap(),
        "ffmpeg version 7.1 Copyright (c) 2000-2024"
    );
    assert!(matches!(
        ffprobe_version(&runner),
        Err(ToolError::Missing { tool: "ffprobe", .. })
    ));
}
