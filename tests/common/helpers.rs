#![allow(dead_code)]

use std::path::{Path, PathBuf};
use vidfit::engine::{CompressionConfig, VideoCodec};

/// Software config that never touches a real ffmpeg
pub fn software_config(target_size_mb: f64) -> CompressionConfig {
    CompressionConfig::with_codec(target_size_mb, false, VideoCodec::SwH264)
}

pub fn hardware_config(target_size_mb: f64) -> CompressionConfig {
    CompressionConfig::with_codec(target_size_mb, true, VideoCodec::HwH264)
}

/// Create an empty stand-in source file
pub fn touch_source(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"source").unwrap();
    path
}

/// Value following `flag` in an argv
pub fn arg_after<'a>(argv: &'a [String], flag: &str) -> Option<&'a str> {
    argv.iter()
        .position(|a| a == flag)
        .and_then(|i| argv.get(i + 1))
        .map(String::as_str)
}
