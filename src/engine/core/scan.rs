use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source container extensions accepted when scanning directories.
/// Advisory only: an explicitly named file is compressed whatever its extension.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm"];

/// Check if a path has a supported video file extension
pub fn is_video_file(path: &Path) -> bool {
    if let Some(ext) = path.extension() {
        if let Some(ext_str) = ext.to_str() {
            return SUPPORTED_EXTENSIONS.contains(&ext_str.to_lowercase().as_str());
        }
    }
    false
}

/// Whether a file looks like something we produced, so rescans don't recompress it
pub fn is_compressed_output(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    if stem.ends_with("_compressed") {
        return true;
    }
    stem.rsplit_once("_part")
        .map(|(_, n)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Scan a directory recursively for video files
pub fn scan(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_video_file(path))
        .filter(|path| {
            let skip = is_compressed_output(path);
            if skip {
                tracing::debug!(
                    "Skipping {}: named like a vidfit output (pass it explicitly to compress it)",
                    path.display()
                );
            }
            !skip
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Expand CLI inputs: files are kept as given, directories are scanned
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(scan(input)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}
