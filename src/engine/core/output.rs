use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Output container extension; the output format is fixed regardless of source
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Directory outputs land in when the caller doesn't pick one
pub fn default_output_dir(input_path: &Path) -> PathBuf {
    input_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

/// Base name outputs of `input_path` are derived from
pub fn output_stem(input_path: &Path) -> String {
    input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Output path for one segment of `input_path`.
///
/// Single-output jobs produce `<stem>_compressed.mp4`; split jobs produce
/// `<stem>_part<N>.mp4` with `N` starting at 1.
pub fn derive_output_path(
    input_path: &Path,
    output_dir: &Path,
    segment_index: usize,
    split: bool,
) -> PathBuf {
    output_path_for_stem(&output_stem(input_path), output_dir, segment_index, split)
}

/// Same as [`derive_output_path`] with an explicit stem
pub fn output_path_for_stem(
    stem: &str,
    output_dir: &Path,
    segment_index: usize,
    split: bool,
) -> PathBuf {
    let filename = if split {
        format!("{}_part{}.{}", stem, segment_index + 1, OUTPUT_EXTENSION)
    } else {
        format!("{}_compressed.{}", stem, OUTPUT_EXTENSION)
    };

    output_dir.join(filename)
}

/// Pick an output stem per input so no two inputs write into the same files.
///
/// Inputs whose stems meet in one output directory get their source extension
/// appended (`talk.mov` → `talk_mov`). Anything still taken after that gets a
/// `_2`, `_3`, ... suffix in input order. Comparison ignores case. Inputs
/// without a clash keep their plain stem.
pub fn assign_output_stems(inputs: &[PathBuf], output_dir: Option<&Path>) -> Vec<String> {
    let dir_of = |input: &Path| {
        output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_dir(input))
    };
    let key = |dir: &Path, stem: &str| (dir.to_path_buf(), stem.to_lowercase());

    let mut counts: HashMap<(PathBuf, String), usize> = HashMap::new();
    for input in inputs {
        *counts
            .entry(key(&dir_of(input), &output_stem(input)))
            .or_default() += 1;
    }

    let mut taken: HashSet<(PathBuf, String)> = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let dir = dir_of(input);
            let base = output_stem(input);

            let mut stem = if counts.get(&key(&dir, &base)).copied().unwrap_or(0) > 1 {
                match input.extension().and_then(|e| e.to_str()) {
                    Some(ext) => format!("{}_{}", base, ext.to_lowercase()),
                    None => base.clone(),
                }
            } else {
                base.clone()
            };

            let candidate = stem.clone();
            let mut n = 2;
            while !taken.insert(key(&dir, &stem)) {
                stem = format!("{}_{}", candidate, n);
                n += 1;
            }

            if stem != base {
                tracing::info!(
                    "Output name for {} renamed to '{}' to avoid a clash",
                    input.display(),
                    stem
                );
            }
            stem
        })
        .collect()
}
