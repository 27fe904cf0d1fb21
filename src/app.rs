use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process;
use vidfit::engine::{self, CompressionConfig, Compressor, SystemRunner};
use vidfit::config;

/// CLI overrides layered on top of the config file
#[derive(Debug, Default)]
struct Overrides {
    target_size_mb: Option<f64>,
    no_hw: bool,
    workers: Option<usize>,
    timeout_secs: Option<u64>,
}

pub fn run(cli: Cli) {
    match cli.command {
        Commands::Compress {
            inputs,
            target_size_mb,
            output_dir,
            no_hw,
            workers,
            timeout_secs,
            json,
        } => {
            let overrides = Overrides {
                target_size_mb,
                no_hw,
                workers,
                timeout_secs,
            };
            handle_compress(inputs, output_dir, overrides, json)
        }
        Commands::Plan {
            input,
            target_size_mb,
            output_dir,
            no_hw,
        } => {
            let overrides = Overrides {
                target_size_mb,
                no_hw,
                ..Default::default()
            };
            handle_plan(input, output_dir, overrides)
        }
        Commands::Probe { file } => handle_probe(file),
        Commands::CheckFfmpeg => handle_check_ffmpeg(),
        Commands::InitConfig => handle_init_config(),
    }
}

fn load_config() -> config::Config {
    config::Config::load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring config file: {:#}", e);
        config::Config::default()
    })
}

/// Merge config defaults with CLI overrides and resolve the codec once
fn build_compression_config(
    defaults: &config::DefaultsConfig,
    overrides: &Overrides,
) -> Result<CompressionConfig> {
    let target_size_mb = overrides.target_size_mb.unwrap_or(defaults.target_size_mb);
    if !target_size_mb.is_finite() || target_size_mb <= 0.0 {
        anyhow::bail!("Target size must be positive, got {}", target_size_mb);
    }

    let use_hw = defaults.use_hardware_encoding && !overrides.no_hw;
    let timeout = match overrides.timeout_secs {
        Some(0) => None,
        Some(secs) => Some(std::time::Duration::from_secs(secs)),
        None => defaults.encode_timeout(),
    };

    Ok(CompressionConfig::resolve(target_size_mb, use_hw, &SystemRunner)
        .max_workers(overrides.workers.unwrap_or(defaults.max_workers as usize))
        .encode_timeout(timeout)
        .additional_args(defaults.additional_args.clone()))
}

fn handle_compress(
    inputs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    overrides: Overrides,
    json: bool,
) {
    let cfg = load_config();
    let output_dir = output_dir.or_else(|| cfg.defaults.output_dir.clone());

    let compression = match build_compression_config(&cfg.defaults, &overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    };

    let files = match engine::collect_inputs(&inputs) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error scanning inputs: {:#}", e);
            process::exit(1);
        }
    };
    if files.is_empty() {
        eprintln!("No video files found");
        process::exit(1);
    }

    let stems = engine::assign_output_stems(&files, output_dir.as_deref());
    let compressor = Compressor::system(compression);
    let mut produced = 0usize;
    let mut failed_sources = 0usize;

    for (file, stem) in files.iter().zip(&stems) {
        match compressor.run_named(file, output_dir.as_deref(), stem) {
            Ok(job) => {
                produced += job.outputs.len();
                if job.produced_nothing() {
                    failed_sources += 1;
                }
                if json {
                    match serde_json::to_string_pretty(&job.report()) {
                        Ok(s) => println!("{}", s),
                        Err(e) => eprintln!("Could not serialize report: {}", e),
                    }
                } else {
                    for output in &job.outputs {
                        println!("{}", output.display());
                    }
                    for failure in &job.failures {
                        eprintln!(
                            "Part {} of {} failed: {}",
                            failure.index + 1,
                            file.display(),
                            failure.error
                        );
                    }
                }
            }
            Err(e) => {
                failed_sources += 1;
                eprintln!("Failed to compress {}: {}", file.display(), e);
            }
        }
    }

    if produced == 0 {
        eprintln!("No output produced");
        process::exit(1);
    }
    if failed_sources > 0 {
        eprintln!("{} of {} source(s) produced no output", failed_sources, files.len());
        process::exit(1);
    }
}

fn handle_plan(input: PathBuf, output_dir: Option<PathBuf>, overrides: Overrides) {
    if let Err(e) = print_plan(&input, output_dir, &overrides) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn print_plan(input: &Path, output_dir: Option<PathBuf>, overrides: &Overrides) -> Result<()> {
    let cfg = load_config();
    let compression = build_compression_config(&cfg.defaults, overrides)?;
    let output_dir = output_dir
        .or_else(|| cfg.defaults.output_dir.clone())
        .unwrap_or_else(|| engine::default_output_dir(input));

    let compressor = Compressor::system(compression);
    let (media, plan) = compressor
        .plan(input)
        .with_context(|| format!("Failed to plan {}", input.display()))?;
    let config = compressor.config();

    println!("Source:   {}", input.display());
    println!(
        "Media:    {:.3}s, {}x{}",
        media.duration_seconds, media.width, media.height
    );
    println!(
        "Encoder:  {} (target {} MB, {} worker(s))",
        config.codec.display_name(),
        config.target_size_mb,
        config.effective_workers()
    );
    println!("Parts:    {}", plan.len());
    println!();

    for task in engine::worker::build_tasks(input, &plan, &output_dir) {
        let seg = &task.segment;
        let window = match (seg.start_offset_seconds, seg.duration_seconds) {
            (Some(start), Some(dur)) => format!("{:.3}s +{:.3}s", start, dur),
            _ => "full length".to_string(),
        };
        println!(
            "[{}] {} | {} kbps video, {} kbps audio{}",
            seg.index + 1,
            window,
            seg.video_bitrate_kbps,
            seg.audio_bitrate_kbps,
            seg.scale_filter
                .as_deref()
                .map(|f| format!(", {}", f))
                .unwrap_or_default()
        );
        let cmd = engine::build_encode_cmd(
            &task.input_path,
            &task.output_path,
            seg,
            config.codec,
            &config.additional_args,
        );
        println!("    {}", engine::format_ffmpeg_cmd(&cmd));
    }

    Ok(())
}

fn handle_probe(file: PathBuf) {
    match engine::probe_media(&SystemRunner, &file) {
        Ok(media) => {
            println!("File: {}", file.display());
            println!("Duration: {:.3} seconds", media.duration_seconds);
            println!("Resolution: {}x{}", media.width, media.height);
        }
        Err(e) => {
            eprintln!("Error probing file: {}", e);
            process::exit(1);
        }
    }
}

fn handle_check_ffmpeg() {
    let runner = SystemRunner;

    match engine::ffmpeg_version(&runner) {
        Ok(version) => println!("ffmpeg found: {}", version),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    match engine::ffprobe_version(&runner) {
        Ok(version) => println!("ffprobe found: {}", version),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    let hw = engine::hardware::check_h264_hw_available(&runner);
    println!(
        "Hardware H.264 ({}): {}",
        engine::VideoCodec::HwH264.ffmpeg_name(),
        if hw { "available" } else { "not available" }
    );
}

fn handle_init_config() {
    match config::Config::config_path() {
        Ok(path) if path.exists() => match config::Config::load_from(&path) {
            Ok(cfg) => {
                println!("Config loaded successfully from {}", path.display());
                println!("{:#?}", cfg);
            }
            Err(e) => {
                eprintln!("Config invalid: {:#}", e);
                process::exit(1);
            }
        },
        Ok(path) => {
            println!("Creating default config...");
            if let Err(err) = config::Config::ensure_default() {
                eprintln!("Failed to save default config: {:#}", err);
                process::exit(1);
            }
            println!("Default config saved to {}", path.display());
        }
        Err(e) => {
            eprintln!("Config path unknown: {:#}", e);
            process::exit(1);
        }
    }
}
