use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidfit")]
#[command(about = "Compress videos to fit under a size budget", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress files, or every supported video under the given directories
    Compress {
        /// Video files or directories to scan
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Size budget per output file in MB (overrides config)
        #[arg(long, value_name = "MB")]
        target_size_mb: Option<f64>,

        /// Output directory (defaults to each source's directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Use the software encoder even if hardware H.264 is available
        #[arg(long)]
        no_hw: bool,

        /// Concurrent segment encodes on the software path
        #[arg(long, value_name = "N")]
        workers: Option<usize>,

        /// Kill an ffmpeg encode after this many seconds (0 = no limit)
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Print a JSON report per source instead of plain output paths
        #[arg(long)]
        json: bool,
    },

    /// Show the plan and ffmpeg commands without encoding (dry run)
    Plan {
        /// Video file to plan
        input: PathBuf,

        /// Size budget per output file in MB (overrides config)
        #[arg(long, value_name = "MB")]
        target_size_mb: Option<f64>,

        /// Output directory used in the printed commands
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Plan for the software encoder
        #[arg(long)]
        no_hw: bool,
    },

    /// Probe a video file for duration and resolution
    Probe {
        /// Path to the video file
        file: PathBuf,
    },

    /// Check if ffmpeg and ffprobe are installed and hardware H.264 is usable
    CheckFfmpeg,

    /// Show config status and location, or create default config if missing
    InitConfig,
}

pub fn parse() -> Cli {
    Cli::parse()
}
