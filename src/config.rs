// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Size budget per output file in MB (keep under the 200 MB hard cap)
    #[serde(default = "default_target_size_mb")]
    pub target_size_mb: f64,

    /// Use the hardware H.264 encoder when ffmpeg offers it
    #[serde(default = "default_true_config")]
    pub use_hardware_encoding: bool,

    /// Concurrent segment encodes on the software path
    #[serde(default = "default_max_workers")]
    pub max_workers: u32,

    /// Kill an ffmpeg encode after this many seconds (0 = no limit)
    #[serde(default)]
    pub encode_timeout_secs: u64,

    /// Where outputs go; defaults to the source file's directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Extra ffmpeg arguments, shell-quoted (e.g. "-tune film")
    #[serde(default)]
    pub additional_args: String,
}

fn default_target_size_mb() -> f64 {
    160.0
}

fn default_max_workers() -> u32 {
    1
}

fn default_true_config() -> bool {
    true
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            target_size_mb: default_target_size_mb(),
            use_hardware_encoding: true,
            max_workers: default_max_workers(),
            encode_timeout_secs: 0,
            output_dir: None,
            additional_args: String::new(),
        }
    }
}

impl DefaultsConfig {
    pub fn encode_timeout(&self) -> Option<Duration> {
        (self.encode_timeout_secs > 0).then(|| Duration::from_secs(self.encode_timeout_secs))
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("vidfit")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("vidfit")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();

            // Try to save the default config, but don't fail if we can't
            if let Err(e) = config.save() {
                tracing::warn!("Could not create default config file: {:#}", e);
                tracing::warn!(
                    "Using built-in defaults. Run 'vidfit init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the planner can't work with
    pub fn validate(&self) -> Result<()> {
        let target = self.defaults.target_size_mb;
        if !target.is_finite() || target <= 0.0 {
            anyhow::bail!("target_size_mb must be positive, got {}", target);
        }
        if self.defaults.max_workers == 0 {
            anyhow::bail!("max_workers must be at least 1");
        }
        Ok(())
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Create a default config file if it doesn't exist
    pub fn ensure_default() -> Result<()> {
        if !Self::exists() {
            let config = Config::default();
            config.save()?;
        }
        Ok(())
    }
}
