//! Configuration initialization and hierarchy management
//!
//! Precedence: CLI > environment > config file > defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::adapters::toml_config::TomlConfigAdapter;
use crate::cli::{Cli, Commands};
use crate::domain::errors::DomainError;
use crate::domain::model::{Container, Quality};
use crate::ports::ConfigPort;
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "kayclipper.toml";

const ENV_BIN_DIR: &str = "KAYCLIPPER_BIN_DIR";
const ENV_LOG_LEVEL: &str = "KAYCLIPPER_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "KAYCLIPPER_LOG_FORMAT";
const ENV_FETCH_POLICY: &str = "KAYCLIPPER_FETCH_POLICY";
const ENV_HWACCEL: &str = "KAYCLIPPER_HWACCEL";

/// What to do when a tool is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPolicy {
    /// Prompt before downloading
    #[default]
    Ask,
    /// Download without asking
    Always,
    /// Never download
    Never,
}

impl fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchPolicy::Ask => "ask",
            FetchPolicy::Always => "always",
            FetchPolicy::Never => "never",
        };
        f.write_str(name)
    }
}

impl FromStr for FetchPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ask" | "prompt" => Ok(FetchPolicy::Ask),
            "always" | "yes" => Ok(FetchPolicy::Always),
            "never" | "no" => Ok(FetchPolicy::Never),
            _ => Err(DomainError::ConfigError(format!(
                "Invalid fetch policy: {}. Valid policies: ask, always, never",
                s
            ))),
        }
    }
}

/// `[clipper]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipperSettings {
    /// Managed directory for downloaded yt-dlp/ffmpeg
    pub bin_dir: PathBuf,
    /// Container used when `--format` is not given
    pub default_format: String,
    /// Quality used when `--quality` is not given
    pub default_quality: String,
    pub fetch_policy: FetchPolicy,
    /// Use the GPU encoder when one is detected
    pub hardware_acceleration: bool,
    /// Let a clip wait for the GPU probe instead of using what is known so far
    pub wait_for_probe: bool,
}

impl Default for ClipperSettings {
    fn default() -> Self {
        Self {
            bin_dir: PathBuf::from("bin"),
            default_format: "mp4".to_string(),
            default_quality: "Best".to_string(),
            fetch_policy: FetchPolicy::Ask,
            hardware_acceleration: true,
            wait_for_probe: true,
        }
    }
}

/// `[network]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Upper bound for one dependency download; unbounded when absent
    pub download_timeout_secs: Option<u64>,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipperConfig {
    pub clipper: ClipperSettings,
    pub logging: LoggingConfig,
    pub network: NetworkSettings,
}

fn parse_bool(name: &str, value: &str) -> Result<bool, DomainError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DomainError::ConfigError(format!(
            "Invalid boolean value for {}: {}",
            name, value
        ))),
    }
}

impl ClipperConfig {
    pub fn download_timeout(&self) -> Option<Duration> {
        self.network.download_timeout_secs.map(Duration::from_secs)
    }

    /// Reject values that only fail later, deep inside a command
    pub fn validate(&self) -> Result<(), DomainError> {
        Container::from_str(&self.clipper.default_format).map_err(|e| {
            DomainError::ConfigError(format!("clipper.default_format: {}", e))
        })?;
        Quality::from_str(&self.clipper.default_quality).map_err(|e| {
            DomainError::ConfigError(format!("clipper.default_quality: {}", e))
        })?;
        if self.network.download_timeout_secs == Some(0) {
            return Err(DomainError::ConfigError(
                "network.download_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `KAYCLIPPER_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), DomainError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply `KAYCLIPPER_*` variables from an arbitrary lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overrides = 0;

        if let Some(value) = lookup(ENV_BIN_DIR) {
            self.clipper.bin_dir = PathBuf::from(value);
            overrides += 1;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = value.parse::<LogLevel>()?;
            overrides += 1;
        }
        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = value.parse::<LogFormat>()?;
            overrides += 1;
        }
        if let Some(value) = lookup(ENV_FETCH_POLICY) {
            self.clipper.fetch_policy = value.parse()?;
            overrides += 1;
        }
        if let Some(value) = lookup(ENV_HWACCEL) {
            self.clipper.hardware_acceleration = parse_bool(ENV_HWACCEL, &value)?;
            overrides += 1;
        }

        if overrides > 0 {
            debug!("Applied {} environment variable overrides", overrides);
        }
        Ok(())
    }

    /// Apply global and per-command flags
    pub fn apply_cli_overrides(&mut self, cli: &Cli) -> Result<(), DomainError> {
        if let Some(level) = &cli.log_level {
            self.logging.level = level.parse()?;
        }
        if let Some(format) = &cli.log_format {
            self.logging.format = format.parse()?;
        }
        if let Some(bin_dir) = &cli.bin_dir {
            self.clipper.bin_dir = bin_dir.clone();
        }

        match &cli.command {
            Commands::Clip(args) => {
                if args.yes {
                    self.clipper.fetch_policy = FetchPolicy::Always;
                }
                if args.no_hwaccel {
                    self.clipper.hardware_acceleration = false;
                }
            }
            Commands::Deps(args) => {
                if args.yes {
                    self.clipper.fetch_policy = FetchPolicy::Always;
                }
            }
            Commands::Probe(_) => {}
        }
        Ok(())
    }
}

/// Build the effective configuration for one CLI invocation
pub fn initialize_configuration(cli: &Cli) -> Result<ClipperConfig, DomainError> {
    let mut config = TomlConfigAdapter::new(cli.config.clone()).load()?;
    config.apply_env_overrides()?;
    config.apply_cli_overrides(cli)?;
    config.validate()?;

    info!(
        "Configuration ready (bin_dir: {}, fetch: {}, hwaccel: {})",
        config.clipper.bin_dir.display(),
        config.clipper.fetch_policy,
        config.clipper.hardware_acceleration
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClipperConfig::default();
        assert_eq!(config.clipper.bin_dir, PathBuf::from("bin"));
        assert_eq!(config.clipper.fetch_policy, FetchPolicy::Ask);
        assert!(config.clipper.hardware_acceleration);
        assert!(config.clipper.wait_for_probe);
        assert_eq!(config.download_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClipperConfig::default();
        config
            .apply_env_with(env(&[
                ("KAYCLIPPER_BIN_DIR", "/opt/tools"),
                ("KAYCLIPPER_LOG_LEVEL", "debug"),
                ("KAYCLIPPER_FETCH_POLICY", "never"),
                ("KAYCLIPPER_HWACCEL", "off"),
            ]))
            .unwrap();

        assert_eq!(config.clipper.bin_dir, PathBuf::from("/opt/tools"));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.clipper.fetch_policy, FetchPolicy::Never);
        assert!(!config.clipper.hardware_acceleration);
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = ClipperConfig::default();
        let err = config
            .apply_env_with(env(&[("KAYCLIPPER_HWACCEL", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, DomainError::ConfigError(_)));
    }

    #[test]
    fn test_cli_beats_env() {
        let mut config = ClipperConfig::default();
        config
            .apply_env_with(env(&[
                ("KAYCLIPPER_BIN_DIR", "/from/env"),
                ("KAYCLIPPER_FETCH_POLICY", "never"),
            ]))
            .unwrap();

        let cli = Cli::parse_from([
            "kayclipper",
            "--bin-dir",
            "/from/cli",
            "clip",
            "--url",
            "https://example/video",
            "--output",
            "clip.mp4",
            "--yes",
            "--no-hwaccel",
        ]);
        config.apply_cli_overrides(&cli).unwrap();

        assert_eq!(config.clipper.bin_dir, PathBuf::from("/from/cli"));
        assert_eq!(config.clipper.fetch_policy, FetchPolicy::Always);
        assert!(!config.clipper.hardware_acceleration);
    }

    #[test]
    fn test_validate_rejects_bad_defaults() {
        let mut config = ClipperConfig::default();
        config.clipper.default_format = "avi".to_string();
        assert!(matches!(config.validate(), Err(DomainError::ConfigError(_))));

        let mut config = ClipperConfig::default();
        config.network.download_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }
}
