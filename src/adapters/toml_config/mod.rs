// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config_initialization::{ClipperConfig, DEFAULT_CONFIG_FILE};
use crate::domain::errors::DomainError;
use crate::error::ClipperError;
use crate::ports::ConfigPort;

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    /// Explicitly requested file; must exist when set
    explicit_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        Self { explicit_path }
    }

    /// Parse a config document; missing keys keep their defaults
    pub fn parse(content: &str) -> Result<ClipperConfig, DomainError> {
        let config: ClipperConfig = toml::from_str(content).map_err(ClipperError::from)?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<ClipperConfig, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

impl ConfigPort for TomlConfigAdapter {
    fn load(&self) -> Result<ClipperConfig, DomainError> {
        match &self.explicit_path {
            Some(path) if !path.exists() => Err(DomainError::ConfigError(format!(
                "Config file does not exist: {}",
                path.display()
            ))),
            Some(path) => Self::read(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::read(path)
                } else {
                    debug!("No {} in the working directory, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(ClipperConfig::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_initialization::FetchPolicy;
    use crate::utils::logging::{LogFormat, LogLevel};
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = TomlConfigAdapter::parse(
            r#"
[clipper]
fetch_policy = "always"
wait_for_probe = false

[logging]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.clipper.fetch_policy, FetchPolicy::Always);
        assert!(!config.clipper.wait_for_probe);
        assert_eq!(config.clipper.default_format, "mp4");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_invalid_value_is_config_error() {
        let err = TomlConfigAdapter::parse("[logging]\nlevel = \"loud\"\n").unwrap_err();
        assert!(matches!(err, DomainError::ConfigError(_)));
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = TempDir::new().unwrap();
        let adapter = TomlConfigAdapter::new(Some(dir.path().join("absent.toml")));
        assert!(matches!(adapter.load(), Err(DomainError::ConfigError(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kayclipper.toml");
        std::fs::write(&path, "[network]\ndownload_timeout_secs = 120\n").unwrap();

        let config = TomlConfigAdapter::new(Some(path)).load().unwrap();
        assert_eq!(config.network.download_timeout_secs, Some(120));
        assert_eq!(config.clipper, ClipperConfig::default().clipper);
    }
}
