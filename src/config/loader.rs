//! Configuration File Loading
//!
//! Handles loading and saving the boot configuration from the usual
//! locations, falling back to built-in defaults when nothing is found. PID 1
//! must come up even with a broken config file, so parse failures are
//! reported and skipped rather than propagated by [`ConfigLoader::load`].
//!
//! A file named by `PIDONE_CONFIG` is tried first, exactly as given, with
//! the format picked from its extension. It is still part of the boot-time
//! search: if it is missing or broken a warning is logged and the system
//! locations are tried next. Only [`ConfigLoader::load_from_file`], the
//! path the operator passes explicitly, turns a bad file into an error.

use super::BootConfig;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "PIDONE_CONFIG";

/// Kernel command line, read for `debug`/`quiet` switches
pub const KERNEL_CMDLINE: &str = "/proc/cmdline";

/// Configuration file loader
pub struct ConfigLoader {
    /// File named by `PIDONE_CONFIG`, tried as is before the search paths
    env_file: Option<PathBuf>,
    /// Search paths for configuration files, without extension
    search_paths: Vec<PathBuf>,
    /// Supported configuration file formats
    supported_formats: Vec<ConfigFormat>,
    /// Current configuration file path (if loaded)
    current_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }

    /// Pick a format from a file extension, defaulting to TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            env_file: env::var_os(CONFIG_ENV).map(PathBuf::from),
            search_paths: Self::get_search_paths(),
            supported_formats: vec![ConfigFormat::Toml, ConfigFormat::Json],
            current_path: None,
        }
    }

    /// Load configuration from the search paths, then apply environment and
    /// kernel command line overrides
    pub fn load() -> BootConfig {
        let mut loader = Self::new();
        let mut config = match loader.find_and_load_config() {
            Some((path, config)) => {
                info!("Configuration loaded from {}", path.display());
                loader.current_path = Some(path);
                config
            }
            None => {
                debug!("No configuration file found, using defaults");
                BootConfig::default()
            }
        };

        config.apply_env();
        if let Ok(cmdline) = fs::read_to_string(KERNEL_CMDLINE) {
            config.apply_cmdline(&cmdline);
        }
        config
    }

    /// Load a specific configuration file, format chosen by extension
    pub fn load_from_file(path: &Path) -> Result<BootConfig> {
        let loader = Self::new();
        let config = loader.load_config_file(path, ConfigFormat::from_path(path))?;
        loader.validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config: &BootConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let format = ConfigFormat::from_path(path);
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                }
            })?,
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })?
            }
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Find and load configuration from search paths
    fn find_and_load_config(&self) -> Option<(PathBuf, BootConfig)> {
        if let Some(path) = &self.env_file {
            match self
                .load_config_file(path, ConfigFormat::from_path(path))
                .and_then(|config| self.validate_config(&config).map(|_| config))
            {
                Ok(config) => return Some((path.clone(), config)),
                Err(e) => warn!("Ignoring {}={}: {}", CONFIG_ENV, path.display(), e),
            }
        }

        for path in &self.search_paths {
            for format in &self.supported_formats {
                let config_path = self.get_config_path_for_format(path, *format);
                if !config_path.exists() {
                    continue;
                }

                match self
                    .load_config_file(&config_path, *format)
                    .and_then(|config| self.validate_config(&config).map(|_| config))
                {
                    Ok(config) => return Some((config_path, config)),
                    Err(e) => {
                        // Keep searching, a bad file must not stop the boot
                        warn!("Failed to load config from {}: {}", config_path.display(), e);
                    }
                }
            }
        }

        None
    }

    /// Load a specific configuration file
    fn load_config_file(&self, path: &Path, format: ConfigFormat) -> Result<BootConfig> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        match format {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                format: format.name().to_string(),
                reason: e.to_string(),
            }),
            ConfigFormat::Json => {
                serde_json::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Get configuration file path for a specific format
    fn get_config_path_for_format(&self, base_path: &Path, format: ConfigFormat) -> PathBuf {
        base_path.with_extension(format.extension())
    }

    /// Get default search paths for configuration files
    fn get_search_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/etc/pidone"),
            PathBuf::from("/etc/pidone.d/pidone"),
        ]
    }

    /// Validate configuration
    fn validate_config(&self, config: &BootConfig) -> Result<()> {
        if config.poll_interval_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "poll_interval_ms".to_string(),
                reason: "Polling interval must be greater than 0".to_string(),
            });
        }

        if config.console_device.as_os_str().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "console_device".to_string(),
                reason: "Console device cannot be empty".to_string(),
            });
        }

        if config.null_device.as_os_str().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "null_device".to_string(),
                reason: "Null device cannot be empty".to_string(),
            });
        }

        if config.shutdown_marker == config.stopped_marker {
            return Err(Error::ConfigValidationFailed {
                field: "stopped_marker".to_string(),
                reason: "Shutdown and stopped markers must differ".to_string(),
            });
        }

        Ok(())
    }

    /// Get the current configuration file path
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// List all search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// File named by `PIDONE_CONFIG`, if any
    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    /// Clear all search paths, including `PIDONE_CONFIG`, and add a single path
    pub fn set_search_path(&mut self, path: PathBuf) {
        self.env_file = None;
        self.search_paths = vec![path];
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
