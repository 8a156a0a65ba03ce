//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Runtime config (~/.nea/nea-runtime.yaml)
//! 3. Environment variables (NEA_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::{ChecksumPolicy, RuntimeConfig};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Runtime config file name inside the config directory
const RUNTIME_CONFIG_FILE: &str = "nea-runtime.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a new hierarchical config loader
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the standard config directory (~/.nea)
    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::invalid_config("Could not determine home directory"))?;

        Ok(Utf8PathBuf::from(home).join(".nea"))
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        // Start with embedded defaults
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        let runtime_config_path = self.config_dir.join(RUNTIME_CONFIG_FILE);
        if runtime_config_path.exists() {
            debug!("Loading runtime config from {}", runtime_config_path);
            let file_config = self.load_yaml_file::<RuntimeConfig>(&runtime_config_path)?;
            config = Self::merge_runtime_config(config, file_config);
        }

        config = self.apply_env_overrides(config)?;

        Ok(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        let config: T = serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })?;

        Ok(config)
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let config: T = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        Ok(config)
    }

    /// Merge two runtime configs (base is overridden by overlay)
    fn merge_runtime_config(_base: RuntimeConfig, overlay: RuntimeConfig) -> RuntimeConfig {
        // Every section carries serde defaults, so sections the file omits
        // already hold the default values.
        RuntimeConfig {
            options: overlay.options,
            network: overlay.network,
            github: overlay.github,
            artifact: overlay.artifact,
            checksum: overlay.checksum,
        }
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("NEA_AUTO_UPDATE") {
            config.options.auto_update = parse_bool(&val).ok_or_else(|| {
                Error::invalid_config("NEA_AUTO_UPDATE must be true or false")
            })?;
        }

        // Network timeouts
        if let Ok(val) = env::var("NEA_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = parse_timeout_secs("NEA_HTTP_TIMEOUT_SECS", &val)?;
        }

        if let Ok(val) = env::var("NEA_CONNECT_TIMEOUT_SECS") {
            config.network.connect_timeout_secs = parse_timeout_secs("NEA_CONNECT_TIMEOUT_SECS", &val)?;
        }

        if let Ok(val) = env::var("NEA_DOWNLOAD_TIMEOUT_SECS") {
            config.network.download_timeout_secs = parse_timeout_secs("NEA_DOWNLOAD_TIMEOUT_SECS", &val)?;
        }

        // GitHub configuration
        if let Ok(val) = env::var("NEA_GITHUB_API_URL") {
            config.github.api_url = val;
        }

        if let Ok(val) = env::var("NEA_GITHUB_DOWNLOAD_URL") {
            config.github.download_url = val;
        }

        if let Ok(val) = env::var("NEA_GITHUB_REPO_OWNER") {
            config.github.repo_owner = val;
        }

        if let Ok(val) = env::var("NEA_GITHUB_REPO_NAME") {
            config.github.repo_name = val;
        }

        if let Ok(val) = env::var("NEA_CHECKSUM_POLICY") {
            config.checksum = val
                .parse::<ChecksumPolicy>()
                .map_err(|e| Error::invalid_config(format!("NEA_CHECKSUM_POLICY: {}", e)))?;
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

/// Timeouts must be positive
fn parse_timeout_secs(var: &str, val: &str) -> Result<u64> {
    match val.trim().parse::<u64>() {
        Ok(0) => Err(Error::invalid_config(format!(
            "{} must be greater than zero",
            var
        ))),
        Ok(secs) => Ok(secs),
        Err(_) => Err(Error::invalid_config(format!(
            "{} must be a valid number",
            var
        ))),
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
