//! CLI command implementations

pub mod check;
pub mod start;
pub mod version;

use anyhow::Result;
use camino::Utf8Path;
use nea_core::config::HierarchicalConfigLoader;
use nea_core::types::RuntimeConfig;

/// Resolve the runtime config from `config_dir`, or `~/.nea` when unset
pub(crate) fn load_config(config_dir: Option<&Utf8Path>) -> Result<RuntimeConfig> {
    let loader = match config_dir {
        Some(dir) => HierarchicalConfigLoader::with_dir(dir.to_path_buf()),
        None => HierarchicalConfigLoader::new()?,
    };

    Ok(loader.load_runtime_config()?)
}
