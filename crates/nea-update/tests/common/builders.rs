//! Construction helpers pointing the updater at a mock server

use nea_core::types::{ChecksumPolicy, RuntimeConfig};
use nea_update::{HostContext, ProcessUpdateState, UpdateOrchestrator};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use wiremock::MockServer;

use super::constants::*;

/// Runtime config whose release index and downloads are served by `server`
pub fn test_config(server: &MockServer) -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.github.api_url = server.uri();
    config.github.download_url = format!("{}{}", server.uri(), DOWNLOAD_PREFIX);
    config.network.http_timeout_secs = 1;
    config.network.connect_timeout_secs = 1;
    config.network.download_timeout_secs = 5;
    config.checksum = ChecksumPolicy::Disabled;
    config
}

/// Orchestrator over `plugin_dir` with a fresh process state
pub fn orchestrator(
    config: &RuntimeConfig,
    plugin_dir: &Path,
    version: Option<&str>,
) -> UpdateOrchestrator {
    orchestrator_with_state(config, plugin_dir, version, Arc::new(ProcessUpdateState::new()))
}

/// Orchestrator sharing an existing process state
pub fn orchestrator_with_state(
    config: &RuntimeConfig,
    plugin_dir: &Path,
    version: Option<&str>,
    state: Arc<ProcessUpdateState>,
) -> UpdateOrchestrator {
    UpdateOrchestrator::new(
        config,
        HostContext::new(plugin_dir, version.map(String::from)),
        state,
    )
    .expect("orchestrator should build")
}

/// Place an installed artifact in `plugin_dir`
pub fn install_artifact(plugin_dir: &Path) {
    fs::write(plugin_dir.join(ARTIFACT_FILE), INSTALLED_CONTENT).unwrap();
}

/// Primary artifact path in `plugin_dir`
pub fn primary(plugin_dir: &Path) -> std::path::PathBuf {
    plugin_dir.join(ARTIFACT_FILE)
}

/// Staged artifact path in `plugin_dir`
pub fn staged(plugin_dir: &Path) -> std::path::PathBuf {
    plugin_dir.join("update").join(ARTIFACT_FILE)
}
