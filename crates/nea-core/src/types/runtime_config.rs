//! Runtime configuration types for the updater
//!
//! These types define configuration that controls runtime behavior like
//! network timeouts, where releases are published and how the artifact is
//! laid out on disk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Plugin options exposed to server operators
    #[serde(default)]
    pub options: OptionsConfig,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// GitHub release source
    #[serde(default)]
    pub github: GitHubConfig,

    /// Artifact naming and placement
    #[serde(default)]
    pub artifact: ArtifactConfig,

    /// Integrity verification of downloaded artifacts
    #[serde(default)]
    pub checksum: ChecksumPolicy,
}

/// Operator-facing plugin options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionsConfig {
    /// Check for and download newer builds on start
    #[serde(default = "default_auto_update")]
    pub auto_update: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            auto_update: default_auto_update(),
        }
    }
}

fn default_auto_update() -> bool {
    true
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Release index request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// TCP/TLS connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Artifact download timeout in seconds
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept header sent to the release index
    #[serde(default = "default_accept")]
    pub accept: String,

    /// Idle connections kept per host
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            download_timeout_secs: default_download_timeout(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            max_idle_connections: default_max_idle_connections(),
        }
    }
}

fn default_http_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_download_timeout() -> u64 {
    300 // 5 minutes
}
fn default_user_agent() -> String {
    "NotEnoughAddons Auto-Updater".to_string()
}
fn default_accept() -> String {
    "application/vnd.github.v3+json".to_string()
}
fn default_max_idle_connections() -> usize {
    2
}

/// GitHub repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// Repository owner
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// Repository name
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Base URL for GitHub API
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Base URL for release downloads, followed by `/<build>/<file>`
    #[serde(default = "default_download_url")]
    pub download_url: String,
}

impl GitHubConfig {
    /// URL of the latest-release endpoint
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_url.trim_end_matches('/'),
            self.repo_owner,
            self.repo_name
        )
    }

    /// URL of a file attached to the release of `build`
    pub fn release_file_url(&self, build: u64, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.download_url.trim_end_matches('/'),
            build,
            file_name
        )
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            api_url: default_github_api_url(),
            download_url: default_download_url(),
        }
    }
}

fn default_repo_owner() -> String {
    "Fhoz".to_string()
}
fn default_repo_name() -> String {
    "NotEnoughAddons".to_string()
}
fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_download_url() -> String {
    "https://github.com/Fhoz/NotEnoughAddons/releases/download".to_string()
}

/// Artifact naming and on-disk placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArtifactConfig {
    /// Logical artifact name
    #[serde(default = "default_artifact_name")]
    pub name: String,

    /// File extension without the dot
    #[serde(default = "default_artifact_extension")]
    pub extension: String,

    /// Folder beside the artifact where superseding builds are staged
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
}

impl ArtifactConfig {
    /// File name of the artifact, e.g. `NotEnoughAddons.jar`
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            name: default_artifact_name(),
            extension: default_artifact_extension(),
            staging_dir: default_staging_dir(),
        }
    }
}

fn default_artifact_name() -> String {
    "NotEnoughAddons".to_string()
}
fn default_artifact_extension() -> String {
    "jar".to_string()
}
fn default_staging_dir() -> String {
    "update".to_string()
}

/// How downloaded artifacts are checked against a published SHA-256
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChecksumPolicy {
    /// Never fetch a checksum
    Disabled,

    /// Verify when a checksum is published, skip otherwise (default)
    #[default]
    Optional,

    /// Refuse artifacts without a matching published checksum
    Required,
}

impl FromStr for ChecksumPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" => Ok(Self::Disabled),
            "optional" => Ok(Self::Optional),
            "required" => Ok(Self::Required),
            other => Err(format!(
                "unknown checksum policy '{}' (expected disabled, optional or required)",
                other
            )),
        }
    }
}

impl fmt::Display for ChecksumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disabled => "disabled",
            Self::Optional => "optional",
            Self::Required => "required",
        };
        f.write_str(s)
    }
}
