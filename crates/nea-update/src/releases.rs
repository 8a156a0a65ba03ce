//! GitHub release index lookup

use nea_core::types::{GitHubConfig, NetworkConfig, RuntimeConfig};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::version::BuildNumber;

/// Latest release as returned by the release index
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag, a build number as JSON number or string
    pub tag_name: Option<Value>,
}

/// Why the latest build could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    #[error("release index answered with HTTP {0}")]
    Status(u16),

    #[error("release index returned an empty body")]
    EmptyBody,

    #[error("release index returned malformed JSON: {0}")]
    MalformedBody(String),

    #[error("release has no tag_name")]
    MissingTag,

    #[error("release tag {0} is not a build number")]
    InvalidTag(String),

    #[error("{0}")]
    Transport(String),
}

/// Outcome of a latest-build lookup. The lookup itself never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestVersion {
    Found(BuildNumber),
    Unavailable(LookupFailure),
}

impl LatestVersion {
    /// The resolved build, if any
    pub fn build(&self) -> Option<BuildNumber> {
        match self {
            Self::Found(build) => Some(*build),
            Self::Unavailable(_) => None,
        }
    }

    /// True only for a resolved build strictly newer than `current`
    pub fn is_newer_than(&self, current: BuildNumber) -> bool {
        self.build().is_some_and(|latest| latest.is_newer_than(current))
    }
}

/// Release index client
pub struct ReleaseIndex {
    /// HTTP client
    client: reqwest::Client,

    /// Accept header for the index API
    accept: String,

    /// GitHub configuration
    github_config: GitHubConfig,
}

impl ReleaseIndex {
    /// Create a release index client from runtime configuration
    pub fn new(config: &RuntimeConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(&config.network, config.network.http_timeout_secs)?,
            accept: config.network.accept.clone(),
            github_config: config.github.clone(),
        })
    }

    /// Resolve the latest published build.
    ///
    /// Every failure (status, body, tag, transport) is logged and reported as
    /// [`LatestVersion::Unavailable`].
    pub async fn fetch_latest_version(&self) -> LatestVersion {
        match self.get_latest().await.and_then(|release| release_build(&release)) {
            Ok(build) => {
                debug!("Latest published build: {}", build);
                LatestVersion::Found(build)
            }
            Err(failure) => {
                warn!(
                    "Failed to fetch latest builds for {}: {}",
                    self.github_config.repo_name, failure
                );
                LatestVersion::Unavailable(failure)
            }
        }
    }

    /// Get latest release
    pub async fn get_latest(&self) -> Result<Release, LookupFailure> {
        let url = self.github_config.latest_release_url();

        debug!("Fetching latest release from: {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, &self.accept)
            .send()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        parse_release(&body)
    }
}

/// Parse a release index response body
pub fn parse_release(body: &[u8]) -> Result<Release, LookupFailure> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(LookupFailure::EmptyBody);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| LookupFailure::MalformedBody(e.to_string()))?;

    match value {
        Value::Null => Err(LookupFailure::EmptyBody),
        Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| LookupFailure::MalformedBody(e.to_string())),
        other => Err(LookupFailure::MalformedBody(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Extract the build number from a release tag
pub fn release_build(release: &Release) -> Result<BuildNumber, LookupFailure> {
    match &release.tag_name {
        None | Some(Value::Null) => Err(LookupFailure::MissingTag),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(BuildNumber::new)
            .ok_or_else(|| LookupFailure::InvalidTag(n.to_string())),
        Some(Value::String(s)) => {
            BuildNumber::parse_tag(s).ok_or_else(|| LookupFailure::InvalidTag(s.clone()))
        }
        Some(other) => Err(LookupFailure::InvalidTag(other.to_string())),
    }
}

/// Build an HTTP client with explicit connect and request timeouts
pub(crate) fn http_client(
    network: &NetworkConfig,
    timeout_secs: u64,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(&network.user_agent)
        .connect_timeout(Duration::from_secs(network.connect_timeout_secs))
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(network.max_idle_connections)
        .build()
}
