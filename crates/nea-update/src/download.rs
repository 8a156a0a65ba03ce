//! Artifact download with progress logging and verification
//!
//! Downloads are streamed to a `.part` file beside the destination and only
//! renamed onto it once the response completed and the checksum policy is
//! satisfied, so the destination never holds a partially written artifact.

use futures_util::StreamExt;
use nea_core::types::{ChecksumPolicy, GitHubConfig, RuntimeConfig};
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::releases::http_client;
use crate::target::UpdateTarget;
use crate::version::BuildNumber;

/// Progress is logged each time it crosses into a new bucket of this size
const PROGRESS_STEP_PERCENT: u64 = 20;

/// Suffix of the in-flight download file
const PART_SUFFIX: &str = ".part";

/// Suffix of the published checksum file
const CHECKSUM_SUFFIX: &str = ".sha256";

/// Download failures, split by where they happened
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Transport failure: DNS, connect, timeout, reset mid-stream
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Server answered with a non-success status
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// Local file could not be removed, created, written or moved
    #[error("failed to {action} {path:?}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Published checksum does not match the downloaded bytes
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// Checksum required but missing or unreadable
    #[error("no usable checksum: {0}")]
    ChecksumUnavailable(String),
}

impl DownloadError {
    /// Network-class failure (the remote side or the path to it)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Status { .. })
    }

    /// Filesystem-class failure
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::Filesystem { .. })
    }

    fn network(url: &str, err: reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    fn filesystem(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Download progress information
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    /// Total bytes to download, when the server declared it
    pub total_bytes: Option<u64>,

    /// Bytes written so far
    pub downloaded_bytes: u64,

    /// Last percentage bucket that was reported
    last_reported: u64,
}

impl DownloadProgress {
    /// Create a new progress tracker
    pub fn new(total_bytes: Option<u64>) -> Self {
        Self {
            total_bytes,
            downloaded_bytes: 0,
            last_reported: 0,
        }
    }

    /// Percentage rounded to the nearest reporting step
    pub fn rounded_percentage(&self) -> Option<u64> {
        let total = self.total_bytes.filter(|t| *t > 0)?;
        let percent = self.downloaded_bytes as f64 / total as f64 * 100.0;
        let step = PROGRESS_STEP_PERCENT as f64;
        Some(((percent / step).round() * step).min(100.0) as u64)
    }

    /// Add written bytes; returns the percentage to report when a new
    /// non-zero bucket is reached
    pub fn advance(&mut self, written: u64) -> Option<u64> {
        self.downloaded_bytes += written;

        let percent = self.rounded_percentage()?;
        if percent != 0 && percent != self.last_reported {
            self.last_reported = percent;
            Some(percent)
        } else {
            None
        }
    }
}

/// Result of a download operation
#[derive(Debug)]
pub struct DownloadResult {
    /// Build that was downloaded
    pub build: BuildNumber,

    /// Path the artifact was placed at
    pub file_path: PathBuf,

    /// Size of the downloaded file in bytes
    pub file_size: u64,

    /// SHA256 checksum of the downloaded file
    pub checksum: String,

    /// Whether a published checksum was compared
    pub verified: bool,
}

/// Downloads release artifacts into an [`UpdateTarget`]
pub struct ArtifactDownloader {
    /// HTTP client
    client: reqwest::Client,

    /// Where release files are published
    github_config: GitHubConfig,

    /// Integrity policy
    checksum_policy: ChecksumPolicy,
}

impl ArtifactDownloader {
    /// Create a new artifact downloader
    pub fn new(config: &RuntimeConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(&config.network, config.network.download_timeout_secs)?,
            github_config: config.github.clone(),
            checksum_policy: config.checksum,
        })
    }

    /// Override the checksum policy
    pub fn with_checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }

    /// URL of the artifact for `build`
    pub fn artifact_url(&self, target: &UpdateTarget, build: BuildNumber) -> String {
        self.github_config
            .release_file_url(build.get(), target.file_name())
    }

    /// Download `build` to wherever `target` currently wants it.
    ///
    /// Any file already at the destination is removed first. On failure the
    /// destination is left absent and no `.part` file remains.
    pub async fn download(
        &self,
        target: &UpdateTarget,
        build: BuildNumber,
    ) -> Result<DownloadResult, DownloadError> {
        let destination = target.destination().to_path_buf();
        let part_path = part_path(&destination);
        let url = self.artifact_url(target, build);

        info!("# Starting download of {} build: #{}", target.name(), build);
        debug!("Downloading {} to {:?}", url, destination);

        remove_stale(&destination).await?;
        remove_stale(&part_path).await?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::filesystem("create directory", parent, e))?;
        }

        match self.fetch_verified(&url, &part_path).await {
            Ok((file_size, checksum, verified)) => {
                fs::rename(&part_path, &destination).await.map_err(|e| {
                    DownloadError::filesystem("move downloaded file to", &destination, e)
                })?;

                info!(
                    "Successfully downloaded {} build: #{}",
                    target.name(),
                    build
                );

                Ok(DownloadResult {
                    build,
                    file_path: destination,
                    file_size,
                    checksum,
                    verified,
                })
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&part_path).await {
                    if cleanup.kind() != io::ErrorKind::NotFound {
                        debug!("Could not remove {:?}: {}", part_path, cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    /// Stream `url` into `part_path` and apply the checksum policy
    async fn fetch_verified(
        &self,
        url: &str,
        part_path: &Path,
    ) -> Result<(u64, String, bool), DownloadError> {
        let (file_size, checksum) = self.stream_to_file(url, part_path).await?;

        let verified = match self.checksum_policy {
            ChecksumPolicy::Disabled => false,
            policy => {
                let checksum_url = format!("{}{}", url, CHECKSUM_SUFFIX);
                match self.fetch_published_checksum(&checksum_url).await? {
                    Some(expected) => {
                        if !expected.eq_ignore_ascii_case(&checksum) {
                            return Err(DownloadError::ChecksumMismatch {
                                expected,
                                actual: checksum,
                            });
                        }
                        debug!("Checksum verified: {}", checksum);
                        true
                    }
                    None if policy == ChecksumPolicy::Required => {
                        return Err(DownloadError::ChecksumUnavailable(format!(
                            "{} is not published",
                            checksum_url
                        )));
                    }
                    None => {
                        debug!("No checksum published at {}, skipping verification", checksum_url);
                        false
                    }
                }
            }
        };

        Ok((file_size, checksum, verified))
    }

    /// Stream a response body to disk, hashing as it goes
    async fn stream_to_file(
        &self,
        url: &str,
        part_path: &Path,
    ) -> Result<(u64, String), DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        if !response.status().is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut progress = DownloadProgress::new(response.content_length());
        let mut hasher = Sha256::new();

        let mut file = File::create(part_path)
            .await
            .map_err(|e| DownloadError::filesystem("create", part_path, e))?;

        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk: bytes::Bytes = chunk_result.map_err(|e| DownloadError::network(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::filesystem("write", part_path, e))?;
            hasher.update(&chunk);

            if let Some(percent) = progress.advance(chunk.len() as u64) {
                info!(
                    "# Downloading... {}% ({}/{} bytes)",
                    percent,
                    progress.downloaded_bytes,
                    progress.total_bytes.unwrap_or_default()
                );
            }
        }

        file.flush()
            .await
            .map_err(|e| DownloadError::filesystem("flush", part_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| DownloadError::filesystem("sync", part_path, e))?;

        Ok((progress.downloaded_bytes, format!("{:x}", hasher.finalize())))
    }

    /// Fetch the published SHA256 for an artifact; `None` when not published
    async fn fetch_published_checksum(&self, url: &str) -> Result<Option<String>, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        parse_checksum(&body).map(Some)
    }
}

/// Parse a `sha256sum`-style file: the first token is the hex digest
pub fn parse_checksum(body: &str) -> Result<String, DownloadError> {
    let digest = body.split_whitespace().next().unwrap_or_default();

    if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DownloadError::ChecksumUnavailable(format!(
            "malformed checksum file: {:?}",
            body.trim()
        )));
    }

    Ok(digest.to_ascii_lowercase())
}

/// Path of the in-flight file for `destination`
fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// Delete a leftover file from an earlier run
async fn remove_stale(path: &Path) -> Result<(), DownloadError> {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed stale file {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DownloadError::filesystem("delete stale file", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_progress_buckets() {
        let mut progress = DownloadProgress::new(Some(1000));
        assert_eq!(progress.advance(50), None);
        assert_eq!(progress.advance(100), Some(20));
        assert_eq!(progress.advance(10), None);
        assert_eq!(progress.advance(240), Some(40));
        assert_eq!(progress.advance(600), Some(100));
        assert_eq!(progress.downloaded_bytes, 1000);
    }

    #[test]
    fn test_download_progress_single_chunk() {
        let mut progress = DownloadProgress::new(Some(64));
        assert_eq!(progress.advance(64), Some(100));
        assert_eq!(progress.advance(0), None);
    }

    #[test]
    fn test_download_progress_unknown_length() {
        let mut progress = DownloadProgress::new(None);
        assert_eq!(progress.advance(4096), None);
        assert_eq!(progress.rounded_percentage(), None);
        assert_eq!(progress.downloaded_bytes, 4096);

        let mut empty = DownloadProgress::new(Some(0));
        assert_eq!(empty.advance(10), None);
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/srv/plugins/update/NotEnoughAddons.jar")),
            PathBuf::from("/srv/plugins/update/NotEnoughAddons.jar.part")
        );
    }

    #[test]
    fn test_parse_checksum() {
        let digest = "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f";
        assert_eq!(parse_checksum(digest).unwrap(), digest);
        assert_eq!(
            parse_checksum(&format!("{}  NotEnoughAddons.jar\n", digest.to_uppercase())).unwrap(),
            digest
        );
        assert!(parse_checksum("").is_err());
        assert!(parse_checksum("not-a-digest NotEnoughAddons.jar").is_err());
    }

    #[test]
    fn test_error_classes() {
        let status = DownloadError::Status {
            url: "http://x".to_string(),
            status: 404,
        };
        assert!(status.is_network());
        assert!(!status.is_filesystem());

        let fs_err = DownloadError::filesystem(
            "delete stale file",
            Path::new("/tmp/x"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(fs_err.is_filesystem());
        assert!(!fs_err.is_network());
    }
}
