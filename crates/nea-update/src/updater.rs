//! Update orchestration for one host start
//!
//! A cycle runs two phases in order:
//! 1. `ensure_installed`: a missing artifact is downloaded unconditionally
//! 2. `maybe_update`: a newer build is staged when auto-update allows it
//!
//! Every failure is logged and reported in the returned [`UpdateOutcome`];
//! nothing escapes to the host.

use nea_core::types::RuntimeConfig;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::download::{ArtifactDownloader, DownloadError, DownloadResult};
use crate::releases::{LatestVersion, LookupFailure, ReleaseIndex};
use crate::state::ProcessUpdateState;
use crate::target::UpdateTarget;
use crate::version::BuildNumber;

/// What the host tells the updater about itself
#[derive(Debug, Clone)]
pub struct HostContext {
    /// Folder the host loads plugins from
    pub plugin_dir: PathBuf,

    /// Version string from the plugin description, if the host has one
    pub version: Option<String>,
}

impl HostContext {
    pub fn new(plugin_dir: impl Into<PathBuf>, version: Option<String>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            version,
        }
    }
}

/// Errors that end a cycle without changing anything on disk
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("latest build could not be resolved: {0}")]
    VersionUnresolvable(#[from] LookupFailure),

    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Why the update check did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Host version string is not a build number
    UnknownLocalVersion,

    /// `options.auto-update` is off
    AutoUpdateDisabled,

    /// A build was already downloaded by this process
    AlreadyUpdated,
}

/// Result of one [`UpdateOrchestrator::start`] cycle
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Artifact was missing and has been installed
    Installed(BuildNumber),

    /// Newer build staged for the next restart
    Updated {
        from: BuildNumber,
        to: BuildNumber,
        staged_at: PathBuf,
    },

    /// Running build is the latest
    UpToDate(BuildNumber),

    /// Update check skipped
    Skipped(SkipReason),

    /// Cycle ended early, installed artifact untouched
    Failed(UpdateError),
}

impl UpdateOutcome {
    /// Whether this cycle placed a new artifact on disk
    pub fn downloaded(&self) -> bool {
        matches!(self, Self::Installed(_) | Self::Updated { .. })
    }
}

/// Drives version checks and artifact placement for one plugin
pub struct UpdateOrchestrator {
    /// `options.auto-update`
    auto_update: bool,

    /// Host-supplied metadata
    host: HostContext,

    /// Artifact placement
    target: UpdateTarget,

    /// Latest build lookup
    release_index: ReleaseIndex,

    /// Artifact fetcher
    downloader: ArtifactDownloader,

    /// Process-wide state, including the cycle lock
    state: Arc<ProcessUpdateState>,
}

impl UpdateOrchestrator {
    /// Create an orchestrator for `host`, sharing `state` with any other
    /// orchestrator of the same process
    pub fn new(
        config: &RuntimeConfig,
        host: HostContext,
        state: Arc<ProcessUpdateState>,
    ) -> Result<Self, UpdateError> {
        let target = UpdateTarget::new(&host.plugin_dir, &config.artifact);

        debug!(
            "Updater initialized: version={:?}, target={:?}",
            host.version,
            target.primary_path()
        );

        Ok(Self {
            auto_update: config.options.auto_update,
            host,
            target,
            release_index: ReleaseIndex::new(config)?,
            downloader: ArtifactDownloader::new(config)?,
            state,
        })
    }

    /// Run one update cycle
    pub async fn start(&self) -> UpdateOutcome {
        let _cycle = self.state.lock_cycle().await;

        let installed = match self.ensure_installed().await {
            Ok(installed) => installed,
            Err(e) => return UpdateOutcome::Failed(e),
        };

        let outcome = self.maybe_update().await;

        match installed {
            Some(build) => UpdateOutcome::Installed(build),
            None => outcome,
        }
    }

    /// Best-known build; after a download this is the build pending restart
    pub fn get_version(&self) -> Option<BuildNumber> {
        self.state.current_known_version()
    }

    /// Whether auto-updates are enabled
    pub fn has_auto_updates(&self) -> bool {
        self.auto_update
    }

    /// Compare `current_version` with the latest build and download the
    /// latest if it is newer. Returns true only when a newer build was
    /// downloaded.
    pub async fn check_for_update(&self, current_version: &str) -> bool {
        let Some(current) = BuildNumber::parse_strict(current_version) else {
            return false;
        };

        let _cycle = self.state.lock_cycle().await;
        self.update_from(current).await.downloaded()
    }

    pub fn target(&self) -> &UpdateTarget {
        &self.target
    }

    pub fn state(&self) -> &Arc<ProcessUpdateState> {
        &self.state
    }

    /// Phase 1: install the artifact if it is missing.
    ///
    /// Returns the installed build, or `None` when an artifact was already present.
    async fn ensure_installed(&self) -> Result<Option<BuildNumber>, UpdateError> {
        if self.target.is_installed() {
            return Ok(None);
        }

        let name = self.target.name();
        info!("{} does not exist, downloading...", name);

        let result = match self.release_index.fetch_latest_version().await {
            LatestVersion::Found(build) => self.fetch(build).await.map(|r| r.build),
            LatestVersion::Unavailable(failure) => Err(UpdateError::from(failure)),
        };

        if result.is_err() {
            warn!(
                "Failed to download {} as the file could not be downloaded.",
                name
            );
            warn!(
                "{} could not be installed; the server will start without it",
                name
            );
        }

        result.map(Some)
    }

    /// Phase 2: stage a newer build if the host version and configuration allow it
    async fn maybe_update(&self) -> UpdateOutcome {
        let running = self
            .host
            .version
            .as_deref()
            .and_then(BuildNumber::parse_strict);
        self.state.observe_running_version(running);

        let Some(current) = running else {
            debug!(
                "Host version {:?} is not a build number, skipping auto-update",
                self.host.version
            );
            return UpdateOutcome::Skipped(SkipReason::UnknownLocalVersion);
        };

        if !self.has_auto_updates() {
            debug!("Auto-update disabled, staying on build #{}", current);
            return UpdateOutcome::Skipped(SkipReason::AutoUpdateDisabled);
        }

        if self.state.has_downloaded_this_run() {
            debug!("A build was already downloaded this run, skipping update check");
            return UpdateOutcome::Skipped(SkipReason::AlreadyUpdated);
        }

        self.update_from(current).await
    }

    /// Decide against the latest build and fetch it when newer
    async fn update_from(&self, current: BuildNumber) -> UpdateOutcome {
        match self.release_index.fetch_latest_version().await {
            LatestVersion::Found(latest) if latest.is_newer_than(current) => {
                info!("Update available: #{} -> #{}", current, latest);
                match self.fetch(latest).await {
                    Ok(result) => UpdateOutcome::Updated {
                        from: current,
                        to: latest,
                        staged_at: result.file_path,
                    },
                    Err(e) => UpdateOutcome::Failed(e),
                }
            }
            LatestVersion::Found(latest) => {
                debug!("Already on latest build #{} (latest #{})", current, latest);
                UpdateOutcome::UpToDate(current)
            }
            LatestVersion::Unavailable(failure) => UpdateOutcome::Failed(failure.into()),
        }
    }

    /// Download `build` into the target and record it
    async fn fetch(&self, build: BuildNumber) -> Result<DownloadResult, UpdateError> {
        match self.downloader.download(&self.target, build).await {
            Ok(result) => {
                self.state.record_download(build);
                warn!("The addon will be updated when the server is restarted!");
                Ok(result)
            }
            Err(e) => {
                if e.is_network() {
                    warn!(
                        "Failed to fetch the latest {} from the builds page. Perhaps GitHub is down? Response: {}",
                        self.target.file_name(),
                        e
                    );
                } else if e.is_filesystem() {
                    warn!(
                        "Failed to replace the old {} file with the new one. Please do this manually! Error: {}",
                        self.target.file_name(),
                        e
                    );
                } else {
                    warn!(
                        "Rejected downloaded {} build #{}: {}",
                        self.target.name(),
                        build,
                        e
                    );
                }
                Err(e.into())
            }
        }
    }
}
