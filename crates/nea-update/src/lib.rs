//! Self-update functionality for the NotEnoughAddons plugin
//!
//! Provides:
//! - Latest build lookup against GitHub releases
//! - Update decision against the build number the host reports
//! - Artifact download with coarse progress logging and checksum verification
//! - Safe placement: first installs go to the plugin folder, superseding
//!   builds are staged in the update folder for the next restart

pub mod download;
pub mod releases;
pub mod state;
pub mod target;
pub mod updater;
pub mod version;

pub use download::{ArtifactDownloader, DownloadError, DownloadProgress, DownloadResult};
pub use releases::{LatestVersion, LookupFailure, ReleaseIndex};
pub use state::ProcessUpdateState;
pub use target::UpdateTarget;
pub use updater::{HostContext, SkipReason, UpdateError, UpdateOrchestrator, UpdateOutcome};
pub use version::BuildNumber;
