//! Shared constants for test infrastructure

/// Artifact file name under the default configuration
pub const ARTIFACT_FILE: &str = "NotEnoughAddons.jar";

/// Release index path under the default configuration
pub const LATEST_RELEASE_PATH: &str = "/repos/Fhoz/NotEnoughAddons/releases/latest";

/// Prefix mock artifact downloads are served under
pub const DOWNLOAD_PREFIX: &str = "/download";

pub const USER_AGENT: &str = "NotEnoughAddons Auto-Updater";
pub const ACCEPT_V3: &str = "application/vnd.github.v3+json";

// Artifact content
pub const INSTALLED_CONTENT: &[u8] = b"installed build content";
pub const REMOTE_CONTENT: &[u8] = b"Hello, World!";
pub const STALE_CONTENT: &[u8] = b"stale partial download from an interrupted run, longer than the remote";

/// SHA256 of `REMOTE_CONTENT`
pub const REMOTE_SHA256: &str = "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f";

pub const WRONG_CHECKSUM: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Path of the artifact for `build`
pub fn artifact_path(build: u64) -> String {
    format!("{}/{}/{}", DOWNLOAD_PREFIX, build, ARTIFACT_FILE)
}

/// Path of the published checksum for `build`
pub fn checksum_path(build: u64) -> String {
    format!("{}.sha256", artifact_path(build))
}
