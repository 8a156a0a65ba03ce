//! Update state shared for the lifetime of the host process

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

use crate::version::BuildNumber;

#[derive(Debug, Default)]
struct Inner {
    current_known_version: Option<BuildNumber>,
    has_downloaded_this_run: bool,
}

/// What this process knows about the managed artifact.
///
/// Starts empty, is never persisted, and only a successful download sets the
/// downloaded flag. Share one instance per host process.
#[derive(Debug, Default)]
pub struct ProcessUpdateState {
    inner: Mutex<Inner>,

    /// Held for a whole update cycle by whichever orchestrator runs it
    cycle: AsyncMutex<()>,
}

impl ProcessUpdateState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Poisoning is ignored: every writer leaves both fields consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for any other update cycle in this process to finish.
    ///
    /// The downloaded-this-run check and the download it guards happen
    /// while the returned guard is held.
    pub async fn lock_cycle(&self) -> AsyncMutexGuard<'_, ()> {
        self.cycle.lock().await
    }

    /// Best-known build, possibly one that only takes effect after a restart
    pub fn current_known_version(&self) -> Option<BuildNumber> {
        self.lock().current_known_version
    }

    pub fn has_downloaded_this_run(&self) -> bool {
        self.lock().has_downloaded_this_run
    }

    /// Record the build the host reports as running.
    ///
    /// Ignored once a download happened this run so the pending build stays
    /// the best-known one. Returns whether the value was recorded.
    pub fn observe_running_version(&self, build: Option<BuildNumber>) -> bool {
        let mut inner = self.lock();
        if inner.has_downloaded_this_run {
            return false;
        }
        inner.current_known_version = build;
        true
    }

    /// Record a completed download of `build`
    pub fn record_download(&self, build: BuildNumber) {
        let mut inner = self.lock();
        inner.current_known_version = Some(build);
        inner.has_downloaded_this_run = true;
    }
}
