//! On-disk placement of the managed artifact

use nea_core::types::ArtifactConfig;
use std::path::{Path, PathBuf};

/// The artifact this updater manages and where it lives.
///
/// A first install writes straight to `primary_path`. When an installation
/// already exists the host may hold it open, so newer builds go to
/// `staging_path` inside the host's update folder and are swapped in by the
/// host on its next start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTarget {
    name: String,
    file_name: String,
    primary_path: PathBuf,
    staging_path: PathBuf,
}

impl UpdateTarget {
    /// Target inside `plugin_dir` laid out per `artifact`
    pub fn new(plugin_dir: impl AsRef<Path>, artifact: &ArtifactConfig) -> Self {
        let plugin_dir = plugin_dir.as_ref();
        let file_name = artifact.file_name();

        Self {
            name: artifact.name.clone(),
            primary_path: plugin_dir.join(&file_name),
            staging_path: plugin_dir.join(&artifact.staging_dir).join(&file_name),
            file_name,
        }
    }

    /// Logical artifact name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Artifact file name, e.g. `NotEnoughAddons.jar`
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary_path
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Whether an artifact is installed at the primary path
    pub fn is_installed(&self) -> bool {
        self.primary_path.is_file()
    }

    /// Where a download must be written right now
    pub fn destination(&self) -> &Path {
        if self.is_installed() {
            &self.staging_path
        } else {
            &self.primary_path
        }
    }
}
