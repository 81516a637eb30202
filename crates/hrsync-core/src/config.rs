//! Run configuration

use crate::error::{SyncError, SyncResult};
use std::path::{Path, PathBuf};

/// Default number of records read per remote request
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Default remote resource holding employees
pub const DEFAULT_RESOURCE: &str = "hr.employee";

/// Paths and limits for one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Persisted backup JSON file
    pub backup_path: PathBuf,
    /// Directory of mirrored photos
    pub image_dir: PathBuf,
    /// Records per `read_batch` call
    pub batch_size: usize,
    /// Remote resource type to mirror
    pub resource: String,
}

impl SyncConfig {
    /// Create configuration with default batch size and resource
    #[inline]
    #[must_use]
    pub fn new(backup_path: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_path: backup_path.into(),
            image_dir: image_dir.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            resource: DEFAULT_RESOURCE.to_string(),
        }
    }

    /// With batch size
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// With remote resource
    #[inline]
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    /// Backup file path
    #[inline]
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Image directory
    #[inline]
    #[must_use]
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Reject unusable settings
    ///
    /// # Errors
    /// `SyncError::Config` for a zero batch size or an empty resource name
    pub fn validate(&self) -> SyncResult<()> {
        if self.batch_size == 0 {
            return Err(SyncError::Config("batch size must be at least 1".to_string()));
        }
        if self.resource.trim().is_empty() {
            return Err(SyncError::Config("resource name is empty".to_string()));
        }
        Ok(())
    }
}
