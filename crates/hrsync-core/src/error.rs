//! Error types for hrsync core
//!
//! Provides the run's error taxonomy:
//! - Remote fetch failures (authentication, transport, RPC faults)
//! - Backup file read/parse/write failures
//! - Per-image I/O failures (recoverable, reported but never propagated)

use std::path::{Path, PathBuf};

/// Errors raised by a [`RecordSource`](crate::RecordSource)
///
/// All variants are fatal for the run: nothing is persisted once the
/// snapshot cannot be fetched in full.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Session could not be established
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Request never produced a usable response
    #[error("transport error: {0}")]
    Transport(String),

    /// Remote service answered with a fault
    #[error("remote call failed: {message}")]
    Rpc {
        /// Most specific message the service supplied
        message: String,
    },

    /// Response arrived but had an unexpected shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl SourceError {
    /// Create RPC fault error
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc {
            message: message.into(),
        }
    }
}

/// Errors from the backup file
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// IO error reading or writing the backup file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backup file exists but is not a valid JSON record array
    #[error("backup {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Backup state could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl BackupError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create parse error for path
    pub fn parse_error(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

/// Failure on a single image file
///
/// Contained by the image synchronizer: it is logged, recorded in the
/// [`ImageReport`](crate::ImageReport) and the run carries on.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Image directory could not be created
    #[error("cannot create image directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing image could not be read for comparison
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload is not valid base64
    #[error("invalid photo payload for {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: base64::DecodeError,
    },

    /// Image could not be written
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Orphaned image could not be removed
    #[error("cannot remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Identity key does not map to a plain file inside the image directory
    #[error("image name {name:?} does not stay inside {path}")]
    UnsafeName { name: String, path: PathBuf },
}

impl ImageError {
    /// Path of the file the failure concerns
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDir { path, .. }
            | Self::Read { path, .. }
            | Self::Decode { path, .. }
            | Self::Write { path, .. }
            | Self::Remove { path, .. }
            | Self::UnsafeName { path, .. } => path,
        }
    }
}

/// Fatal errors that abort a reconciliation run
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Remote snapshot could not be fetched
    #[error("fetch failed: {0}")]
    Fetch(#[from] SourceError),

    /// Backup file could not be loaded or saved
    #[error("backup failed: {0}")]
    Backup(#[from] BackupError),

    /// Run configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for reconciliation runs
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_display() {
        let err = SourceError::rpc("Access Denied");
        assert_eq!(err.to_string(), "remote call failed: Access Denied");
    }

    #[test]
    fn image_error_exposes_path() {
        let err = ImageError::Write {
            path: PathBuf::from("emp_img/alice.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.path(), Path::new("emp_img/alice.png"));
        assert!(err.to_string().starts_with("cannot write emp_img/alice.png"));
    }

    #[test]
    fn error_conversions() {
        let err: SyncError = SourceError::Authentication("bad key".to_string()).into();
        assert!(matches!(err, SyncError::Fetch(SourceError::Authentication(_))));

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SyncError = BackupError::parse_error("hr_backup.json", parse).into();
        assert!(matches!(err, SyncError::Backup(BackupError::Parse { .. })));
    }
}
