//! Image synchronizer
//!
//! Owns the image directory. Each run it:
//! - writes photos that are new or whose bytes differ from the file on disk
//! - leaves files alone when the payload matches (content equality, not mtime)
//! - deletes photos of employees that left the remote snapshot
//!
//! The directory is flat: a key whose local part would resolve anywhere but
//! a plain file directly inside it is refused.
//!
//! Failures on individual files are logged and collected in the
//! [`ImageReport`]; they never abort the run.

use crate::backup::BackupState;
use crate::error::ImageError;
use crate::record::{image_filename, local_part, PhotoPayload, StagedRecord};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Current remote population keyed by identity key, photos attached
pub type Snapshot = BTreeMap<String, StagedRecord>;

/// What happened to one employee's photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    /// File created or overwritten
    Written,
    /// File already held the same bytes
    Unchanged,
    /// Record carried no payload; any existing file was left as is
    Skipped,
}

/// Image failure attributed to an employee
#[derive(Debug)]
pub struct ImageFailure {
    /// Identity key, `None` for directory-level failures
    pub key: Option<String>,
    pub error: ImageError,
}

/// Summary of one image pass
#[derive(Debug, Default)]
pub struct ImageReport {
    /// Keys whose photo was written
    pub written: Vec<String>,
    /// Photos already up to date
    pub unchanged: usize,
    /// Records without a payload
    pub skipped: usize,
    /// Keys whose photo was deleted
    pub removed: Vec<String>,
    pub failures: Vec<ImageFailure>,
}

impl ImageReport {
    /// Whether every file operation succeeded
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, key: &str, outcome: ImageOutcome) {
        match outcome {
            ImageOutcome::Written => self.written.push(key.to_string()),
            ImageOutcome::Unchanged => self.unchanged += 1,
            ImageOutcome::Skipped => self.skipped += 1,
        }
    }

    fn fail(&mut self, key: Option<&str>, error: ImageError) {
        self.failures.push(ImageFailure {
            key: key.map(str::to_string),
            error,
        });
    }
}

/// Reconciles the image directory against a snapshot
#[derive(Debug, Clone)]
pub struct ImageSynchronizer {
    dir: PathBuf,
}

impl ImageSynchronizer {
    /// Create synchronizer for `dir`
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Image directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the photo for `key`
    ///
    /// # Errors
    /// `ImageError::UnsafeName` if the local part is empty or the filename is
    /// not a single plain component of the directory.
    pub fn image_path(&self, key: &str) -> Result<PathBuf, ImageError> {
        let name = image_filename(key);
        let mut components = Path::new(&name).components();
        let flat = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(part)), None) if part == name.as_str()
        );
        if !flat || local_part(key).is_empty() || name.contains(['/', '\\']) {
            return Err(ImageError::UnsafeName {
                name,
                path: self.dir.clone(),
            });
        }
        Ok(self.dir.join(name))
    }

    /// Reconcile photos and strip payloads
    ///
    /// `snapshot` must be the full current remote population: photos of keys
    /// in `previous` but absent from it are deleted. Returns the persistable
    /// state along with the report.
    pub fn sync(&self, snapshot: Snapshot, previous: &BackupState) -> (BackupState, ImageReport) {
        let mut report = ImageReport::default();

        if let Err(source) = std::fs::create_dir_all(&self.dir) {
            let error = ImageError::CreateDir {
                path: self.dir.clone(),
                source,
            };
            tracing::warn!(error = %error, "image directory unavailable");
            report.fail(None, error);
        }

        self.remove_orphans(previous, &snapshot, &mut report);
        self.write_photos(&snapshot, &mut report);

        let state = snapshot
            .into_iter()
            .map(|(key, staged)| (key, staged.into_canonical()))
            .collect();
        (state, report)
    }

    /// Write new or changed photos for every record in `snapshot`
    pub fn write_photos(&self, snapshot: &Snapshot, report: &mut ImageReport) {
        for (key, staged) in snapshot {
            let Some(payload) = &staged.photo else {
                report.record(key, ImageOutcome::Skipped);
                continue;
            };

            match self.write_photo(key, payload) {
                Ok(outcome) => {
                    if outcome == ImageOutcome::Written {
                        tracing::info!(employee = %key, "image updated");
                    }
                    report.record(key, outcome);
                }
                Err(error) => {
                    tracing::warn!(employee = %key, error = %error, "could not sync image");
                    report.fail(Some(key.as_str()), error);
                }
            }
        }
    }

    /// Delete photos of keys present in `previous` but gone from `snapshot`
    ///
    /// A file still claimed by a current key with the same local part is kept.
    pub fn remove_orphans(&self, previous: &BackupState, snapshot: &Snapshot, report: &mut ImageReport) {
        let live: BTreeSet<String> = snapshot.keys().map(|k| image_filename(k)).collect();

        for key in previous.keys().filter(|k| !snapshot.contains_key(*k)) {
            if live.contains(&image_filename(key)) {
                tracing::debug!(employee = %key, "image still owned by a current employee");
                continue;
            }
            let path = match self.image_path(key) {
                Ok(path) => path,
                Err(error) => {
                    tracing::warn!(employee = %key, error = %error, "could not remove image");
                    report.fail(Some(key.as_str()), error);
                    continue;
                }
            };
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::info!(employee = %key, "removed image for deleted employee");
                    report.removed.push(key.clone());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    let error = ImageError::Remove { path, source };
                    tracing::warn!(employee = %key, error = %error, "could not remove image");
                    report.fail(Some(key.as_str()), error);
                }
            }
        }
    }

    fn write_photo(&self, key: &str, payload: &PhotoPayload) -> Result<ImageOutcome, ImageError> {
        let path = self.image_path(key)?;

        match std::fs::read(&path) {
            Ok(existing) if STANDARD.encode(&existing) == payload.as_str() => {
                return Ok(ImageOutcome::Unchanged);
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(ImageError::Read { path, source }),
        }

        let bytes = match STANDARD.decode(payload.as_str()) {
            Ok(bytes) => bytes,
            Err(source) => return Err(ImageError::Decode { path, source }),
        };
        std::fs::write(&path, bytes).map_err(|source| ImageError::Write { path, source })?;
        Ok(ImageOutcome::Written)
    }
}
