//! Reconciliation engine
//!
//! Drives one single-pass run:
//!
//! ```text
//! Fetch → Load → Diff → (changes?) → Image sync → Save
//!                          └─ none → stop, nothing written
//! ```
//!
//! Fetch and load failures abort the run before anything touches disk.
//! Image failures are contained by the [`ImageSynchronizer`].

use crate::backup::{BackupState, BackupStore};
use crate::config::SyncConfig;
use crate::delta::KeyDelta;
use crate::error::SyncResult;
use crate::images::{ImageReport, ImageSynchronizer, Snapshot};
use crate::record::{normalize, EMPLOYEE_FIELDS};
use crate::source::RecordSource;

/// Current remote population plus fetch statistics
#[derive(Debug, Default)]
pub struct FetchedSnapshot {
    pub records: Snapshot,
    /// Raw records returned by the remote
    pub fetched: usize,
    /// Raw records dropped for lacking a `work_email`
    pub skipped: usize,
}

/// Outcome of one run
#[derive(Debug)]
pub struct RunReport {
    pub delta: KeyDelta,
    /// Raw records returned by the remote
    pub fetched: usize,
    /// Raw records dropped for lacking a `work_email`
    pub skipped: usize,
    /// Records written to the backup, `None` when nothing was written
    pub persisted: Option<usize>,
    /// Image pass summary, `None` when no pass ran
    pub images: Option<ImageReport>,
}

impl RunReport {
    /// Whether the run found anything to record
    #[inline]
    #[must_use]
    pub fn changes_found(&self) -> bool {
        self.delta.changes_found()
    }
}

/// Orchestrates fetch, diff, image sync and persistence
#[derive(Debug)]
pub struct ReconciliationEngine<S> {
    source: S,
    config: SyncConfig,
    store: BackupStore,
    images: ImageSynchronizer,
}

impl<S: RecordSource> ReconciliationEngine<S> {
    /// Create engine over an authenticated source
    ///
    /// # Errors
    /// `SyncError::Config` if `config` is unusable
    pub fn new(source: S, config: SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self {
            store: BackupStore::new(config.backup_path()),
            images: ImageSynchronizer::new(config.image_dir()),
            source,
            config,
        })
    }

    /// Run configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Underlying record source
    #[inline]
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and normalize the whole remote population
    ///
    /// Identifiers are read in batches of `batch_size`, strictly one after
    /// another. When two records share a key the later one wins.
    ///
    /// # Errors
    /// `SyncError::Fetch` if listing or any batch read fails
    pub async fn fetch_snapshot(&self) -> SyncResult<FetchedSnapshot> {
        let resource = self.config.resource.as_str();
        let ids = self.source.list_identifiers(resource).await?;
        tracing::debug!(count = ids.len(), resource, "listed remote records");

        let mut snapshot = FetchedSnapshot::default();
        for batch in ids.chunks(self.config.batch_size) {
            let raw = self.source.read_batch(resource, batch, EMPLOYEE_FIELDS).await?;
            snapshot.fetched += raw.len();

            for record in &raw {
                let Some(staged) = normalize(record) else {
                    snapshot.skipped += 1;
                    continue;
                };
                let key = staged.key().to_string();
                if snapshot.records.insert(key, staged).is_some() {
                    tracing::debug!(resource, "duplicate work_email in snapshot, keeping later record");
                }
            }
        }

        Ok(snapshot)
    }

    /// Execute one reconciliation run
    ///
    /// # Errors
    /// - `SyncError::Fetch` if the remote snapshot cannot be read in full
    /// - `SyncError::Backup` if the previous backup is unreadable or the new
    ///   one cannot be saved
    pub async fn run(&self) -> SyncResult<RunReport> {
        tracing::info!(resource = %self.config.resource, "fetching employee data");
        let FetchedSnapshot {
            records,
            fetched,
            skipped,
        } = self.fetch_snapshot().await?;
        tracing::info!(employees = records.len(), skipped, "snapshot fetched");

        tracing::info!(path = %self.store.path().display(), "loading existing backup");
        let previous = self.store.load()?;
        tracing::info!(records = previous.len(), "previous backup loaded");

        let delta = KeyDelta::compute(&previous, &records);
        log_delta(&delta);

        if !delta.changes_found() {
            tracing::info!("no changes detected compared to existing backup, backup not updated");
            return Ok(RunReport {
                delta,
                fetched,
                skipped,
                persisted: None,
                images: None,
            });
        }

        tracing::info!(
            changed = delta.changed_keys().count(),
            removed = delta.removed.len(),
            "changes detected, syncing images"
        );
        let (next, images) = self.images.sync(records, &previous);
        if !images.is_clean() {
            tracing::warn!(failures = images.failures.len(), "some images could not be synced");
        }

        self.persist(&next)?;

        Ok(RunReport {
            delta,
            fetched,
            skipped,
            persisted: Some(next.len()),
            images: Some(images),
        })
    }

    fn persist(&self, next: &BackupState) -> SyncResult<()> {
        tracing::info!(path = %self.store.path().display(), "saving backup file");
        self.store.save(next)?;
        tracing::info!(employees = next.len(), "backup saved");
        Ok(())
    }
}

fn log_delta(delta: &KeyDelta) {
    for key in &delta.removed {
        tracing::info!(employee = %key, "employee removed");
    }
    for key in &delta.added {
        tracing::info!(employee = %key, "employee added");
    }
    for key in &delta.updated {
        tracing::info!(employee = %key, "employee updated");
    }
}
