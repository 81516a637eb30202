//! hrsync Core
//!
//! Incrementally mirrors employee records and photos from a remote business
//! server into a local JSON backup and an image directory.
//!
//! # Core Concepts
//!
//! - [`RecordSource`]: the remote collaborator (list identifiers, read batches)
//! - [`normalize`]: raw record → [`StagedRecord`] (canonical record + photo payload)
//! - [`BackupStore`]: loads and atomically saves the [`BackupState`]
//! - [`ImageSynchronizer`]: writes changed photos, deletes orphaned ones
//! - [`ReconciliationEngine`]: fetch, diff, and persist only when something changed
//!
//! # Example
//!
//! ```rust,ignore
//! use hrsync_core::{ReconciliationEngine, SyncConfig};
//!
//! let config = SyncConfig::new("hr_backup.json", "emp_img");
//! let engine = ReconciliationEngine::new(source, config)?;
//! let report = engine.run().await?;
//!
//! if report.changes_found() {
//!     println!("backup rewritten with {:?} employees", report.persisted);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod backup;
mod config;
mod delta;
mod engine;
mod error;
mod images;
mod record;
mod source;

// Re-exports
pub use backup::{BackupState, BackupStore};
pub use config::{SyncConfig, DEFAULT_BATCH_SIZE, DEFAULT_RESOURCE};
pub use delta::KeyDelta;
pub use engine::{FetchedSnapshot, ReconciliationEngine, RunReport};
pub use error::{BackupError, ImageError, SourceError, SyncError, SyncResult};
pub use images::{ImageFailure, ImageOutcome, ImageReport, ImageSynchronizer, Snapshot};
pub use record::{
    image_filename, local_part, normalize, CanonicalRecord, PhotoPayload, StagedRecord,
    EMPLOYEE_FIELDS, IMAGE_EXTENSION,
};
pub use source::{RawRecord, RecordId, RecordSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
