//! Remote record source
//!
//! The engine treats the remote business server purely as a supplier of raw
//! records. Implementations authenticate at construction; by the time a
//! source exists it is ready to serve reads.

use crate::error::SourceError;
use async_trait::async_trait;

/// Opaque remote record identifier
pub type RecordId = i64;

/// One record as the remote returns it: field name to loosely typed value
///
/// Linked-entity fields arrive as `[id, display_name]` pairs or `false`.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Record-oriented remote service
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// List every identifier of `resource`
    ///
    /// # Errors
    /// Any failure is fatal for the run
    async fn list_identifiers(&self, resource: &str) -> Result<Vec<RecordId>, SourceError>;

    /// Read `fields` for the records in `ids`
    ///
    /// # Errors
    /// Any failure is fatal for the run
    async fn read_batch(
        &self,
        resource: &str,
        ids: &[RecordId],
        fields: &[&str],
    ) -> Result<Vec<RawRecord>, SourceError>;
}
