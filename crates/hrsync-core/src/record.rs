//! Snapshot normalizer
//!
//! Turns raw remote employee records into the canonical shape persisted in
//! the backup. Two record types keep the transient photo payload out of the
//! persisted form:
//!
//! - [`StagedRecord`]: canonical record plus the run-scoped [`PhotoPayload`]
//! - [`CanonicalRecord`]: the durable shape, the only one that serializes
//!
//! A staged record becomes canonical through [`StagedRecord::into_canonical`].

use crate::source::RawRecord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Fields requested from the remote for every employee
pub const EMPLOYEE_FIELDS: &[&str] = &[
    "name",
    "work_email",
    "work_phone",
    "job_title",
    "image_1920",
    "department_id",
    "parent_id",
    "coach_id",
    "company_id",
];

/// Extension of every mirrored image
pub const IMAGE_EXTENSION: &str = "png";

/// Persisted employee record, keyed by `work_email`
///
/// Linked entities (department, manager, mentor, company) are optional
/// display names; absent ones serialize as `""` to keep the file layout flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub work_email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub work_phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_title: String,
    #[serde(default, with = "display_name")]
    pub department_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub photo_name: String,
    #[serde(default, with = "display_name")]
    pub manager: Option<String>,
    #[serde(default, with = "display_name")]
    pub mentor: Option<String>,
    #[serde(default, with = "display_name")]
    pub company: Option<String>,
}

impl CanonicalRecord {
    /// Identity key (the work email)
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.work_email
    }

    /// Whether the record can take part in reconciliation
    #[inline]
    #[must_use]
    pub fn has_key(&self) -> bool {
        !self.work_email.is_empty()
    }
}

/// Base64 photo attached to a record for the current run only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPayload(String);

impl PhotoPayload {
    /// Wrap a payload; empty or whitespace-only payloads yield `None`
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Option<Self> {
        let encoded = encoded.into();
        let trimmed = encoded.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == encoded.len() {
            Some(Self(encoded))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Encoded payload text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Canonical record carrying its run-scoped photo payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedRecord {
    pub record: CanonicalRecord,
    pub photo: Option<PhotoPayload>,
}

impl StagedRecord {
    /// Identity key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        self.record.key()
    }

    /// Drop the payload, leaving the persistable record
    #[inline]
    #[must_use]
    pub fn into_canonical(self) -> CanonicalRecord {
        self.record
    }
}

/// Substring of `email` before the first `@`
#[must_use]
pub fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Image filename derived from an identity key
#[must_use]
pub fn image_filename(email: &str) -> String {
    format!("{}.{IMAGE_EXTENSION}", local_part(email))
}

/// Normalize one raw remote record
///
/// Returns `None` when the record has no usable `work_email`; such records
/// never take part in reconciliation. Missing or malformed fields degrade to
/// empty values instead of failing.
#[must_use]
pub fn normalize(raw: &RawRecord) -> Option<StagedRecord> {
    let work_email = scalar(raw, "work_email");
    if work_email.is_empty() {
        return None;
    }

    let record = CanonicalRecord {
        name: scalar(raw, "name"),
        work_phone: scalar(raw, "work_phone"),
        job_title: scalar(raw, "job_title"),
        department_name: linked(raw, "department_id"),
        photo_name: image_filename(&work_email),
        manager: linked(raw, "parent_id"),
        mentor: linked(raw, "coach_id"),
        company: linked(raw, "company_id"),
        work_email,
    };

    let photo = raw
        .get("image_1920")
        .and_then(Value::as_str)
        .and_then(PhotoPayload::new);

    Some(StagedRecord { record, photo })
}

/// Text field; `false`, `null`, absent and non-string values become `""`
fn scalar(raw: &RawRecord, field: &str) -> String {
    raw.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Display name of a `[id, display_name]` pair
fn linked(raw: &RawRecord, field: &str) -> Option<String> {
    match raw.get(field)? {
        Value::Array(pair) => pair
            .get(1)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Accepts strings and the `false`/`null` placeholders older backups contain
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

mod display_name {
    use serde::{Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = super::lenient_string(deserializer)?;
        Ok(Some(name).filter(|n| !n.is_empty()))
    }
}
