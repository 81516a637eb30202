//! Testing utilities for hrsync workspace
//!
//! Shared test helpers: an in-memory [`RecordSource`] and raw record builders
//! shaped like the remote's responses.

#![allow(missing_docs)]

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hrsync_core::{RawRecord, RecordId, RecordSource, SourceError};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Builder for one raw employee record
#[derive(Debug, Clone)]
pub struct EmployeeBuilder {
    fields: RawRecord,
}

impl EmployeeBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.fields.insert("name".into(), json!(name));
        self
    }

    pub fn phone(mut self, phone: &str) -> Self {
        self.fields.insert("work_phone".into(), json!(phone));
        self
    }

    pub fn job_title(mut self, title: &str) -> Self {
        self.fields.insert("job_title".into(), json!(title));
        self
    }

    /// Attach photo bytes, base64-encoded as the remote sends them
    pub fn photo(mut self, bytes: &[u8]) -> Self {
        self.fields.insert("image_1920".into(), json!(encode(bytes)));
        self
    }

    pub fn department(self, id: i64, name: &str) -> Self {
        self.linked("department_id", id, name)
    }

    pub fn manager(self, id: i64, name: &str) -> Self {
        self.linked("parent_id", id, name)
    }

    pub fn mentor(self, id: i64, name: &str) -> Self {
        self.linked("coach_id", id, name)
    }

    pub fn company(self, id: i64, name: &str) -> Self {
        self.linked("company_id", id, name)
    }

    pub fn build(self) -> RawRecord {
        self.fields
    }

    fn linked(mut self, field: &str, id: i64, name: &str) -> Self {
        self.fields.insert(field.into(), json!([id, name]));
        self
    }
}

/// Raw employee with the remote's `false` placeholders for empty fields
pub fn employee(email: &str) -> EmployeeBuilder {
    let mut fields = RawRecord::new();
    fields.insert("name".into(), json!(false));
    fields.insert("work_email".into(), json!(email));
    fields.insert("work_phone".into(), json!(false));
    fields.insert("job_title".into(), json!(false));
    fields.insert("image_1920".into(), json!(false));
    for linked in ["department_id", "parent_id", "coach_id", "company_id"] {
        fields.insert(linked.into(), Value::Bool(false));
    }
    EmployeeBuilder { fields }
}

/// Raw employee that has no `work_email`
pub fn employee_without_email(name: &str) -> RawRecord {
    let mut fields = employee("").name(name).build();
    fields.insert("work_email".into(), json!(false));
    fields
}

/// Standard base64 of `bytes`
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// One `read_batch` call as seen by [`StaticSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCall {
    pub resource: String,
    pub ids: Vec<RecordId>,
    pub fields: Vec<String>,
}

/// In-memory record source
///
/// Records get sequential ids in insertion order. The population can be
/// replaced between runs, and failures can be injected.
#[derive(Debug, Default)]
pub struct StaticSource {
    records: Mutex<Vec<RawRecord>>,
    fail_listing: Mutex<bool>,
    fail_on_batch: Mutex<Option<usize>>,
    calls: Mutex<Vec<BatchCall>>,
}

impl StaticSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Replace the remote population
    pub fn set_records(&self, records: Vec<RawRecord>) {
        *self.records.lock() = records;
    }

    /// Make `list_identifiers` fail
    pub fn fail_listing(&self) {
        *self.fail_listing.lock() = true;
    }

    /// Make the `n`th (0-based) batch read fail
    pub fn fail_on_batch(&self, n: usize) {
        *self.fail_on_batch.lock() = Some(n);
    }

    /// Batch reads issued so far
    pub fn calls(&self) -> Vec<BatchCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn list_identifiers(&self, _resource: &str) -> Result<Vec<RecordId>, SourceError> {
        if *self.fail_listing.lock() {
            return Err(SourceError::Transport("connection refused".into()));
        }
        let count = self.records.lock().len();
        Ok((1..=count as RecordId).collect())
    }

    async fn read_batch(
        &self,
        resource: &str,
        ids: &[RecordId],
        fields: &[&str],
    ) -> Result<Vec<RawRecord>, SourceError> {
        let index = {
            let mut calls = self.calls.lock();
            calls.push(BatchCall {
                resource: resource.to_string(),
                ids: ids.to_vec(),
                fields: fields.iter().map(|f| (*f).to_string()).collect(),
            });
            calls.len() - 1
        };
        if *self.fail_on_batch.lock() == Some(index) {
            return Err(SourceError::rpc("batch read rejected"));
        }

        let records = self.records.lock();
        Ok(ids
            .iter()
            .filter_map(|id| usize::try_from(*id - 1).ok())
            .filter_map(|i| records.get(i).cloned())
            .collect())
    }
}
