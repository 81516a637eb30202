//! Key-level delta between the previous backup and the current snapshot
//!
//! Every key ends up in exactly one of four disjoint sets. Records are
//! compared in their canonical form, so photo payloads never count as a
//! difference.

use crate::backup::BackupState;
use crate::images::Snapshot;
use std::collections::BTreeSet;

/// Classification of every identity key seen in a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDelta {
    /// In the current snapshot only
    pub added: BTreeSet<String>,
    /// In the previous backup only
    pub removed: BTreeSet<String>,
    /// In both, canonical records differ
    pub updated: BTreeSet<String>,
    /// In both, canonical records equal
    pub unchanged: BTreeSet<String>,
}

impl KeyDelta {
    /// Classify keys of `previous` and `current`
    #[must_use]
    pub fn compute(previous: &BackupState, current: &Snapshot) -> Self {
        let mut delta = Self::default();

        for key in previous.keys() {
            if !current.contains_key(key) {
                delta.removed.insert(key.clone());
            }
        }

        for (key, staged) in current {
            match previous.get(key) {
                None => {
                    delta.added.insert(key.clone());
                }
                Some(old) if *old != staged.record => {
                    delta.updated.insert(key.clone());
                }
                Some(_) => {
                    delta.unchanged.insert(key.clone());
                }
            }
        }

        delta
    }

    /// Whether the backup must be rewritten
    #[inline]
    #[must_use]
    pub fn changes_found(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.updated.is_empty()
    }

    /// Keys that were added or updated
    pub fn changed_keys(&self) -> impl Iterator<Item = &String> {
        self.added.iter().chain(self.updated.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{image_filename, CanonicalRecord, PhotoPayload, StagedRecord};
    use proptest::prelude::*;

    fn canonical(email: &str, title: &str) -> CanonicalRecord {
        CanonicalRecord {
            name: "Someone".into(),
            work_email: email.into(),
            work_phone: String::new(),
            job_title: title.into(),
            department_name: None,
            photo_name: image_filename(email),
            manager: None,
            mentor: None,
            company: None,
        }
    }

    fn staged(email: &str, title: &str, photo: &str) -> (String, StagedRecord) {
        (
            email.to_string(),
            StagedRecord {
                record: canonical(email, title),
                photo: PhotoPayload::new(photo),
            },
        )
    }

    #[test]
    fn classifies_each_key_once() {
        let previous: BackupState = [
            ("a@x.com".to_string(), canonical("a@x.com", "Dev")),
            ("b@x.com".to_string(), canonical("b@x.com", "Dev")),
            ("c@x.com".to_string(), canonical("c@x.com", "Dev")),
        ]
        .into_iter()
        .collect();
        let current: Snapshot = [
            staged("a@x.com", "Dev", ""),
            staged("b@x.com", "Lead", ""),
            staged("d@x.com", "Dev", ""),
        ]
        .into_iter()
        .collect();

        let delta = KeyDelta::compute(&previous, &current);

        assert!(delta.unchanged.contains("a@x.com"));
        assert!(delta.updated.contains("b@x.com"));
        assert!(delta.removed.contains("c@x.com"));
        assert!(delta.added.contains("d@x.com"));
        assert!(delta.changes_found());
        assert_eq!(delta.changed_keys().count(), 2);
    }

    #[test]
    fn photo_payload_alone_is_not_an_update() {
        let previous: BackupState = [("a@x.com".to_string(), canonical("a@x.com", "Dev"))]
            .into_iter()
            .collect();
        let current: Snapshot = [staged("a@x.com", "Dev", "UE5H")].into_iter().collect();

        let delta = KeyDelta::compute(&previous, &current);

        assert!(delta.unchanged.contains("a@x.com"));
        assert!(!delta.changes_found());
    }

    #[test]
    fn empty_against_empty_has_no_changes() {
        let delta = KeyDelta::compute(&BackupState::new(), &Snapshot::new());
        assert_eq!(delta, KeyDelta::default());
        assert!(!delta.changes_found());
    }

    proptest! {
        #[test]
        fn prop_sets_partition_all_keys(
            prev in proptest::collection::btree_set("[a-f]@x\\.com", 0..6),
            curr in proptest::collection::btree_set("[a-f]@x\\.com", 0..6),
        ) {
            let previous: BackupState = prev
                .iter()
                .map(|k| (k.clone(), canonical(k, "Dev")))
                .collect();
            let current: Snapshot = curr.iter().map(|k| staged(k, "Dev", "")).collect();

            let delta = KeyDelta::compute(&previous, &current);

            let total = delta.added.len() + delta.removed.len() + delta.updated.len() + delta.unchanged.len();
            let union: BTreeSet<_> = prev.union(&curr).cloned().collect();
            prop_assert_eq!(total, union.len());
            prop_assert!(delta.updated.is_empty());
            prop_assert_eq!(delta.changes_found(), prev != curr);
        }
    }
}
