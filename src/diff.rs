//! # Diff Engine
//!
//! Matches the entries of two snapshots by name and classifies every change.
//! Matching is indexed by name with first-insert-wins, so duplicate names
//! within one snapshot resolve to the earliest entry — later duplicates are
//! never consulted. That policy is part of the observable contract.

use std::collections::HashMap;

use crate::entry::EntryDescriptor;
use crate::reader::Snapshot;

/// The outcome of comparing a baseline snapshot against a new one.
///
/// Both lists preserve the order of the snapshot they were drawn from:
/// `added_or_modified` follows new-archive order, `removed` follows baseline
/// order.
#[derive(Debug)]
pub struct DiffReport {
    /// Entries of the new snapshot that are absent from the baseline or
    /// present but different.
    pub added_or_modified: Vec<EntryDescriptor>,
    /// Entries of the baseline whose name no longer appears in the new
    /// snapshot.
    pub removed: Vec<EntryDescriptor>,
}

impl DiffReport {
    /// True when the snapshots are identical under the comparator.
    pub fn is_unchanged(&self) -> bool {
        self.added_or_modified.is_empty() && self.removed.is_empty()
    }
}

/// Index of snapshot entries by name. Insertion keeps the first occurrence,
/// preserving first-match-wins for duplicate names.
fn index_by_name(snapshot: &Snapshot) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(snapshot.len());
    for (i, descriptor) in snapshot.iter().enumerate() {
        index.entry(descriptor.name.as_str()).or_insert(i);
    }
    index
}

/// Diffs `new` against `baseline`, consuming both snapshots.
///
/// An empty baseline marks everything in `new` as added; an empty new
/// snapshot is accepted and marks everything in the baseline as removed.
pub fn diff_snapshots(baseline: Snapshot, new: Snapshot) -> DiffReport {
    let baseline_index = index_by_name(&baseline);
    let new_index = index_by_name(&new);

    let changed: Vec<bool> = new
        .iter()
        .map(|entry| match baseline_index.get(entry.name.as_str()) {
            Some(&i) => entry.differs(&baseline[i]),
            None => true,
        })
        .collect();
    let gone: Vec<bool> = baseline
        .iter()
        .map(|entry| !new_index.contains_key(entry.name.as_str()))
        .collect();

    let added_or_modified = new
        .into_iter()
        .zip(changed)
        .filter_map(|(entry, changed)| changed.then_some(entry))
        .collect();
    let removed = baseline
        .into_iter()
        .zip(gone)
        .filter_map(|(entry, gone)| gone.then_some(entry))
        .collect();

    DiffReport { added_or_modified, removed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{test_descriptor, EntryKind};

    fn file(name: &str, digest: &str) -> EntryDescriptor {
        test_descriptor(name, EntryKind::Regular, 10, Some(digest))
    }

    fn names(entries: &[EntryDescriptor]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn identical_snapshots_produce_an_empty_report() {
        let baseline = vec![file("a", "x"), file("b", "y")];
        let new = vec![file("a", "x"), file("b", "y")];
        let report = diff_snapshots(baseline, new);
        assert!(report.is_unchanged());
    }

    #[test]
    fn modified_and_added_entries_are_collected_in_new_order() {
        // baseline = {a(X), b(Y)}, new = {a(X), b(Z), c}
        let baseline = vec![file("a", "x"), file("b", "y")];
        let new = vec![file("a", "x"), file("b", "z"), file("c", "w")];
        let report = diff_snapshots(baseline, new);
        assert_eq!(names(&report.added_or_modified), vec!["b", "c"]);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn entries_dropped_from_the_new_snapshot_are_removed() {
        // baseline = {a, b}, new = {a}
        let baseline = vec![file("a", "x"), file("b", "y")];
        let new = vec![file("a", "x")];
        let report = diff_snapshots(baseline, new);
        assert!(report.added_or_modified.is_empty());
        assert_eq!(names(&report.removed), vec!["b"]);
    }

    #[test]
    fn empty_baseline_marks_everything_added() {
        let new = vec![file("a", "x"), file("b", "y"), file("c", "z")];
        let report = diff_snapshots(Vec::new(), new);
        assert_eq!(names(&report.added_or_modified), vec!["a", "b", "c"]);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn empty_new_snapshot_marks_everything_removed() {
        let baseline = vec![file("a", "x"), file("b", "y")];
        let report = diff_snapshots(baseline, Vec::new());
        assert!(report.added_or_modified.is_empty());
        assert_eq!(names(&report.removed), vec!["a", "b"]);
    }

    #[test]
    fn name_is_identity_even_for_identical_content() {
        // Same content under a different name is an add plus a remove, never
        // a match.
        let baseline = vec![file("old-name", "x")];
        let new = vec![file("new-name", "x")];
        let report = diff_snapshots(baseline, new);
        assert_eq!(names(&report.added_or_modified), vec!["new-name"]);
        assert_eq!(names(&report.removed), vec!["old-name"]);
    }

    #[test]
    fn duplicate_baseline_names_resolve_to_the_first_entry() {
        // The second "a" in the baseline would match the new entry, but
        // first-match-wins means only the first is ever consulted.
        let baseline = vec![file("a", "x"), file("a", "z")];
        let new = vec![file("a", "z")];
        let report = diff_snapshots(baseline, new);
        assert_eq!(names(&report.added_or_modified), vec!["a"]);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn duplicate_new_names_are_each_checked_against_the_first_baseline_entry() {
        let baseline = vec![file("a", "x")];
        let new = vec![file("a", "x"), file("a", "z")];
        let report = diff_snapshots(baseline, new);
        // The first duplicate matches, the second differs.
        assert_eq!(report.added_or_modified.len(), 1);
        assert_eq!(report.added_or_modified[0].fingerprint.as_deref(), Some("z"));
    }

    #[test]
    fn symlink_retarget_counts_as_modified() {
        let baseline = vec![test_descriptor(
            "link",
            EntryKind::Symlink { target: "v1".into() },
            0,
            None,
        )];
        let new = vec![test_descriptor(
            "link",
            EntryKind::Symlink { target: "v2".into() },
            0,
            None,
        )];
        let report = diff_snapshots(baseline, new);
        assert_eq!(names(&report.added_or_modified), vec!["link"]);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn diffing_is_idempotent() {
        let make = || {
            (
                vec![file("a", "x"), file("b", "y")],
                vec![file("b", "y2"), file("c", "z")],
            )
        };
        let (b1, n1) = make();
        let (b2, n2) = make();
        let first = diff_snapshots(b1, n1);
        let second = diff_snapshots(b2, n2);
        assert_eq!(names(&first.added_or_modified), names(&second.added_or_modified));
        assert_eq!(names(&first.removed), names(&second.removed));
    }
}
