use crate::entry::EntryStore;

///
/// DiffReport
///
/// Deterministic key-set comparison of two snapshots, reported in three
/// segments — removed, modified, added — each sorted by key.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    pub added: Vec<String>,
}

/// Compare snapshots `a` and `b` by key set.
///
/// - Key in `a` only -> removed.
/// - Key in `b` only -> added.
/// - Key in both with a different entry hash -> modified.
/// - Key in both with an identical entry hash -> unchanged (not reported).
#[must_use]
pub fn diff(a: &EntryStore, b: &EntryStore) -> DiffReport {
    let mut removed = Vec::new();
    let mut modified = Vec::new();
    let mut added = Vec::new();

    for key in a.keys() {
        match b.entry(key) {
            Ok(b_entry) => {
                let a_entry = a.entry(key).expect("key came from a.keys()");
                if a_entry.hash != b_entry.hash {
                    modified.push(key.to_string());
                }
            }
            Err(_) => removed.push(key.to_string()),
        }
    }

    for key in b.keys() {
        if a.entry(key).is_err() {
            added.push(key.to_string());
        }
    }

    removed.sort();
    modified.sort();
    added.sort();

    DiffReport { removed, modified, added }
}

///
/// MergeOutcome
///
/// The reconciled entry set plus the set of keys that were in conflict
/// (present in both `source` and `target` with differing hashes).
///
#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    pub merged: EntryStore,
    pub conflicts: Vec<String>,
}

/// Reconcile `source`'s snapshot onto `target`'s snapshot.
///
/// For each key in `source`: if absent in `target`, it is inserted; if
/// present in both with differing hashes, it is a conflict. When
/// `auto_resolve` is true, `source` wins every conflict. When false and at
/// least one conflict exists, no merge is performed: the caller must treat
/// the live set as `target`'s snapshot, unchanged, with no partial state.
#[must_use]
pub fn plan_merge(source: &EntryStore, target: &EntryStore, auto_resolve: bool) -> Option<MergeOutcome> {
    let mut conflicts = Vec::new();
    for key in source.keys() {
        if let Ok(target_entry) = target.entry(key) {
            let source_entry = source.entry(key).expect("key came from source.keys()");
            if source_entry.hash != target_entry.hash {
                conflicts.push(key.to_string());
            }
        }
    }
    conflicts.sort();

    if !auto_resolve && !conflicts.is_empty() {
        return None;
    }

    let mut merged = target.clone();
    for key in source.keys() {
        let source_entry = source.entry(key).expect("key came from source.keys()");
        if target.entry(key).is_err() || conflicts.contains(&key.to_string()) {
            merged.overwrite_entry(source_entry.clone());
        }
    }

    Some(MergeOutcome { merged, conflicts })
}
