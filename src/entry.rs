use std::collections::HashMap;

use crate::{
    error::{BlueCrabError, ErrorOrigin, Result},
    hash,
    pattern::Pattern,
    value::{
        Value,
        wire::{payload_bytes, tag_bytes},
    },
};

///
/// Entry
///
/// A single key/value row with timestamps, metadata, and an integrity hash.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
    pub created_at: u64,
    pub updated_at: u64,
    pub metadata: Option<String>,
    pub hash: String,
}

impl Entry {
    fn new(key: String, value: Value, now: u64) -> Self {
        let mut entry = Self {
            key,
            value,
            created_at: now,
            updated_at: now,
            metadata: None,
            hash: String::new(),
        };
        entry.recompute_hash();
        entry
    }

    /// Recompute the canonical hash from this entry's current fields.
    pub fn recompute_hash(&mut self) {
        self.hash = canonical_entry_hash(
            &self.key,
            &self.value,
            self.metadata.as_deref(),
            self.created_at,
            self.updated_at,
        );
    }

    /// Recompute the hash and compare it to the stored value.
    #[must_use]
    pub fn verify(&self) -> bool {
        let expected = canonical_entry_hash(
            &self.key,
            &self.value,
            self.metadata.as_deref(),
            self.created_at,
            self.updated_at,
        );
        expected == self.hash
    }
}

/// Assemble the canonical byte stream and hash it: key bytes, two-byte
/// little-endian type tag, type-specific value bytes, metadata bytes (empty
/// if absent), eight bytes of `created_at`, eight bytes of `updated_at`.
#[must_use]
pub fn canonical_entry_hash(
    key: &str,
    value: &Value,
    metadata: Option<&str>,
    created_at: u64,
    updated_at: u64,
) -> String {
    let mut stream = Vec::new();
    stream.extend_from_slice(key.as_bytes());
    stream.extend_from_slice(&tag_bytes(value));
    stream.extend_from_slice(&payload_bytes(value));
    stream.extend_from_slice(metadata.unwrap_or("").as_bytes());
    stream.extend_from_slice(&created_at.to_le_bytes());
    stream.extend_from_slice(&updated_at.to_le_bytes());
    hash::canonical_hash(&stream)
}

///
/// SetOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SetOutcome {
    Inserted,
    Updated,
}

///
/// EntryStore
///
/// Ordered sequence of entries with unique keys. Ordering is insertion order
/// for new keys and is preserved across updates; deletion preserves the
/// relative order of the remaining entries.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryStore {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl EntryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert-or-replace `key` with `value`. Returns whether the key was a
    /// fresh insert or an update to an existing entry.
    pub fn set(&mut self, key: &str, value: Value, now: u64) -> Result<SetOutcome> {
        if key.is_empty() {
            return Err(BlueCrabError::invalid_arg(
                ErrorOrigin::Store,
                "key must not be empty",
            ));
        }

        if let Some(&idx) = self.index.get(key) {
            let entry = &mut self.entries[idx];
            entry.value = value;
            entry.updated_at = now;
            entry.recompute_hash();
            Ok(SetOutcome::Updated)
        } else {
            let entry = Entry::new(key.to_string(), value, now);
            self.index.insert(key.to_string(), self.entries.len());
            self.entries.push(entry);
            Ok(SetOutcome::Inserted)
        }
    }

    pub fn get(&self, key: &str) -> Result<Value> {
        self.entry(key).map(|e| e.value.clone())
    }

    pub fn entry(&self, key: &str) -> Result<&Entry> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| BlueCrabError::not_found(ErrorOrigin::Store, format!("key not found: {key}")))?;
        Ok(&self.entries[idx])
    }

    pub fn delete(&mut self, key: &str) -> Result<()> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| BlueCrabError::not_found(ErrorOrigin::Store, format!("key not found: {key}")))?;
        self.entries.remove(idx);
        self.index.remove(key);
        for v in self.index.values_mut() {
            if *v > idx {
                *v -= 1;
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn set_metadata(&mut self, key: &str, text: &str, now: u64) -> Result<()> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| BlueCrabError::not_found(ErrorOrigin::Store, format!("key not found: {key}")))?;
        let entry = &mut self.entries[idx];
        // Empty metadata is indistinguishable from absent metadata on disk
        // (the codec collapses a zero-length field back to `None`), so
        // normalize it here to keep the in-memory and persisted states equal.
        entry.metadata = if text.is_empty() { None } else { Some(text.to_string()) };
        entry.updated_at = now;
        entry.recompute_hash();
        Ok(())
    }

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entry(key)?.metadata.clone())
    }

    /// Insertion-ordered iterator over live entries.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Insertion-ordered iterator over live keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn find_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = Pattern::parse(pattern)?;
        Ok(self
            .entries
            .iter()
            .filter(|e| matcher.matches(&e.key))
            .map(|e| e.key.clone())
            .collect())
    }

    pub fn find_entries(&self, pattern: &str) -> Result<Vec<Entry>> {
        let matcher = Pattern::parse(pattern)?;
        Ok(self
            .entries
            .iter()
            .filter(|e| matcher.matches(&e.key))
            .cloned()
            .collect())
    }

    /// Recompute and compare every live entry's hash.
    #[must_use]
    pub fn verify_all(&self) -> bool {
        self.entries.iter().all(Entry::verify)
    }

    /// Insert or replace a fully-formed entry verbatim (its own hash and
    /// timestamps are preserved, not recomputed). Used by merge/checkout
    /// paths that install entries sourced from another snapshot.
    pub fn overwrite_entry(&mut self, entry: Entry) {
        if let Some(&idx) = self.index.get(&entry.key) {
            self.entries[idx] = entry;
        } else {
            self.index.insert(entry.key.clone(), self.entries.len());
            self.entries.push(entry);
        }
    }

    /// Deep copy the current entries into a fresh, independent store — the
    /// snapshot mechanism used by commits.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Replace this store's live contents with a deep copy of `snapshot`.
    pub fn restore_from(&mut self, snapshot: &Self) {
        *self = snapshot.clone();
    }
}
