//! Persistence codec.
//!
//! Length-prefixed binary layout per the data model: every integer is
//! little-endian, most strings are plain length+bytes, and a few fields
//! (key, hash, string-typed values) carry a legacy-compatible trailing NUL
//! included in both their length and their byte run. `save` writes a
//! temporary file, `fsync`s it, then renames it over the target so a crash
//! never exposes a torn file (grounded on the disk-cache write path used
//! elsewhere in the reference pack: write to `*.tmp`, `sync_all`, `rename`).

use std::fs::{self, File};
use std::io::Write as _;
use std::path::Path;

use crate::{
    branch::TagRegistry,
    commit::{Commit, CommitLog},
    entry::{Entry, EntryStore},
    error::{BlueCrabError, Result},
    value::{Value, ValueTag},
};

const MAGIC: [u8; 4] = *b"BCRB";
const FORMAT_VERSION: u32 = 1;

///
/// DecodedDatabase
///
/// Plain-data result of `decode`; the caller (the `Database` aggregate)
/// rebuilds its branch table from the persisted current branch/commit (see
/// `branch::BranchRegistry::rebuild_from_persisted`). The wire layout carries
/// no per-commit branch field, so branches other than the one current at
/// save time do not survive a round trip.
///
pub struct DecodedDatabase {
    pub entries: EntryStore,
    pub commits: CommitLog,
    pub current_branch: String,
    pub current_commit: Option<String>,
    pub tags: TagRegistry,
}

// ---------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// `u64` length (not including a NUL) followed by the raw bytes.
    fn len_prefixed(&mut self, bytes: &[u8]) {
        self.u64(bytes.len() as u64);
        self.raw(bytes);
    }

    /// `u64` length INCLUDING a trailing NUL, followed by bytes + NUL.
    fn len_prefixed_nul(&mut self, bytes: &[u8]) {
        self.u64(bytes.len() as u64 + 1);
        self.raw(bytes);
        self.buf.push(0);
    }
}

// ---------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn need(&self, n: usize) -> Result<()> {
        let overflows = self.pos.checked_add(n).map_or(true, |end| end > self.data.len());
        if overflows {
            return Err(BlueCrabError::corrupt(format!(
                "unexpected end of input: need {n} bytes at offset {}, have {}",
                self.pos,
                self.data.len()
            )));
        }
        Ok(())
    }

    fn u16(&mut self) -> Result<u16> {
        self.need(2)?;
        let v = u16::from_le_bytes(self.data[self.pos..self.pos + 2].try_into().unwrap());
        self.pos += 2;
        Ok(v)
    }

    fn u64(&mut self) -> Result<u64> {
        self.need(8)?;
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().unwrap());
        self.pos += 8;
        Ok(v)
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.need(n)?;
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read a `u64` length followed by that many raw bytes (no NUL).
    fn len_prefixed(&mut self) -> Result<Vec<u8>> {
        let len = self.u64()? as usize;
        Ok(self.bytes(len)?.to_vec())
    }

    /// Read a `u64` length (including a trailing NUL) followed by bytes,
    /// stripping the NUL.
    fn len_prefixed_nul(&mut self) -> Result<Vec<u8>> {
        let len = self.u64()? as usize;
        if len == 0 {
            return Ok(Vec::new());
        }
        let raw = self.bytes(len)?;
        Ok(raw[..len - 1].to_vec())
    }

    fn string_len_prefixed(&mut self) -> Result<String> {
        String::from_utf8(self.len_prefixed()?)
            .map_err(|e| BlueCrabError::corrupt(format!("invalid UTF-8: {e}")))
    }

    fn string_len_prefixed_nul(&mut self) -> Result<String> {
        String::from_utf8(self.len_prefixed_nul()?)
            .map_err(|e| BlueCrabError::corrupt(format!("invalid UTF-8: {e}")))
    }
}

// ---------------------------------------------------------------------
// Entry payload (shared by top-level entries and commit snapshots)
// ---------------------------------------------------------------------

fn write_entry(w: &mut Writer, entry: &Entry) {
    w.len_prefixed_nul(entry.key.as_bytes());
    w.u16(entry.value.tag().to_u16());
    write_value_payload(w, &entry.value);
    w.u64(entry.created_at);
    w.u64(entry.updated_at);
    w.len_prefixed_nul(entry.hash.as_bytes());
    w.len_prefixed(entry.metadata.as_deref().unwrap_or("").as_bytes());
}

fn write_value_payload(w: &mut Writer, value: &Value) {
    match value {
        Value::Null => {}
        Value::I8(v) => w.raw(&[*v as u8]),
        Value::U8(v) => w.raw(&[*v]),
        Value::Bool(v) => w.raw(&[u8::from(*v)]),
        Value::Char(v) => w.raw(&[*v]),
        Value::I16(v) => w.raw(&v.to_le_bytes()),
        Value::U16(v) => w.raw(&v.to_le_bytes()),
        Value::I32(v) => w.raw(&v.to_le_bytes()),
        Value::U32(v) => w.raw(&v.to_le_bytes()),
        Value::F32(v) => w.raw(&v.to_bits().to_le_bytes()),
        Value::I64(v) => w.raw(&v.to_le_bytes()),
        Value::U64(v) => w.raw(&v.to_le_bytes()),
        Value::F64(v) => w.raw(&v.to_bits().to_le_bytes()),
        Value::Size(v) => w.raw(&v.to_le_bytes()),
        Value::Timestamp(v) => w.raw(&v.to_le_bytes()),
        Value::Duration(v) => w.raw(&v.to_le_bytes()),
        Value::Text(s) | Value::Hex(s) | Value::Oct(s) | Value::Bin(s) => {
            w.len_prefixed_nul(s.as_bytes());
        }
        Value::Bytes(b) => w.len_prefixed(b),
    }
}

fn read_entry(r: &mut Reader<'_>) -> Result<Entry> {
    let key = r.string_len_prefixed_nul()?;
    let tag_raw = r.u16()?;
    let tag = ValueTag::from_u16(tag_raw)
        .ok_or_else(|| BlueCrabError::type_mismatch(format!("unknown value type tag: {tag_raw}")))?;
    let value = read_value_payload(r, tag)?;
    let created_at = r.u64()?;
    let updated_at = r.u64()?;
    let hash = r.string_len_prefixed_nul()?;
    let metadata_bytes = r.len_prefixed()?;
    let metadata = if metadata_bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8(metadata_bytes).map_err(|e| BlueCrabError::corrupt(e.to_string()))?)
    };

    Ok(Entry {
        key,
        value,
        created_at,
        updated_at,
        metadata,
        hash,
    })
}

fn read_value_payload(r: &mut Reader<'_>, tag: ValueTag) -> Result<Value> {
    Ok(match tag {
        ValueTag::Null => Value::Null,
        ValueTag::I8 => Value::I8(r.bytes(1)?[0] as i8),
        ValueTag::U8 => Value::U8(r.bytes(1)?[0]),
        ValueTag::Bool => Value::Bool(r.bytes(1)?[0] != 0),
        ValueTag::Char => Value::Char(r.bytes(1)?[0]),
        ValueTag::I16 => Value::I16(i16::from_le_bytes(r.bytes(2)?.try_into().unwrap())),
        ValueTag::U16 => Value::U16(u16::from_le_bytes(r.bytes(2)?.try_into().unwrap())),
        ValueTag::I32 => Value::I32(i32::from_le_bytes(r.bytes(4)?.try_into().unwrap())),
        ValueTag::U32 => Value::U32(u32::from_le_bytes(r.bytes(4)?.try_into().unwrap())),
        ValueTag::F32 => Value::F32(f32::from_bits(u32::from_le_bytes(r.bytes(4)?.try_into().unwrap()))),
        ValueTag::I64 => Value::I64(i64::from_le_bytes(r.bytes(8)?.try_into().unwrap())),
        ValueTag::U64 => Value::U64(u64::from_le_bytes(r.bytes(8)?.try_into().unwrap())),
        ValueTag::F64 => Value::F64(f64::from_bits(u64::from_le_bytes(r.bytes(8)?.try_into().unwrap()))),
        ValueTag::Size => Value::Size(u64::from_le_bytes(r.bytes(8)?.try_into().unwrap())),
        ValueTag::Timestamp => Value::Timestamp(i64::from_le_bytes(r.bytes(8)?.try_into().unwrap())),
        ValueTag::Duration => Value::Duration(i64::from_le_bytes(r.bytes(8)?.try_into().unwrap())),
        ValueTag::Text => Value::Text(r.string_len_prefixed_nul()?),
        ValueTag::Hex => Value::Hex(r.string_len_prefixed_nul()?),
        ValueTag::Oct => Value::Oct(r.string_len_prefixed_nul()?),
        ValueTag::Bin => Value::Bin(r.string_len_prefixed_nul()?),
        ValueTag::Bytes => Value::Bytes(r.len_prefixed()?),
    })
}

// ---------------------------------------------------------------------
// Whole-database encode / decode
// ---------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn encode(
    entries: &EntryStore,
    commits: &CommitLog,
    current_branch: &str,
    current_commit: Option<&str>,
    tags: &TagRegistry,
) -> Vec<u8> {
    let mut w = Writer::new();
    w.raw(&MAGIC);
    w.buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());

    w.u64(entries.len() as u64);
    for entry in entries.iter() {
        write_entry(&mut w, entry);
    }

    w.u64(commits.len() as u64);
    for commit in commits.iter() {
        w.len_prefixed(commit.commit_id.as_bytes());
        w.len_prefixed(commit.message.as_bytes());
        w.u64(commit.timestamp);
        w.len_prefixed(commit.parent_id.as_bytes());
        w.u64(commit.snapshot.len() as u64);
        for entry in commit.snapshot.iter() {
            write_entry(&mut w, entry);
        }
    }

    w.len_prefixed(current_branch.as_bytes());
    w.len_prefixed(current_commit.unwrap_or("").as_bytes());

    w.u64(tags.len() as u64);
    for (name, target) in tags.iter() {
        w.len_prefixed(name.as_bytes());
        w.len_prefixed(target.as_bytes());
    }

    w.buf
}

pub fn decode(bytes: &[u8]) -> Result<DecodedDatabase> {
    let mut r = Reader::new(bytes);

    let magic = r.bytes(4)?;
    if magic != MAGIC {
        return Err(BlueCrabError::corrupt("bad magic: not a Blue Crab database file"));
    }
    let version = u32::from_le_bytes(r.bytes(4)?.try_into().unwrap());
    if version > FORMAT_VERSION {
        return Err(BlueCrabError::new(
            crate::error::ErrorClass::Unsupported,
            crate::error::ErrorOrigin::Codec,
            format!("unsupported format version {version}"),
        ));
    }

    let entry_count = r.u64()? as usize;
    let mut entries = EntryStore::new();
    for _ in 0..entry_count {
        entries.overwrite_entry(read_entry(&mut r)?);
    }

    let commit_count = r.u64()? as usize;
    let mut commits = CommitLog::new();
    for _ in 0..commit_count {
        let commit_id = r.string_len_prefixed()?;
        let message = r.string_len_prefixed()?;
        let timestamp = r.u64()?;
        let parent_id = r.string_len_prefixed()?;
        let snapshot_count = r.u64()? as usize;
        let mut snapshot = EntryStore::new();
        for _ in 0..snapshot_count {
            snapshot.overwrite_entry(read_entry(&mut r)?);
        }
        commits.push(Commit {
            commit_id,
            parent_id,
            // Not part of the on-disk layout (spec.md §4.7 lists no
            // per-commit branch field); only the current branch's tip
            // survives a save/load round trip, see `BranchRegistry::rebuild_from_persisted`.
            branch_name: String::new(),
            message,
            timestamp,
            snapshot,
        });
    }

    let current_branch = r.string_len_prefixed()?;
    let current_commit_raw = r.string_len_prefixed()?;
    let current_commit = if current_commit_raw.is_empty() {
        None
    } else {
        Some(current_commit_raw)
    };

    let tag_count = r.u64()? as usize;
    let mut tags = TagRegistry::new();
    for _ in 0..tag_count {
        let name = r.string_len_prefixed()?;
        let target = r.string_len_prefixed()?;
        tags.insert_raw(name, target);
    }

    Ok(DecodedDatabase {
        entries,
        commits,
        current_branch,
        current_commit,
        tags,
    })
}

/// Write `bytes` atomically to `path`: a temporary file is written, fsynced,
/// then renamed over the target so a crash never leaves a torn file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::value::Value;
    use proptest::prelude::*;

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i8>().prop_map(Value::I8),
            any::<i16>().prop_map(Value::I16),
            any::<i32>().prop_map(Value::I32),
            any::<i64>().prop_map(Value::I64),
            any::<u8>().prop_map(Value::U8),
            any::<u16>().prop_map(Value::U16),
            any::<u32>().prop_map(Value::U32),
            any::<u64>().prop_map(Value::U64),
            any::<f32>().prop_map(Value::F32),
            any::<f64>().prop_map(Value::F64),
            any::<bool>().prop_map(Value::Bool),
            any::<u8>().prop_map(Value::Char),
            ".*".prop_map(Value::Text),
            any::<u64>().prop_map(Value::Size),
            any::<i64>().prop_map(Value::Timestamp),
            any::<i64>().prop_map(Value::Duration),
            proptest::collection::vec(any::<u8>(), 0..64).prop_map(Value::Bytes),
            Just(Value::Null),
        ]
    }

    proptest! {
        /// For every `Value` variant, encode/decode through a single entry
        /// yields a bit-identical value back (the spec's round-trip law).
        #[test]
        fn value_round_trips_through_entry_codec(value in arb_value(), key in "[a-zA-Z0-9_]{1,16}") {
            let mut store = EntryStore::new();
            store.set(&key, value.clone(), 0).unwrap();
            let mut w = Writer::new();
            write_entry(&mut w, store.entry(&key).unwrap());

            let mut r = Reader::new(&w.buf);
            let decoded = read_entry(&mut r).unwrap();
            prop_assert_eq!(decoded.value, value);
        }

        /// `load(save(db))` is structurally equal to the original for an
        /// arbitrary small entry set (entries, hashes, and current branch).
        #[test]
        fn whole_database_round_trips(values in proptest::collection::vec(arb_value(), 0..20)) {
            let mut entries = EntryStore::new();
            for (i, value) in values.into_iter().enumerate() {
                entries.set(&format!("k{i}"), value, i as u64).unwrap();
            }
            let commits = CommitLog::new();
            let tags = TagRegistry::new();

            let bytes = encode(&entries, &commits, "main", None, &tags);
            let decoded = decode(&bytes).unwrap();

            prop_assert_eq!(decoded.entries.len(), entries.len());
            for key in entries.keys() {
                prop_assert_eq!(decoded.entries.get(key).unwrap(), entries.get(key).unwrap());
                prop_assert_eq!(&decoded.entries.entry(key).unwrap().hash, &entries.entry(key).unwrap().hash);
            }
            prop_assert_eq!(decoded.current_branch, "main");
            prop_assert!(decoded.current_commit.is_none());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn sample_entries() -> EntryStore {
        let mut store = EntryStore::new();
        store.set("a", Value::I32(-7), 1).unwrap();
        store.set("b", Value::Text("hello".into()), 2).unwrap();
        store.set("c", Value::Bytes(vec![0, 1, 2, 255]), 3).unwrap();
        store.set("d", Value::Null, 4).unwrap();
        store.set("e", Value::F64(1.5), 5).unwrap();
        store
    }

    #[test]
    fn entries_round_trip_through_encode_decode() {
        let entries = sample_entries();
        let commits = CommitLog::new();
        let tags = TagRegistry::new();
        let bytes = encode(&entries, &commits, "main", None, &tags);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.entries.len(), entries.len());
        for key in entries.keys() {
            assert_eq!(decoded.entries.get(key).unwrap(), entries.get(key).unwrap());
            assert_eq!(decoded.entries.entry(key).unwrap().hash, entries.entry(key).unwrap().hash);
        }
    }

    #[test]
    fn rejects_bad_magic() {
        let err = decode(b"nope").unwrap_err();
        assert_eq!(err.class, crate::error::ErrorClass::Corrupt);
    }

    #[test]
    fn rejects_truncated_input() {
        let entries = sample_entries();
        let bytes = encode(&entries, &CommitLog::new(), "main", None, &TagRegistry::new());
        let truncated = &bytes[..bytes.len() - 10];
        let err = decode(truncated).unwrap_err();
        assert_eq!(err.class, crate::error::ErrorClass::Corrupt);
    }

    #[test]
    fn rejects_unknown_type_tag() {
        let entries = sample_entries();
        let mut bytes = encode(&entries, &CommitLog::new(), "main", None, &TagRegistry::new());
        // Offset of the first entry's type tag: magic(4) + version(4) + entry_count(8)
        // + key_len(8) + key bytes ("a\0" = 2 bytes) = 26.
        let tag_offset = 4 + 4 + 8 + 8 + 2;
        bytes[tag_offset] = 0xFF;
        bytes[tag_offset + 1] = 0xFF;
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.class, crate::error::ErrorClass::TypeMismatch);
    }

    #[test]
    fn rejects_garbage_length_prefix_without_panicking() {
        let entries = sample_entries();
        let mut bytes = encode(&entries, &CommitLog::new(), "main", None, &TagRegistry::new());
        // Offset of the first entry's key_len: magic(4) + version(4) + entry_count(8) = 16.
        // Set it to near-u64::MAX so `pos + len` overflows a naive bounds check
        // instead of legitimately exceeding the buffer.
        let key_len_offset = 4 + 4 + 8;
        bytes[key_len_offset..key_len_offset + 8].copy_from_slice(&u64::MAX.to_le_bytes());
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.class, crate::error::ErrorClass::Corrupt);
    }
}
