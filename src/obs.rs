//! Injectable event sink boundary.
//!
//! Core engine logic MUST NOT print or log directly (spec: `printf` calls
//! inside the engine are a defect). All lifecycle notifications flow through
//! [`EventSink`], owned by the `Database` handle — never a process-global.

use std::path::PathBuf;

///
/// Event
///

#[derive(Clone, Debug)]
pub enum Event {
    Set {
        key: String,
        inserted: bool,
    },
    Deleted {
        key: String,
    },
    Committed {
        commit_id: String,
        branch: String,
    },
    CheckedOut {
        commit_id: String,
    },
    BranchSwitched {
        branch: String,
    },
    Tagged {
        tag: String,
        commit_id: String,
    },
    Merged {
        source: String,
        target: String,
        conflicts: usize,
    },
    MergeAborted {
        source: String,
        target: String,
        conflicts: usize,
    },
    Saved {
        path: PathBuf,
        entry_count: usize,
    },
    Loaded {
        path: PathBuf,
        entry_count: usize,
    },
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: &Event);
}

///
/// NoopEventSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: &Event) {}
}
