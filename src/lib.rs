//! Blue Crab: an embedded, single-process, tamper-evident key/value store
//! with a typed value model and a Git-style versioned history (commits,
//! branches, tags, diff, merge).
//!
//! The engine never prints or logs on its own; lifecycle notifications flow
//! through an injectable [`obs::EventSink`]. Time is read through an
//! injectable [`clock::Clock`] so commit and entry timestamps are
//! deterministic under test. See [`db::Database`] for the public surface.

pub mod branch;
pub mod clock;
pub mod codec;
pub mod commit;
pub mod config;
pub mod db;
pub mod diff;
pub mod entry;
pub mod error;
pub mod hash;
pub mod obs;
pub mod pattern;
pub mod value;

pub mod prelude {
    pub use crate::branch::{BranchRegistry, TagRegistry, DEFAULT_BRANCH};
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::commit::{Commit, CommitLog};
    pub use crate::config::DatabaseConfig;
    pub use crate::db::Database;
    pub use crate::diff::{DiffReport, MergeOutcome};
    pub use crate::entry::{Entry, SetOutcome};
    pub use crate::error::{BlueCrabError, ErrorClass, ErrorOrigin, Result};
    pub use crate::obs::{Event, EventSink, NoopEventSink};
    pub use crate::value::{Value, ValueTag};
}
