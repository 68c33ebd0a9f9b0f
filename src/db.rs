use std::path::{Path, PathBuf};

use crate::{
    branch::{BranchRegistry, TagRegistry},
    clock::{Clock, SystemClock},
    codec,
    commit::{Commit, CommitLog, derive_commit_id},
    config::DatabaseConfig,
    diff::{DiffReport, diff as diff_stores, plan_merge},
    entry::{EntryStore, SetOutcome},
    error::{BlueCrabError, ErrorOrigin, Result},
    obs::{Event, EventSink, NoopEventSink},
    value::Value,
};

///
/// Database
///
/// Aggregate of: storage path, ordered entry set, commit log, branch
/// registry (with current branch), tag registry, and the current commit id
/// (empty before the first commit). Single-writer, single-threaded — see
/// the crate-level docs for the concurrency contract.
///
pub struct Database {
    path: PathBuf,
    entries: EntryStore,
    commits: CommitLog,
    branches: BranchRegistry,
    tags: TagRegistry,
    current_commit: Option<String>,
    config: DatabaseConfig,
    clock: Box<dyn Clock>,
    sink: Box<dyn EventSink>,
}

impl Database {
    /// Create an empty database at `path`. Does not touch the filesystem
    /// until `save` is called.
    #[must_use]
    pub fn init(path: impl Into<PathBuf>) -> Self {
        Self::init_with_config(path, DatabaseConfig::default())
    }

    #[must_use]
    pub fn init_with_config(path: impl Into<PathBuf>, config: DatabaseConfig) -> Self {
        Self {
            path: path.into(),
            entries: EntryStore::new(),
            commits: CommitLog::new(),
            branches: BranchRegistry::new(),
            tags: TagRegistry::new(),
            current_commit: None,
            config,
            clock: Box::new(SystemClock),
            sink: Box::new(NoopEventSink),
        }
    }

    /// Install a custom time source (tests; anything embedding the engine
    /// in a deterministic replay context).
    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    /// Install an event sink. The core never prints; lifecycle events flow
    /// here instead.
    pub fn set_event_sink(&mut self, sink: impl EventSink + 'static) {
        self.sink = Box::new(sink);
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn config(&self) -> DatabaseConfig {
        self.config
    }

    fn now(&self) -> u64 {
        self.clock.now_nanos()
    }

    fn check_bounds(&self, key: &str, value: &Value) -> Result<()> {
        if key.len() > self.config.max_key_len {
            return Err(BlueCrabError::invalid_arg(
                ErrorOrigin::Store,
                format!("key exceeds max_key_len ({} > {})", key.len(), self.config.max_key_len),
            ));
        }
        let value_len = match value {
            Value::Text(s) | Value::Hex(s) | Value::Oct(s) | Value::Bin(s) => s.len(),
            Value::Bytes(b) => b.len(),
            _ => 0,
        };
        if value_len > self.config.max_value_bytes {
            return Err(BlueCrabError::invalid_arg(
                ErrorOrigin::Store,
                format!(
                    "value exceeds max_value_bytes ({value_len} > {})",
                    self.config.max_value_bytes
                ),
            ));
        }
        Ok(())
    }

    // -- CRUD -----------------------------------------------------------

    pub fn set(&mut self, key: &str, value: Value) -> Result<SetOutcome> {
        self.check_bounds(key, &value)?;
        let now = self.now();
        let outcome = self.entries.set(key, value, now)?;
        self.sink.record(&Event::Set {
            key: key.to_string(),
            inserted: matches!(outcome, SetOutcome::Inserted),
        });
        Ok(outcome)
    }

    pub fn get(&self, key: &str) -> Result<Value> {
        self.entries.get(key)
    }

    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.delete(key)?;
        self.sink.record(&Event::Deleted { key: key.to_string() });
        Ok(())
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.has(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn set_metadata(&mut self, key: &str, text: &str) -> Result<()> {
        if text.len() > self.config.max_metadata_bytes {
            return Err(BlueCrabError::invalid_arg(
                ErrorOrigin::Store,
                format!(
                    "metadata exceeds max_metadata_bytes ({} > {})",
                    text.len(),
                    self.config.max_metadata_bytes
                ),
            ));
        }
        let now = self.now();
        self.entries.set_metadata(key, text, now)
    }

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        self.entries.get_metadata(key)
    }

    pub fn find_keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.entries.find_keys(pattern)
    }

    pub fn find_entries(&self, pattern: &str) -> Result<Vec<crate::entry::Entry>> {
        self.entries.find_entries(pattern)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // -- Verification -----------------------------------------------------

    #[must_use]
    pub fn verify_entry(&self, key: &str) -> Result<bool> {
        Ok(self.entries.entry(key)?.verify())
    }

    #[must_use]
    pub fn verify_db(&self) -> bool {
        self.entries.verify_all()
    }

    // -- Commit / checkout / log ------------------------------------------

    pub fn commit(&mut self, message: &str) -> Result<String> {
        if let Some(max) = self.config.max_commits {
            if self.commits.len() >= max {
                return Err(BlueCrabError::invalid_arg(
                    ErrorOrigin::Commit,
                    format!("commit log already has the maximum of {max} commits"),
                ));
            }
        }

        let branch_name = self.branches.current().to_string();
        let parent_id = self.branches.current_tip().unwrap_or("").to_string();
        let now = self.now();
        let snapshot = self.entries.snapshot();
        let commit_id = derive_commit_id(&parent_id, message, now, &snapshot);

        let commit = Commit {
            commit_id: commit_id.clone(),
            parent_id,
            branch_name: branch_name.clone(),
            message: message.to_string(),
            timestamp: now,
            snapshot,
        };
        self.commits.push(commit);
        self.branches.advance(&branch_name, &commit_id);
        self.current_commit = Some(commit_id.clone());

        self.sink.record(&Event::Committed {
            commit_id: commit_id.clone(),
            branch: branch_name,
        });
        Ok(commit_id)
    }

    pub fn checkout(&mut self, commit_id: &str) -> Result<()> {
        let commit = self
            .commits
            .find(commit_id)
            .ok_or_else(|| BlueCrabError::not_found(ErrorOrigin::Commit, format!("commit not found: {commit_id}")))?;
        self.entries.restore_from(&commit.snapshot);
        self.current_commit = Some(commit_id.to_string());
        self.sink.record(&Event::CheckedOut {
            commit_id: commit_id.to_string(),
        });
        Ok(())
    }

    /// Commits reachable from the current branch's tip, newest first.
    #[must_use]
    pub fn log(&self) -> Vec<&Commit> {
        match self.branches.current_tip() {
            Some(tip) => self.commits.history_from(tip),
            None => Vec::new(),
        }
    }

    #[must_use]
    pub fn current_commit(&self) -> Option<&str> {
        self.current_commit.as_deref()
    }

    // -- Branch / tag ------------------------------------------------------

    pub fn branch(&mut self, name: &str) -> Result<()> {
        let starting_tip = self.current_commit.clone();
        self.branches.switch_to(name, starting_tip.as_deref())?;
        self.current_commit = self.branches.current_tip().map(str::to_string);
        self.sink.record(&Event::BranchSwitched { branch: name.to_string() });
        Ok(())
    }

    #[must_use]
    pub fn current_branch(&self) -> &str {
        self.branches.current()
    }

    pub fn tag_commit(&mut self, commit_id: &str, tag_name: &str) -> Result<()> {
        if self.commits.find(commit_id).is_none() {
            return Err(BlueCrabError::not_found(
                ErrorOrigin::Tag,
                format!("commit not found: {commit_id}"),
            ));
        }
        self.tags.tag(commit_id, tag_name)?;
        self.sink.record(&Event::Tagged {
            tag: tag_name.to_string(),
            commit_id: commit_id.to_string(),
        });
        Ok(())
    }

    #[must_use]
    pub fn get_tagged_commit(&self, tag_name: &str) -> Option<&str> {
        self.tags.get(tag_name)
    }

    // -- Diff / merge -------------------------------------------------------

    pub fn diff(&self, a: &str, b: &str) -> Result<DiffReport> {
        let commit_a = self
            .commits
            .find(a)
            .ok_or_else(|| BlueCrabError::not_found(ErrorOrigin::Diff, format!("commit not found: {a}")))?;
        let commit_b = self
            .commits
            .find(b)
            .ok_or_else(|| BlueCrabError::not_found(ErrorOrigin::Diff, format!("commit not found: {b}")))?;
        Ok(diff_stores(&commit_a.snapshot, &commit_b.snapshot))
    }

    pub fn merge(&mut self, source: &str, target: &str, auto_resolve: bool) -> Result<String> {
        let source_snapshot = self
            .commits
            .find(source)
            .ok_or_else(|| BlueCrabError::not_found(ErrorOrigin::Merge, format!("commit not found: {source}")))?
            .snapshot
            .clone();
        let target_snapshot = self
            .commits
            .find(target)
            .ok_or_else(|| BlueCrabError::not_found(ErrorOrigin::Merge, format!("commit not found: {target}")))?
            .snapshot
            .clone();

        let outcome = plan_merge(&source_snapshot, &target_snapshot, true)
            .expect("plan_merge with auto_resolve=true always resolves");

        if !auto_resolve && !outcome.conflicts.is_empty() {
            // Abort: live set must be left bit-identical to target's snapshot.
            self.entries.restore_from(&target_snapshot);
            self.sink.record(&Event::MergeAborted {
                source: source.to_string(),
                target: target.to_string(),
                conflicts: outcome.conflicts.len(),
            });
            return Err(BlueCrabError::conflict(
                ErrorOrigin::Merge,
                "merge has conflicts and auto_resolve was not requested",
            ));
        }

        self.entries.restore_from(&outcome.merged);
        let pre_merge_commit = self.current_commit.clone().unwrap_or_default();
        let branch_name = self.branches.current().to_string();
        let now = self.now();
        let snapshot = self.entries.snapshot();
        let commit_id = derive_commit_id(&pre_merge_commit, "merge commit", now, &snapshot);
        let commit = Commit {
            commit_id: commit_id.clone(),
            parent_id: pre_merge_commit,
            branch_name: branch_name.clone(),
            message: "merge commit".to_string(),
            timestamp: now,
            snapshot,
        };
        self.commits.push(commit);
        self.branches.advance(&branch_name, &commit_id);
        self.current_commit = Some(commit_id.clone());

        self.sink.record(&Event::Merged {
            source: source.to_string(),
            target: target.to_string(),
            conflicts: outcome.conflicts.len(),
        });
        Ok(commit_id)
    }

    // -- Persistence ---------------------------------------------------------

    pub fn save(&self) -> Result<()> {
        let bytes = codec::encode(
            &self.entries,
            &self.commits,
            self.branches.current(),
            self.current_commit.as_deref(),
            &self.tags,
        );
        codec::write_atomic(&self.path, &bytes)?;
        self.sink.record(&Event::Saved {
            path: self.path.clone(),
            entry_count: self.entries.len(),
        });
        Ok(())
    }

    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        Self::load_with_config(path, DatabaseConfig::default())
    }

    pub fn load_with_config(path: impl Into<PathBuf>, config: DatabaseConfig) -> Result<Self> {
        let path = path.into();
        let bytes = std::fs::read(&path)?;
        let decoded = codec::decode(&bytes)?;
        let branches = BranchRegistry::rebuild_from_persisted(
            &decoded.current_branch,
            decoded.current_commit.as_deref(),
        );

        let entry_count = decoded.entries.len();
        let db = Self {
            path: path.clone(),
            entries: decoded.entries,
            commits: decoded.commits,
            branches,
            tags: decoded.tags,
            current_commit: decoded.current_commit,
            config,
            clock: Box::new(SystemClock),
            sink: Box::new(NoopEventSink),
        };
        db.sink.record(&Event::Loaded { path, entry_count });
        Ok(db)
    }

    /// Release all owned memory. `Database` has no other resources to
    /// reclaim (no file handles are held between operations), so this is
    /// equivalent to dropping the handle; it exists to give embedders an
    /// explicit, documented end-of-lifecycle call.
    pub fn shutdown(self) {
        drop(self);
    }
}
