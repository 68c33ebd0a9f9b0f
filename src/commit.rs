use crate::{entry::EntryStore, hash};

///
/// Commit
///
/// A snapshot of the entry set at a point in time plus identifying
/// metadata. Commits form a DAG per branch with a single parent each; the
/// snapshot's entries carry their original hashes (it is never re-derived
/// from the live set after the fact).
///
#[derive(Clone, Debug, PartialEq)]
pub struct Commit {
    pub commit_id: String,
    /// Empty for the root commit of a branch's history.
    pub parent_id: String,
    pub branch_name: String,
    pub message: String,
    pub timestamp: u64,
    pub snapshot: EntryStore,
}

/// Derive a commit id: a 16-hex canonical hash of
/// `parent_id ∥ message ∥ timestamp ∥ snapshot hashes`.
///
/// This is deterministic and content-addressed: changing any component of
/// the input changes the id. Ordering among commits is carried by the
/// append-only log and parent links, not by the numeric value of the id
/// itself (see DESIGN.md for the rationale).
#[must_use]
pub fn derive_commit_id(parent_id: &str, message: &str, timestamp: u64, snapshot: &EntryStore) -> String {
    let mut stream = Vec::new();
    stream.extend_from_slice(parent_id.as_bytes());
    stream.extend_from_slice(message.as_bytes());
    stream.extend_from_slice(&timestamp.to_le_bytes());
    for entry in snapshot.iter() {
        stream.extend_from_slice(entry.hash.as_bytes());
    }
    hash::canonical_hash(&stream)
}

///
/// CommitLog
///
/// Append-only history of commits in creation order, shared across all
/// branches of a database.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommitLog {
    commits: Vec<Commit>,
}

impl CommitLog {
    #[must_use]
    pub fn new() -> Self {
        Self { commits: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn push(&mut self, commit: Commit) {
        self.commits.push(commit);
    }

    /// Linear-scan the commit log by id.
    #[must_use]
    pub fn find(&self, commit_id: &str) -> Option<&Commit> {
        self.commits.iter().find(|c| c.commit_id == commit_id)
    }

    /// All commits, in creation order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &Commit> {
        self.commits.iter()
    }

    /// Walk the parent chain starting at `tip_commit_id`, newest first.
    #[must_use]
    pub fn history_from(&self, tip_commit_id: &str) -> Vec<&Commit> {
        let mut out = Vec::new();
        let mut cursor = Some(tip_commit_id.to_string());
        while let Some(id) = cursor {
            let Some(commit) = self.find(&id) else { break };
            out.push(commit);
            cursor = if commit.parent_id.is_empty() {
                None
            } else {
                Some(commit.parent_id.clone())
            };
        }
        out
    }
}
