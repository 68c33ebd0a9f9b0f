use std::collections::HashMap;

use crate::error::{BlueCrabError, ErrorOrigin, Result};

pub const DEFAULT_BRANCH: &str = "main";

///
/// BranchRegistry
///
/// Named mutable pointers into the commit log. Exactly one branch is
/// "current" at any time. A branch never silently forgets its tip —
/// switching away and back restores the commit it pointed at.
///
#[derive(Clone, Debug, PartialEq)]
pub struct BranchRegistry {
    /// Branch name -> tip commit id (`None` until the branch's first commit).
    tips: HashMap<String, Option<String>>,
    current: String,
}

impl Default for BranchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut tips = HashMap::new();
        tips.insert(DEFAULT_BRANCH.to_string(), None);
        Self {
            tips,
            current: DEFAULT_BRANCH.to_string(),
        }
    }

    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    #[must_use]
    pub fn tip_of(&self, name: &str) -> Option<Option<&str>> {
        self.tips.get(name).map(|tip| tip.as_deref())
    }

    #[must_use]
    pub fn current_tip(&self) -> Option<&str> {
        self.tip_of(&self.current).flatten()
    }

    /// Switch the current branch pointer to `name`, creating it lazily if
    /// absent. A freshly created branch initially points at `starting_tip`
    /// (the database's current commit, or `None` if there isn't one yet).
    pub fn switch_to(&mut self, name: &str, starting_tip: Option<&str>) -> Result<()> {
        if name.is_empty() {
            return Err(BlueCrabError::invalid_arg(
                ErrorOrigin::Branch,
                "branch name must not be empty",
            ));
        }
        self.tips
            .entry(name.to_string())
            .or_insert_with(|| starting_tip.map(str::to_string));
        self.current = name.to_string();
        Ok(())
    }

    /// Advance the named branch's tip to `commit_id` (used after a commit).
    pub fn advance(&mut self, name: &str, commit_id: &str) {
        self.tips
            .insert(name.to_string(), Some(commit_id.to_string()));
    }

    /// Rebuild a branch table from what the on-disk footer actually
    /// persists: the current branch name and its tip commit. The wire
    /// layout (spec.md §4.7) carries no per-commit branch field, so other
    /// branches' tips do not survive a save/load round trip — only the
    /// branch that was current at save time, and `main`, are known after
    /// load (see DESIGN.md).
    #[must_use]
    pub fn rebuild_from_persisted(current_branch: &str, current_tip: Option<&str>) -> Self {
        let mut tips: HashMap<String, Option<String>> = HashMap::new();
        tips.insert(DEFAULT_BRANCH.to_string(), None);
        tips.insert(current_branch.to_string(), current_tip.map(str::to_string));
        Self {
            tips,
            current: current_branch.to_string(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tips.keys().map(String::as_str)
    }
}

///
/// TagRegistry
///
/// A name mapping to a commit_id; tag names are unique across the database.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagRegistry {
    tags: HashMap<String, String>,
}

impl TagRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { tags: HashMap::new() }
    }

    /// Bind `tag_name` to `commit_id`; re-binding an existing name replaces it.
    pub fn tag(&mut self, commit_id: &str, tag_name: &str) -> Result<()> {
        if tag_name.is_empty() {
            return Err(BlueCrabError::invalid_arg(
                ErrorOrigin::Tag,
                "tag name must not be empty",
            ));
        }
        self.tags.insert(tag_name.to_string(), commit_id.to_string());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, tag_name: &str) -> Option<&str> {
        self.tags.get(tag_name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn insert_raw(&mut self, tag_name: String, commit_id: String) {
        self.tags.insert(tag_name, commit_id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
