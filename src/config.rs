///
/// DatabaseConfig
///
/// Caller-tunable limits. Defaults match the spec's "bounded only by
/// available memory" stance; an embedder may tighten these to a documented
/// cap. Oversize inputs are rejected with `InvalidArg`, never truncated.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub max_key_len: usize,
    pub max_value_bytes: usize,
    pub max_metadata_bytes: usize,
    /// `None` means unbounded.
    pub max_commits: Option<usize>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_key_len: usize::MAX,
            max_value_bytes: usize::MAX,
            max_metadata_bytes: usize::MAX,
            max_commits: None,
        }
    }
}
