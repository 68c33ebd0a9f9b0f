use crate::error::{BlueCrabError, ErrorOrigin, Result};

///
/// Pattern
///
/// Small glob-like matcher used by `find_keys`/`find_entries`.
///
/// Syntax:
/// - an optional leading `(?i)` enables case-insensitive matching;
/// - a leading `^` anchors to the start of the key and requires an exact
///   match of the remainder against the whole key;
/// - a trailing `$` anchors to the end and requires the remainder to match
///   the key's suffix exactly;
/// - a single `*` acts as a greedy wildcard between a fixed head and tail;
/// - otherwise the pattern matches iff it occurs as a substring.
///
/// Exactly one `*` is supported; additional `*` characters are rejected
/// rather than guessed at. This type holds only index offsets into its own
/// owned copy of the pattern — matching does index arithmetic, no temporary
/// substring allocation beyond the case-fold path.
///
#[derive(Clone, Debug)]
pub struct Pattern {
    core: String,
    case_insensitive: bool,
    anchor_start: bool,
    anchor_end: bool,
    wildcard_at: Option<usize>,
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut rest = raw;
        let case_insensitive = if let Some(stripped) = rest.strip_prefix("(?i)") {
            rest = stripped;
            true
        } else {
            false
        };

        let anchor_start = rest.starts_with('^');
        if anchor_start {
            rest = &rest[1..];
        }
        let anchor_end = rest.ends_with('$');
        if anchor_end {
            rest = &rest[..rest.len() - 1];
        }

        let star_count = rest.matches('*').count();
        if star_count > 1 {
            return Err(BlueCrabError::invalid_arg(
                ErrorOrigin::Pattern,
                format!("pattern has {star_count} '*' wildcards, only one is supported: {raw}"),
            ));
        }

        let wildcard_at = rest.find('*');

        Ok(Self {
            core: rest.to_string(),
            case_insensitive,
            anchor_start,
            anchor_end,
            wildcard_at,
        })
    }

    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        if let Some(star_idx) = self.wildcard_at {
            let head = &self.core[..star_idx];
            let tail = &self.core[star_idx + 1..];
            return self.matches_wildcard(key, head, tail);
        }

        if self.anchor_start {
            self.eq_fold(key, &self.core)
        } else if self.anchor_end {
            self.ends_with_fold(key, &self.core)
        } else {
            self.contains_fold(key, &self.core)
        }
    }

    fn matches_wildcard(&self, key: &str, head: &str, tail: &str) -> bool {
        if key.len() < head.len() + tail.len() {
            return false;
        }
        self.starts_with_fold(key, head) && self.ends_with_fold(key, tail)
    }

    fn fold(&self, s: &str) -> String {
        if self.case_insensitive {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    }

    fn eq_fold(&self, key: &str, pat: &str) -> bool {
        if self.case_insensitive {
            self.fold(key) == self.fold(pat)
        } else {
            key == pat
        }
    }

    fn starts_with_fold(&self, key: &str, pat: &str) -> bool {
        if self.case_insensitive {
            self.fold(key).starts_with(&self.fold(pat))
        } else {
            key.starts_with(pat)
        }
    }

    fn ends_with_fold(&self, key: &str, pat: &str) -> bool {
        if self.case_insensitive {
            self.fold(key).ends_with(&self.fold(pat))
        } else {
            key.ends_with(pat)
        }
    }

    fn contains_fold(&self, key: &str, pat: &str) -> bool {
        if self.case_insensitive {
            self.fold(key).contains(&self.fold(pat))
        } else {
            key.contains(pat)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Pattern;

    #[test]
    fn empty_pattern_matches_every_key() {
        let p = Pattern::parse("").unwrap();
        assert!(p.matches(""));
        assert!(p.matches("anything"));
    }

    #[test]
    fn substring_match() {
        let p = Pattern::parse("ell").unwrap();
        assert!(p.matches("hello"));
        assert!(!p.matches("world"));
    }

    #[test]
    fn leading_caret_requires_exact_match() {
        let p = Pattern::parse("^foo").unwrap();
        assert!(p.matches("foo"));
        assert!(!p.matches("foobar"));
        assert!(!p.matches("barfoo"));
    }

    #[test]
    fn trailing_dollar_is_suffix_match() {
        let p = Pattern::parse("bar$").unwrap();
        assert!(p.matches("foobar"));
        assert!(p.matches("bar"));
        assert!(!p.matches("barfoo"));
    }

    #[test]
    fn anchored_both_ends_is_exact_match() {
        let p = Pattern::parse("^foo$").unwrap();
        assert!(p.matches("foo"));
        assert!(!p.matches("foofoo"));
    }

    #[test]
    fn single_wildcard_matches_head_and_tail() {
        let p = Pattern::parse("user_*").unwrap();
        assert!(p.matches("user_1"));
        assert!(p.matches("user_"));
        assert!(!p.matches("admin_1"));

        let p2 = Pattern::parse("a*z").unwrap();
        assert!(p2.matches("az"));
        assert!(p2.matches("abcz"));
        assert!(!p2.matches("a"));
    }

    #[test]
    fn more_than_one_wildcard_is_rejected() {
        let err = Pattern::parse("foo*bar*baz").unwrap_err();
        assert_eq!(err.class, crate::error::ErrorClass::InvalidArg);
    }

    #[test]
    fn case_insensitive_prefix_enables_case_fold() {
        let p = Pattern::parse("(?i)^Foo$").unwrap();
        assert!(p.matches("foo"));
        assert!(p.matches("FOO"));
        assert!(!p.matches("foob"));
    }

    #[test]
    fn case_fold_does_not_panic_on_non_ascii_keys() {
        let p = Pattern::parse("(?i)caf*").unwrap();
        assert!(!p.matches("\u{00e9}clair"));
        let p2 = Pattern::parse("(?i)\u{00e9}*").unwrap();
        assert!(p2.matches("\u{00c9}clair"));
    }

    #[test]
    fn empty_key_against_empty_pattern_matches() {
        let p = Pattern::parse("*").unwrap();
        assert!(p.matches(""));
    }
}
