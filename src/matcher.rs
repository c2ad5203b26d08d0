//! Wildcard whitelist matching.
//!
//! Patterns are fixed-length templates: each position is a literal
//! character or `*`, which matches exactly one character. There is no
//! variable-length wildcard; this is a deliberate, known limitation and
//! not a regex engine.

/// The single-character wildcard marker.
pub const WILDCARD: char = '*';

/// One fixed-length allow-list template.
///
/// Positions are `char`s, so pattern length is the character count, not
/// the byte count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistPattern {
    chars: Vec<char>,
}

impl WhitelistPattern {
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            chars: pattern.as_ref().chars().collect(),
        }
    }

    /// True if `line` has the same length and every position is equal or
    /// wildcarded. Case-sensitive, no backtracking.
    pub fn matches(&self, line: &str) -> bool {
        if line.chars().count() != self.chars.len() {
            return false;
        }

        line.chars()
            .zip(&self.chars)
            .all(|(c, &p)| p == WILDCARD || c == p)
    }
}

/// Fixed allow-list of patterns, supplied once at construction.
///
/// A line is allowed if at least one pattern matches. An empty allow-list
/// allows nothing.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    patterns: Vec<WhitelistPattern>,
}

impl Whitelist {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns.into_iter().map(WhitelistPattern::new).collect(),
        }
    }

    pub fn is_allowed(&self, line: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(line))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
