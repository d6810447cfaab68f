//! Text normalization and word-bounded term matching.
//!
//! All keyword and gate checks run against normalized text: lowercase, ASCII
//! letters and digits only, hyphens and underscores treated as spaces,
//! whitespace collapsed. Matching is whole-word, with an optional trailing
//! `*` wildcard on terms (`"welcom*"` matches "welcome", "welcomed",
//! "welcoming").

use serde::{Deserialize, Serialize};

/// Normalize raw chat text for matching.
///
/// Lowercases, replaces every character outside `[a-z0-9]` with a space
/// (hyphen and underscore included), collapses whitespace runs, and trims.
/// Idempotent: normalizing twice equals normalizing once.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// A normalized haystack pre-padded with one leading and one trailing space,
/// so every word in it is space-bounded on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Haystack(String);

impl Haystack {
    /// Normalize `raw` and wrap it in boundary spaces.
    pub fn new(raw: &str) -> Self {
        Self(format!(" {} ", normalize(raw)))
    }

    /// The padded text, including the boundary spaces.
    pub fn padded(&self) -> &str {
        &self.0
    }

    /// True if the haystack holds no words at all.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whole-word term match with optional trailing-`*` wildcard.
    ///
    /// A literal term matches when it appears space-bounded in the haystack.
    /// A term ending in `*` matches when some word starts with the normalized
    /// stem and the rest of that word is lowercase letters only. Empty or
    /// whitespace-only terms (including a bare `"*"`) never match.
    pub fn has_term(&self, term: &str) -> bool {
        let raw = term.trim();
        if raw.is_empty() {
            return false;
        }

        if let Some(stem_raw) = raw.strip_suffix('*') {
            let stem = normalize(stem_raw);
            if stem.is_empty() {
                return false;
            }
            return self.wildcard_match(&stem);
        }

        let needle = normalize(raw);
        if needle.is_empty() {
            return false;
        }
        self.0.contains(&format!(" {needle} "))
    }

    /// True if any listed term matches.
    pub fn has_any_term<S: AsRef<str>>(&self, terms: &[S]) -> bool {
        terms.iter().any(|t| self.has_term(t.as_ref()))
    }

    fn wildcard_match(&self, stem: &str) -> bool {
        // The stem may span several words ("good morn*"); scan space-bounded
        // occurrences and require the remainder of the final word to be
        // lowercase letters.
        let pattern = format!(" {stem}");
        let mut from = 0;
        while let Some(pos) = self.0[from..].find(&pattern) {
            let after = from + pos + pattern.len();
            let rest = &self.0[after..];
            let word_end = rest.find(' ').unwrap_or(rest.len());
            if rest[..word_end].chars().all(|c| c.is_ascii_lowercase()) {
                return true;
            }
            from += pos + 1;
        }
        false
    }
}
