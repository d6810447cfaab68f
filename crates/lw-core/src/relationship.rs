//! Relationship triggers between entity pairs.
//!
//! A trigger injects an extra text block when both named entities are active
//! in the current turn and every required tag fired this turn. Triggers share
//! the mutual-exclusion group namespace with rules.

use serde::Serialize;

/// One authored pair trigger, compiled form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipTrigger {
    /// The unordered entity-name pair, lower-cased.
    pub pair: [String; 2],
    /// Tags that must ALL be present in this turn's fired-tag set. An empty
    /// list never injects.
    pub require_tags: Vec<String>,
    /// Text appended to the personality buffer when the trigger fires.
    pub injection: String,
    /// Optional mutual-exclusion group, shared with rule groups.
    pub group: Option<String>,
}

impl RelationshipTrigger {
    /// True when both members of the pair are in the active set.
    pub fn pair_active<S: AsRef<str>>(&self, active: &[S]) -> bool {
        self.pair
            .iter()
            .all(|name| active.iter().any(|a| a.as_ref() == name))
    }
}
