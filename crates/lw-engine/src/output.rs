//! Output buffers and the per-turn report.

use serde::Serialize;

/// The two host-owned text buffers the engine appends to.
///
/// Buffers are append-only: every fragment is prefixed with a blank line and
/// prior contents are never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputBuffers {
    /// Character-voice fragments.
    pub personality: String,
    /// Scene-state fragments.
    pub scenario: String,
}

impl OutputBuffers {
    /// Create two empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment to the personality buffer.
    pub fn push_personality(&mut self, fragment: &str) {
        self.personality.push_str("\n\n");
        self.personality.push_str(fragment);
    }

    /// Append a fragment to the scenario buffer.
    pub fn push_scenario(&mut self, fragment: &str) {
        self.scenario.push_str("\n\n");
        self.scenario.push_str(fragment);
    }
}

/// What one turn did, for hosts and debugging.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TurnReport {
    /// Rules chosen by the capped priority pass.
    pub selected: usize,
    /// All tags fired this turn, sorted.
    pub fired_tags: Vec<String>,
    /// Entities active in the current turn.
    pub active_entities: Vec<String>,
    /// Trace lines (populated when the engine runs with `debug`).
    pub trace: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_are_separated_by_blank_lines() {
        let mut out = OutputBuffers::new();
        out.push_personality("Warm and wry.");
        out.push_personality("Hates mornings.");
        assert_eq!(out.personality, "\n\nWarm and wry.\n\nHates mornings.");
        assert!(out.scenario.is_empty());
    }

    #[test]
    fn prior_contents_are_preserved() {
        let mut out = OutputBuffers {
            personality: "seed".into(),
            scenario: String::new(),
        };
        out.push_personality("more");
        assert_eq!(out.personality, "seed\n\nmore");
    }
}
