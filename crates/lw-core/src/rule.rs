//! Canonical rule records and gate value objects.
//!
//! Authoring drafts accept several synonymous spellings for each gate; the
//! compiler merges them all into the single canonical form defined here, so
//! the engine only ever sees one shape.

use std::fmt;

use serde::Serialize;

/// Lowest rule priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest rule priority.
pub const MAX_PRIORITY: u8 = 5;
/// Priority assigned when authoring omits or mangles the field.
pub const DEFAULT_PRIORITY: u8 = 3;

/// Clamp a raw priority value into `1..=5`, defaulting to 3 when absent.
pub fn clamp_priority(raw: Option<f64>) -> u8 {
    match raw {
        Some(p) if p.is_finite() => (p as i64).clamp(i64::from(MIN_PRIORITY), i64::from(MAX_PRIORITY)) as u8,
        _ => DEFAULT_PRIORITY,
    }
}

/// Normalize a signal name: lowercase and strip one leading `namespace.`
/// segment, so `"Eros.Tension"` and `"tension"` refer to the same flag.
pub fn normalize_signal(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.split_once('.') {
        Some((_, rest)) => rest.to_string(),
        None => lower,
    }
}

/// One `any`/`all`/`none`/`not_all` gate over a membership predicate.
///
/// The same value object covers word gates (membership = term present in a
/// haystack), tag gates (membership = tag fired this turn), and signal gates
/// (membership = external flag active).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GateSet {
    /// Pass only if at least one listed item is present (when non-empty).
    pub any: Vec<String>,
    /// Pass only if every listed item is present (when non-empty).
    pub all: Vec<String>,
    /// Fail if any listed item is present.
    pub none: Vec<String>,
    /// Fail only if *every* listed item is present (when non-empty).
    /// Distinct from `none`: partial overlap still passes.
    pub not_all: Vec<String>,
}

impl GateSet {
    /// True when no list constrains anything.
    pub fn is_empty(&self) -> bool {
        self.any.is_empty() && self.all.is_empty() && self.none.is_empty() && self.not_all.is_empty()
    }

    /// Evaluate the four checks against a membership predicate,
    /// short-circuiting on the first failure.
    pub fn passes<F>(&self, mut present: F) -> bool
    where
        F: FnMut(&str) -> bool,
    {
        if !self.any.is_empty() && !self.any.iter().any(|t| present(t)) {
            return false;
        }
        if !self.all.is_empty() && !self.all.iter().all(|t| present(t)) {
            return false;
        }
        if self.none.iter().any(|t| present(t)) {
            return false;
        }
        if !self.not_all.is_empty() && self.not_all.iter().all(|t| present(t)) {
            return false;
        }
        true
    }
}

/// How a rule can first activate, computed once at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    /// No keywords, no tag, no message bounds: a textual hit on every turn.
    AlwaysOn,
    /// Has current- or previous-turn keywords; hits when one matches.
    Keyword,
    /// No keywords but carries a tag; can only fire once the tag is emitted
    /// by another rule this turn.
    TagOnly,
    /// Carries only message bounds: it can never textually hit and has no
    /// tag, so no phase will ever activate it.
    Dormant,
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlwaysOn => write!(f, "always-on"),
            Self::Keyword => write!(f, "keyword"),
            Self::TagOnly => write!(f, "tag-only"),
            Self::Dormant => write!(f, "dormant"),
        }
    }
}

/// One compiled lore rule. Immutable after compile.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    /// Label for cross-rule tag gating; never matched against chat text.
    pub tag: Option<String>,
    /// Terms (with optional trailing-`*` wildcard) matched against the
    /// joined window.
    pub keywords: Vec<String>,
    /// Terms matched against the second-most-recent turn only.
    pub previous_keywords: Vec<String>,
    /// Inclusive lower bound on the turn count.
    pub min_messages: Option<u64>,
    /// Inclusive upper bound on the turn count.
    pub max_messages: Option<u64>,
    /// Active-character names that suppress this rule.
    pub name_block: Vec<String>,
    /// Word gate over the joined window.
    pub word_gate: GateSet,
    /// Word gate over the previous turn.
    pub previous_word_gate: GateSet,
    /// Gate over tags fired earlier this turn.
    pub tag_gate: GateSet,
    /// Gate over external boolean signals.
    pub signal_gate: GateSet,
    /// Pass probability in `0.0..=1.0`; 1.0 means the step always passes.
    pub probability: f64,
    /// Fragment appended to the personality buffer on selection.
    pub personality: Option<String>,
    /// Fragment appended to the scenario buffer on selection.
    pub scenario: Option<String>,
    /// Tags emitted into the fired-tag set on activation.
    pub triggers: Vec<String>,
    /// Mutual-exclusion group; at most one member wins per turn.
    pub group: Option<String>,
    /// Selection priority, `1..=5`, higher first.
    pub priority: u8,
    /// Child rules evaluated only when this rule is selected.
    pub shifts: Vec<Rule>,
    /// Activation classification, computed at compile time.
    pub activation: ActivationKind,
}

impl Rule {
    /// True when this rule is a textual hit on every turn.
    pub fn is_always_on(&self) -> bool {
        self.activation == ActivationKind::AlwaysOn
    }
}
