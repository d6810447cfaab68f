//! Authoring drafts: the lenient serde surface for lore book JSON.
//!
//! The authoring format keeps the field vocabulary lore writers already use,
//! including every synonymous spelling (`requireAny`/`andAny`/`requires.any`
//! and friends) and scalar-or-list leniency. Synonyms are kept as separate
//! draft fields so that a rule using two spellings at once merges them
//! instead of erroring; the [compiler](crate::compile) folds everything into
//! the canonical [`Rule`](crate::rule::Rule) form.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::compile::{self, CompiledBook};
use crate::entity::Gender;
use crate::error::LoreResult;

/// A term/tag/signal list that accepts a bare string, an array of strings,
/// or `null` (treated as empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "TermListDraft")]
pub struct TermList(pub Vec<String>);

impl TermList {
    /// True when no terms were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the terms.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<TermListDraft> for TermList {
    fn from(draft: TermListDraft) -> Self {
        match draft {
            TermListDraft::Many(v) => Self(v),
            TermListDraft::One(s) => Self(vec![s]),
            TermListDraft::Null(()) => Self(Vec::new()),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for TermList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Wire shapes accepted for a [`TermList`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TermListDraft {
    /// A JSON array of terms.
    Many(Vec<String>),
    /// A single bare term.
    One(String),
    /// JSON `null`.
    Null(()),
}

/// A number that may arrive as an integer, a float, or a numeric string.
/// Unparsable values fall back to the field's default at compile time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    /// A JSON integer.
    Int(i64),
    /// A JSON float.
    Float(f64),
    /// A string, possibly numeric, possibly a percentage like `"40%"`.
    Text(String),
}

impl LooseNumber {
    /// The value as a finite float, if parsable.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    /// The value as a non-negative message count, if parsable.
    pub fn as_count(&self) -> Option<u64> {
        self.as_f64().map(|v| v.max(0.0) as u64)
    }
}

/// The nested `requires: { any, all, none }` gate bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequiresDraft {
    /// Terms of which at least one must be present.
    pub any: TermList,
    /// Terms which must all be present.
    pub all: TermList,
    /// Terms of which none may be present.
    pub none: TermList,
}

/// One authored rule (or shift), exactly as written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleDraft {
    /// Internal label; never matched against chat text.
    pub tag: Option<String>,
    /// Keywords matched against the joined window; `char.<entity>` tokens
    /// expand to the entity's name and aliases.
    pub keywords: TermList,
    /// Keywords matched against the second-most-recent turn only.
    #[serde(rename = "prev.keywords")]
    pub previous_keywords: TermList,
    /// Inclusive lower turn-count bound.
    #[serde(rename = "minMessages")]
    pub min_messages: Option<LooseNumber>,
    /// Inclusive upper turn-count bound.
    #[serde(rename = "maxMessages")]
    pub max_messages: Option<LooseNumber>,
    /// Active-character names that suppress this rule.
    #[serde(rename = "nameBlock")]
    pub name_block: TermList,

    // -- current-turn word gates, all synonym spellings --
    /// `requireAny` spelling of the any-gate.
    #[serde(rename = "requireAny")]
    pub require_any: TermList,
    /// `andAny` spelling of the any-gate.
    #[serde(rename = "andAny")]
    pub and_any: TermList,
    /// `requireAll` spelling of the all-gate.
    #[serde(rename = "requireAll")]
    pub require_all: TermList,
    /// `andAll` spelling of the all-gate.
    #[serde(rename = "andAll")]
    pub and_all: TermList,
    /// `requireNone` spelling of the none-gate.
    #[serde(rename = "requireNone")]
    pub require_none: TermList,
    /// `notAny` spelling of the none-gate.
    #[serde(rename = "notAny")]
    pub not_any: TermList,
    /// `block` spelling of the none-gate.
    pub block: TermList,
    /// Capitalized `Block` spelling of the none-gate.
    #[serde(rename = "Block")]
    pub block_capitalized: TermList,
    /// Reject only if every listed term is present.
    #[serde(rename = "notAll")]
    pub not_all: TermList,
    /// Nested `requires` gate bundle.
    pub requires: RequiresDraft,

    // -- previous-turn word gates --
    /// Previous-turn `requireAny`.
    #[serde(rename = "prev.requireAny")]
    pub prev_require_any: TermList,
    /// Previous-turn `andAny`.
    #[serde(rename = "prev.andAny")]
    pub prev_and_any: TermList,
    /// Previous-turn `requireAll`.
    #[serde(rename = "prev.requireAll")]
    pub prev_require_all: TermList,
    /// Previous-turn `andAll`.
    #[serde(rename = "prev.andAll")]
    pub prev_and_all: TermList,
    /// Previous-turn `requireNone`.
    #[serde(rename = "prev.requireNone")]
    pub prev_require_none: TermList,
    /// Previous-turn `notAny`.
    #[serde(rename = "prev.notAny")]
    pub prev_not_any: TermList,
    /// Previous-turn `block`.
    #[serde(rename = "prev.block")]
    pub prev_block: TermList,
    /// Previous-turn `notAll`.
    #[serde(rename = "prev.notAll")]
    pub prev_not_all: TermList,
    /// Previous-turn nested `requires` bundle.
    #[serde(rename = "prev.requires")]
    pub prev_requires: RequiresDraft,

    // -- tag gates --
    /// Pass if any listed tag fired this turn.
    #[serde(rename = "andAnyTags")]
    pub and_any_tags: TermList,
    /// Pass only if all listed tags fired this turn.
    #[serde(rename = "andAllTags")]
    pub and_all_tags: TermList,
    /// Fail if any listed tag fired this turn.
    #[serde(rename = "notAnyTags")]
    pub not_any_tags: TermList,
    /// Fail only if every listed tag fired this turn.
    #[serde(rename = "notAllTags")]
    pub not_all_tags: TermList,

    // -- external signal gates (unified across the legacy emotion/eros/
    //    intent spellings) --
    /// `requireSignals` spelling of the signal any-gate.
    #[serde(rename = "requireSignals")]
    pub require_signals: TermList,
    /// `requireAnySignals` spelling of the signal any-gate.
    #[serde(rename = "requireAnySignals")]
    pub require_any_signals: TermList,
    /// `andAnySignals` spelling of the signal any-gate.
    #[serde(rename = "andAnySignals")]
    pub and_any_signals: TermList,
    /// Legacy `requireEmotion` spelling.
    #[serde(rename = "requireEmotion")]
    pub require_emotion: TermList,
    /// Legacy `requireEros` spelling.
    #[serde(rename = "requireEros")]
    pub require_eros: TermList,
    /// Legacy `requireIntent` spelling.
    #[serde(rename = "requireIntent")]
    pub require_intent: TermList,
    /// `requireAllSignals` spelling of the signal all-gate.
    #[serde(rename = "requireAllSignals")]
    pub require_all_signals: TermList,
    /// `andAllSignals` spelling of the signal all-gate.
    #[serde(rename = "andAllSignals")]
    pub and_all_signals: TermList,
    /// `blockSignals` spelling of the signal none-gate.
    #[serde(rename = "blockSignals")]
    pub block_signals: TermList,
    /// `notAnySignals` spelling of the signal none-gate.
    #[serde(rename = "notAnySignals")]
    pub not_any_signals: TermList,
    /// Legacy `blockEmotion` spelling.
    #[serde(rename = "blockEmotion")]
    pub block_emotion: TermList,
    /// Legacy `blockEros` spelling.
    #[serde(rename = "blockEros")]
    pub block_eros: TermList,
    /// Legacy `blockIntent` spelling.
    #[serde(rename = "blockIntent")]
    pub block_intent: TermList,
    /// `blockAllSignals` spelling of the signal not-all-gate.
    #[serde(rename = "blockAllSignals")]
    pub block_all_signals: TermList,
    /// `notAllSignals` spelling of the signal not-all-gate.
    #[serde(rename = "notAllSignals")]
    pub not_all_signals: TermList,

    // -- effects and selection --
    /// Pass probability: a number in `0..=1` (values above 1 clamp to 1) or
    /// a percentage string like `"40%"`.
    pub probability: Option<LooseNumber>,
    /// Selection priority, clamped to `1..=5` at compile time.
    pub priority: Option<LooseNumber>,
    /// Fragment for the personality buffer.
    pub personality: Option<String>,
    /// Fragment for the scenario buffer.
    pub scenario: Option<String>,
    /// Tags emitted when this rule activates.
    pub triggers: TermList,
    /// Mutual-exclusion group name.
    pub group: Option<String>,
    /// Child rules evaluated only when this rule is selected.
    #[serde(rename = "Shifts", alias = "shifts")]
    pub shifts: Vec<RuleDraft>,
}

/// One authored entity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EntityDraft {
    /// Grammatical class (`"M"`, `"F"`, `"N"`); defaults to neutral.
    pub gender: Gender,
    /// Alternate surface forms.
    pub aliases: TermList,
    /// Lore rules attached to this entity, merged into the global rule list
    /// at compile time.
    pub lore: Vec<RuleDraft>,
}

/// One authored relationship trigger.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelationshipDraft {
    /// The entity-name pair; must list exactly two names.
    pub pair: TermList,
    /// Tags that must all fire this turn.
    #[serde(rename = "requireTags")]
    pub require_tags: TermList,
    /// Text injected into the personality buffer.
    pub injection: String,
    /// Optional mutual-exclusion group.
    pub group: Option<String>,
}

/// A complete authored lore book.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoreBook {
    /// The authored rule list, in authoring order.
    pub rules: Vec<RuleDraft>,
    /// Known entities, keyed by name.
    pub entities: BTreeMap<String, EntityDraft>,
    /// Authored relationship triggers.
    pub relationships: Vec<RelationshipDraft>,
}

impl LoreBook {
    /// Deserialize a book from JSON text.
    pub fn from_json(json: &str) -> LoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compile the book into its canonical form.
    pub fn compile(self) -> CompiledBook {
        compile::compile(self)
    }
}
