//! Per-rule gate evaluation.
//!
//! [`entry_passes`] runs every gate a rule carries, in a fixed short-circuit
//! order: message bounds, name block, current-turn words, previous-turn
//! words, tags, signals, probability. Textual candidacy (keyword hits) is
//! checked by the pipeline before calling in here.

use std::collections::BTreeSet;

use lw_core::text::normalize;
use lw_core::{ChatWindow, Rule};
use rand::Rng;
use rand::rngs::StdRng;

use crate::signals::SignalSet;

/// Read-only per-turn facts shared by every gate evaluation.
#[derive(Debug, Clone, Copy)]
pub struct GateContext<'a> {
    /// The materialized chat window.
    pub window: &'a ChatWindow,
    /// The active character's name, if the host supplied one.
    pub character_name: Option<&'a str>,
    /// Active external signals.
    pub signals: &'a SignalSet,
}

/// Evaluate every gate on `rule` against the turn context.
///
/// `tags` is the fired-tag view the current phase exposes; the direct pass
/// hands an empty set. The probability gate draws from `rng` only when the
/// rule's probability is below 1.0.
pub fn entry_passes(
    rule: &Rule,
    ctx: &GateContext<'_>,
    tags: &BTreeSet<String>,
    rng: &mut StdRng,
) -> bool {
    let count = ctx.window.message_count();
    if rule.min_messages.is_some_and(|min| count < min) {
        return false;
    }
    if rule.max_messages.is_some_and(|max| count > max) {
        return false;
    }

    if name_blocked(rule, ctx.character_name) {
        return false;
    }

    if !rule.word_gate.passes(|t| ctx.window.joined().has_term(t)) {
        return false;
    }
    if !rule.previous_word_gate.passes(|t| ctx.window.previous().has_term(t)) {
        return false;
    }
    if !rule.tag_gate.passes(|t| tags.contains(t)) {
        return false;
    }
    if !rule.signal_gate.passes(|s| ctx.signals.contains(s)) {
        return false;
    }

    // Probability 1.0 never draws, probability 0.0 never passes.
    if rule.probability < 1.0 && rng.random::<f64>() >= rule.probability {
        return false;
    }
    true
}

/// True when the active character's normalized name trips the rule's name
/// block: the names are equal, the active name contains the blocked name, or
/// the blocked name extends the active name with further words.
fn name_blocked(rule: &Rule, character_name: Option<&str>) -> bool {
    let Some(name) = character_name else {
        return false;
    };
    if rule.name_block.is_empty() {
        return false;
    }
    let active = normalize(name);
    if active.is_empty() {
        return false;
    }
    rule.name_block.iter().any(|blocked| {
        let blocked = normalize(blocked);
        !blocked.is_empty()
            && (active == blocked
                || active.contains(&blocked)
                || blocked.starts_with(&format!("{active} ")))
    })
}
