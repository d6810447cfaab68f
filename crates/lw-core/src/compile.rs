//! Compiler from authoring drafts to canonical rules.
//!
//! Compilation never fails: malformed values fall back to defaults and
//! anything worth telling the author about lands in the diagnostics list.
//! The pass flattens entity-attached lore into the global rule list, expands
//! `char.<entity>` keyword tokens, merges gate synonyms into canonical
//! [`GateSet`]s, and classifies each rule's activation kind once.

use crate::authoring::{LooseNumber, LoreBook, RelationshipDraft, RuleDraft, TermList};
use crate::entity::{Entity, EntityBook};
use crate::relationship::RelationshipTrigger;
use crate::rule::{ActivationKind, GateSet, Rule, clamp_priority, normalize_signal};

/// A lore book in canonical form, ready for per-turn evaluation.
#[derive(Debug, Clone)]
pub struct CompiledBook {
    /// All rules: authored rules first, then entity-attached lore in sorted
    /// entity order.
    pub rules: Vec<Rule>,
    /// The entity table.
    pub entities: EntityBook,
    /// Relationship pair triggers.
    pub relationships: Vec<RelationshipTrigger>,
    /// Non-fatal compile notes (dropped tokens, skipped triggers).
    pub diagnostics: Vec<String>,
}

/// Compile an authored book into its canonical form.
pub fn compile(book: LoreBook) -> CompiledBook {
    let mut entities = EntityBook::new();
    let mut entity_lore = Vec::new();
    for (name, draft) in book.entities {
        entities.insert(
            Entity::new(name.as_str(), draft.gender).with_aliases(draft.aliases.0.clone()),
        );
        entity_lore.extend(draft.lore);
    }

    let mut compiler = Compiler {
        entities,
        diagnostics: Vec::new(),
    };

    let mut rules = Vec::new();
    for (index, draft) in book.rules.into_iter().chain(entity_lore).enumerate() {
        rules.push(compiler.compile_rule(draft, &format!("rule {index}")));
    }

    let mut relationships = Vec::new();
    for (index, draft) in book.relationships.into_iter().enumerate() {
        if let Some(trigger) = compiler.compile_relationship(draft, index) {
            relationships.push(trigger);
        }
    }

    CompiledBook {
        rules,
        entities: compiler.entities,
        relationships,
        diagnostics: compiler.diagnostics,
    }
}

struct Compiler {
    entities: EntityBook,
    diagnostics: Vec<String>,
}

impl Compiler {
    fn compile_rule(&mut self, draft: RuleDraft, at: &str) -> Rule {
        let keywords = self.expand_keywords(&draft.keywords, at);
        let tag = draft.tag.clone().filter(|t| !t.is_empty());

        // Classification mirrors the runtime candidacy checks: a draft that
        // carries an (even unparsable) message bound is not always-on, and a
        // keyword list that expanded away entirely no longer counts.
        let always_on = keywords.is_empty()
            && draft.previous_keywords.is_empty()
            && tag.is_none()
            && draft.min_messages.is_none()
            && draft.max_messages.is_none();
        let activation = if always_on {
            ActivationKind::AlwaysOn
        } else if !keywords.is_empty() || !draft.previous_keywords.is_empty() {
            ActivationKind::Keyword
        } else if tag.is_some() {
            ActivationKind::TagOnly
        } else {
            ActivationKind::Dormant
        };
        if activation == ActivationKind::Dormant {
            self.diagnostics
                .push(format!("{at}: only message bounds, no keywords or tag; can never fire"));
        }

        let word_gate = GateSet {
            any: merged(&[&draft.require_any, &draft.and_any, &draft.requires.any]),
            all: merged(&[&draft.require_all, &draft.and_all, &draft.requires.all]),
            none: merged(&[
                &draft.require_none,
                &draft.not_any,
                &draft.block,
                &draft.block_capitalized,
                &draft.requires.none,
            ]),
            not_all: merged(&[&draft.not_all]),
        };
        let previous_word_gate = GateSet {
            any: merged(&[&draft.prev_require_any, &draft.prev_and_any, &draft.prev_requires.any]),
            all: merged(&[&draft.prev_require_all, &draft.prev_and_all, &draft.prev_requires.all]),
            none: merged(&[
                &draft.prev_require_none,
                &draft.prev_not_any,
                &draft.prev_block,
                &draft.prev_requires.none,
            ]),
            not_all: merged(&[&draft.prev_not_all]),
        };
        let tag_gate = GateSet {
            any: merged(&[&draft.and_any_tags]),
            all: merged(&[&draft.and_all_tags]),
            none: merged(&[&draft.not_any_tags]),
            not_all: merged(&[&draft.not_all_tags]),
        };
        let signal_gate = GateSet {
            any: merged_signals(&[
                &draft.require_signals,
                &draft.require_any_signals,
                &draft.and_any_signals,
                &draft.require_emotion,
                &draft.require_eros,
                &draft.require_intent,
            ]),
            all: merged_signals(&[&draft.require_all_signals, &draft.and_all_signals]),
            none: merged_signals(&[
                &draft.block_signals,
                &draft.not_any_signals,
                &draft.block_emotion,
                &draft.block_eros,
                &draft.block_intent,
            ]),
            not_all: merged_signals(&[&draft.block_all_signals, &draft.not_all_signals]),
        };

        let shifts = draft
            .shifts
            .into_iter()
            .enumerate()
            .map(|(i, shift)| self.compile_rule(shift, &format!("{at} shift {i}")))
            .collect();

        Rule {
            tag,
            keywords,
            previous_keywords: draft.previous_keywords.0,
            min_messages: draft.min_messages.as_ref().and_then(LooseNumber::as_count),
            max_messages: draft.max_messages.as_ref().and_then(LooseNumber::as_count),
            name_block: draft.name_block.0,
            word_gate,
            previous_word_gate,
            tag_gate,
            signal_gate,
            probability: parse_probability(draft.probability.as_ref()),
            personality: draft.personality.filter(|s| !s.is_empty()),
            scenario: draft.scenario.filter(|s| !s.is_empty()),
            triggers: draft.triggers.0,
            group: draft.group.filter(|g| !g.is_empty()),
            priority: clamp_priority(draft.priority.as_ref().and_then(LooseNumber::as_f64)),
            shifts,
            activation,
        }
    }

    /// Expand `char.<entity>` tokens to the entity's name plus aliases,
    /// de-duplicating while preserving first-seen order.
    fn expand_keywords(&mut self, keywords: &TermList, at: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let push = |term: String, out: &mut Vec<String>| {
            if !out.contains(&term) {
                out.push(term);
            }
        };

        for keyword in &keywords.0 {
            match entity_token(keyword) {
                Some(name) => {
                    if let Some(entity) = self.entities.get(&name) {
                        for form in entity.surface_forms() {
                            push(form.to_string(), &mut out);
                        }
                    } else {
                        self.diagnostics
                            .push(format!("{at}: unknown entity in keyword \"{keyword}\"; token dropped"));
                    }
                }
                None => push(keyword.clone(), &mut out),
            }
        }
        out
    }

    fn compile_relationship(
        &mut self,
        draft: RelationshipDraft,
        index: usize,
    ) -> Option<RelationshipTrigger> {
        let pair = draft.pair.0;
        if pair.len() != 2 {
            self.diagnostics.push(format!(
                "relationship {index}: pair must list exactly two names, got {}",
                pair.len()
            ));
            return None;
        }
        let mut names = pair.into_iter().map(|n| n.to_lowercase());
        Some(RelationshipTrigger {
            pair: [names.next().unwrap_or_default(), names.next().unwrap_or_default()],
            require_tags: draft.require_tags.0,
            injection: draft.injection,
            group: draft.group.filter(|g| !g.is_empty()),
        })
    }
}

fn merged(lists: &[&TermList]) -> Vec<String> {
    lists.iter().flat_map(|l| l.0.iter().cloned()).collect()
}

fn merged_signals(lists: &[&TermList]) -> Vec<String> {
    lists
        .iter()
        .flat_map(|l| l.0.iter())
        .map(|s| normalize_signal(s))
        .collect()
}

/// Parse an authored keyword of the form `char.<name>` into the entity name.
fn entity_token(keyword: &str) -> Option<String> {
    let rest = keyword.trim();
    let rest = rest
        .get(..5)
        .filter(|p| p.eq_ignore_ascii_case("char."))
        .map(|_| &rest[5..])?;
    let name = rest.to_lowercase();
    (!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        .then_some(name)
}

/// Parse an authored probability: a number in `0..=1`, or a percentage
/// string like `"40%"`. Anything unparsable falls back to 1.0.
fn parse_probability(raw: Option<&LooseNumber>) -> f64 {
    let Some(value) = raw else { return 1.0 };
    match value {
        LooseNumber::Int(i) => (*i as f64).clamp(0.0, 1.0),
        LooseNumber::Float(f) if f.is_finite() => f.clamp(0.0, 1.0),
        LooseNumber::Float(_) => 1.0,
        LooseNumber::Text(s) => {
            let s = s.trim().to_lowercase();
            let percent = s.contains('%');
            match s.replace('%', "").trim().parse::<f64>() {
                Ok(n) if n.is_finite() => {
                    if percent {
                        (n / 100.0).clamp(0.0, 1.0)
                    } else {
                        n.clamp(0.0, 1.0)
                    }
                }
                _ => 1.0,
            }
        }
    }
}
