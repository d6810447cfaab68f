//! The per-turn selection pipeline.
//!
//! Phase order is semantic and fixed: direct pass, trigger pass, capped
//! priority selection, apply with shift expansion, post-shift pass,
//! relationship injection. All selection state lives in a [`TurnState`]
//! built fresh for every turn.

use std::collections::BTreeSet;

use lw_core::rule::{MAX_PRIORITY, MIN_PRIORITY};
use lw_core::{ChatWindow, CompiledBook, Rule};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::EngineConfig;
use crate::gate::{GateContext, entry_passes};
use crate::output::{OutputBuffers, TurnReport};
use crate::resolver::resolve_active;
use crate::turn::TurnInput;

const BUCKETS: usize = (MAX_PRIORITY - MIN_PRIORITY + 1) as usize;

/// Selection state for one turn, discarded afterwards.
#[derive(Debug)]
struct TurnState {
    /// Per-rule activation flags, indexed like the compiled rule list.
    picked: Vec<bool>,
    /// Rule indices bucketed by priority, `buckets[0]` = priority 1.
    buckets: [Vec<usize>; BUCKETS],
    /// Tags fired by the direct and trigger passes.
    fired: BTreeSet<String>,
    /// Tags fired by shifts, kept apart from the main set.
    post_shift: BTreeSet<String>,
    /// Mutual-exclusion groups consumed this turn.
    used_groups: BTreeSet<String>,
    trace: Vec<String>,
    debug: bool,
}

impl TurnState {
    fn new(rule_count: usize, debug: bool) -> Self {
        Self {
            picked: vec![false; rule_count],
            buckets: Default::default(),
            fired: BTreeSet::new(),
            post_shift: BTreeSet::new(),
            used_groups: BTreeSet::new(),
            trace: Vec::new(),
            debug,
        }
    }

    fn pick(&mut self, index: usize, rule: &Rule) {
        self.picked[index] = true;
        self.buckets[usize::from(rule.priority - MIN_PRIORITY)].push(index);
        self.fired.extend(rule.triggers.iter().cloned());
    }

    fn note(&mut self, line: impl FnOnce() -> String) {
        if self.debug {
            self.trace.push(line());
        }
    }
}

/// True when the rule textually hits this turn: always-on, a keyword in the
/// joined window, or a previous-turn keyword in the previous turn.
fn textual_hit(rule: &Rule, window: &ChatWindow) -> bool {
    rule.is_always_on()
        || window.joined().has_any_term(&rule.keywords)
        || window.previous().has_any_term(&rule.previous_keywords)
}

fn apply_fragments(rule: &Rule, out: &mut OutputBuffers) {
    if let Some(personality) = &rule.personality {
        out.push_personality(personality);
    }
    if let Some(scenario) = &rule.scenario {
        out.push_scenario(scenario);
    }
}

/// A compiled book plus configuration, ready to run turns.
#[derive(Debug)]
pub struct Engine {
    book: CompiledBook,
    config: EngineConfig,
    rng: StdRng,
}

impl Engine {
    /// Build an engine; the RNG is seeded once from the config.
    pub fn new(book: CompiledBook, config: EngineConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { book, config, rng }
    }

    /// The compiled book this engine evaluates.
    pub fn book(&self) -> &CompiledBook {
        &self.book
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one turn: evaluate every phase and append the winning fragments
    /// to `out`.
    pub fn run_turn(&mut self, input: &TurnInput, out: &mut OutputBuffers) -> TurnReport {
        let book = &self.book;
        let config = &self.config;
        let rng = &mut self.rng;

        let window = input.window(config.window_depth);
        let ctx = GateContext {
            window: &window,
            character_name: input.character_name(),
            signals: input.signals(),
        };
        let mut state = TurnState::new(book.rules.len(), config.debug);

        // Phase 1: direct pass. Rules cannot see tags fired this turn.
        let no_tags = BTreeSet::new();
        for (index, rule) in book.rules.iter().enumerate() {
            if !textual_hit(rule, &window) {
                continue;
            }
            if !entry_passes(rule, &ctx, &no_tags, rng) {
                continue;
            }
            state.pick(index, rule);
            state.note(|| format!("direct: rule {index} activated"));
        }

        // Phase 2: trigger pass, one sweep in authoring order. Cascades only
        // reach rules later in iteration order.
        for (index, rule) in book.rules.iter().enumerate() {
            if state.picked[index] {
                continue;
            }
            let Some(tag) = &rule.tag else { continue };
            if !state.fired.contains(tag) {
                continue;
            }
            if !entry_passes(rule, &ctx, &state.fired, rng) {
                continue;
            }
            state.pick(index, rule);
            state.note(|| format!("trigger: rule {index} activated via tag \"{tag}\""));
        }

        // Phase 3: capped priority selection, highest bucket first. A group
        // skip does not count against the cap.
        let buckets = std::mem::take(&mut state.buckets);
        let mut selected: Vec<usize> = Vec::new();
        'buckets: for bucket in buckets.iter().rev() {
            for &index in bucket {
                let rule = &book.rules[index];
                if let Some(group) = &rule.group {
                    if state.used_groups.contains(group) {
                        state.note(|| format!("select: rule {index} skipped, group \"{group}\" used"));
                        continue;
                    }
                    state.used_groups.insert(group.clone());
                }
                selected.push(index);
                if selected.len() == config.apply_limit {
                    state.note(|| format!("select: apply limit {} reached", config.apply_limit));
                    break 'buckets;
                }
            }
        }

        // Phase 4: apply fragments and expand shifts. Shifts are uncapped,
        // unbucketed, and gate against the main fired-tag set; their
        // triggers land in the separate post-shift set.
        for &index in &selected {
            let rule = &book.rules[index];
            apply_fragments(rule, out);
            for shift in &rule.shifts {
                if !textual_hit(shift, &window) {
                    continue;
                }
                if !entry_passes(shift, &ctx, &state.fired, rng) {
                    continue;
                }
                apply_fragments(shift, out);
                state.post_shift.extend(shift.triggers.iter().cloned());
                state.note(|| format!("shift: under rule {index}, fired"));
            }
        }

        // Phase 5: post-shift pass over the union of both tag sets. Winners
        // emit directly, bypassing the cap and groups.
        let mut union: BTreeSet<String> = state.fired.union(&state.post_shift).cloned().collect();
        for (index, rule) in book.rules.iter().enumerate() {
            if state.picked[index] {
                continue;
            }
            let Some(tag) = &rule.tag else { continue };
            if !union.contains(tag) {
                continue;
            }
            if !entry_passes(rule, &ctx, &union, rng) {
                continue;
            }
            state.picked[index] = true;
            apply_fragments(rule, out);
            union.extend(rule.triggers.iter().cloned());
            state.note(|| format!("post-shift: rule {index} activated via tag \"{tag}\""));
        }

        // Phase 6: relationship injection against the union set, sharing the
        // used-group namespace with rules.
        let active = resolve_active(&book.entities, input.turns());
        if active.len() >= 2 {
            for (index, trigger) in book.relationships.iter().enumerate() {
                if trigger.require_tags.is_empty() {
                    continue;
                }
                if !trigger.pair_active(&active) {
                    continue;
                }
                if !trigger.require_tags.iter().all(|t| union.contains(t)) {
                    continue;
                }
                if let Some(group) = &trigger.group {
                    if state.used_groups.contains(group) {
                        state.note(|| {
                            format!("relationship: trigger {index} skipped, group \"{group}\" used")
                        });
                        continue;
                    }
                    state.used_groups.insert(group.clone());
                }
                out.push_personality(&trigger.injection);
                state.note(|| format!("relationship: trigger {index} injected"));
            }
        }

        TurnReport {
            selected: selected.len(),
            fired_tags: union.into_iter().collect(),
            active_entities: active,
            trace: state.trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lw_core::LoreBook;

    fn engine(json: &str) -> Engine {
        let book = LoreBook::from_json(json).unwrap().compile();
        Engine::new(book, EngineConfig::default())
    }

    fn run(engine: &mut Engine, message: &str) -> (OutputBuffers, TurnReport) {
        let mut out = OutputBuffers::new();
        let report = engine.run_turn(&TurnInput::from_message(message), &mut out);
        (out, report)
    }

    #[test]
    fn direct_pass_cannot_see_same_turn_tags() {
        // The gated rule precedes the tag source in authoring order; the
        // trigger pass still reaches it because tag candidacy is re-checked
        // after the direct pass finishes.
        let mut engine = engine(
            r#"{
                "rules": [
                    { "tag": "echo", "personality": "echo body" },
                    { "keywords": ["ping"], "triggers": ["echo"], "scenario": "ping seen" }
                ]
            }"#,
        );
        let (out, report) = run(&mut engine, "ping");
        assert_eq!(out.scenario, "\n\nping seen");
        assert_eq!(out.personality, "\n\necho body");
        assert_eq!(report.selected, 2);
    }

    #[test]
    fn trigger_pass_is_single_sweep() {
        // b fires from a's tag, but c sits before b in authoring order, so
        // b's own trigger cannot reach back to it in the same sweep. c still
        // fires in the post-shift pass over the union set.
        let mut engine = engine(
            r#"{
                "rules": [
                    { "tag": "from_b", "personality": "c body" },
                    { "tag": "from_a", "triggers": ["from_b"], "personality": "b body" },
                    { "keywords": ["go"], "triggers": ["from_a"] }
                ]
            }"#,
        );
        let (out, report) = run(&mut engine, "go");
        assert_eq!(out.personality, "\n\nb body\n\nc body");
        // Only a and b were selected; c emitted via the post-shift pass.
        assert_eq!(report.selected, 2);
    }

    #[test]
    fn priority_orders_output() {
        let mut engine = engine(
            r#"{
                "rules": [
                    { "keywords": ["x"], "priority": 4, "personality": "A" },
                    { "keywords": ["x"], "priority": 5, "personality": "B" }
                ]
            }"#,
        );
        let (out, _) = run(&mut engine, "x");
        assert_eq!(out.personality, "\n\nB\n\nA");
    }

    #[test]
    fn group_admits_first_highest_priority_member() {
        let mut engine = engine(
            r#"{
                "rules": [
                    { "keywords": ["x"], "group": "mood", "priority": 3, "personality": "low" },
                    { "keywords": ["x"], "group": "mood", "priority": 5, "personality": "high" },
                    { "keywords": ["x"], "group": "mood", "priority": 5, "personality": "later" }
                ]
            }"#,
        );
        let (out, report) = run(&mut engine, "x");
        assert_eq!(out.personality, "\n\nhigh");
        assert_eq!(report.selected, 1);
    }

    #[test]
    fn group_skips_do_not_consume_the_cap() {
        let mut engine = Engine::new(
            LoreBook::from_json(
                r#"{
                    "rules": [
                        { "keywords": ["x"], "group": "g", "personality": "g1" },
                        { "keywords": ["x"], "group": "g", "personality": "g2" },
                        { "keywords": ["x"], "personality": "free" }
                    ]
                }"#,
            )
            .unwrap()
            .compile(),
            EngineConfig::default().with_apply_limit(2),
        );
        let (out, report) = run(&mut engine, "x");
        assert_eq!(out.personality, "\n\ng1\n\nfree");
        assert_eq!(report.selected, 2);
    }

    #[test]
    fn cap_stops_selection() {
        let rules: Vec<String> = (0..10)
            .map(|i| format!(r#"{{ "keywords": ["x"], "personality": "p{i}" }}"#))
            .collect();
        let json = format!(r#"{{ "rules": [{}] }}"#, rules.join(","));
        let mut engine = engine(&json);
        let (out, report) = run(&mut engine, "x");
        assert_eq!(report.selected, 6);
        assert_eq!(out.personality.matches("\n\np").count(), 6);
        assert!(out.personality.contains("p5"));
        assert!(!out.personality.contains("p6"));
    }

    #[test]
    fn always_on_rules_fire_every_turn() {
        let mut engine = engine(r#"{ "rules": [{ "personality": "ever-present" }] }"#);
        for message in ["hello", "completely unrelated", ""] {
            let (out, _) = run(&mut engine, message);
            assert_eq!(out.personality, "\n\never-present");
        }
    }

    #[test]
    fn tag_only_rules_need_a_trigger() {
        let mut engine = engine(
            r#"{
                "rules": [
                    { "tag": "secret", "personality": "revealed" }
                ]
            }"#,
        );
        let (out, report) = run(&mut engine, "anything at all");
        assert!(out.personality.is_empty());
        assert_eq!(report.selected, 0);
    }

    #[test]
    fn shifts_fire_only_under_selected_parents() {
        let mut engine = engine(
            r#"{
                "rules": [
                    {
                        "keywords": ["milk"],
                        "personality": "parent",
                        "Shifts": [{ "keywords": ["latte"], "personality": "child" }]
                    },
                    {
                        "keywords": ["nowhere"],
                        "Shifts": [{ "keywords": ["latte"], "personality": "orphan" }]
                    }
                ]
            }"#,
        );
        let (out, _) = run(&mut engine, "a latte with milk");
        assert_eq!(out.personality, "\n\nparent\n\nchild");
    }

    #[test]
    fn shift_triggers_reach_the_post_shift_pass() {
        let mut engine = engine(
            r#"{
                "rules": [
                    { "tag": "aftermath", "scenario": "dust settles" },
                    {
                        "keywords": ["spark"],
                        "Shifts": [{ "keywords": ["spark"], "triggers": ["aftermath"] }]
                    }
                ]
            }"#,
        );
        let (out, report) = run(&mut engine, "a spark flies");
        assert_eq!(out.scenario, "\n\ndust settles");
        assert!(report.fired_tags.contains(&"aftermath".to_string()));
    }

    #[test]
    fn post_shift_pass_bypasses_cap_and_groups() {
        // The cap is exhausted and group "g" is used, yet the tag-only rule
        // reached through a shift trigger still emits.
        let mut engine = Engine::new(
            LoreBook::from_json(
                r#"{
                    "rules": [
                        {
                            "keywords": ["x"],
                            "group": "g",
                            "personality": "first",
                            "Shifts": [{ "keywords": ["x"], "triggers": ["late"] }]
                        },
                        { "tag": "late", "group": "g", "personality": "late body" }
                    ]
                }"#,
            )
            .unwrap()
            .compile(),
            EngineConfig::default().with_apply_limit(1),
        );
        let (out, report) = run(&mut engine, "x");
        assert_eq!(out.personality, "\n\nfirst\n\nlate body");
        assert_eq!(report.selected, 1);
    }

    #[test]
    fn previous_keywords_scope_to_previous_turn() {
        let mut engine = engine(
            r#"{ "rules": [{ "prev.keywords": ["question"], "personality": "answering" }] }"#,
        );
        let mut out = OutputBuffers::new();
        let input = TurnInput::from_turns(["I have a question", "sure, go ahead"]);
        engine.run_turn(&input, &mut out);
        assert_eq!(out.personality, "\n\nanswering");

        let mut out = OutputBuffers::new();
        let input = TurnInput::from_turns(["all quiet", "I have a question"]);
        engine.run_turn(&input, &mut out);
        assert!(out.personality.is_empty());
    }

    #[test]
    fn relationship_needs_pair_tags_and_group() {
        let json = r#"{
            "rules": [
                { "keywords": ["glance"], "triggers": ["yearning", "history"] }
            ],
            "entities": {
                "marcus": { "gender": "M" },
                "elara": { "gender": "F" }
            },
            "relationships": [
                { "pair": ["marcus", "elara"], "requireTags": ["yearning", "history"], "injection": "Old wounds." },
                { "pair": ["marcus", "elara"], "requireTags": ["absent_tag"], "injection": "Never." },
                { "pair": ["marcus", "elara"], "requireTags": [], "injection": "Empty never fires." }
            ]
        }"#;
        let mut engine = engine(json);
        let (out, report) = run(&mut engine, "Marcus and Elara share a glance.");
        assert_eq!(out.personality, "\n\nOld wounds.");
        assert_eq!(report.active_entities.len(), 2);

        // One active entity is not enough.
        let (out, _) = run(&mut engine, "Marcus glance alone");
        assert!(out.personality.is_empty());
    }

    #[test]
    fn relationship_respects_used_groups() {
        let json = r#"{
            "rules": [
                { "keywords": ["glance"], "triggers": ["t"], "group": "bond", "personality": "rule wins" }
            ],
            "entities": {
                "marcus": { "gender": "M" },
                "elara": { "gender": "F" }
            },
            "relationships": [
                { "pair": ["marcus", "elara"], "requireTags": ["t"], "injection": "blocked", "group": "bond" }
            ]
        }"#;
        let mut engine = engine(json);
        let (out, _) = run(&mut engine, "Marcus and Elara share a glance.");
        assert_eq!(out.personality, "\n\nrule wins");
    }

    #[test]
    fn probability_zero_and_one_over_many_turns() {
        let mut engine = engine(
            r#"{
                "rules": [
                    { "keywords": ["x"], "probability": 1.0, "personality": "sure" },
                    { "keywords": ["x"], "probability": 0.0, "personality": "never" }
                ]
            }"#,
        );
        for _ in 0..1000 {
            let (out, _) = run(&mut engine, "x");
            assert_eq!(out.personality, "\n\nsure");
        }
    }

    #[test]
    fn name_block_suppresses_rule() {
        let mut engine = engine(
            r#"{ "rules": [{ "keywords": ["hi"], "nameBlock": ["jamie"], "personality": "hi back" }] }"#,
        );
        let mut out = OutputBuffers::new();
        let input = TurnInput::from_message("hi").with_character_name("Jamie");
        engine.run_turn(&input, &mut out);
        assert!(out.personality.is_empty());

        let mut out = OutputBuffers::new();
        let input = TurnInput::from_message("hi").with_character_name("Alex");
        engine.run_turn(&input, &mut out);
        assert_eq!(out.personality, "\n\nhi back");
    }

    #[test]
    fn greeting_rule_emits_verbatim_fragment() {
        let mut engine = engine(
            r#"{ "rules": [{ "keywords": ["hello", "hi"], "personality": " Hi back!" }] }"#,
        );
        let mut out = OutputBuffers::new();
        let input = TurnInput::from_message("hello there").with_message_count(5);
        engine.run_turn(&input, &mut out);
        assert_eq!(out.personality, "\n\n Hi back!");
    }

    #[test]
    fn unlocked_higher_priority_rule_emits_first() {
        // The tag-gated rule outranks the keyword rule that unlocked it, so
        // its fragment comes first in the output.
        let mut engine = engine(
            r#"{
                "rules": [
                    { "keywords": ["welcome"], "triggers": ["g"], "priority": 4, "personality": "A" },
                    { "tag": "g", "priority": 5, "personality": "B" }
                ]
            }"#,
        );
        let (out, _) = run(&mut engine, "welcome friend");
        assert_eq!(out.personality, "\n\nB\n\nA");
    }

    #[test]
    fn relationship_requires_every_tag_from_separate_rules() {
        let json = r#"{
            "rules": [
                { "keywords": ["storm"], "triggers": ["t1"] },
                { "keywords": ["harbor"], "triggers": ["t2"] }
            ],
            "entities": {
                "a": { "gender": "N" },
                "b": { "gender": "N" }
            },
            "relationships": [
                { "pair": ["a", "b"], "requireTags": ["t1", "t2"], "injection": "Bound by the wreck." }
            ]
        }"#;
        let mut engine = engine(json);
        let (out, _) = run(&mut engine, "a and b brave the storm near the harbor");
        assert_eq!(out.personality, "\n\nBound by the wreck.");

        // Only t1 fires: no injection.
        let (out, _) = run(&mut engine, "a and b brave the storm");
        assert!(out.personality.is_empty());
    }

    #[test]
    fn trace_lines_only_in_debug() {
        let book = LoreBook::from_json(r#"{ "rules": [{ "keywords": ["x"], "personality": "p" }] }"#)
            .unwrap();
        let mut silent = Engine::new(book.clone().compile(), EngineConfig::default());
        let (_, report) = run(&mut silent, "x");
        assert!(report.trace.is_empty());

        let mut chatty = Engine::new(book.compile(), EngineConfig::default().with_debug(true));
        let (_, report) = run(&mut chatty, "x");
        assert!(!report.trace.is_empty());
    }
}
