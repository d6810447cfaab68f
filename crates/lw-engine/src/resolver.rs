//! Active-entity resolution with pronoun memory.
//!
//! The resolver scans the turn history oldest to newest, remembering the
//! last entity mentioned per grammatical gender, then treats current-turn
//! mentions as the active set. Pronouns in the current turn resolve against
//! the memory and add their referents. Resolution only ever adds names.

use lw_core::entity::{Entity, EntityBook, Gender, pronoun_gender};
use lw_core::text::Haystack;

#[derive(Debug, Default)]
struct GenderMemory {
    masculine: Option<String>,
    feminine: Option<String>,
    last: Option<String>,
}

impl GenderMemory {
    fn note(&mut self, entity: &Entity) {
        match entity.gender {
            Gender::Masculine => self.masculine = Some(entity.name.clone()),
            Gender::Feminine => self.feminine = Some(entity.name.clone()),
            Gender::Neutral => {}
        }
        self.last = Some(entity.name.clone());
    }

    fn recall(&self, gender: Gender) -> Option<&String> {
        match gender {
            Gender::Masculine => self.masculine.as_ref().or(self.last.as_ref()),
            Gender::Feminine => self.feminine.as_ref().or(self.last.as_ref()),
            Gender::Neutral => self.last.as_ref(),
        }
    }
}

/// True when any surface form of the entity appears word-bounded in the turn.
fn mentioned(haystack: &Haystack, entity: &Entity) -> bool {
    entity.surface_forms().any(|form| haystack.has_term(form))
}

fn push_unique(active: &mut Vec<String>, name: &str) {
    if !active.iter().any(|a| a == name) {
        active.push(name.to_string());
    }
}

/// Resolve the entities active in the current turn.
///
/// `turns` is the full history, oldest first, last element current. Returned
/// names are canonical lower-case, in mention-then-resolution order.
pub fn resolve_active(entities: &EntityBook, turns: &[String]) -> Vec<String> {
    if entities.is_empty() || turns.is_empty() {
        return Vec::new();
    }

    let mut memory = GenderMemory::default();
    let (current_raw, history) = turns.split_last().map(|(c, h)| (c.as_str(), h)).unwrap_or(("", &[]));

    for turn in history {
        let haystack = Haystack::new(turn);
        for entity in entities.iter() {
            if mentioned(&haystack, entity) {
                memory.note(entity);
            }
        }
    }

    let current = Haystack::new(current_raw);
    let mut active = Vec::new();
    for entity in entities.iter() {
        if mentioned(&current, entity) {
            push_unique(&mut active, &entity.name);
            memory.note(entity);
        }
    }

    for word in current.padded().split_whitespace() {
        if let Some(gender) = pronoun_gender(word) {
            if let Some(name) = memory.recall(gender) {
                push_unique(&mut active, name);
            }
        }
    }

    active
}
