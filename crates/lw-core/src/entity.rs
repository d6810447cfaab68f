//! Character entities, grammatical gender, and the pronoun table.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Grammatical class used for pronoun resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Resolves "he", "him", "his".
    #[serde(rename = "M", alias = "m")]
    Masculine,
    /// Resolves "she", "her", "hers".
    #[serde(rename = "F", alias = "f")]
    Feminine,
    /// Resolves "it" and "they"; also the fallback class.
    #[default]
    #[serde(rename = "N", alias = "n")]
    Neutral,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Masculine => write!(f, "M"),
            Self::Feminine => write!(f, "F"),
            Self::Neutral => write!(f, "N"),
        }
    }
}

/// Map a (normalized) word to the gender it refers to, if it is a pronoun.
pub fn pronoun_gender(word: &str) -> Option<Gender> {
    match word {
        "he" | "him" | "his" => Some(Gender::Masculine),
        "she" | "her" | "hers" => Some(Gender::Feminine),
        "it" | "they" => Some(Gender::Neutral),
        _ => None,
    }
}

/// A known story character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// Canonical lower-case name; the lookup key.
    pub name: String,
    /// Grammatical class for pronoun resolution.
    pub gender: Gender,
    /// Alternate surface forms (nicknames, titles).
    pub aliases: Vec<String>,
}

impl Entity {
    /// Create an entity with no aliases.
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into().to_lowercase(),
            gender,
            aliases: Vec::new(),
        }
    }

    /// Attach alias surface forms.
    #[must_use]
    pub fn with_aliases<S: Into<String>>(mut self, aliases: impl IntoIterator<Item = S>) -> Self {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// The name followed by every alias, in authoring order.
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// The compiled entity table, keyed by lower-case name.
///
/// Iteration order is the sorted name order, so downstream passes (lore
/// flattening, entity scans) are deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityBook {
    entities: BTreeMap<String, Entity>,
}

impl EntityBook {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, replacing any previous one with the same name.
    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.name.clone(), entity);
    }

    /// Look up an entity by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(&name.to_lowercase())
    }

    /// Iterate entities in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of known entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when no entities are defined.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
