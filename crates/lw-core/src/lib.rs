//! Core types for Loreweaver: lore rules, entities, and the book compiler.
//!
//! This crate defines the authoring surface (a lenient, synonym-tolerant JSON
//! format) and the canonical compiled form the engine evaluates. You can
//! deserialize a [`LoreBook`] from JSON or build one programmatically, then
//! [`compile`](LoreBook::compile) it once at startup.

/// Authoring drafts: the lenient serde surface for lore book JSON.
pub mod authoring;
/// Compiler from authoring drafts to canonical rules.
pub mod compile;
/// Character entities, grammatical gender, and the pronoun table.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Relationship triggers between entity pairs.
pub mod relationship;
/// Canonical rule records and gate value objects.
pub mod rule;
/// Text normalization and word-bounded term matching.
pub mod text;
/// Bounded sliding window over recent chat turns.
pub mod window;

/// Re-export the authoring book type.
pub use authoring::LoreBook;
/// Re-export the compiled book type.
pub use compile::CompiledBook;
/// Re-export core entity types.
pub use entity::{Entity, EntityBook, Gender};
/// Re-export error types.
pub use error::{LoreError, LoreResult};
/// Re-export the relationship trigger type.
pub use relationship::RelationshipTrigger;
/// Re-export canonical rule types.
pub use rule::{ActivationKind, GateSet, Rule};
/// Re-export the chat window type.
pub use window::ChatWindow;
