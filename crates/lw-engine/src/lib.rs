//! Per-turn lore selection for Loreweaver.
//!
//! The engine takes a [`CompiledBook`](lw_core::CompiledBook) and, for each
//! turn of chat, selects a bounded set of rules and appends their text
//! fragments to two host-owned buffers. Construct an [`Engine`] once, then
//! feed it a [`TurnInput`] per turn:
//!
//! ```
//! use lw_core::LoreBook;
//! use lw_engine::{Engine, EngineConfig, OutputBuffers, TurnInput};
//!
//! let book = LoreBook::from_json(r#"{ "rules": [
//!     { "keywords": ["hello"], "personality": "Hi back!" }
//! ] }"#).unwrap();
//! let mut engine = Engine::new(book.compile(), EngineConfig::default());
//! let mut out = OutputBuffers::new();
//! engine.run_turn(&TurnInput::from_message("hello there"), &mut out);
//! assert_eq!(out.personality, "\n\nHi back!");
//! ```

/// Engine configuration.
pub mod config;
/// Engine error types.
pub mod error;
/// Per-rule gate evaluation.
pub mod gate;
/// Output buffers and the per-turn report.
pub mod output;
/// The per-turn selection pipeline.
pub mod pipeline;
/// Active-entity resolution with pronoun memory.
pub mod resolver;
/// External boolean signals and the classifier boundary.
pub mod signals;
/// Host-supplied input for one turn.
pub mod turn;

/// Re-export the configuration type.
pub use config::{DEFAULT_APPLY_LIMIT, EngineConfig};
/// Re-export the signal error type.
pub use error::SignalError;
/// Re-export the gate evaluator.
pub use gate::{GateContext, entry_passes};
/// Re-export the output types.
pub use output::{OutputBuffers, TurnReport};
/// Re-export the engine.
pub use pipeline::Engine;
/// Re-export the entity resolver.
pub use resolver::resolve_active;
/// Re-export the signal types.
pub use signals::{SignalProvider, SignalSet, classify_guarded};
/// Re-export the turn input type.
pub use turn::TurnInput;
