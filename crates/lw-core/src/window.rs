//! Bounded sliding window over recent chat turns.
//!
//! The window joins the last `depth` turns into one normalized haystack for
//! keyword matching, and keeps the most recent and second-most-recent turns
//! as separate haystacks for current- and previous-turn scoped gates.

use crate::text::Haystack;

/// Default number of recent turns scanned together.
pub const DEFAULT_DEPTH: usize = 5;

/// Smallest allowed window depth.
pub const MIN_DEPTH: usize = 1;

/// Largest allowed window depth.
pub const MAX_DEPTH: usize = 20;

/// Clamp a requested depth into the supported range.
pub fn clamp_depth(depth: usize) -> usize {
    depth.clamp(MIN_DEPTH, MAX_DEPTH)
}

/// A per-turn, read-only snapshot of recent chat text.
#[derive(Debug, Clone)]
pub struct ChatWindow {
    depth: usize,
    message_count: u64,
    joined: Haystack,
    current: Haystack,
    previous: Haystack,
    current_raw: String,
}

impl ChatWindow {
    /// Build a window from ordered turn history, oldest first, where the last
    /// element is the current turn. The last `depth` turns are joined with
    /// single spaces before normalization. The message count defaults to the
    /// number of turns supplied; hosts that track their own count can
    /// override it with [`with_message_count`](Self::with_message_count).
    pub fn from_turns<S: AsRef<str>>(turns: &[S], depth: usize) -> Self {
        let depth = clamp_depth(depth);
        let start = turns.len().saturating_sub(depth);
        let joined_raw = turns[start..]
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        let current_raw = turns.last().map(|t| t.as_ref().to_string()).unwrap_or_default();
        let previous_raw = if turns.len() > 1 {
            turns[turns.len() - 2].as_ref()
        } else {
            ""
        };

        Self {
            depth,
            message_count: turns.len() as u64,
            joined: Haystack::new(&joined_raw),
            current: Haystack::new(&current_raw),
            previous: Haystack::new(previous_raw),
            current_raw,
        }
    }

    /// Degraded fallback when no turn history is available: the single last
    /// message stands in for the whole window and the previous turn is empty.
    pub fn from_message(message: &str, message_count: u64) -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            message_count,
            joined: Haystack::new(message),
            current: Haystack::new(message),
            previous: Haystack::new(""),
            current_raw: message.to_string(),
        }
    }

    /// Override the message count with a host-supplied value.
    #[must_use]
    pub fn with_message_count(mut self, count: u64) -> Self {
        self.message_count = count;
        self
    }

    /// The configured (clamped) depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The turn count visible to message-count gates.
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Joined haystack over the last `depth` turns.
    pub fn joined(&self) -> &Haystack {
        &self.joined
    }

    /// Haystack over the current turn only.
    pub fn current(&self) -> &Haystack {
        &self.current
    }

    /// Haystack over the second-most-recent turn only.
    pub fn previous(&self) -> &Haystack {
        &self.previous
    }

    /// The raw (unnormalized) current turn text.
    pub fn current_raw(&self) -> &str {
        &self.current_raw
    }
}
