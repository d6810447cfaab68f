//! Host-supplied input for one turn.

use lw_core::ChatWindow;

use crate::signals::SignalSet;

/// Everything the host hands the engine for a single turn.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    turns: Vec<String>,
    message_count: Option<u64>,
    character_name: Option<String>,
    signals: SignalSet,
}

impl TurnInput {
    /// Build from ordered turn history, oldest first; the last element is
    /// the current turn.
    pub fn from_turns<S: Into<String>>(turns: impl IntoIterator<Item = S>) -> Self {
        Self {
            turns: turns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Build from the current message alone, with no history.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::from_turns([message.into()])
    }

    /// Override the message count with a host-tracked value.
    #[must_use]
    pub fn with_message_count(mut self, count: u64) -> Self {
        self.message_count = Some(count);
        self
    }

    /// Name the active character, enabling name-block gates.
    #[must_use]
    pub fn with_character_name(mut self, name: impl Into<String>) -> Self {
        self.character_name = Some(name.into());
        self
    }

    /// Attach externally classified signals.
    #[must_use]
    pub fn with_signals(mut self, signals: SignalSet) -> Self {
        self.signals = signals;
        self
    }

    /// The turn history, oldest first.
    pub fn turns(&self) -> &[String] {
        &self.turns
    }

    /// The active character name, if any.
    pub fn character_name(&self) -> Option<&str> {
        self.character_name.as_deref()
    }

    /// The active signal set.
    pub fn signals(&self) -> &SignalSet {
        &self.signals
    }

    /// Materialize the chat window at the given depth.
    pub fn window(&self, depth: usize) -> ChatWindow {
        let window = ChatWindow::from_turns(&self.turns, depth);
        match self.message_count {
            Some(count) => window.with_message_count(count),
            None => window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_counts_turns_by_default() {
        let input = TurnInput::from_turns(["one", "two", "three"]);
        assert_eq!(input.window(5).message_count(), 3);
    }

    #[test]
    fn message_count_override_wins() {
        let input = TurnInput::from_message("hi").with_message_count(40);
        assert_eq!(input.window(5).message_count(), 40);
    }

    #[test]
    fn builders_compose() {
        let input = TurnInput::from_message("hello")
            .with_character_name("Jamie")
            .with_signals(["anger"].into_iter().collect());
        assert_eq!(input.character_name(), Some("Jamie"));
        assert!(input.signals().contains("anger"));
        assert_eq!(input.turns(), ["hello".to_string()]);
    }
}
