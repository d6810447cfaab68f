//! External boolean signals and the classifier boundary.
//!
//! Signals are named flags produced outside the engine, typically by small
//! linear classifiers run over the current message. The engine only ever
//! reads them through [`SignalSet`]; a signal that was never set is false.

use std::collections::BTreeSet;

use lw_core::rule::normalize_signal;

use crate::error::SignalError;

/// A set of active named boolean signals.
///
/// Names are normalized on insert and lookup (lowercased, one leading
/// `namespace.` segment stripped), so `"Eros.Tension"` and `"tension"` are
/// the same flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSet {
    active: BTreeSet<String>,
}

impl SignalSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a signal active.
    pub fn insert(&mut self, name: &str) {
        let name = normalize_signal(name);
        if !name.is_empty() {
            self.active.insert(name);
        }
    }

    /// True when the named signal is active.
    pub fn contains(&self, name: &str) -> bool {
        self.active.contains(&normalize_signal(name))
    }

    /// True when no signal is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Iterate active signal names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for SignalSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

/// An external classifier that maps message text to active signals.
pub trait SignalProvider {
    /// Classify the message, returning the active signal set.
    fn classify(&self, text: &str) -> Result<SignalSet, SignalError>;
}

/// Run a provider behind the failure boundary.
///
/// A provider error degrades to an empty set; the error text is returned so
/// the caller can record it as a trace line. Selection always proceeds.
pub fn classify_guarded(
    provider: &dyn SignalProvider,
    text: &str,
) -> (SignalSet, Option<String>) {
    match provider.classify(text) {
        Ok(set) => (set, None),
        Err(err) => (SignalSet::new(), Some(err.to_string())),
    }
}
