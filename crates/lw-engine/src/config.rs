//! Engine configuration.

use lw_core::window::{DEFAULT_DEPTH, clamp_depth};

/// Default cap on rules selected per turn.
pub const DEFAULT_APPLY_LIMIT: usize = 6;

/// Configuration for a lore engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum rules selected by the priority pass per turn (at least 1).
    pub apply_limit: usize,
    /// Number of recent turns joined for keyword matching (clamped 1-20).
    pub window_depth: usize,
    /// RNG seed for reproducible probability gates.
    pub seed: u64,
    /// Collect verbose trace lines in turn reports.
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            apply_limit: DEFAULT_APPLY_LIMIT,
            window_depth: DEFAULT_DEPTH,
            seed: 42,
            debug: false,
        }
    }
}

impl EngineConfig {
    /// Set the per-turn selection cap (raised to at least 1).
    pub fn with_apply_limit(mut self, limit: usize) -> Self {
        self.apply_limit = limit.max(1);
        self
    }

    /// Set the window depth (clamped to 1-20).
    pub fn with_window_depth(mut self, depth: usize) -> Self {
        self.window_depth = clamp_depth(depth);
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable trace collection.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
