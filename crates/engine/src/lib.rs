//! Bug Hunter progress engine -- turns solved challenges into XP, levels,
//! streaks, and achievements.
//!
//! The pure pieces (level lookup, XP award, streak arithmetic, achievement
//! rules) are free functions. The operations that read and write progress
//! go through an [`Engine`] holding an injected [`ProgressStore`].

pub mod achievements;
pub mod completion;
mod error;
pub mod format;
pub mod level;
pub mod progress;
pub mod stats;
pub mod streak;
pub mod xp;

use std::time::Duration;

use bughunter_storage::ProgressStore;
use serde::{Deserialize, Serialize};

pub use achievements::{default_catalog, AchievementKind, EarnedAchievement, ProgressSummary};
pub use completion::{Completion, CompletionOutcome};
pub use error::EngineError;
pub use level::{level_from_xp, xp_to_next_level, LevelProgress};
pub use stats::UserStats;
pub use xp::compute_xp;

/// Tunables for the store-driving operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Solves strictly faster than this earn the time bonus.
    pub time_bonus_seconds: u64,
    /// Times a progress write is recomputed after a version conflict.
    pub max_conflict_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_bonus_seconds: 120,
            max_conflict_retries: 3,
        }
    }
}

impl EngineConfig {
    pub fn time_bonus_threshold(&self) -> Duration {
        Duration::from_secs(self.time_bonus_seconds)
    }
}

/// The progress engine, bound to one store handle.
#[derive(Debug, Clone)]
pub struct Engine<S: ProgressStore> {
    store: S,
    config: EngineConfig,
}

impl<S: ProgressStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
