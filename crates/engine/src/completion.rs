use std::time::Duration;

use bughunter_storage::{CourseType, ProgressRecord, ProgressStore};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::achievements::EarnedAchievement;
use crate::error::EngineError;
use crate::xp::{compute_xp, qualifies_for_time_bonus};
use crate::Engine;

/// A challenge the caller has judged solved.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub user_id: String,
    pub course_type: CourseType,
    pub base_xp: u32,
    /// Solve time. `None` never earns the time bonus.
    pub time_taken: Option<Duration>,
    pub hints_used: u32,
    pub streak_multiplier: f64,
}

/// What one completion produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub xp_earned: u64,
    pub time_bonus: bool,
    pub progress: ProgressRecord,
    pub new_achievements: Vec<EarnedAchievement>,
}

impl<S: ProgressStore> Engine<S> {
    /// Score a solved challenge, record it, and evaluate achievements.
    ///
    /// The progress write happens once; if it fails nothing is awarded. Once
    /// it has landed the call succeeds: a failure while evaluating
    /// achievements is logged and leaves `new_achievements` empty, since the
    /// caller must not record the same solve again.
    pub async fn record_completion_at(
        &self,
        completion: &Completion,
        now: OffsetDateTime,
    ) -> Result<CompletionOutcome, EngineError> {
        if !completion.streak_multiplier.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "streak multiplier must be finite, got {}",
                completion.streak_multiplier
            )));
        }
        let time_bonus = completion
            .time_taken
            .is_some_and(|t| qualifies_for_time_bonus(t, self.config.time_bonus_threshold()));
        let xp_earned = compute_xp(
            completion.base_xp,
            time_bonus,
            completion.hints_used,
            completion.streak_multiplier,
        );
        let xp = i64::try_from(xp_earned).map_err(|_| {
            EngineError::InvalidInput(format!("xp award {xp_earned} out of range"))
        })?;

        let progress = self
            .update_progress_at(&completion.user_id, completion.course_type, xp, true, now)
            .await?;
        let new_achievements = match self
            .check_and_award_achievements_at(&completion.user_id, now)
            .await
        {
            Ok(earned) => earned,
            Err(e) => {
                warn!(
                    user_id = %completion.user_id,
                    error = %e,
                    "progress recorded but achievement evaluation failed"
                );
                Vec::new()
            }
        };

        Ok(CompletionOutcome {
            xp_earned,
            time_bonus,
            progress,
            new_achievements,
        })
    }
}
