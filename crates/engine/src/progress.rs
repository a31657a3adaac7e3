//! Streak and progress update.
//!
//! `update_progress` reads the (user, course) record, prepares the complete
//! successor record in memory, and writes it once with the version it read.
//! A version conflict means another completion landed in between; nothing
//! was written, so the engine re-reads and recomputes.

use bughunter_storage::{CourseType, ProgressRecord, ProgressStore, StoreError};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::EngineError;
use crate::level::level_from_xp;
use crate::streak::{days_between, next_streak};
use crate::Engine;

/// Build the record that results from one completion.
///
/// `existing` is the stored record for the pair, or `None` on the first
/// completion. The returned record keeps `existing`'s version; the store
/// assigns the new one.
pub fn apply_completion(
    existing: Option<&ProgressRecord>,
    user_id: &str,
    course_type: CourseType,
    xp_earned: u64,
    completed: bool,
    now: OffsetDateTime,
) -> ProgressRecord {
    let completed_delta = u32::from(completed);
    match existing {
        Some(current) => {
            let total_xp = current.total_xp.saturating_add(xp_earned);
            ProgressRecord {
                user_id: current.user_id.clone(),
                course_type: current.course_type,
                challenges_completed: current
                    .challenges_completed
                    .saturating_add(completed_delta),
                total_xp,
                current_level: level_from_xp(total_xp),
                streak_days: next_streak(
                    current.streak_days,
                    days_between(current.last_activity, now),
                ),
                last_activity: now,
                version: current.version,
            }
        }
        None => ProgressRecord {
            user_id: user_id.to_string(),
            course_type,
            challenges_completed: completed_delta,
            total_xp: xp_earned,
            current_level: level_from_xp(xp_earned),
            streak_days: 1,
            last_activity: now,
            version: 0,
        },
    }
}

impl<S: ProgressStore> Engine<S> {
    /// Record a completion at the current time.
    ///
    /// See [`Engine::update_progress_at`].
    pub async fn update_progress(
        &self,
        user_id: &str,
        course_type: CourseType,
        xp_earned: i64,
        completed: bool,
    ) -> Result<ProgressRecord, EngineError> {
        self.update_progress_at(
            user_id,
            course_type,
            xp_earned,
            completed,
            OffsetDateTime::now_utc(),
        )
        .await
    }

    /// Add `xp_earned` to the user's record for `course_type`, advance the
    /// streak, and recompute the level, as of `now`.
    ///
    /// Not idempotent: each call adds XP. Callers invoke it at most once per
    /// solved attempt. Store failures propagate unchanged; a version conflict
    /// is retried up to `max_conflict_retries` times before it is returned.
    pub async fn update_progress_at(
        &self,
        user_id: &str,
        course_type: CourseType,
        xp_earned: i64,
        completed: bool,
        now: OffsetDateTime,
    ) -> Result<ProgressRecord, EngineError> {
        if user_id.is_empty() {
            return Err(EngineError::InvalidInput("user id must not be empty".to_string()));
        }
        let xp_earned = u64::try_from(xp_earned).map_err(|_| {
            EngineError::InvalidInput(format!("xp earned must be non-negative, got {xp_earned}"))
        })?;

        let mut retries = 0;
        loop {
            let existing = self.store.get_progress(user_id, course_type).await?;
            let expected_version = existing.as_ref().map(|r| r.version);
            let next = apply_completion(
                existing.as_ref(),
                user_id,
                course_type,
                xp_earned,
                completed,
                now,
            );

            match self.store.upsert_progress(next, expected_version).await {
                Ok(stored) => {
                    debug!(
                        user_id,
                        course = %course_type,
                        total_xp = stored.total_xp,
                        level = stored.current_level,
                        streak = stored.streak_days,
                        version = stored.version,
                        "progress updated"
                    );
                    return Ok(stored);
                }
                Err(StoreError::ConcurrentConflict { .. })
                    if retries < self.config.max_conflict_retries =>
                {
                    retries += 1;
                    debug!(user_id, course = %course_type, retries, "progress write conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
