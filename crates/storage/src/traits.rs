use std::collections::BTreeSet;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::record::{Achievement, CourseType, ProgressRecord, UserAchievement};

/// The storage trait for Bug Hunter progress backends.
///
/// A `ProgressStore` owns the lifecycle of progress records, the achievement
/// catalog, and the user/achievement join records. The engine only computes;
/// every read and write it performs goes through this trait.
///
/// ## OCC Conflict Detection
///
/// `upsert_progress` is a conditional write keyed on
/// `(user_id, course_type)`:
///
/// - `expected_version = None` inserts. If a record already exists the call
///   returns `Err(StoreError::ConcurrentConflict { expected_version: None, .. })`.
/// - `expected_version = Some(v)` updates only if the stored version is `v`
///   (`UPDATE ... WHERE version = v`). Otherwise, or if the record vanished,
///   it returns `Err(StoreError::ConcurrentConflict { .. })`.
///
/// A rejected write leaves the store unchanged.
///
/// ## Achievement Uniqueness
///
/// `award_achievement` enforces at most one row per
/// `(user_id, achievement_id)`. A second award returns
/// `Err(StoreError::DuplicateAchievement)` and changes nothing.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so a single handle can be
/// shared across async tasks.
#[async_trait]
pub trait ProgressStore: Send + Sync + 'static {
    // ── Progress records ─────────────────────────────────────────────────────

    /// Read the progress record for a (user, course) pair.
    ///
    /// Absence is `Ok(None)`: it means the user has never completed a
    /// challenge in that course.
    async fn get_progress(
        &self,
        user_id: &str,
        course_type: CourseType,
    ) -> Result<Option<ProgressRecord>, StoreError>;

    /// Insert or version-checked update of a progress record.
    ///
    /// The `version` field of `record` is ignored; the store assigns it.
    /// Returns the record as stored, carrying its new version.
    async fn upsert_progress(
        &self,
        record: ProgressRecord,
        expected_version: Option<i64>,
    ) -> Result<ProgressRecord, StoreError>;

    /// List every progress record for a user, ordered by course.
    async fn list_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StoreError>;

    // ── Achievements ─────────────────────────────────────────────────────────

    /// The full achievement catalog, in catalog order.
    async fn list_achievement_catalog(&self) -> Result<Vec<Achievement>, StoreError>;

    /// Ids of the achievements a user has already earned.
    async fn list_earned_achievement_ids(
        &self,
        user_id: &str,
    ) -> Result<BTreeSet<String>, StoreError>;

    /// Every achievement a user has earned, oldest first.
    async fn list_user_achievements(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserAchievement>, StoreError>;

    /// Record that `user_id` earned `achievement_id` at `earned_at`.
    ///
    /// Returns `Err(StoreError::DuplicateAchievement)` if already earned and
    /// `Err(StoreError::UnknownAchievement)` if the id is not in the catalog.
    async fn award_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
        earned_at: OffsetDateTime,
    ) -> Result<UserAchievement, StoreError>;
}
