use crate::record::CourseType;

/// All errors that can be returned by a ProgressStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or failed internally (connection,
    /// serialization, poisoned lock, etc.).
    #[error("progress store unavailable: {0}")]
    Unavailable(String),

    /// Optimistic concurrency control conflict. Another writer changed the
    /// (user_id, course_type) record first, or an insert found an existing
    /// record (`expected_version` is `None`).
    #[error(
        "concurrent conflict on progress {user_id}/{course_type}: expected version {}",
        display_version(.expected_version)
    )]
    ConcurrentConflict {
        user_id: String,
        course_type: CourseType,
        expected_version: Option<i64>,
    },

    /// The user already holds this achievement.
    #[error("achievement {achievement_id} already awarded to {user_id}")]
    DuplicateAchievement {
        user_id: String,
        achievement_id: String,
    },

    /// The achievement id is not in the catalog.
    #[error("unknown achievement: {achievement_id}")]
    UnknownAchievement { achievement_id: String },
}

fn display_version(expected_version: &Option<i64>) -> String {
    match expected_version {
        Some(v) => v.to_string(),
        None => "none (insert)".to_string(),
    }
}
