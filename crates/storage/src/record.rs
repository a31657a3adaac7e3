use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The three courses a challenge can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    Html,
    Css,
    Javascript,
}

impl CourseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseType::Html => "html",
            CourseType::Css => "css",
            CourseType::Javascript => "javascript",
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the known courses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown course type '{0}' (expected html, css, or javascript)")]
pub struct UnknownCourseType(pub String);

impl FromStr for CourseType {
    type Err = UnknownCourseType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(CourseType::Html),
            "css" => Ok(CourseType::Css),
            "javascript" => Ok(CourseType::Javascript),
            other => Err(UnknownCourseType(other.to_string())),
        }
    }
}

/// Per-user, per-course aggregate of completions, XP, level, and streak.
///
/// `current_level` is always derived from `total_xp` by the engine; the
/// store persists it as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub course_type: CourseType,
    pub challenges_completed: u32,
    pub total_xp: u64,
    pub current_level: u8,
    pub streak_days: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity: OffsetDateTime,
    /// Optimistic concurrency version. 0 after insert, bumped by the store on
    /// every successful update.
    #[serde(default)]
    pub version: i64,
}

/// A static catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    /// Unique display name. Selects the unlock rule.
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub xp_reward: u32,
    /// Free-form requirement metadata. Not interpreted.
    #[serde(default)]
    pub requirements: serde_json::Value,
}

/// An achievement earned by a user. At most one per (user_id, achievement_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAchievement {
    pub user_id: String,
    pub achievement_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub earned_at: OffsetDateTime,
}
