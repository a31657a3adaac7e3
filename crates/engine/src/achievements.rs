//! Achievement rules and evaluation.
//!
//! Each catalog entry is resolved by name to an [`AchievementKind`] once per
//! evaluation; the unlock rule is a method on the kind, not on the name.
//! The catalog's `requirements` field is never interpreted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bughunter_storage::{
    Achievement, CourseType, ProgressRecord, ProgressStore, StoreError, UserAchievement,
};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::level::{level_from_xp, MAX_LEVEL};
use crate::Engine;

/// Completions needed in one course for its mastery achievement.
pub const COURSE_MASTERY_CHALLENGES: u32 = 10;

/// Total completions needed for Bug Slayer.
pub const BUG_SLAYER_CHALLENGES: u64 = 30;

/// Streak length needed for Streak Master.
pub const STREAK_MASTER_DAYS: u32 = 7;

/// Every achievement the engine knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AchievementKind {
    FirstBugFixed,
    HtmlMaster,
    CssWizard,
    JavascriptJedi,
    LearningLegend,
    BugSlayer,
    StreakMaster,
    /// Needs per-attempt timing; never auto-awarded.
    SpeedCoder,
    /// Needs per-attempt hint data; never auto-awarded.
    PerfectScore,
    /// Needs per-attempt bug data; never auto-awarded.
    CodeDetective,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 10] = [
        AchievementKind::FirstBugFixed,
        AchievementKind::HtmlMaster,
        AchievementKind::CssWizard,
        AchievementKind::JavascriptJedi,
        AchievementKind::LearningLegend,
        AchievementKind::BugSlayer,
        AchievementKind::StreakMaster,
        AchievementKind::SpeedCoder,
        AchievementKind::PerfectScore,
        AchievementKind::CodeDetective,
    ];

    /// Catalog display name.
    pub fn name(&self) -> &'static str {
        match self {
            AchievementKind::FirstBugFixed => "First Bug Fixed",
            AchievementKind::HtmlMaster => "HTML Master",
            AchievementKind::CssWizard => "CSS Wizard",
            AchievementKind::JavascriptJedi => "JavaScript Jedi",
            AchievementKind::LearningLegend => "Learning Legend",
            AchievementKind::BugSlayer => "Bug Slayer",
            AchievementKind::StreakMaster => "Streak Master",
            AchievementKind::SpeedCoder => "Speed Coder",
            AchievementKind::PerfectScore => "Perfect Score",
            AchievementKind::CodeDetective => "Code Detective",
        }
    }

    /// Whether the engine evaluates this kind from aggregated progress.
    pub fn is_auto_awarded(&self) -> bool {
        !matches!(
            self,
            AchievementKind::SpeedCoder
                | AchievementKind::PerfectScore
                | AchievementKind::CodeDetective
        )
    }

    /// The unlock rule.
    pub fn is_unlocked(&self, summary: &ProgressSummary) -> bool {
        match self {
            AchievementKind::FirstBugFixed => summary.total_challenges >= 1,
            AchievementKind::HtmlMaster => {
                summary.course_completions(CourseType::Html) >= COURSE_MASTERY_CHALLENGES
            }
            AchievementKind::CssWizard => {
                summary.course_completions(CourseType::Css) >= COURSE_MASTERY_CHALLENGES
            }
            AchievementKind::JavascriptJedi => {
                summary.course_completions(CourseType::Javascript) >= COURSE_MASTERY_CHALLENGES
            }
            AchievementKind::LearningLegend => summary.current_level >= MAX_LEVEL,
            AchievementKind::BugSlayer => summary.total_challenges >= BUG_SLAYER_CHALLENGES,
            AchievementKind::StreakMaster => summary.max_streak >= STREAK_MASTER_DAYS,
            AchievementKind::SpeedCoder
            | AchievementKind::PerfectScore
            | AchievementKind::CodeDetective => false,
        }
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AchievementKind {
    type Err = EngineError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        AchievementKind::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| EngineError::InvalidInput(format!("no achievement rule named '{name}'")))
    }
}

/// Aggregates over all of a user's progress records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total_xp: u64,
    pub total_challenges: u64,
    /// Longest current streak across courses; 0 with no records.
    pub max_streak: u32,
    /// Level of the summed XP, not of any single course.
    pub current_level: u8,
    pub per_course: BTreeMap<CourseType, u32>,
}

impl ProgressSummary {
    pub fn from_records(records: &[ProgressRecord]) -> Self {
        let mut summary = ProgressSummary::default();
        for r in records {
            summary.total_xp = summary.total_xp.saturating_add(r.total_xp);
            summary.total_challenges += u64::from(r.challenges_completed);
            summary.max_streak = summary.max_streak.max(r.streak_days);
            let course = summary.per_course.entry(r.course_type).or_default();
            *course = course.saturating_add(r.challenges_completed);
        }
        summary.current_level = level_from_xp(summary.total_xp);
        summary
    }

    pub fn course_completions(&self, course_type: CourseType) -> u32 {
        self.per_course.get(&course_type).copied().unwrap_or(0)
    }
}

/// A stored award joined with its catalog entry.
///
/// Serializes as the award's own fields plus an `achievement` object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarnedAchievement {
    #[serde(flatten)]
    pub award: UserAchievement,
    pub achievement: Achievement,
}

impl EarnedAchievement {
    pub fn new(award: UserAchievement, achievement: Achievement) -> Self {
        Self { award, achievement }
    }
}

impl<S: ProgressStore> Engine<S> {
    /// Award every achievement the user now qualifies for, as of now.
    ///
    /// See [`Engine::check_and_award_achievements_at`].
    pub async fn check_and_award_achievements(
        &self,
        user_id: &str,
    ) -> Result<Vec<EarnedAchievement>, EngineError> {
        self.check_and_award_achievements_at(user_id, OffsetDateTime::now_utc())
            .await
    }

    /// Evaluate every unearned catalog entry against the user's aggregated
    /// progress and award those whose rule holds.
    ///
    /// Returns only the achievements awarded by this call, in catalog order.
    /// Failing to load progress, catalog, or earned ids aborts the call.
    /// Per-achievement failures (an unknown name, a failed award) are logged
    /// and skipped. A duplicate award is a no-op, so re-running is safe.
    pub async fn check_and_award_achievements_at(
        &self,
        user_id: &str,
        now: OffsetDateTime,
    ) -> Result<Vec<EarnedAchievement>, EngineError> {
        let records = self.store.list_progress(user_id).await?;
        let summary = ProgressSummary::from_records(&records);
        let catalog = self.store.list_achievement_catalog().await?;
        let earned = self.store.list_earned_achievement_ids(user_id).await?;

        let mut awarded = Vec::new();
        for achievement in catalog {
            if earned.contains(&achievement.id) {
                continue;
            }
            let kind = match achievement.name.parse::<AchievementKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    warn!(user_id, achievement = %achievement.id, error = %e, "skipping achievement");
                    continue;
                }
            };
            if !kind.is_unlocked(&summary) {
                continue;
            }

            match self
                .store
                .award_achievement(user_id, &achievement.id, now)
                .await
            {
                Ok(award) => {
                    info!(user_id, achievement = %kind, xp_reward = achievement.xp_reward, "achievement unlocked");
                    awarded.push(EarnedAchievement::new(award, achievement));
                }
                Err(StoreError::DuplicateAchievement { .. }) => {
                    debug!(user_id, achievement = %kind, "achievement already awarded");
                }
                Err(e) => {
                    warn!(user_id, achievement = %kind, error = %e, "failed to award achievement");
                }
            }
        }

        Ok(awarded)
    }
}

/// The ten achievements the application ships with, in ascending
/// `xp_reward` order.
pub fn default_catalog() -> Vec<Achievement> {
    let entry = |kind: AchievementKind,
                 id: &str,
                 icon: &str,
                 xp_reward: u32,
                 description: &str,
                 requirements: serde_json::Value| Achievement {
        id: id.to_string(),
        name: kind.name().to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        xp_reward,
        requirements,
    };

    vec![
        entry(
            AchievementKind::FirstBugFixed,
            "first-bug-fixed",
            "bug",
            10,
            "Fix your very first bug",
            serde_json::json!({ "challenges_completed": 1 }),
        ),
        entry(
            AchievementKind::SpeedCoder,
            "speed-coder",
            "zap",
            25,
            "Fix a bug in under 30 seconds",
            serde_json::json!({ "time_taken_under": 30 }),
        ),
        entry(
            AchievementKind::CodeDetective,
            "code-detective",
            "search",
            25,
            "Find every bug in a challenge on the first try",
            serde_json::json!({ "first_try": true }),
        ),
        entry(
            AchievementKind::PerfectScore,
            "perfect-score",
            "star",
            30,
            "Complete a challenge without using any hints",
            serde_json::json!({ "hints_used": 0 }),
        ),
        entry(
            AchievementKind::StreakMaster,
            "streak-master",
            "flame",
            50,
            "Keep a 7-day streak",
            serde_json::json!({ "streak_days": STREAK_MASTER_DAYS }),
        ),
        entry(
            AchievementKind::HtmlMaster,
            "html-master",
            "code",
            100,
            "Complete 10 HTML challenges",
            serde_json::json!({ "course_type": "html", "challenges_completed": COURSE_MASTERY_CHALLENGES }),
        ),
        entry(
            AchievementKind::CssWizard,
            "css-wizard",
            "palette",
            100,
            "Complete 10 CSS challenges",
            serde_json::json!({ "course_type": "css", "challenges_completed": COURSE_MASTERY_CHALLENGES }),
        ),
        entry(
            AchievementKind::JavascriptJedi,
            "javascript-jedi",
            "cpu",
            100,
            "Complete 10 JavaScript challenges",
            serde_json::json!({ "course_type": "javascript", "challenges_completed": COURSE_MASTERY_CHALLENGES }),
        ),
        entry(
            AchievementKind::BugSlayer,
            "bug-slayer",
            "sword",
            150,
            "Fix 30 bugs across all courses",
            serde_json::json!({ "challenges_completed": BUG_SLAYER_CHALLENGES }),
        ),
        entry(
            AchievementKind::LearningLegend,
            "learning-legend",
            "crown",
            200,
            "Reach level 5",
            serde_json::json!({ "level": MAX_LEVEL }),
        ),
    ]
}
