use bughunter_storage::{ProgressRecord, ProgressStore};
use serde::Serialize;

use crate::achievements::{EarnedAchievement, ProgressSummary};
use crate::error::EngineError;
use crate::level::LevelProgress;
use crate::Engine;

/// Everything the dashboard shows for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_id: String,
    pub total_xp: u64,
    pub total_challenges: u64,
    pub current_level: u8,
    pub max_streak: u32,
    pub level_progress: LevelProgress,
    pub progress: Vec<ProgressRecord>,
    pub achievements: Vec<EarnedAchievement>,
}

impl<S: ProgressStore> Engine<S> {
    /// Aggregate a user's progress records and earned achievements.
    ///
    /// Earned achievements whose id is no longer in the catalog are omitted.
    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats, EngineError> {
        let progress = self.store.list_progress(user_id).await?;
        let awards = self.store.list_user_achievements(user_id).await?;
        let catalog = self.store.list_achievement_catalog().await?;

        let summary = ProgressSummary::from_records(&progress);
        let achievements = awards
            .iter()
            .filter_map(|award| {
                catalog
                    .iter()
                    .find(|a| a.id == award.achievement_id)
                    .map(|a| EarnedAchievement::new(award.clone(), a.clone()))
            })
            .collect();

        Ok(UserStats {
            user_id: user_id.to_string(),
            total_xp: summary.total_xp,
            total_challenges: summary.total_challenges,
            current_level: summary.current_level,
            max_streak: summary.max_streak,
            level_progress: LevelProgress::from_total_xp(summary.total_xp),
            progress,
            achievements,
        })
    }
}
