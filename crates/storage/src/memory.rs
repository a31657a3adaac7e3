//! In-memory `ProgressStore` backend.
//!
//! Backs the CLI (loaded from and saved to a JSON state file) and every
//! engine test. All state sits behind one mutex, so each trait call is
//! atomic with respect to the others.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::record::{Achievement, CourseType, ProgressRecord, UserAchievement};
use crate::traits::ProgressStore;

/// Serializable image of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub catalog: Vec<Achievement>,
    #[serde(default)]
    pub progress: Vec<ProgressRecord>,
    #[serde(default)]
    pub user_achievements: Vec<UserAchievement>,
}

/// Thread-safe in-memory store. Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    catalog: Vec<Achievement>,
    progress: BTreeMap<(String, CourseType), ProgressRecord>,
    user_achievements: Vec<UserAchievement>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store whose achievement catalog is `catalog`.
    pub fn with_catalog(catalog: Vec<Achievement>) -> Self {
        Self::from_state(StoreState {
            catalog,
            ..StoreState::default()
        })
    }

    /// Rebuild a store from a previously exported state.
    ///
    /// Later progress entries for the same (user, course) replace earlier ones.
    pub fn from_state(state: StoreState) -> Self {
        let progress = state
            .progress
            .into_iter()
            .map(|r| ((r.user_id.clone(), r.course_type), r))
            .collect();
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                catalog: state.catalog,
                progress,
                user_achievements: state.user_achievements,
            })),
        }
    }

    /// Export the full contents of the store.
    pub fn to_state(&self) -> Result<StoreState, StoreError> {
        let inner = self.lock()?;
        Ok(StoreState {
            catalog: inner.catalog.clone(),
            progress: inner.progress.values().cloned().collect(),
            user_achievements: inner.user_achievements.clone(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get_progress(
        &self,
        user_id: &str,
        course_type: CourseType,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .progress
            .get(&(user_id.to_string(), course_type))
            .cloned())
    }

    async fn upsert_progress(
        &self,
        mut record: ProgressRecord,
        expected_version: Option<i64>,
    ) -> Result<ProgressRecord, StoreError> {
        let mut inner = self.lock()?;
        let key = (record.user_id.clone(), record.course_type);
        let conflict = || StoreError::ConcurrentConflict {
            user_id: record.user_id.clone(),
            course_type: record.course_type,
            expected_version,
        };

        let current_version = inner.progress.get(&key).map(|r| r.version);
        let new_version = match (expected_version, current_version) {
            (None, None) => 0,
            (Some(expected), Some(current)) if expected == current => {
                current.checked_add(1).ok_or_else(|| {
                    StoreError::Unavailable(format!(
                        "version counter exhausted for {}/{}",
                        record.user_id, record.course_type
                    ))
                })?
            }
            _ => return Err(conflict()),
        };

        record.version = new_version;
        inner.progress.insert(key, record.clone());
        Ok(record)
    }

    async fn list_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .progress
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_achievement_catalog(&self) -> Result<Vec<Achievement>, StoreError> {
        Ok(self.lock()?.catalog.clone())
    }

    async fn list_earned_achievement_ids(
        &self,
        user_id: &str,
    ) -> Result<BTreeSet<String>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .user_achievements
            .iter()
            .filter(|ua| ua.user_id == user_id)
            .map(|ua| ua.achievement_id.clone())
            .collect())
    }

    async fn list_user_achievements(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserAchievement>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .user_achievements
            .iter()
            .filter(|ua| ua.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn award_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
        earned_at: OffsetDateTime,
    ) -> Result<UserAchievement, StoreError> {
        let mut inner = self.lock()?;
        if !inner.catalog.iter().any(|a| a.id == achievement_id) {
            return Err(StoreError::UnknownAchievement {
                achievement_id: achievement_id.to_string(),
            });
        }
        if inner
            .user_achievements
            .iter()
            .any(|ua| ua.user_id == user_id && ua.achievement_id == achievement_id)
        {
            return Err(StoreError::DuplicateAchievement {
                user_id: user_id.to_string(),
                achievement_id: achievement_id.to_string(),
            });
        }
        let awarded = UserAchievement {
            user_id: user_id.to_string(),
            achievement_id: achievement_id.to_string(),
            earned_at,
        };
        inner.user_achievements.push(awarded.clone());
        Ok(awarded)
    }
}
