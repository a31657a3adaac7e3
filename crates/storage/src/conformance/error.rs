use std::future::Future;

use super::{fixture_time, TestResult};
use crate::{ProgressStore, StoreError};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "error",
        "duplicate_award_has_correct_fields",
        duplicate_award_has_correct_fields(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "award_unknown_achievement",
        award_unknown_achievement(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "earned_ids_empty_for_nonexistent_user",
        earned_ids_empty_for_nonexistent_user(factory).await,
    ));

    results
}

// ── 1. DuplicateAchievement carries user_id and achievement_id ───────────────

async fn duplicate_award_has_correct_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.award_achievement("ada", "first", fixture_time())
        .await
        .map_err(|e| format!("first award: {e}"))?;
    match s.award_achievement("ada", "first", fixture_time()).await {
        Err(StoreError::DuplicateAchievement {
            user_id,
            achievement_id,
        }) => {
            if user_id != "ada" {
                return Err(format!("expected user_id \"ada\", got \"{}\"", user_id));
            }
            if achievement_id != "first" {
                return Err(format!(
                    "expected achievement_id \"first\", got \"{}\"",
                    achievement_id
                ));
            }
            Ok(())
        }
        other => Err(format!("expected DuplicateAchievement, got {:?}", other)),
    }
}

// ── 2. Awarding an id outside the catalog is UnknownAchievement ──────────────

async fn award_unknown_achievement<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s
        .award_achievement("ada", "no-such-achievement", fixture_time())
        .await
    {
        Err(StoreError::UnknownAchievement { achievement_id })
            if achievement_id == "no-such-achievement" =>
        {
            Ok(())
        }
        other => Err(format!("expected UnknownAchievement, got {:?}", other)),
    }
}

// ── 3. Users with no awards get an empty set, not an error ───────────────────

async fn earned_ids_empty_for_nonexistent_user<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.list_earned_achievement_ids("ghost").await {
        Ok(ids) if ids.is_empty() => Ok(()),
        other => Err(format!("expected empty set, got {:?}", other)),
    }
}
