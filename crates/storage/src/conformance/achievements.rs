use std::future::Future;

use super::{fixture_time, test_catalog, TestResult};
use crate::ProgressStore;

pub(super) async fn run_achievement_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "achievements",
        "catalog_preserves_order",
        catalog_preserves_order(factory).await,
    ));
    results.push(TestResult::from_result(
        "achievements",
        "award_is_listed",
        award_is_listed(factory).await,
    ));
    results.push(TestResult::from_result(
        "achievements",
        "duplicate_award_keeps_single_row",
        duplicate_award_keeps_single_row(factory).await,
    ));
    results.push(TestResult::from_result(
        "achievements",
        "awards_are_scoped_per_user",
        awards_are_scoped_per_user(factory).await,
    ));

    results
}

// ── 1. Catalog comes back in seeded order ────────────────────────────────────

async fn catalog_preserves_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let ids: Vec<String> = s
        .list_achievement_catalog()
        .await
        .map_err(|e| format!("catalog: {e}"))?
        .into_iter()
        .map(|a| a.id)
        .collect();
    let expected: Vec<String> = test_catalog().into_iter().map(|a| a.id).collect();
    if ids != expected {
        return Err(format!("expected {:?}, got {:?}", expected, ids));
    }
    Ok(())
}

// ── 2. An award shows up in both earned views ────────────────────────────────

async fn award_is_listed<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let awarded = s
        .award_achievement("ada", "first", fixture_time())
        .await
        .map_err(|e| format!("award: {e}"))?;
    if awarded.user_id != "ada" || awarded.achievement_id != "first" {
        return Err(format!("award returned wrong record: {:?}", awarded));
    }
    if awarded.earned_at != fixture_time() {
        return Err(format!("earned_at not preserved: {}", awarded.earned_at));
    }

    let ids = s
        .list_earned_achievement_ids("ada")
        .await
        .map_err(|e| format!("earned ids: {e}"))?;
    if !ids.contains("first") || ids.len() != 1 {
        return Err(format!("expected {{first}}, got {:?}", ids));
    }
    let full = s
        .list_user_achievements("ada")
        .await
        .map_err(|e| format!("user achievements: {e}"))?;
    if full != vec![awarded] {
        return Err(format!("list_user_achievements returned {:?}", full));
    }
    Ok(())
}

// ── 3. A duplicate award is rejected and nothing is added ────────────────────

async fn duplicate_award_keeps_single_row<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.award_achievement("ada", "streak", fixture_time())
        .await
        .map_err(|e| format!("first award: {e}"))?;
    if s
        .award_achievement("ada", "streak", fixture_time())
        .await
        .is_ok()
    {
        return Err("second award of the same achievement succeeded".to_string());
    }
    let rows = s
        .list_user_achievements("ada")
        .await
        .map_err(|e| format!("user achievements: {e}"))?;
    if rows.len() != 1 {
        return Err(format!("expected 1 row, got {}", rows.len()));
    }
    Ok(())
}

// ── 4. One user's awards do not leak to another ──────────────────────────────

async fn awards_are_scoped_per_user<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.award_achievement("ada", "legend", fixture_time())
        .await
        .map_err(|e| format!("award ada: {e}"))?;
    s.award_achievement("bob", "legend", fixture_time())
        .await
        .map_err(|e| format!("award bob (same achievement, other user): {e}"))?;

    let carol = s
        .list_earned_achievement_ids("carol")
        .await
        .map_err(|e| format!("earned ids: {e}"))?;
    if !carol.is_empty() {
        return Err(format!("carol should have nothing, got {:?}", carol));
    }
    Ok(())
}
