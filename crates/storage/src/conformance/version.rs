use std::future::Future;

use super::{make_progress, TestResult};
use crate::record::CourseType;
use crate::{ProgressStore, StoreError};

pub(super) async fn run_version_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "version",
        "update_with_matching_version_bumps",
        update_with_matching_version_bumps(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "sequential_updates_increment_monotonically",
        sequential_updates_increment_monotonically(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "update_with_stale_version_conflicts",
        update_with_stale_version_conflicts(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "insert_over_existing_conflicts",
        insert_over_existing_conflicts(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "update_of_missing_record_conflicts",
        update_of_missing_record_conflicts(factory).await,
    ));
    results.push(TestResult::from_result(
        "version",
        "conflict_leaves_record_unchanged",
        conflict_leaves_record_unchanged(factory).await,
    ));

    results
}

// ── 1. Update at the current version succeeds and returns version + 1 ──────

async fn update_with_matching_version_bumps<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let inserted = s
        .upsert_progress(make_progress("ada", CourseType::Html, 25), None)
        .await
        .map_err(|e| format!("insert: {e}"))?;

    let mut next = inserted.clone();
    next.total_xp = 50;
    let updated = s
        .upsert_progress(next, Some(inserted.version))
        .await
        .map_err(|e| format!("update: {e}"))?;

    if updated.version != inserted.version + 1 {
        return Err(format!(
            "expected version {}, got {}",
            inserted.version + 1,
            updated.version
        ));
    }
    let read = s
        .get_progress("ada", CourseType::Html)
        .await
        .map_err(|e| format!("get: {e}"))?
        .ok_or("record missing after update")?;
    if read.total_xp != 50 || read.version != updated.version {
        return Err(format!(
            "read back total_xp={} version={}, expected 50/{}",
            read.total_xp, read.version, updated.version
        ));
    }
    Ok(())
}

// ── 2. Versions 0, 1, 2, 3 across sequential updates ─────────────────────────

async fn sequential_updates_increment_monotonically<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut current = s
        .upsert_progress(make_progress("ada", CourseType::Css, 0), None)
        .await
        .map_err(|e| format!("insert: {e}"))?;

    for expected in 1..=3 {
        let mut next = current.clone();
        next.total_xp += 10;
        current = s
            .upsert_progress(next, Some(current.version))
            .await
            .map_err(|e| format!("update to {expected}: {e}"))?;
        if current.version != expected {
            return Err(format!(
                "expected version {expected}, got {}",
                current.version
            ));
        }
    }
    Ok(())
}

// ── 3. Stale expected_version is rejected with the right fields ──────────────

async fn update_with_stale_version_conflicts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let inserted = s
        .upsert_progress(make_progress("ada", CourseType::Html, 25), None)
        .await
        .map_err(|e| format!("insert: {e}"))?;
    s.upsert_progress(inserted.clone(), Some(0))
        .await
        .map_err(|e| format!("first update: {e}"))?;

    match s.upsert_progress(inserted, Some(0)).await {
        Err(StoreError::ConcurrentConflict {
            user_id,
            course_type,
            expected_version,
        }) => {
            if user_id != "ada" || course_type != CourseType::Html || expected_version != Some(0)
            {
                return Err(format!(
                    "conflict fields wrong: {user_id}/{course_type} expected {:?}",
                    expected_version
                ));
            }
            Ok(())
        }
        other => Err(format!("expected ConcurrentConflict, got {:?}", other)),
    }
}

// ── 4. Insert when a record exists is a conflict, not an overwrite ───────────

async fn insert_over_existing_conflicts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.upsert_progress(make_progress("ada", CourseType::Html, 25), None)
        .await
        .map_err(|e| format!("insert: {e}"))?;

    match s
        .upsert_progress(make_progress("ada", CourseType::Html, 99), None)
        .await
    {
        Err(StoreError::ConcurrentConflict {
            expected_version: None,
            ..
        }) => Ok(()),
        other => Err(format!(
            "expected ConcurrentConflict with no expected version, got {:?}",
            other
        )),
    }
}

// ── 5. Update of a record that does not exist is a conflict ──────────────────

async fn update_of_missing_record_conflicts<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s
        .upsert_progress(make_progress("ada", CourseType::Html, 25), Some(0))
        .await
    {
        Err(StoreError::ConcurrentConflict { .. }) => {}
        other => return Err(format!("expected ConcurrentConflict, got {:?}", other)),
    }
    match s.get_progress("ada", CourseType::Html).await {
        Ok(None) => Ok(()),
        other => Err(format!("rejected update created a record: {:?}", other)),
    }
}

// ── 6. A rejected write does not change the stored record ────────────────────

async fn conflict_leaves_record_unchanged<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let inserted = s
        .upsert_progress(make_progress("ada", CourseType::Html, 25), None)
        .await
        .map_err(|e| format!("insert: {e}"))?;

    let mut stale = inserted.clone();
    stale.total_xp = 1_000;
    if s.upsert_progress(stale, Some(7)).await.is_ok() {
        return Err("update at wrong version succeeded".to_string());
    }

    let read = s
        .get_progress("ada", CourseType::Html)
        .await
        .map_err(|e| format!("get: {e}"))?
        .ok_or("record missing")?;
    if read != inserted {
        return Err(format!("expected {:?}, got {:?}", inserted, read));
    }
    Ok(())
}
