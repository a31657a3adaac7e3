use std::future::Future;
use std::sync::Arc;

use super::{fixture_time, make_progress, TestResult};
use crate::record::CourseType;
use crate::{ProgressStore, StoreError};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_updates_exactly_one_wins",
        concurrent_updates_exactly_one_wins(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_inserts_exactly_one_wins",
        concurrent_inserts_exactly_one_wins(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_awards_exactly_one_wins",
        concurrent_awards_exactly_one_wins(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "retrying_increments_lose_nothing",
        retrying_increments_lose_nothing(factory).await,
    ));

    results
}

// ── Concurrent update: exactly one wins ─────────────────────────────────────

/// N tasks each try to add XP to the same record from version 0. Exactly one
/// write lands; the rest must get ConcurrentConflict.
async fn concurrent_updates_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);
    let base = storage
        .upsert_progress(make_progress("ada", CourseType::Html, 0), None)
        .await
        .map_err(|e| format!("insert: {e}"))?;

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        let mut next = base.clone();
        next.total_xp = 10 + i as u64;
        handles.push(tokio::spawn(async move {
            match s.upsert_progress(next, Some(0)).await {
                Ok(_) => Ok(true),
                Err(StoreError::ConcurrentConflict { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = 0usize;
    for handle in handles {
        let won = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StoreError| format!("storage error: {e}"))?;
        if won {
            winners += 1;
        }
    }

    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }
    let record = storage
        .get_progress("ada", CourseType::Html)
        .await
        .map_err(|e| format!("get: {e}"))?
        .ok_or("record missing")?;
    if record.version != 1 {
        return Err(format!("expected version 1, got {}", record.version));
    }
    Ok(())
}

// ── Concurrent first completion: exactly one insert wins ────────────────────

async fn concurrent_inserts_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = storage.clone();
        let record = make_progress("ada", CourseType::Css, i as u64);
        handles.push(tokio::spawn(async move {
            match s.upsert_progress(record, None).await {
                Ok(_) => Ok(true),
                Err(StoreError::ConcurrentConflict { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = 0usize;
    for handle in handles {
        if handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StoreError| format!("storage error: {e}"))?
        {
            winners += 1;
        }
    }

    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }
    Ok(())
}

// ── Concurrent award of the same achievement: exactly one row ───────────────

async fn concurrent_awards_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);

    let mut handles = Vec::new();
    for _ in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            match s.award_achievement("ada", "first", fixture_time()).await {
                Ok(_) => Ok(true),
                Err(StoreError::DuplicateAchievement { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = 0usize;
    for handle in handles {
        if handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StoreError| format!("storage error: {e}"))?
        {
            winners += 1;
        }
    }

    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }
    let rows = storage
        .list_user_achievements("ada")
        .await
        .map_err(|e| format!("list: {e}"))?;
    if rows.len() != 1 {
        return Err(format!("expected 1 row, got {}", rows.len()));
    }
    Ok(())
}

// ── Read-modify-write with retry: no lost increments ────────────────────────

/// N tasks each add 10 XP with a read / conditional-write / retry loop. The
/// final total must account for every task.
async fn retrying_increments_lose_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory().await);
    storage
        .upsert_progress(make_progress("ada", CourseType::Javascript, 0), None)
        .await
        .map_err(|e| format!("insert: {e}"))?;

    let mut handles = Vec::new();
    for _ in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let current = s
                    .get_progress("ada", CourseType::Javascript)
                    .await?
                    .ok_or_else(|| StoreError::Unavailable("record vanished".to_string()))?;
                let mut next = current.clone();
                next.total_xp += 10;
                match s.upsert_progress(next, Some(current.version)).await {
                    Ok(_) => return Ok(()),
                    Err(StoreError::ConcurrentConflict { .. }) => {
                        tokio::task::yield_now().await;
                    }
                    Err(e) => return Err(e),
                }
            }
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StoreError| format!("storage error: {e}"))?;
    }

    let record = storage
        .get_progress("ada", CourseType::Javascript)
        .await
        .map_err(|e| format!("get: {e}"))?
        .ok_or("record missing")?;
    if record.total_xp != 10 * N as u64 {
        return Err(format!(
            "expected total_xp {}, got {}",
            10 * N as u64,
            record.total_xp
        ));
    }
    if record.version != N as i64 {
        return Err(format!("expected version {N}, got {}", record.version));
    }
    Ok(())
}
