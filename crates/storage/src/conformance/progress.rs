use std::future::Future;

use super::{make_progress, TestResult};
use crate::record::CourseType;
use crate::ProgressStore;

pub(super) async fn run_progress_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "progress",
        "get_missing_returns_none",
        get_missing_returns_none(factory).await,
    ));
    results.push(TestResult::from_result(
        "progress",
        "insert_assigns_version_0",
        insert_assigns_version_0(factory).await,
    ));
    results.push(TestResult::from_result(
        "progress",
        "insert_then_get_round_trips",
        insert_then_get_round_trips(factory).await,
    ));
    results.push(TestResult::from_result(
        "progress",
        "courses_are_independent",
        courses_are_independent(factory).await,
    ));
    results.push(TestResult::from_result(
        "progress",
        "list_progress_filters_by_user",
        list_progress_filters_by_user(factory).await,
    ));
    results.push(TestResult::from_result(
        "progress",
        "list_progress_empty_for_unknown_user",
        list_progress_empty_for_unknown_user(factory).await,
    ));

    results
}

// ── 1. Absence is not an error ───────────────────────────────────────────────

async fn get_missing_returns_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get_progress("nobody", CourseType::Html).await {
        Ok(None) => Ok(()),
        other => Err(format!("expected Ok(None), got {:?}", other)),
    }
}

// ── 2. A fresh insert is version 0 regardless of the input version ───────────

async fn insert_assigns_version_0<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut record = make_progress("ada", CourseType::Html, 25);
    record.version = 41;
    let stored = s
        .upsert_progress(record, None)
        .await
        .map_err(|e| format!("insert: {e}"))?;
    if stored.version != 0 {
        return Err(format!("expected version 0, got {}", stored.version));
    }
    Ok(())
}

// ── 3. Every field survives a write/read cycle ───────────────────────────────

async fn insert_then_get_round_trips<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut record = make_progress("ada", CourseType::Css, 260);
    record.challenges_completed = 11;
    record.current_level = 3;
    record.streak_days = 4;
    s.upsert_progress(record.clone(), None)
        .await
        .map_err(|e| format!("insert: {e}"))?;

    let read = s
        .get_progress("ada", CourseType::Css)
        .await
        .map_err(|e| format!("get: {e}"))?
        .ok_or("record missing after insert")?;

    if read != record {
        return Err(format!("expected {:?}, got {:?}", record, read));
    }
    Ok(())
}

// ── 4. (user, html) and (user, css) are separate records ─────────────────────

async fn courses_are_independent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.upsert_progress(make_progress("ada", CourseType::Html, 10), None)
        .await
        .map_err(|e| format!("insert html: {e}"))?;
    s.upsert_progress(make_progress("ada", CourseType::Css, 20), None)
        .await
        .map_err(|e| format!("insert css: {e}"))?;

    let html = s
        .get_progress("ada", CourseType::Html)
        .await
        .map_err(|e| format!("get html: {e}"))?
        .ok_or("html record missing")?;
    if html.total_xp != 10 {
        return Err(format!("html total_xp: expected 10, got {}", html.total_xp));
    }
    if s
        .get_progress("ada", CourseType::Javascript)
        .await
        .map_err(|e| format!("get javascript: {e}"))?
        .is_some()
    {
        return Err("javascript record should not exist".to_string());
    }
    Ok(())
}

// ── 5. list_progress returns only the requested user's records ───────────────

async fn list_progress_filters_by_user<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for (user, course) in [
        ("ada", CourseType::Javascript),
        ("ada", CourseType::Html),
        ("bob", CourseType::Html),
    ] {
        s.upsert_progress(make_progress(user, course, 5), None)
            .await
            .map_err(|e| format!("insert {user}/{course}: {e}"))?;
    }

    let mut courses: Vec<CourseType> = s
        .list_progress("ada")
        .await
        .map_err(|e| format!("list: {e}"))?
        .into_iter()
        .map(|r| r.course_type)
        .collect();
    courses.sort();
    if courses != vec![CourseType::Html, CourseType::Javascript] {
        return Err(format!("expected [html, javascript], got {:?}", courses));
    }
    Ok(())
}

// ── 6. Unknown users have no records ─────────────────────────────────────────

async fn list_progress_empty_for_unknown_user<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let list = s
        .list_progress("ghost")
        .await
        .map_err(|e| format!("list: {e}"))?;
    if !list.is_empty() {
        return Err(format!("expected no records, got {}", list.len()));
    }
    Ok(())
}
