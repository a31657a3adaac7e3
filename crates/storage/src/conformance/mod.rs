//! Conformance test suite for `ProgressStore` implementations.
//!
//! This module provides a backend-agnostic test suite that any
//! `ProgressStore` implementation can run to verify correctness. The suite
//! covers:
//!
//! - **Progress**: insert, read back, per-user listing
//! - **Version validation / OCC**: conditional writes and conflict detection
//! - **Achievements**: catalog order, awarding, per-pair uniqueness
//! - **Error handling**: correct error variants and their fields
//! - **Concurrency**: racing writers resolve to exactly one winner
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory that creates
//! a fresh store for each test, seeded with [`test_catalog`]:
//!
//! ```ignore
//! use bughunter_storage::conformance::{run_conformance_suite, test_catalog};
//!
//! #[tokio::test]
//! async fn postgres_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_postgres_store(test_catalog()).await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod achievements;
mod concurrent;
mod error;
mod progress;
mod version;

use std::fmt;
use std::future::Future;

use time::macros::datetime;
use time::OffsetDateTime;

use crate::record::{Achievement, CourseType, ProgressRecord};
use crate::ProgressStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "progress", "version", "achievements").
    pub category: String,
    /// Test name (e.g. "insert_assigns_version_0").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh store
/// with no progress or awards and [`test_catalog`] as its catalog.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: ProgressStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(progress::run_progress_tests(&factory).await);
    results.extend(version::run_version_tests(&factory).await);
    results.extend(achievements::run_achievement_tests(&factory).await);
    results.extend(error::run_error_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

/// The catalog every conformance store must be seeded with.
///
/// Ids are `first`, `streak`, `legend`, in that catalog order.
pub fn test_catalog() -> Vec<Achievement> {
    vec![
        make_achievement("first", "First Bug Fixed", 10),
        make_achievement("streak", "Streak Master", 100),
        make_achievement("legend", "Learning Legend", 200),
    ]
}

// ── Helpers: record constructors with sensible defaults ──────────────────────

fn make_achievement(id: &str, name: &str, xp_reward: u32) -> Achievement {
    Achievement {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} (conformance fixture)"),
        icon: "trophy".to_string(),
        xp_reward,
        requirements: serde_json::json!({}),
    }
}

fn make_progress(user_id: &str, course_type: CourseType, total_xp: u64) -> ProgressRecord {
    ProgressRecord {
        user_id: user_id.to_string(),
        course_type,
        challenges_completed: 1,
        total_xp,
        current_level: 1,
        streak_days: 1,
        last_activity: fixture_time(),
        version: 0,
    }
}

fn fixture_time() -> OffsetDateTime {
    datetime!(2025-01-01 12:00 UTC)
}
