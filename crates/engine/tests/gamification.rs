//! End-to-end engine tests against the in-memory store.
//!
//! Covers the completion scenarios (first challenge, reaching max level),
//! streak behavior across days, input validation, OCC retries, and
//! per-achievement failure isolation.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bughunter_engine::{
    default_catalog, Completion, Engine, EngineConfig, EngineError, LevelProgress,
};
use bughunter_storage::{
    Achievement, CourseType, MemoryStore, ProgressRecord, ProgressStore, StoreError,
    UserAchievement,
};
use time::macros::datetime;
use time::{Duration as TimeDuration, OffsetDateTime};

// ──────────────────────────────────────────────
// Fixtures
// ──────────────────────────────────────────────

fn engine() -> Engine<MemoryStore> {
    Engine::new(MemoryStore::with_catalog(default_catalog()))
}

fn day(n: i64) -> OffsetDateTime {
    datetime!(2025-03-01 10:00 UTC) + TimeDuration::days(n)
}

fn names(awarded: &[bughunter_engine::EarnedAchievement]) -> Vec<&str> {
    awarded.iter().map(|a| a.achievement.name.as_str()).collect()
}

/// Store wrapper that injects failures in front of a `MemoryStore`.
struct FlakyStore {
    inner: MemoryStore,
    fail_award_for: Option<String>,
    fail_reads: bool,
    fail_catalog: bool,
    conflicts_remaining: AtomicU32,
}

impl FlakyStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_award_for: None,
            fail_reads: false,
            fail_catalog: false,
            conflicts_remaining: AtomicU32::new(0),
        }
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("connection refused".to_string())
    }
}

#[async_trait]
impl ProgressStore for FlakyStore {
    async fn get_progress(
        &self,
        user_id: &str,
        course_type: CourseType,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        if self.fail_reads {
            return Err(Self::unavailable());
        }
        self.inner.get_progress(user_id, course_type).await
    }

    async fn upsert_progress(
        &self,
        record: ProgressRecord,
        expected_version: Option<i64>,
    ) -> Result<ProgressRecord, StoreError> {
        let injected = self
            .conflicts_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::ConcurrentConflict {
                user_id: record.user_id,
                course_type: record.course_type,
                expected_version,
            });
        }
        self.inner.upsert_progress(record, expected_version).await
    }

    async fn list_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        if self.fail_reads {
            return Err(Self::unavailable());
        }
        self.inner.list_progress(user_id).await
    }

    async fn list_achievement_catalog(&self) -> Result<Vec<Achievement>, StoreError> {
        if self.fail_catalog {
            return Err(Self::unavailable());
        }
        self.inner.list_achievement_catalog().await
    }

    async fn list_earned_achievement_ids(
        &self,
        user_id: &str,
    ) -> Result<BTreeSet<String>, StoreError> {
        self.inner.list_earned_achievement_ids(user_id).await
    }

    async fn list_user_achievements(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserAchievement>, StoreError> {
        self.inner.list_user_achievements(user_id).await
    }

    async fn award_achievement(
        &self,
        user_id: &str,
        achievement_id: &str,
        earned_at: OffsetDateTime,
    ) -> Result<UserAchievement, StoreError> {
        if self.fail_award_for.as_deref() == Some(achievement_id) {
            return Err(Self::unavailable());
        }
        self.inner
            .award_achievement(user_id, achievement_id, earned_at)
            .await
    }
}

// ──────────────────────────────────────────────
// 1. Completion scenarios
// ──────────────────────────────────────────────

#[tokio::test]
async fn first_html_challenge_creates_record_and_unlocks_first_bug_fixed() {
    let engine = engine();
    let xp = bughunter_engine::compute_xp(25, false, 0, 1.0);
    assert_eq!(xp, 25);

    let record = engine
        .update_progress_at("ada", CourseType::Html, xp as i64, true, day(0))
        .await
        .unwrap();
    assert_eq!(record.challenges_completed, 1);
    assert_eq!(record.total_xp, 25);
    assert_eq!(record.current_level, 1);
    assert_eq!(record.streak_days, 1);
    assert_eq!(record.version, 0);

    let awarded = engine
        .check_and_award_achievements_at("ada", day(0))
        .await
        .unwrap();
    assert_eq!(names(&awarded), vec!["First Bug Fixed"]);
    assert_eq!(awarded[0].award.user_id, "ada");
    assert_eq!(awarded[0].award.achievement_id, "first-bug-fixed");
    assert_eq!(awarded[0].award.earned_at, day(0));
}

#[tokio::test]
async fn second_check_without_progress_awards_nothing() {
    let engine = engine();
    engine
        .update_progress_at("ada", CourseType::Css, 40, true, day(0))
        .await
        .unwrap();

    let first = engine.check_and_award_achievements("ada").await.unwrap();
    assert_eq!(first.len(), 1);
    let second = engine.check_and_award_achievements("ada").await.unwrap();
    assert!(second.is_empty(), "got {:?}", names(&second));
}

#[tokio::test]
async fn reaching_750_xp_unlocks_learning_legend() {
    let engine = engine();
    engine
        .update_progress_at("ada", CourseType::Javascript, 700, true, day(0))
        .await
        .unwrap();
    let before = engine
        .check_and_award_achievements_at("ada", day(0))
        .await
        .unwrap();
    assert!(!names(&before).contains(&"Learning Legend"));

    let record = engine
        .update_progress_at("ada", CourseType::Javascript, 50, true, day(0))
        .await
        .unwrap();
    assert_eq!(record.total_xp, 750);
    assert_eq!(record.current_level, 5);

    let after = engine
        .check_and_award_achievements_at("ada", day(0))
        .await
        .unwrap();
    assert_eq!(names(&after), vec!["Learning Legend"]);
}

#[tokio::test]
async fn learning_legend_counts_xp_across_courses() {
    let engine = engine();
    engine
        .update_progress_at("ada", CourseType::Html, 400, true, day(0))
        .await
        .unwrap();
    engine
        .update_progress_at("ada", CourseType::Css, 350, true, day(0))
        .await
        .unwrap();
    let awarded = engine.check_and_award_achievements("ada").await.unwrap();
    assert!(names(&awarded).contains(&"Learning Legend"));
}

#[tokio::test]
async fn course_mastery_after_ten_completions() {
    let engine = engine();
    for i in 0..10 {
        engine
            .update_progress_at("ada", CourseType::Css, 10, true, day(0))
            .await
            .unwrap();
        let awarded = engine
            .check_and_award_achievements_at("ada", day(0))
            .await
            .unwrap();
        let unlocked_wizard = names(&awarded).contains(&"CSS Wizard");
        assert_eq!(unlocked_wizard, i == 9, "completion {}", i + 1);
    }
}

// ──────────────────────────────────────────────
// 2. Streaks
// ──────────────────────────────────────────────

#[tokio::test]
async fn streak_follows_calendar_days() {
    let engine = engine();
    let mut streaks = Vec::new();
    for n in [0, 1, 2, 2, 3, 8] {
        let r = engine
            .update_progress_at("ada", CourseType::Html, 5, true, day(n))
            .await
            .unwrap();
        streaks.push(r.streak_days);
    }
    assert_eq!(streaks, vec![1, 2, 3, 3, 4, 1]);
}

#[tokio::test]
async fn seven_day_streak_unlocks_streak_master() {
    let engine = engine();
    for n in 0..7 {
        engine
            .update_progress_at("ada", CourseType::Javascript, 5, true, day(n))
            .await
            .unwrap();
    }
    let awarded = engine
        .check_and_award_achievements_at("ada", day(6))
        .await
        .unwrap();
    assert!(names(&awarded).contains(&"Streak Master"));
}

#[tokio::test]
async fn incomplete_attempt_adds_xp_but_not_a_completion() {
    let engine = engine();
    engine
        .update_progress_at("ada", CourseType::Html, 20, true, day(0))
        .await
        .unwrap();
    let r = engine
        .update_progress_at("ada", CourseType::Html, 20, false, day(0))
        .await
        .unwrap();
    assert_eq!(r.challenges_completed, 1);
    assert_eq!(r.total_xp, 40);
}

// ──────────────────────────────────────────────
// 3. Validation and failures
// ──────────────────────────────────────────────

#[tokio::test]
async fn negative_xp_is_rejected_before_any_write() {
    let engine = engine();
    let err = engine
        .update_progress_at("ada", CourseType::Html, -5, true, day(0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)), "{err}");
    assert!(engine.store().list_progress("ada").await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_course_type_is_invalid_input() {
    let err: EngineError = "rust".parse::<CourseType>().unwrap_err().into();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn store_unavailable_propagates_from_update() {
    let mut store = FlakyStore::new(MemoryStore::with_catalog(default_catalog()));
    store.fail_reads = true;
    let engine = Engine::new(store);

    let err = engine
        .update_progress_at("ada", CourseType::Html, 10, true, day(0))
        .await
        .unwrap_err();
    assert!(
        matches!(err, EngineError::Store(StoreError::Unavailable(_))),
        "{err}"
    );

    let err = engine.check_and_award_achievements("ada").await.unwrap_err();
    assert!(matches!(err, EngineError::Store(StoreError::Unavailable(_))));
}

#[tokio::test]
async fn failed_award_does_not_block_the_others() {
    let inner = MemoryStore::with_catalog(default_catalog());
    let mut store = FlakyStore::new(inner.clone());
    store.fail_award_for = Some("first-bug-fixed".to_string());
    let engine = Engine::new(store);

    engine
        .update_progress_at("ada", CourseType::Html, 800, true, day(0))
        .await
        .unwrap();
    let awarded = engine.check_and_award_achievements("ada").await.unwrap();
    assert_eq!(names(&awarded), vec!["Learning Legend"]);

    // the skipped one is picked up once the store recovers
    let retry = Engine::new(inner)
        .check_and_award_achievements("ada")
        .await
        .unwrap();
    assert_eq!(names(&retry), vec!["First Bug Fixed"]);
}

#[tokio::test]
async fn catalog_entries_without_a_rule_are_skipped() {
    let mut catalog = default_catalog();
    catalog.insert(
        0,
        Achievement {
            id: "mystery".to_string(),
            name: "Bug Whisperer".to_string(),
            description: "not a known rule".to_string(),
            icon: String::new(),
            xp_reward: 1,
            requirements: serde_json::json!({}),
        },
    );
    let engine = Engine::new(MemoryStore::with_catalog(catalog));
    engine
        .update_progress_at("ada", CourseType::Html, 10, true, day(0))
        .await
        .unwrap();
    let awarded = engine.check_and_award_achievements("ada").await.unwrap();
    assert_eq!(names(&awarded), vec!["First Bug Fixed"]);
}

// ──────────────────────────────────────────────
// 4. Optimistic concurrency
// ──────────────────────────────────────────────

#[tokio::test]
async fn conflicting_write_is_recomputed() {
    let store = FlakyStore::new(MemoryStore::with_catalog(default_catalog()));
    store.conflicts_remaining.store(2, Ordering::SeqCst);
    let engine = Engine::new(store);

    let r = engine
        .update_progress_at("ada", CourseType::Html, 10, true, day(0))
        .await
        .unwrap();
    assert_eq!(r.total_xp, 10);
    assert_eq!(r.challenges_completed, 1);
}

#[tokio::test]
async fn conflict_surfaces_after_retries_exhausted() {
    let store = FlakyStore::new(MemoryStore::with_catalog(default_catalog()));
    store.conflicts_remaining.store(10, Ordering::SeqCst);
    let engine = Engine::with_config(
        store,
        EngineConfig {
            max_conflict_retries: 2,
            ..EngineConfig::default()
        },
    );

    let err = engine
        .update_progress_at("ada", CourseType::Html, 10, true, day(0))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            EngineError::Store(StoreError::ConcurrentConflict { .. })
        ),
        "{err}"
    );
    // three attempts consumed, nothing written
    assert_eq!(engine.store().conflicts_remaining.load(Ordering::SeqCst), 7);
    assert!(engine
        .store()
        .inner
        .list_progress("ada")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn concurrent_completions_lose_no_xp() {
    const TASKS: u64 = 8;
    let engine = Arc::new(Engine::with_config(
        MemoryStore::with_catalog(default_catalog()),
        EngineConfig {
            max_conflict_retries: 1_000,
            ..EngineConfig::default()
        },
    ));
    engine
        .update_progress_at("ada", CourseType::Html, 0, false, day(0))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let e = engine.clone();
        handles.push(tokio::spawn(async move {
            e.update_progress_at("ada", CourseType::Html, 15, true, day(0))
                .await
        }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    let r = engine
        .store()
        .get_progress("ada", CourseType::Html)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r.total_xp, 15 * TASKS);
    assert_eq!(r.challenges_completed as u64, TASKS);
}

// ──────────────────────────────────────────────
// 5. Stats and full completions
// ──────────────────────────────────────────────

#[tokio::test]
async fn user_stats_aggregates_courses_and_awards() {
    let engine = engine();
    engine
        .update_progress_at("ada", CourseType::Html, 120, true, day(0))
        .await
        .unwrap();
    engine
        .update_progress_at("ada", CourseType::Css, 80, true, day(1))
        .await
        .unwrap();
    engine
        .update_progress_at("ada", CourseType::Css, 10, true, day(2))
        .await
        .unwrap();
    engine
        .check_and_award_achievements_at("ada", day(2))
        .await
        .unwrap();

    let stats = engine.user_stats("ada").await.unwrap();
    assert_eq!(stats.total_xp, 210);
    assert_eq!(stats.total_challenges, 3);
    assert_eq!(stats.current_level, 2);
    assert_eq!(stats.max_streak, 2);
    assert_eq!(stats.progress.len(), 2);
    assert_eq!(stats.level_progress, LevelProgress::from_total_xp(210));
    assert_eq!(names(&stats.achievements), vec!["First Bug Fixed"]);

    let empty = engine.user_stats("ghost").await.unwrap();
    assert_eq!(empty.total_xp, 0);
    assert_eq!(empty.current_level, 1);
    assert_eq!(empty.max_streak, 0);
}

#[tokio::test]
async fn record_completion_applies_time_bonus_and_hints() {
    let engine = engine();
    let completion = Completion {
        user_id: "ada".to_string(),
        course_type: CourseType::Html,
        base_xp: 100,
        time_taken: Some(Duration::from_secs(90)),
        hints_used: 1,
        streak_multiplier: 1.0,
    };
    let outcome = engine
        .record_completion_at(&completion, day(0))
        .await
        .unwrap();
    // floor(100 * 1.2) = 120, floor(120 * 0.9) = 108
    assert!(outcome.time_bonus);
    assert_eq!(outcome.xp_earned, 108);
    assert_eq!(outcome.progress.total_xp, 108);
    assert_eq!(outcome.progress.current_level, 2);
    assert_eq!(names(&outcome.new_achievements), vec!["First Bug Fixed"]);

    let slow = Completion {
        time_taken: Some(Duration::from_secs(120)),
        hints_used: 0,
        ..completion
    };
    let outcome = engine.record_completion_at(&slow, day(0)).await.unwrap();
    assert!(!outcome.time_bonus);
    assert_eq!(outcome.xp_earned, 100);
    assert_eq!(outcome.progress.total_xp, 208);
    assert!(outcome.new_achievements.is_empty());
}

#[tokio::test]
async fn completion_succeeds_when_achievement_lookup_fails_after_write() {
    let mut store = FlakyStore::new(MemoryStore::with_catalog(default_catalog()));
    store.fail_catalog = true;
    let engine = Engine::new(store);
    let completion = Completion {
        user_id: "ada".to_string(),
        course_type: CourseType::Css,
        base_xp: 25,
        time_taken: None,
        hints_used: 0,
        streak_multiplier: 1.0,
    };

    let outcome = engine
        .record_completion_at(&completion, day(0))
        .await
        .unwrap();
    assert_eq!(outcome.xp_earned, 25);
    assert!(outcome.new_achievements.is_empty());

    // the solve is recorded exactly once
    let r = engine
        .store()
        .get_progress("ada", CourseType::Css)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r.total_xp, 25);
    assert_eq!(r.challenges_completed, 1);
    assert_eq!(r.version, 0);
}

#[tokio::test]
async fn non_finite_streak_multiplier_is_rejected_before_any_write() {
    let engine = engine();
    for multiplier in [f64::NAN, f64::INFINITY] {
        let completion = Completion {
            user_id: "ada".to_string(),
            course_type: CourseType::Html,
            base_xp: 25,
            time_taken: None,
            hints_used: 0,
            streak_multiplier: multiplier,
        };
        let err = engine
            .record_completion_at(&completion, day(0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)), "{err:?}");
    }
    assert!(engine.store().list_progress("ada").await.unwrap().is_empty());
}

#[tokio::test]
async fn six_hints_award_matches_float_rounding() {
    let engine = engine();
    let completion = Completion {
        user_id: "ada".to_string(),
        course_type: CourseType::Javascript,
        base_xp: 100,
        time_taken: None,
        hints_used: 6,
        streak_multiplier: 1.0,
    };
    let outcome = engine
        .record_completion_at(&completion, day(0))
        .await
        .unwrap();
    assert_eq!(outcome.xp_earned, 39);
    assert_eq!(outcome.progress.total_xp, 39);
}
