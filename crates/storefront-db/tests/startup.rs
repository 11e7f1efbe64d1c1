//! Startup orchestrator scenarios with a scripted target and a recording
//! sleeper, plus end-to-end runs against an in-memory database.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use storefront_db::startup::initialize;
use storefront_db::{
    Database, DbConfig, DbError, DbResult, RetryPolicy, SeedReport, Sleeper, StartupMode,
    StartupOutcome, StartupState, StartupTarget, TokioSleeper,
};

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Default)]
struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn slept_secs(&self) -> Vec<u64> {
        self.slept.lock().unwrap().iter().map(|d| d.as_secs()).collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

#[derive(Default)]
struct FakeState {
    failing_pings: u32,
    schema: bool,
    seed_fails: bool,
    calls: Vec<&'static str>,
}

/// Target whose ping fails `failing_pings` times before succeeding.
#[derive(Default)]
struct FakeTarget {
    state: Mutex<FakeState>,
}

impl FakeTarget {
    fn new(failing_pings: u32, schema: bool) -> Self {
        FakeTarget {
            state: Mutex::new(FakeState {
                failing_pings,
                schema,
                ..FakeState::default()
            }),
        }
    }

    fn unreachable() -> Self {
        Self::new(u32::MAX, false)
    }

    fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }
}

#[async_trait]
impl StartupTarget for FakeTarget {
    async fn ping(&self) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("ping");
        if state.failing_pings > 0 {
            state.failing_pings -= 1;
            return Err(DbError::ConnectionFailed("connection refused".into()));
        }
        Ok(())
    }

    async fn schema_present(&self) -> DbResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("schema_present");
        Ok(state.schema)
    }

    async fn drop_schema(&self) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("drop_schema");
        state.schema = false;
        Ok(())
    }

    async fn create_schema(&self) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("create_schema");
        state.schema = true;
        Ok(())
    }

    async fn seed(&self) -> DbResult<SeedReport> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("seed");
        if state.seed_fails {
            return Err(DbError::QueryFailed("disk I/O error".into()));
        }
        Ok(SeedReport {
            categories: 13,
            offers: 5,
        })
    }
}

// =============================================================================
// Retry and backoff
// =============================================================================

#[tokio::test]
async fn test_unreachable_target_ends_degraded_after_full_backoff() {
    let target = FakeTarget::unreachable();
    let sleeper = RecordingSleeper::default();

    let report = initialize(
        &target,
        StartupMode::Production,
        &RetryPolicy::default(),
        &sleeper,
    )
    .await;

    assert_eq!(report.outcome, StartupOutcome::DegradedReady);
    assert!(!report.is_ready());
    assert_eq!(report.attempts, 6);
    assert_eq!(sleeper.slept_secs(), vec![2, 4, 8, 16, 32]);
    assert_eq!(
        report.delays.iter().sum::<Duration>(),
        Duration::from_secs(62)
    );
    assert_eq!(report.transitions.last(), Some(&StartupState::DegradedReady));
    assert!(report.last_error.unwrap().contains("connection refused"));
    assert_eq!(target.count("ping"), 6);
    assert_eq!(target.count("seed"), 0);
}

#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let target = FakeTarget::new(2, false);
    let sleeper = RecordingSleeper::default();

    let report = initialize(
        &target,
        StartupMode::Production,
        &RetryPolicy::default(),
        &sleeper,
    )
    .await;

    assert_eq!(report.outcome, StartupOutcome::Ready);
    assert_eq!(report.attempts, 3);
    assert_eq!(sleeper.slept_secs(), vec![2, 4]);
    assert_eq!(
        report.transitions,
        vec![
            StartupState::Disconnected,
            StartupState::Connecting { attempt: 1 },
            StartupState::Disconnected,
            StartupState::Connecting { attempt: 2 },
            StartupState::Disconnected,
            StartupState::Connecting { attempt: 3 },
            StartupState::SchemaAbsent,
            StartupState::Seeded,
            StartupState::Ready,
        ]
    );
}

#[tokio::test]
async fn test_custom_policy_bounds_attempts() {
    let target = FakeTarget::unreachable();
    let sleeper = RecordingSleeper::default();
    let policy = RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_secs(1),
    };

    let report = initialize(&target, StartupMode::Production, &policy, &sleeper).await;

    assert_eq!(report.attempts, 3);
    assert_eq!(sleeper.slept_secs(), vec![1, 2]);
}

#[tokio::test]
async fn test_failed_seed_fails_the_attempt_and_is_retried() {
    let target = FakeTarget::new(0, false);
    target.state.lock().unwrap().seed_fails = true;
    let sleeper = RecordingSleeper::default();

    let report = initialize(
        &target,
        StartupMode::Production,
        &RetryPolicy::default(),
        &sleeper,
    )
    .await;

    // The first attempt created the schema before the seed failed, so the
    // retry finds it present and skips seeding.
    assert_eq!(report.outcome, StartupOutcome::Ready);
    assert_eq!(report.attempts, 2);
    assert_eq!(sleeper.slept_secs(), vec![2]);
    assert_eq!(target.count("seed"), 1);
    assert!(report.seed.is_none());
    assert!(report.transitions.contains(&StartupState::SkippedSeed));
}

#[tokio::test(start_paused = true)]
async fn test_tokio_sleeper_waits_real_backoff() {
    let target = FakeTarget::unreachable();
    let started = tokio::time::Instant::now();

    let report = initialize(
        &target,
        StartupMode::Production,
        &RetryPolicy::default(),
        &TokioSleeper,
    )
    .await;

    assert_eq!(report.outcome, StartupOutcome::DegradedReady);
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(62));
    assert!(waited < Duration::from_secs(63));
}

// =============================================================================
// Seeding policy
// =============================================================================

#[tokio::test]
async fn test_production_with_schema_skips_seed() {
    let target = FakeTarget::new(0, true);
    let sleeper = RecordingSleeper::default();

    let report = initialize(
        &target,
        StartupMode::Production,
        &RetryPolicy::default(),
        &sleeper,
    )
    .await;

    assert!(report.is_ready());
    assert!(report.seed.is_none());
    assert_eq!(target.calls(), vec!["ping", "schema_present"]);
    assert!(report.transitions.contains(&StartupState::SkippedSeed));
    assert!(sleeper.slept_secs().is_empty());
}

#[tokio::test]
async fn test_production_without_schema_creates_and_seeds() {
    let target = FakeTarget::new(0, false);
    let sleeper = RecordingSleeper::default();

    let report = initialize(
        &target,
        StartupMode::Production,
        &RetryPolicy::default(),
        &sleeper,
    )
    .await;

    assert!(report.is_ready());
    assert_eq!(
        target.calls(),
        vec!["ping", "schema_present", "create_schema", "seed"]
    );
    assert_eq!(
        report.seed,
        Some(SeedReport {
            categories: 13,
            offers: 5
        })
    );
}

#[tokio::test]
async fn test_development_recreates_schema_every_time() {
    let target = FakeTarget::new(0, true);
    let sleeper = RecordingSleeper::default();

    for _ in 0..2 {
        let report = initialize(
            &target,
            StartupMode::Development,
            &RetryPolicy::default(),
            &sleeper,
        )
        .await;
        assert!(report.is_ready());
        assert!(report.transitions.contains(&StartupState::Seeded));
    }

    assert_eq!(target.count("drop_schema"), 2);
    assert_eq!(target.count("create_schema"), 2);
    assert_eq!(target.count("seed"), 2);
    assert_eq!(target.count("schema_present"), 0);
}

// =============================================================================
// Against SQLite
// =============================================================================

#[tokio::test]
async fn test_production_startup_on_fresh_database() {
    let db = Database::connect_lazy(DbConfig::in_memory()).unwrap();

    let report = initialize(
        &db,
        StartupMode::Production,
        &RetryPolicy::default(),
        &RecordingSleeper::default(),
    )
    .await;

    assert!(report.is_ready());
    assert_eq!(db.offers().count().await.unwrap(), 5);

    // Second boot: schema present, nothing seeded again
    let again = initialize(
        &db,
        StartupMode::Production,
        &RetryPolicy::default(),
        &RecordingSleeper::default(),
    )
    .await;
    assert!(again.transitions.contains(&StartupState::SkippedSeed));
    assert_eq!(db.offers().count().await.unwrap(), 5);
    assert_eq!(db.categories().count().await.unwrap(), 13);
}

#[tokio::test]
async fn test_development_startup_resets_data() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.seeder().seed_all().await.unwrap();
    sqlx::query("DELETE FROM special_offers WHERE \"order\" > 2")
        .execute(db.pool())
        .await
        .unwrap();
    assert_eq!(db.offers().count().await.unwrap(), 2);

    let report = initialize(
        &db,
        StartupMode::Development,
        &RetryPolicy::default(),
        &RecordingSleeper::default(),
    )
    .await;

    assert!(report.is_ready());
    assert_eq!(db.offers().count().await.unwrap(), 5);
}
