//! # Startup Orchestrator
//!
//! Brings the database to a usable state before the service takes requests:
//! connect with bounded retry, create the schema when it is missing, seed
//! reference data, and fall back to a degraded start when the database never
//! answers.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Disconnected ──► Connecting ──ping fails──► Disconnected ──sleep──┐    │
//! │                       │                                            │    │
//! │                       │ ping ok              wait next_backoff()   │    │
//! │                       ▼                                            │    │
//! │        ┌──────────────┴──────────────┐                             │    │
//! │        ▼                             ▼                             │    │
//! │   SchemaAbsent                  SchemaPresent                      │    │
//! │   create + seed                      │                             │    │
//! │        ▼                             ▼                             │    │
//! │     Seeded                      SkippedSeed                        │    │
//! │        └──────────────┬──────────────┘                             │    │
//! │                       ▼                                            │    │
//! │                     Ready        retries exhausted ──► DegradedReady    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modes
//! - **Development**: every attempt drops the schema, recreates it and seeds.
//! - **Production**: ping, probe the schema; create + seed only when absent.
//!
//! ## Retry Budget
//! One initial attempt plus `max_retries` retries. With the defaults (5
//! retries, 2s base) the waits are 2, 4, 8, 16, 32 seconds: 62 seconds in
//! the worst case. Exhaustion is logged as critical and returns
//! [`StartupOutcome::DegradedReady`]; it never panics.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tracing::{error, info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::pool::Database;
use crate::seed::SeedReport;

// =============================================================================
// Seams
// =============================================================================

/// The database operations the startup loop drives.
#[async_trait]
pub trait StartupTarget: Send + Sync {
    /// Round-trips a trivial query.
    async fn ping(&self) -> DbResult<()>;

    /// Returns true when every catalog table exists.
    async fn schema_present(&self) -> DbResult<bool>;

    /// Removes the catalog schema.
    async fn drop_schema(&self) -> DbResult<()>;

    /// Applies the schema migrations.
    async fn create_schema(&self) -> DbResult<()>;

    /// Seeds reference data into empty collections.
    async fn seed(&self) -> DbResult<SeedReport>;
}

#[async_trait]
impl StartupTarget for Database {
    async fn ping(&self) -> DbResult<()> {
        Database::ping(self).await
    }

    async fn schema_present(&self) -> DbResult<bool> {
        migrations::schema_present(self.pool()).await
    }

    async fn drop_schema(&self) -> DbResult<()> {
        migrations::drop_schema(self.pool()).await
    }

    async fn create_schema(&self) -> DbResult<()> {
        self.run_migrations().await
    }

    async fn seed(&self) -> DbResult<SeedReport> {
        self.seeder().seed_all().await
    }
}

/// Waits between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Environment the process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupMode {
    Development,
    Production,
}

impl fmt::Display for StartupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupMode::Development => f.write_str("development"),
            StartupMode::Production => f.write_str("production"),
        }
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each retry after it.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_secs(2),
        }
    }
}

/// Upper bound on a single wait.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

impl RetryPolicy {
    /// A fresh backoff for one `initialize` run.
    ///
    /// No jitter and no elapsed-time limit: the n-th `next_backoff()` is
    /// `base_delay * 2^(n-1)`, capped at one day. `max_retries` bounds the
    /// attempts, not the backoff.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.base_delay,
            current_interval: self.base_delay,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: MAX_RETRY_DELAY.max(self.base_delay),
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// Every wait a run that uses all retries asks for, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        let mut backoff = self.backoff();
        (0..self.max_retries)
            .map_while(|_| backoff.next_backoff())
            .collect()
    }

    /// Sum of every wait when all retries are used.
    pub fn worst_case_wait(&self) -> Duration {
        self.schedule()
            .into_iter()
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

// =============================================================================
// Faults, States, Report
// =============================================================================

/// Why an attempt did not reach `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupFault {
    /// Unreachable, busy, or out of pooled connections. Worth retrying.
    TransientConnectivity,
    /// Reachable but the catalog tables don't exist. Drives schema creation;
    /// never fails an attempt on its own.
    SchemaMissing,
    /// Anything else, e.g. a broken migration or a failing seed insert.
    Fatal,
}

/// A state the orchestrator passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    Disconnected,
    Connecting { attempt: u32 },
    SchemaAbsent,
    SchemaPresent,
    Seeded,
    SkippedSeed,
    Ready,
    DegradedReady,
}

/// How startup ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    /// Database reachable, schema in place, reference data handled.
    Ready,
    /// Retries exhausted; the process runs without a working database.
    DegradedReady,
}

/// Everything that happened during startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub outcome: StartupOutcome,
    /// Attempts made, including the initial one.
    pub attempts: u32,
    pub transitions: Vec<StartupState>,
    /// Waits requested from the sleeper, in order.
    pub delays: Vec<Duration>,
    /// Rows inserted by the last successful seed, if one ran.
    pub seed: Option<SeedReport>,
    /// Error that ended the last failed attempt.
    pub last_error: Option<String>,
}

impl StartupReport {
    fn new() -> Self {
        StartupReport {
            outcome: StartupOutcome::DegradedReady,
            attempts: 0,
            transitions: vec![StartupState::Disconnected],
            delays: Vec::new(),
            seed: None,
            last_error: None,
        }
    }

    fn enter(&mut self, state: StartupState) {
        info!(state = ?state, "Startup transition");
        self.transitions.push(state);
    }

    /// True when the database is usable.
    pub fn is_ready(&self) -> bool {
        self.outcome == StartupOutcome::Ready
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Runs the startup sequence to completion.
///
/// Always returns a report; failures are recorded, never raised.
pub async fn initialize<T, S>(
    target: &T,
    mode: StartupMode,
    policy: &RetryPolicy,
    sleeper: &S,
) -> StartupReport
where
    T: StartupTarget + ?Sized,
    S: Sleeper + ?Sized,
{
    info!(
        mode = %mode,
        max_retries = policy.max_retries,
        base_delay_secs = policy.base_delay.as_secs_f64(),
        "Starting database initialization"
    );

    let mut report = StartupReport::new();
    let mut backoff = policy.backoff();

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            let Some(delay) = backoff.next_backoff() else {
                break;
            };
            warn!(
                attempt = attempt + 1,
                delay_secs = delay.as_secs_f64(),
                "Retrying database initialization"
            );
            report.delays.push(delay);
            sleeper.sleep(delay).await;
        }

        report.attempts = attempt + 1;
        report.enter(StartupState::Connecting { attempt: attempt + 1 });

        match run_attempt(target, mode, &mut report).await {
            Ok(()) => {
                report.outcome = StartupOutcome::Ready;
                report.enter(StartupState::Ready);
                info!(attempts = report.attempts, "Database ready");
                return report;
            }
            Err(e) => {
                match attempt_fault(&e) {
                    StartupFault::TransientConnectivity => {
                        warn!(attempt = attempt + 1, error = %e, "Database unreachable");
                    }
                    fault => {
                        error!(
                            attempt = attempt + 1,
                            fault = ?fault,
                            error = %e,
                            "Database initialization failed"
                        );
                    }
                }
                report.last_error = Some(e.to_string());
                report.enter(StartupState::Disconnected);
            }
        }
    }

    error!(
        severity = "critical",
        attempts = report.attempts,
        waited_secs = report
            .delays
            .iter()
            .fold(Duration::ZERO, |sum, d| sum.saturating_add(*d))
            .as_secs_f64(),
        last_error = report.last_error.as_deref().unwrap_or("unknown"),
        "Database initialization exhausted all retries, continuing in degraded mode"
    );
    report.outcome = StartupOutcome::DegradedReady;
    report.enter(StartupState::DegradedReady);
    report
}

/// Fault that ended an attempt.
///
/// A missing schema only steers the production probe toward creation. Once
/// the attempt is creating or seeding, the schema vanishing under it (a
/// concurrent development-mode drop) means the attempt failed outright.
fn attempt_fault(err: &DbError) -> StartupFault {
    match err.fault() {
        StartupFault::SchemaMissing => StartupFault::Fatal,
        fault => fault,
    }
}

async fn run_attempt<T>(target: &T, mode: StartupMode, report: &mut StartupReport) -> Result<(), DbError>
where
    T: StartupTarget + ?Sized,
{
    target.ping().await?;

    let present = match mode {
        StartupMode::Development => {
            info!("Development mode, recreating schema");
            target.drop_schema().await?;
            false
        }
        StartupMode::Production => match target.schema_present().await {
            Ok(present) => present,
            Err(e) if e.fault() == StartupFault::SchemaMissing => false,
            Err(e) => return Err(e),
        },
    };

    if present {
        report.enter(StartupState::SchemaPresent);
        info!("Schema present, skipping seed");
        report.enter(StartupState::SkippedSeed);
        return Ok(());
    }

    report.enter(StartupState::SchemaAbsent);
    target.create_schema().await?;
    let seeded = target.seed().await?;
    report.seed = Some(seeded);
    report.enter(StartupState::Seeded);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_delays() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = policy.schedule().iter().map(Duration::as_secs).collect();

        assert_eq!(delays, vec![2, 4, 8, 16, 32]);
        assert_eq!(policy.worst_case_wait(), Duration::from_secs(62));
    }

    #[test]
    fn test_backoff_is_exact_and_unbounded_in_time() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(250),
        };
        let mut backoff = policy.backoff();

        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(250)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(500)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
        assert!(backoff.max_elapsed_time.is_none());
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy {
            max_retries: 40,
            base_delay: Duration::from_secs(2),
        };
        let schedule = policy.schedule();

        assert_eq!(schedule.len(), 40);
        assert_eq!(schedule.last(), Some(&MAX_RETRY_DELAY));
    }

    #[test]
    fn test_no_retries_means_no_waits() {
        let policy = RetryPolicy {
            max_retries: 0,
            base_delay: Duration::from_secs(2),
        };
        assert!(policy.schedule().is_empty());
        assert_eq!(policy.worst_case_wait(), Duration::ZERO);
    }

    #[test]
    fn test_schema_vanishing_mid_attempt_is_fatal() {
        let err = DbError::SchemaMissing("no such table: special_offers".into());

        assert_eq!(err.fault(), StartupFault::SchemaMissing);
        assert_eq!(attempt_fault(&err), StartupFault::Fatal);
        assert_eq!(
            attempt_fault(&DbError::PoolExhausted),
            StartupFault::TransientConnectivity
        );
    }
}
