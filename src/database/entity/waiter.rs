//! Migration readiness
//!
//! A successful `CREATE TABLE` does not guarantee the table is queryable yet, e.g.
//! on replicated backends or when creation failed silently. The waiter probes each
//! registered table until it answers, sleeping a fixed backoff between attempts.
//! Tables are checked one after another; exhausting the attempts of any table is fatal.

use std::thread;
use std::time::Duration;

use tracing::{debug, error};

use crate::database::core::SchemaStore;

use super::error::{FatalSchemaError, SchemaResult};
use super::registry::EntityRegistry;

/// Default number of probes per table
pub const DEFAULT_MIGRATION_ATTEMPTS: u32 = 100;

/// Default pause between two probes of the same table
pub const DEFAULT_MIGRATION_BACKOFF: Duration = Duration::from_millis(50);

/// Bounds of the readiness polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Probes per table; values below 1 are treated as 1
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MIGRATION_ATTEMPTS,
            backoff: DEFAULT_MIGRATION_BACKOFF,
        }
    }
}

impl WaitPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

/// Blocks the calling thread between probes
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeper backed by [`std::thread::sleep`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Polling state of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationAttempt {
    pub table: &'static str,
    pub attempts_remaining: u32,
    pub last_error: Option<String>,
}

impl MigrationAttempt {
    fn new(table: &'static str, attempts: u32) -> Self {
        Self {
            table,
            attempts_remaining: attempts,
            last_error: None,
        }
    }
}

pub struct MigrationWaiter<'a, S: SchemaStore + ?Sized> {
    store: &'a S,
    policy: WaitPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a, S: SchemaStore + ?Sized> MigrationWaiter<'a, S> {
    pub fn new(store: &'a S, policy: WaitPolicy, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            store,
            policy,
            sleeper,
        }
    }

    /// Wait until every registered table is queryable
    pub fn wait_for_all(&self, registry: &EntityRegistry) -> SchemaResult<()> {
        for name in registry.names() {
            self.wait_for(name)?;
        }
        Ok(())
    }

    /// Wait until a single table is queryable; returns the number of probes used
    pub fn wait_for(&self, table: &'static str) -> SchemaResult<u32> {
        let attempts = self.policy.max_attempts.max(1);
        let mut state = MigrationAttempt::new(table, attempts);

        loop {
            state.attempts_remaining -= 1;

            match self.store.probe(table) {
                Ok(()) => {
                    debug!("entity: table {} migrated", table);
                    return Ok(attempts - state.attempts_remaining);
                }
                Err(e) => {
                    debug!("entity: {:#}", e);
                    state.last_error = Some(format!("{:#}", e));
                }
            }

            if state.attempts_remaining == 0 {
                error!(
                    "entity: table {} not queryable after {} attempts",
                    table, attempts
                );
                return Err(FatalSchemaError::MigrationTimeout {
                    table: table.to_string(),
                    attempts,
                    last_error: state.last_error.unwrap_or_default(),
                });
            }

            self.sleeper.sleep(self.policy.backoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entity::testing::{CountingSleeper, RecordingStore, Visibility};

    #[test]
    fn test_default_policy() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.max_attempts, 100);
        assert_eq!(policy.backoff, Duration::from_millis(50));
    }

    #[test]
    fn test_visible_on_kth_attempt() {
        let store = RecordingStore::new().with_visibility("cameras", Visibility::OnAttempt(7));
        let sleeper = CountingSleeper::default();
        let waiter = MigrationWaiter::new(&store, WaitPolicy::default(), &sleeper);

        assert_eq!(waiter.wait_for("cameras").unwrap(), 7);
        assert_eq!(store.probe_count("cameras"), 7);
        assert_eq!(sleeper.sleeps(), 6);
        assert_eq!(sleeper.total(), Duration::from_millis(300));
    }

    #[test]
    fn test_visible_immediately() {
        let store = RecordingStore::new();
        let sleeper = CountingSleeper::default();
        let waiter = MigrationWaiter::new(&store, WaitPolicy::default(), &sleeper);

        assert_eq!(waiter.wait_for("lenses").unwrap(), 1);
        assert_eq!(sleeper.sleeps(), 0);
    }

    #[test]
    fn test_never_visible() {
        let store = RecordingStore::new().with_visibility("photos", Visibility::Never);
        let sleeper = CountingSleeper::default();
        let waiter = MigrationWaiter::new(&store, WaitPolicy::default(), &sleeper);

        let err = waiter.wait_for("photos").unwrap_err();

        match err {
            FatalSchemaError::MigrationTimeout {
                table,
                attempts,
                last_error,
            } => {
                assert_eq!(table, "photos");
                assert_eq!(attempts, 100);
                assert!(last_error.contains("no such table"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.probe_count("photos"), 100);
        assert_eq!(sleeper.sleeps(), 99);
    }

    #[test]
    fn test_zero_attempts_probes_once() {
        let store = RecordingStore::new().with_visibility("photos", Visibility::Never);
        let sleeper = CountingSleeper::default();
        let policy = WaitPolicy::new(0, Duration::from_millis(1));
        let waiter = MigrationWaiter::new(&store, policy, &sleeper);

        assert!(waiter.wait_for("photos").is_err());
        assert_eq!(store.probe_count("photos"), 1);
        assert_eq!(sleeper.sleeps(), 0);
    }

    #[test]
    fn test_sequential_stops_at_first_timeout() {
        let registry = EntityRegistry::subset(&["cameras", "lenses", "countries"]).unwrap();
        let store = RecordingStore::new().with_visibility("lenses", Visibility::Never);
        let sleeper = CountingSleeper::default();
        let waiter = MigrationWaiter::new(&store, WaitPolicy::new(3, Duration::ZERO), &sleeper);

        let err = waiter.wait_for_all(&registry).unwrap_err();

        assert!(matches!(err, FatalSchemaError::MigrationTimeout { ref table, .. } if table == "lenses"));
        assert_eq!(store.probe_count("cameras"), 1);
        assert_eq!(store.probe_count("lenses"), 3);
        assert_eq!(store.probe_count("countries"), 0);
    }

    #[test]
    fn test_empty_registry() {
        let registry = EntityRegistry::new([]).unwrap();
        let store = RecordingStore::new();
        let sleeper = CountingSleeper::default();
        let waiter = MigrationWaiter::new(&store, WaitPolicy::default(), &sleeper);

        waiter.wait_for_all(&registry).unwrap();
        assert!(store.calls.lock().unwrap().probes.is_empty());
    }

    #[test]
    fn test_thread_sleeper() {
        let started = std::time::Instant::now();
        ThreadSleeper.sleep(Duration::from_millis(5));
        assert!(started.elapsed() >= Duration::from_millis(5));
    }
}
