//! One-time initialization gate
//!
//! [`FixtureGate::run_once`] runs its initializer at most once per gate. Callers
//! arriving while the initializer runs block until it finishes, then every caller
//! sees the same outcome. A failed run is final and is not retried.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::error::{FatalSchemaError, SchemaResult};

#[derive(Debug)]
enum GateState {
    Idle,
    Running,
    Done(SchemaResult<()>),
}

#[derive(Debug)]
pub struct FixtureGate {
    state: Mutex<GateState>,
    finished: Condvar,
}

impl Default for FixtureGate {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureGate {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
            finished: Condvar::new(),
        }
    }

    // Only plain state transitions happen under the lock, so a poisoned
    // guard still holds consistent state.
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the initializer has finished, successfully or not
    pub fn is_done(&self) -> bool {
        matches!(*self.lock(), GateState::Done(_))
    }

    /// Block until a run has finished and return its outcome
    ///
    /// Never starts a run itself; the caller must know that some other caller
    /// has started or is about to start one.
    pub fn wait_until_done(&self) -> SchemaResult<()> {
        let mut state = self.lock();
        loop {
            if let GateState::Done(outcome) = &*state {
                return outcome.clone();
            }
            debug!("entity: waiting for fixture initialization");
            state = self
                .finished
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Run `init` unless it already ran, waiting for a concurrent run to finish
    pub fn run_once<F>(&self, init: F) -> SchemaResult<()>
    where
        F: FnOnce() -> SchemaResult<()>,
    {
        let mut state = self.lock();
        loop {
            match &*state {
                GateState::Done(outcome) => return outcome.clone(),
                GateState::Idle => break,
                GateState::Running => {}
            }
            debug!("entity: waiting for fixture initialization");
            state = self
                .finished
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *state = GateState::Running;
        drop(state);

        let mut run = RunGuard {
            gate: self,
            outcome: None,
        };
        let outcome = init();
        run.outcome = Some(outcome.clone());
        drop(run);

        outcome
    }
}

/// Publishes the outcome and wakes waiters, also when the initializer panics
struct RunGuard<'a> {
    gate: &'a FixtureGate,
    outcome: Option<SchemaResult<()>>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or_else(|| {
            Err(FatalSchemaError::Fixtures {
                reason: "fixture initialization panicked".to_string(),
            })
        });
        *self.gate.lock() = GateState::Done(outcome);
        self.gate.finished.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_runs_once() {
        let gate = FixtureGate::new();
        let runs = AtomicUsize::new(0);

        for _ in 0..3 {
            gate.run_once(|| {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(gate.is_done());
    }

    #[test]
    fn test_concurrent_callers_wait() {
        const CALLERS: usize = 8;
        let gate = Arc::new(FixtureGate::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let runs = Arc::clone(&runs);
                let completed = Arc::clone(&completed);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    gate.run_once(|| {
                        runs.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        completed.store(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .unwrap();
                    // nobody returns before the initializer finished
                    completed.load(Ordering::SeqCst)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wait_until_done_blocks_for_run() {
        let gate = Arc::new(FixtureGate::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let (started_tx, started_rx) = std::sync::mpsc::channel();

        let runner = {
            let gate = Arc::clone(&gate);
            let runs = Arc::clone(&runs);
            thread::spawn(move || {
                gate.run_once(|| {
                    started_tx.send(()).unwrap();
                    thread::sleep(Duration::from_millis(50));
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
        };

        started_rx.recv().unwrap();
        assert!(!gate.is_done());
        assert_eq!(gate.wait_until_done(), Ok(()));
        assert!(gate.is_done());
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        assert_eq!(runner.join().unwrap(), Ok(()));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wait_until_done_shares_failure() {
        let gate = FixtureGate::new();
        let failure = FatalSchemaError::Fixtures {
            reason: "disk full".to_string(),
        };

        let _ = gate.run_once(|| Err(failure.clone()));
        assert_eq!(gate.wait_until_done(), Err(failure));
    }

    #[test]
    fn test_failure_is_final() {
        let gate = FixtureGate::new();
        let failure = FatalSchemaError::Fixtures {
            reason: "disk full".to_string(),
        };

        let first = gate.run_once(|| Err(failure.clone()));
        let second = gate.run_once(|| Ok(()));

        assert_eq!(first, Err(failure.clone()));
        assert_eq!(second, Err(failure));
    }

    #[test]
    fn test_panic_releases_waiters() {
        let gate = Arc::new(FixtureGate::new());

        let panicking = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || gate.run_once(|| panic!("boom")))
        };
        assert!(panicking.join().is_err());

        let outcome = gate.run_once(|| Ok(()));
        assert!(matches!(outcome, Err(FatalSchemaError::Fixtures { .. })));
        assert!(gate.is_done());
    }
}
