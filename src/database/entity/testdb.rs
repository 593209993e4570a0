//! Test database bootstrap
//!
//! Tests of a process share one database provider. The first caller of
//! [`TestDatabase::init_test_db`] opens and registers it, then resets the schema
//! and loads the fixtures. Later callers wait for that to finish, get `None` and
//! reuse the registered provider. Fixture loading runs at most once no matter how many threads ask.

use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use crate::database::core::{DbProvider, ProviderSlot};

use super::error::{FatalSchemaError, SchemaResult};
use super::gate::FixtureGate;
use super::lifecycle::SchemaLifecycle;
use super::registry::EntityRegistry;
use super::waiter::WaitPolicy;

static TEST_DB: OnceLock<TestDatabase> = OnceLock::new();

#[derive(Debug)]
pub struct TestDatabase {
    provider: ProviderSlot,
    fixtures: FixtureGate,
    registry: &'static EntityRegistry,
    policy: WaitPolicy,
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDatabase {
    pub fn new() -> Self {
        Self {
            provider: ProviderSlot::new(),
            fixtures: FixtureGate::new(),
            registry: EntityRegistry::entities(),
            policy: WaitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Process-wide instance used by test suites
    pub fn global() -> &'static TestDatabase {
        TEST_DB.get_or_init(TestDatabase::new)
    }

    /// The registered provider, if any
    pub fn provider(&self) -> Option<Arc<DbProvider>> {
        self.provider.get()
    }

    /// Reset the schema and load the fixtures, at most once per instance
    ///
    /// Concurrent callers block until the single run finishes and all observe
    /// its outcome.
    pub fn init_test_fixtures(&self) -> SchemaResult<()> {
        let provider = self.provider.get().ok_or(FatalSchemaError::NoProvider)?;

        self.fixtures.run_once(|| {
            info!("entity: loading test fixtures into {}", provider.dsn());
            SchemaLifecycle::new(&*provider, self.registry)
                .with_policy(self.policy)
                .reset_database(true)
        })
    }

    /// Open and register a provider for `dsn` unless one is already registered
    ///
    /// Returns the new provider after the fixtures are loaded, or `None` if a
    /// provider was registered before. In that case the call only waits for the
    /// registering caller to finish loading the fixtures and never loads them again.
    pub fn init_test_db(&self, dsn: &str) -> SchemaResult<Option<Arc<DbProvider>>> {
        if self.provider.has_provider() {
            self.fixtures.wait_until_done()?;
            return Ok(None);
        }

        let provider = DbProvider::open(dsn).map(Arc::new).map_err(|e| {
            FatalSchemaError::Provider {
                dsn: dsn.to_string(),
                reason: format!("{:#}", e),
            }
        })?;

        if !self.provider.set(Arc::clone(&provider)) {
            warn!("entity: provider for {} registered concurrently", dsn);
            self.fixtures.wait_until_done()?;
            return Ok(None);
        }

        self.init_test_fixtures()?;
        Ok(Some(provider))
    }
}
