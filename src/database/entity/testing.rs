//! Recording store and sleeper shared by the entity tests

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::database::core::{SchemaStore, SeedRow, TableDescriptor};

use super::waiter::Sleeper;

/// When a table becomes probe-readable
#[derive(Debug, Clone, Copy)]
pub enum Visibility {
    /// Readable on the given attempt (1-based)
    OnAttempt(u32),
    Never,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub creates: Vec<String>,
    pub drops: Vec<String>,
    pub probes: Vec<String>,
    pub inserts: Vec<String>,
}

/// In-memory store that records every call
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub calls: Mutex<Calls>,
    visibility: HashMap<String, Visibility>,
    fail_create: Option<String>,
    fail_drop: Option<String>,
    rows: Mutex<HashMap<String, Vec<String>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visibility(mut self, table: &str, visibility: Visibility) -> Self {
        self.visibility.insert(table.to_string(), visibility);
        self
    }

    pub fn failing_create(mut self, table: &str) -> Self {
        self.fail_create = Some(table.to_string());
        self
    }

    pub fn failing_drop(mut self, table: &str) -> Self {
        self.fail_drop = Some(table.to_string());
        self
    }

    pub fn probe_count(&self, table: &str) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.probes.iter().filter(|p| *p == table).count()
    }

    pub fn rows_in(&self, table: &str) -> usize {
        self.rows.lock().unwrap().get(table).map_or(0, Vec::len)
    }
}

impl SchemaStore for RecordingStore {
    fn create_table(&self, table: &TableDescriptor) -> Result<()> {
        self.calls.lock().unwrap().creates.push(table.name.to_string());
        if self.fail_create.as_deref() == Some(table.name) {
            return Err(anyhow!("disk I/O error"));
        }
        Ok(())
    }

    fn drop_table(&self, table: &TableDescriptor) -> Result<()> {
        self.calls.lock().unwrap().drops.push(table.name.to_string());
        if self.fail_drop.as_deref() == Some(table.name) {
            return Err(anyhow!("database is locked"));
        }
        self.rows.lock().unwrap().remove(table.name);
        Ok(())
    }

    fn probe(&self, table: &str) -> Result<()> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.probes.push(table.to_string());
            calls.probes.iter().filter(|p| *p == table).count() as u32
        };

        match self.visibility.get(table) {
            None => Ok(()),
            Some(Visibility::OnAttempt(k)) if attempt >= *k => Ok(()),
            Some(_) => Err(anyhow!("no such table: {}", table)),
        }
    }

    fn insert_if_absent(&self, row: &SeedRow) -> Result<bool> {
        self.calls.lock().unwrap().inserts.push(row.table.to_string());
        let key = format!("{:?}", row.key_values());
        let mut rows = self.rows.lock().unwrap();
        let keys = rows.entry(row.table.to_string()).or_default();
        if keys.contains(&key) {
            return Ok(false);
        }
        keys.push(key);
        Ok(true)
    }

    fn table_exists(&self, _table: &str) -> Result<bool> {
        Ok(true)
    }

    fn table_count(&self, table: &str) -> Result<u64> {
        Ok(self.rows_in(table) as u64)
    }

    fn missing_columns(&self, _table: &TableDescriptor) -> Result<Vec<&'static str>> {
        Ok(Vec::new())
    }
}

/// Sleeper that only counts
#[derive(Debug, Default)]
pub struct CountingSleeper {
    sleeps: AtomicUsize,
    total_ms: AtomicUsize,
}

impl CountingSleeper {
    pub fn sleeps(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_ms.load(Ordering::SeqCst) as u64)
    }
}

impl Sleeper for CountingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        self.total_ms
            .fetch_add(duration.as_millis() as usize, Ordering::SeqCst);
    }
}
