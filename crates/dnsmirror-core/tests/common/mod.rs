//! Test doubles and common utilities for reconciliation contract tests
//!
//! This module provides a scriptable in-memory remote DNS service that
//! counts every call, can be told to fail specific calls, and can add
//! latency to one zone's mutations.

#![allow(dead_code)]

use dnsmirror_core::engine::{ReconcileEvent, ReconciliationEngine};
use dnsmirror_core::error::{Error, Result};
use dnsmirror_core::{EngineConfig, Record, RecordPayload, RecordSpec, RemoteDnsClient, RemoteZone, ZoneFilter};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Default TTL used by test records
pub const TTL: Duration = Duration::from_secs(300);

/// Per-operation call counters
#[derive(Debug, Default)]
pub struct CallCounters {
    pub list_zones: AtomicUsize,
    pub list_records: AtomicUsize,
    pub create: AtomicUsize,
    pub update: AtomicUsize,
    pub delete: AtomicUsize,
}

impl CallCounters {
    /// Create + update + delete calls
    pub fn mutations(&self) -> usize {
        self.create.load(Ordering::SeqCst)
            + self.update.load(Ordering::SeqCst)
            + self.delete.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct RemoteState {
    zones: Vec<RemoteZone>,
    records: HashMap<String, Vec<Record>>,
    next_id: usize,
    /// Keys like "create:www.example.com", "list_records:z1", "delete:rec-3"
    failures: HashSet<String>,
    /// Latency added to create/update/delete calls of one zone
    latency: HashMap<String, Duration>,
}

/// A scriptable remote DNS service
///
/// Clones share state and counters, so a test can keep one handle while
/// the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MockRemoteClient {
    state: Arc<Mutex<RemoteState>>,
    calls: Arc<CallCounters>,
}

impl MockRemoteClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an active zone
    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.with_zone_status(id, name, "active")
    }

    /// Seed a zone with an explicit remote status
    pub fn with_zone_status(self, id: &str, name: &str, status: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.zones.push(RemoteZone {
                id: id.to_string(),
                name: name.to_string(),
                status: status.to_string(),
            });
            state.records.entry(id.to_string()).or_default();
        }
        self
    }

    /// Seed a record in a zone
    pub fn with_record(self, zone_id: &str, id: &str, name: &str, record_type: &str, content: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(Record::new(id, name, record_type, content, TTL));
        self
    }

    /// Make the call identified by `key` fail from now on
    pub fn fail_on(&self, key: impl Into<String>) {
        self.state.lock().unwrap().failures.insert(key.into());
    }

    /// Make the call identified by `key` succeed again
    pub fn recover(&self, key: &str) {
        self.state.lock().unwrap().failures.remove(key);
    }

    /// Delay create/update/delete calls for one zone
    pub fn with_latency(self, zone_id: &str, latency: Duration) -> Self {
        self.state
            .lock()
            .unwrap()
            .latency
            .insert(zone_id.to_string(), latency);
        self
    }

    pub fn calls(&self) -> &CallCounters {
        &self.calls
    }

    pub fn create_count(&self) -> usize {
        self.calls.create.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.calls.update.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.calls.delete.load(Ordering::SeqCst)
    }

    pub fn mutation_count(&self) -> usize {
        self.calls.mutations()
    }

    /// Records the remote service currently holds for a zone
    pub fn remote_records(&self, zone_id: &str) -> Vec<Record> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    fn check_failure(&self, key: String) -> Result<()> {
        if self.state.lock().unwrap().failures.contains(&key) {
            Err(Error::provider("mock", format!("injected failure: {key}")))
        } else {
            Ok(())
        }
    }

    async fn simulate_latency(&self, zone_id: &str) {
        let latency = self.state.lock().unwrap().latency.get(zone_id).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait::async_trait]
impl RemoteDnsClient for MockRemoteClient {
    async fn list_zones(&self, filter: ZoneFilter) -> Result<Vec<RemoteZone>> {
        self.calls.list_zones.fetch_add(1, Ordering::SeqCst);
        self.check_failure("list_zones".to_string())?;

        let state = self.state.lock().unwrap();
        Ok(state
            .zones
            .iter()
            .filter(|z| !filter.active_only || z.status == "active")
            .cloned()
            .collect())
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        self.calls.list_records.fetch_add(1, Ordering::SeqCst);
        self.check_failure(format!("list_records:{zone_id}"))?;

        let state = self.state.lock().unwrap();
        Ok(state.records.get(zone_id).cloned().unwrap_or_default())
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<Record> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency(zone_id).await;
        self.check_failure(format!("create:{}", payload.name()))?;

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let record = payload.to_record(format!("rec-{}", state.next_id));
        state
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<Record> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency(zone_id).await;
        self.check_failure(format!("update:{record_id}"))?;

        let mut state = self.state.lock().unwrap();
        let records = state.records.entry(zone_id.to_string()).or_default();
        let slot = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::not_found(format!("record {record_id}")))?;
        *slot = payload.to_record(record_id);
        Ok(slot.clone())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<String> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency(zone_id).await;
        self.check_failure(format!("delete:{record_id}"))?;

        let mut state = self.state.lock().unwrap();
        let records = state.records.entry(zone_id.to_string()).or_default();
        let index = records
            .iter()
            .position(|r| r.id == record_id)
            .ok_or_else(|| Error::not_found(format!("record {record_id}")))?;
        records.remove(index);
        Ok(record_id.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Build an engine over `remote` without warming it
pub fn engine_for(remote: &MockRemoteClient) -> (ReconciliationEngine, mpsc::Receiver<ReconcileEvent>) {
    ReconciliationEngine::new(Box::new(remote.clone()), &EngineConfig::default())
        .expect("engine construction succeeds")
}

/// Build an engine over `remote` and run warm-up
pub async fn warmed_engine(
    remote: &MockRemoteClient,
) -> (ReconciliationEngine, mpsc::Receiver<ReconcileEvent>) {
    let (engine, events) = engine_for(remote);
    engine.init_cache().await.expect("warm-up succeeds");
    (engine, events)
}

/// Desired record with the default TTL
pub fn spec(name: &str, record_type: &str, content: &str) -> RecordSpec {
    RecordSpec::new(name, record_type, content, TTL)
}

/// Drain every event currently buffered
pub fn drain(events: &mut mpsc::Receiver<ReconcileEvent>) -> Vec<ReconcileEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
