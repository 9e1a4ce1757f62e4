//! Reconciliation engine
//!
//! The ReconciliationEngine is responsible for:
//! - Warming the zone/record cache from the remote service
//! - Comparing desired record state against the cache
//! - Issuing the minimal remote create/update/delete calls
//! - Writing each remote result back into the cache
//!
//! ## Architecture
//!
//! ```text
//!            desired records
//!                  │
//!                  ▼
//!       ┌──────────────────────┐
//!       │ ReconciliationEngine │
//!       └──────────────────────┘
//!          │        │        │
//!          ▼        ▼        ▼
//! ┌───────────┐ ┌──────────────┐ ┌──────────┐
//! │ ZoneStore │ │ RemoteDns-   │ │  Events  │
//! │ (mirror)  │ │ Client       │ │ (notify) │
//! └───────────┘ └──────────────┘ └──────────┘
//! ```
//!
//! ## Per-record flow
//!
//! ```text
//! Unknown ─┬─ CacheMiss ─┬─ empty content ──► Skipped
//!          │             └─ content ───────► Created
//!          └─ CacheHit ──┬─ empty content ──► Deleted
//!                        ├─ content ───────► Updated
//!                        └─ (append) ──────► Conflict
//! ```
//!
//! Any remote failure ends the batch. Records reconciled earlier in the
//! batch stay committed; re-running the same desired state converges.
//!
//! ## Locking
//!
//! Cache locks are only held inside `ZoneStore`/`RecordStore` calls. The
//! engine reads what it needs, releases, awaits the remote call, then
//! re-acquires to commit. A remote call that is dropped before completing
//! commits nothing.
//!
//! Mutating batches hold `rebuild_gate` shared for their whole run and
//! warm-up holds it exclusively, so a re-warm never discards a zone that an
//! in-flight batch is about to commit into.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::cache::{Zone, ZoneStore};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::normalize::normalize_domain;
use crate::record::{Record, RecordPayload, RecordSpec, RecordType, ZoneFilter};
use crate::traits::{
    RecordAppender, RecordDeleter, RecordGetter, RecordSetter, RemoteDnsClient, ZoneLister,
};

/// Events emitted by the ReconciliationEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// Cache rebuilt from the remote service
    CacheWarmed { zones: usize, records: usize },

    /// Record created remotely and added to the cache
    RecordCreated {
        zone: String,
        name: String,
        record_type: RecordType,
    },

    /// Record updated remotely and replaced in the cache
    RecordUpdated {
        zone: String,
        name: String,
        record_type: RecordType,
    },

    /// Record deleted remotely and removed from the cache
    RecordDeleted {
        zone: String,
        name: String,
        record_type: RecordType,
    },

    /// Removal requested for a record that does not exist (no-op)
    RecordSkipped {
        zone: String,
        name: String,
        record_type: RecordType,
    },
}

/// Core reconciliation engine
///
/// Keeps a write-through mirror of the remote service's zones and records
/// and implements the five host-facing capabilities on top of it.
///
/// ## Lifecycle
///
/// 1. Create with [`ReconciliationEngine::new()`]
/// 2. Warm the cache with [`ReconciliationEngine::init_cache()`]
/// 3. Serve operations; before step 2 succeeds every operation fails with
///    [`Error::CacheNotReady`]
///
/// ## Threading
///
/// The engine is `Send + Sync`; share it behind an `Arc` to serve
/// concurrent callers.
pub struct ReconciliationEngine {
    /// Remote DNS service
    client: Box<dyn RemoteDnsClient>,

    /// Zone/record mirror
    cache: ZoneStore,

    /// Which zones warm-up mirrors
    zone_filter: ZoneFilter,

    /// Completion time of the last successful warm-up
    warmed_at: RwLock<Option<DateTime<Utc>>>,

    /// Shared by mutating batches, exclusive during warm-up
    rebuild_gate: RwLock<()>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ReconcileEvent>,
}

impl ReconciliationEngine {
    /// Create a new reconciliation engine
    ///
    /// # Parameters
    ///
    /// - `client`: Remote DNS client implementation
    /// - `config`: Engine configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields reconciliation events
    pub fn new(
        client: Box<dyn RemoteDnsClient>,
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcileEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            client,
            cache: ZoneStore::new(),
            zone_filter: config.zone_filter(),
            warmed_at: RwLock::new(None),
            rebuild_gate: RwLock::new(()),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Rebuild the cache from the remote service
    ///
    /// Lists zones, adds each one to the cache, then lists and adds each
    /// zone's records. A failing list call aborts the warm-up: zones and
    /// records added before the failure stay cached, the failing zone keeps
    /// no records, and the engine stays not-ready.
    ///
    /// Waits for in-flight set/append/delete batches to finish; new batches
    /// wait until the rebuild is done.
    pub async fn init_cache(&self) -> Result<()> {
        let _rebuild = self.rebuild_gate.write().await;
        *self.warmed_at.write().await = None;
        self.cache.clear().await;

        let provider = self.client.provider_name();
        let remote_zones = self
            .client
            .list_zones(self.zone_filter)
            .await
            .map_err(|e| Error::remote_call("list_zones", "", format!("zones of {provider}"), e))?;

        let mut zones = Vec::with_capacity(remote_zones.len());
        for remote in remote_zones {
            zones.push(self.cache.add_zone(Zone::new(remote.id, remote.name)).await);
        }

        let mut record_count = 0;
        for zone in &zones {
            let records = self
                .client
                .list_records(zone.id())
                .await
                .map_err(|e| Error::remote_call("list_records", zone.name(), zone.name(), e))?;

            debug!("Mirroring {} record(s) for zone {}", records.len(), zone.name());
            record_count += records.len();
            for record in records {
                zone.records().add(record).await;
            }
        }

        *self.warmed_at.write().await = Some(Utc::now());
        info!(
            "Cache initialized from {}: {} zone(s), {} record(s)",
            provider,
            zones.len(),
            record_count
        );
        self.emit_event(ReconcileEvent::CacheWarmed {
            zones: zones.len(),
            records: record_count,
        });

        Ok(())
    }

    /// Add a zone to the cache without a remote round-trip
    ///
    /// Returns the already-cached zone if one with the same normalized name
    /// exists.
    pub async fn register_zone(&self, id: impl Into<String>, name: &str) -> Arc<Zone> {
        let _rebuild = self.rebuild_gate.read().await;
        self.cache.find_or_add(Zone::new(id, name)).await
    }

    /// Whether warm-up has completed
    pub async fn is_ready(&self) -> bool {
        self.warmed_at.read().await.is_some()
    }

    /// Completion time of the last successful warm-up
    pub async fn warmed_at(&self) -> Option<DateTime<Utc>> {
        *self.warmed_at.read().await
    }

    /// The underlying cache (read access for inspection)
    pub fn cache(&self) -> &ZoneStore {
        &self.cache
    }

    async fn ensure_ready(&self) -> Result<()> {
        if self.is_ready().await {
            Ok(())
        } else {
            Err(Error::CacheNotReady)
        }
    }

    /// Resolve a caller-supplied zone name against the cache
    async fn resolve_zone(&self, zone: &str) -> Result<Arc<Zone>> {
        self.ensure_ready().await?;
        let name = normalize_domain(zone);
        self.cache
            .find(&name)
            .await
            .ok_or_else(|| Error::zone_not_found(name))
    }

    /// Look up the single cached record for (name, type)
    ///
    /// More than one match means the remote state is ambiguous for this
    /// pair; that is reported, never resolved by picking one.
    async fn lookup(&self, zone: &Zone, spec: &RecordSpec) -> Result<Option<Record>> {
        let name = normalize_domain(&spec.name);
        let mut matches = zone.records().find_all(&name, &spec.record_type).await;
        match matches.len() {
            0 => {
                debug!("Cache miss for {} in zone {}", spec.label(), zone.name());
                Ok(None)
            }
            1 => {
                debug!("Cache hit for {} in zone {}", spec.label(), zone.name());
                Ok(matches.pop())
            }
            n => Err(Error::conflict(
                zone.name(),
                name,
                &spec.record_type,
                format!("has {n} cached records"),
            )),
        }
    }

    async fn create(&self, zone: &Zone, spec: &RecordSpec) -> Result<Record> {
        let payload = RecordPayload::for_spec(spec)?;

        let mut record = self
            .client
            .create_record(zone.id(), &payload)
            .await
            .map_err(|e| Error::remote_call("create", zone.name(), spec.label(), e))?;
        record.name = normalize_domain(&record.name);

        zone.records().add(record.clone()).await;
        info!("Created {} in zone {}", spec.label(), zone.name());
        self.emit_event(ReconcileEvent::RecordCreated {
            zone: zone.name().to_string(),
            name: record.name.clone(),
            record_type: record.record_type.clone(),
        });

        Ok(record)
    }

    async fn update(&self, zone: &Zone, current: &Record, spec: &RecordSpec) -> Result<Record> {
        let payload = RecordPayload::for_spec(spec)?;

        let mut record = self
            .client
            .update_record(zone.id(), &current.id, &payload)
            .await
            .map_err(|e| Error::remote_call("update", zone.name(), spec.label(), e))?;
        record.name = normalize_domain(&record.name);

        zone.records()
            .replace_by_id(record.clone())
            .await
            .map_err(|_| Error::record_not_found(zone.name(), &current.name, &current.record_type))?;
        info!(
            "Updated {} in zone {} (content: {} -> {})",
            spec.label(),
            zone.name(),
            current.content,
            record.content
        );
        self.emit_event(ReconcileEvent::RecordUpdated {
            zone: zone.name().to_string(),
            name: record.name.clone(),
            record_type: record.record_type.clone(),
        });

        Ok(record)
    }

    async fn delete(&self, zone: &Zone, current: &Record, spec: &RecordSpec) -> Result<()> {
        let deleted_id = self
            .client
            .delete_record(zone.id(), &current.id)
            .await
            .map_err(|e| Error::remote_call("delete", zone.name(), spec.label(), e))?;

        zone.records()
            .delete_by_id(&deleted_id)
            .await
            .map_err(|_| Error::record_not_found(zone.name(), &current.name, &current.record_type))?;
        info!("Deleted {} from zone {}", spec.label(), zone.name());
        self.emit_event(ReconcileEvent::RecordDeleted {
            zone: zone.name().to_string(),
            name: current.name.clone(),
            record_type: current.record_type.clone(),
        });

        Ok(())
    }

    /// Emit a reconciliation event
    fn emit_event(&self, event: ReconcileEvent) {
        // Dropping is preferable to stalling a reconciliation on a slow consumer.
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping reconciliation event");
        }
    }
}

#[async_trait]
impl ZoneLister for ReconciliationEngine {
    async fn list_zones(&self) -> Result<Vec<String>> {
        self.ensure_ready().await?;
        let zones: Vec<String> = self
            .cache
            .list()
            .await
            .iter()
            .map(|z| z.name().to_string())
            .collect();
        debug!("Listed {} cached zone(s)", zones.len());
        Ok(zones)
    }
}

#[async_trait]
impl RecordGetter for ReconciliationEngine {
    async fn get_records(&self, zone: &str) -> Result<Vec<RecordSpec>> {
        let zone = self.resolve_zone(zone).await?;
        let records: Vec<RecordSpec> = zone.records().list().await.iter().map(Record::spec).collect();
        debug!("Retrieved {} record(s) for zone {}", records.len(), zone.name());
        Ok(records)
    }
}

#[async_trait]
impl RecordSetter for ReconciliationEngine {
    async fn set_records(&self, zone: &str, records: &[RecordSpec]) -> Result<Vec<RecordSpec>> {
        let _rebuild = self.rebuild_gate.read().await;
        let zone = self.resolve_zone(zone).await?;
        let mut result = Vec::with_capacity(records.len());

        for desired in records {
            match (self.lookup(&zone, desired).await?, desired.is_removal()) {
                (None, true) => {
                    debug!("{} absent from zone {}, nothing to delete", desired.label(), zone.name());
                    self.emit_event(ReconcileEvent::RecordSkipped {
                        zone: zone.name().to_string(),
                        name: normalize_domain(&desired.name),
                        record_type: desired.record_type.clone(),
                    });
                }
                (None, false) => {
                    let created = self.create(&zone, desired).await?;
                    result.push(created.spec());
                }
                (Some(current), true) => {
                    self.delete(&zone, &current, desired).await?;
                }
                (Some(current), false) => {
                    let updated = self.update(&zone, &current, desired).await?;
                    result.push(updated.spec());
                }
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl RecordAppender for ReconciliationEngine {
    async fn append_records(&self, zone: &str, records: &[RecordSpec]) -> Result<Vec<RecordSpec>> {
        let _rebuild = self.rebuild_gate.read().await;
        let zone = self.resolve_zone(zone).await?;
        let mut result = Vec::with_capacity(records.len());

        for record in records {
            if let Some(existing) = self.lookup(&zone, record).await? {
                return Err(Error::conflict(
                    zone.name(),
                    existing.name,
                    &existing.record_type,
                    "already exists",
                ));
            }
            let created = self.create(&zone, record).await?;
            result.push(created.spec());
        }

        Ok(result)
    }
}

#[async_trait]
impl RecordDeleter for ReconciliationEngine {
    async fn delete_records(&self, zone: &str, records: &[RecordSpec]) -> Result<Vec<RecordSpec>> {
        let _rebuild = self.rebuild_gate.read().await;
        let zone = self.resolve_zone(zone).await?;
        let mut result = Vec::with_capacity(records.len());

        for requested in records {
            let current = self.lookup(&zone, requested).await?.ok_or_else(|| {
                Error::record_not_found(
                    zone.name(),
                    normalize_domain(&requested.name),
                    &requested.record_type,
                )
            })?;
            self.delete(&zone, &current, requested).await?;
            result.push(requested.clone());
        }

        Ok(result)
    }
}
