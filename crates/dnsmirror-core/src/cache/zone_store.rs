// # Zone Store
//
// The cache root: an ordered collection of zones, each owning one
// `RecordStore`.
//
// ## Locking
//
// The zone list has its own `RwLock`. Zones are handed out as `Arc<Zone>`
// so a caller can drop the zone-list lock before touching the zone's
// records; record locks never nest inside the zone-list lock.
//
// ## Lookup keys
//
// `find` compares names byte-for-byte. Callers normalize the query with
// `normalize_domain` first.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::RecordStore;
use crate::normalize::normalize_domain;

/// A cached zone
#[derive(Debug)]
pub struct Zone {
    id: String,
    name: String,
    records: RecordStore,
}

impl Zone {
    /// Create an empty zone
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            records: RecordStore::new(),
        }
    }

    /// Remote identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Normalized zone name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The zone's records
    pub fn records(&self) -> &RecordStore {
        &self.records
    }
}

/// Lock-protected collection of zones
#[derive(Debug, Default)]
pub struct ZoneStore {
    zones: RwLock<Vec<Arc<Zone>>>,
}

impl ZoneStore {
    /// Create an empty zone store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a zone, normalizing its name, and return a handle to it
    pub async fn add_zone(&self, mut zone: Zone) -> Arc<Zone> {
        zone.name = normalize_domain(&zone.name);
        let zone = Arc::new(zone);
        self.zones.write().await.push(Arc::clone(&zone));
        zone
    }

    /// The cached zone with `zone`'s normalized name, adding `zone` if absent
    ///
    /// The lookup and the insert happen under one write lock.
    pub async fn find_or_add(&self, mut zone: Zone) -> Arc<Zone> {
        zone.name = normalize_domain(&zone.name);
        let mut zones = self.zones.write().await;
        if let Some(existing) = zones.iter().find(|z| z.name == zone.name) {
            return Arc::clone(existing);
        }
        let zone = Arc::new(zone);
        zones.push(Arc::clone(&zone));
        zone
    }

    /// Snapshot of all zones in insertion order
    pub async fn list(&self) -> Vec<Arc<Zone>> {
        self.zones.read().await.clone()
    }

    /// First zone whose name equals `name`
    ///
    /// `name` must already be normalized.
    pub async fn find(&self, name: &str) -> Option<Arc<Zone>> {
        let guard = self.zones.read().await;
        guard.iter().find(|z| z.name == name).cloned()
    }

    /// Number of cached zones
    pub async fn len(&self) -> usize {
        self.zones.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.zones.read().await.is_empty()
    }

    /// Drop every zone (and with them their records)
    pub async fn clear(&self) {
        let zones = std::mem::take(&mut *self.zones.write().await);
        // Handles still held by in-flight operations must not keep serving stale records.
        for zone in zones {
            zone.records.clear().await;
        }
    }
}
