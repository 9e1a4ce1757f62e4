// # Record Store
//
// Per-zone ordered collection of cached records.
//
// ## Locking
//
// Each store owns its own `tokio::sync::RwLock`, independent of the zone
// list and of every other zone's records. Lookups take the shared lock,
// structural changes (add, delete, replace) take the exclusive lock.
//
// ## Uniqueness
//
// The store does NOT reject a second record for an existing (name, type)
// pair. Warm-up must be able to mirror whatever the remote service holds,
// duplicates included; the reconciliation engine detects and reports them.

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::normalize::normalize_domain;
use crate::record::{Record, RecordType};

/// Ordered, lock-protected collection of one zone's records
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<Vec<Record>>,
}

impl RecordStore {
    /// Create an empty record store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records in insertion order
    pub async fn list(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    /// Number of cached records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// First record matching (name, type)
    ///
    /// `name` must already be normalized.
    pub async fn find(&self, name: &str, record_type: &RecordType) -> Option<Record> {
        let guard = self.records.read().await;
        guard.iter().find(|r| r.matches(name, record_type)).cloned()
    }

    /// Every record matching (name, type), in insertion order
    ///
    /// `name` must already be normalized.
    pub async fn find_all(&self, name: &str, record_type: &RecordType) -> Vec<Record> {
        let guard = self.records.read().await;
        guard
            .iter()
            .filter(|r| r.matches(name, record_type))
            .cloned()
            .collect()
    }

    /// Append a record, normalizing its name
    pub async fn add(&self, mut record: Record) {
        record.name = normalize_domain(&record.name);
        self.records.write().await.push(record);
    }

    /// Remove the first record with the given remote identifier
    ///
    /// The order of the remaining records is preserved.
    pub async fn delete_by_id(&self, id: &str) -> Result<Record> {
        let mut guard = self.records.write().await;
        let index = guard
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::not_found(format!("cached record {id}")))?;
        Ok(guard.remove(index))
    }

    /// Replace in place the record whose identifier equals `record.id`
    pub async fn replace_by_id(&self, mut record: Record) -> Result<()> {
        record.name = normalize_domain(&record.name);
        let mut guard = self.records.write().await;
        let slot = guard
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::not_found(format!("cached record {}", record.id)))?;
        *slot = record;
        Ok(())
    }

    /// Drop every record
    pub(crate) async fn clear(&self) {
        self.records.write().await.clear();
    }

    #[cfg(test)]
    pub(crate) fn lock(&self) -> &RwLock<Vec<Record>> {
        &self.records
    }
}
