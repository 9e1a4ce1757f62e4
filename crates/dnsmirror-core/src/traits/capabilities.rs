// # Record Management Capabilities
//
// The operations a host plugin can invoke. Each capability is its own trait
// so a host can depend on exactly the subset it uses (for example an ACME
// DNS-01 solver only needs `RecordAppender` and `RecordDeleter`).
//
// `ReconciliationEngine` implements all five.

use async_trait::async_trait;

use crate::record::RecordSpec;

/// Lists the zones the mirror knows about
#[async_trait]
pub trait ZoneLister: Send + Sync {
    /// Names of all cached zones
    async fn list_zones(&self) -> Result<Vec<String>, crate::Error>;
}

/// Reads a zone's records
#[async_trait]
pub trait RecordGetter: Send + Sync {
    /// All cached records of `zone`
    async fn get_records(&self, zone: &str) -> Result<Vec<RecordSpec>, crate::Error>;
}

/// Converges records to a desired state (upsert, or delete on empty content)
#[async_trait]
pub trait RecordSetter: Send + Sync {
    /// Reconcile each desired record; returns the records that now exist
    async fn set_records(
        &self,
        zone: &str,
        records: &[RecordSpec],
    ) -> Result<Vec<RecordSpec>, crate::Error>;
}

/// Creates records that must not exist yet
#[async_trait]
pub trait RecordAppender: Send + Sync {
    /// Create each record; fails on the first (name, type) already present
    async fn append_records(
        &self,
        zone: &str,
        records: &[RecordSpec],
    ) -> Result<Vec<RecordSpec>, crate::Error>;
}

/// Deletes existing records
#[async_trait]
pub trait RecordDeleter: Send + Sync {
    /// Delete each record; returns the descriptors that were requested
    async fn delete_records(
        &self,
        zone: &str,
        records: &[RecordSpec],
    ) -> Result<Vec<RecordSpec>, crate::Error>;
}
