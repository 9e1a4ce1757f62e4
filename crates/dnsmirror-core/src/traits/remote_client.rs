// # Remote DNS Client Trait
//
// Defines the interface to the authoritative DNS service the cache mirrors.
//
// ## Implementations
//
// - Cloudflare: `dnsmirror-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsmirror_core::{RecordPayload, RecordSpec, RemoteDnsClient, ZoneFilter};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let client = /* RemoteDnsClient implementation */;
//
//     for zone in client.list_zones(ZoneFilter::active()).await? {
//         let spec = RecordSpec::new(format!("www.{}", zone.name), "A", "192.0.2.1", ttl);
//         client.create_record(&zone.id, &RecordPayload::for_spec(&spec)?).await?;
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::{Record, RecordPayload, RemoteZone, ZoneFilter};

/// Trait for remote DNS service clients
///
/// One method per remote call. The reconciliation engine decides which calls
/// to make; a client only performs them.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks. The
/// engine issues calls for different zones concurrently.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Follow pagination within a single list call
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failure is final for the record in progress)
/// - ❌ Cache zones or records (owned by `ZoneStore`)
/// - ❌ Decide whether a create/update/delete is needed (owned by `ReconciliationEngine`)
/// - ❌ Spawn tasks or threads
///
/// ## Cancellation
///
/// Every method must be cancel-safe from the engine's point of view: if the
/// returned future is dropped, the engine commits nothing for that call.
#[async_trait]
pub trait RemoteDnsClient: Send + Sync {
    /// List zones
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<RemoteZone>)`: Every zone matching `filter`, across all pages
    /// - `Err(Error)`: Transport, authorization or provider failure
    async fn list_zones(&self, filter: ZoneFilter) -> Result<Vec<RemoteZone>, crate::Error>;

    /// List every record of a zone
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Remote zone identifier
    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>, crate::Error>;

    /// Create a record
    ///
    /// # Returns
    ///
    /// The record as stored remotely, with its remote-assigned `id`.
    async fn create_record(
        &self,
        zone_id: &str,
        payload: &RecordPayload,
    ) -> Result<Record, crate::Error>;

    /// Overwrite an existing record
    ///
    /// # Returns
    ///
    /// The record as stored remotely; its `id` equals `record_id`.
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<Record, crate::Error>;

    /// Delete a record
    ///
    /// # Returns
    ///
    /// The identifier of the deleted record.
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<String, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing remote clients from configuration
pub trait RemoteDnsClientFactory: Send + Sync {
    /// Create a RemoteDnsClient instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed RemoteDnsClient trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn RemoteDnsClient>, crate::Error>;
}
