// # dnsmirror-core
//
// Desired-state DNS record management over a local mirror of a remote
// authoritative DNS service.
//
// ## Architecture Overview
//
// - **normalize_domain**: Canonical form of domain names used as cache keys
// - **RecordStore / ZoneStore**: Lock-protected zone and record mirror
// - **ReconciliationEngine**: Warm-up plus the list/get/set/append/delete
//   operations that drive remote calls and write results back
// - **RemoteDnsClient**: Trait for the remote service's API
// - **ProviderRegistry**: Plugin-based registry of remote client factories
//
// ## Design Principles
//
// 1. **Mirror, not source of truth**: The cache is rebuilt at startup and
//    updated only from remote results
// 2. **Empty content means delete**: Desired state expresses absence too
// 3. **Fail fast, converge on retry**: Batches stop at the first error and
//    are safe to re-run
// 4. **Fine-grained locking**: Zone list and each zone's records lock
//    independently; no lock is held across a remote call

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod record;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use cache::{RecordStore, Zone, ZoneStore};
pub use config::{EngineConfig, MirrorConfig, ProviderConfig};
pub use engine::{ReconcileEvent, ReconciliationEngine};
pub use error::{Error, Result};
pub use normalize::normalize_domain;
pub use record::{Record, RecordPayload, RecordSpec, RecordType, RemoteZone, ZoneFilter};
pub use registry::ProviderRegistry;
pub use traits::{
    RecordAppender, RecordDeleter, RecordGetter, RecordSetter, RemoteDnsClient,
    RemoteDnsClientFactory, ZoneLister,
};
