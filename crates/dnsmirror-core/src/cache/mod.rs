// # Zone/Record Cache
//
// Local mirror of the remote service's zones and records. It is rebuilt at
// startup and kept write-through by the reconciliation engine; it is never
// the source of truth and is not persisted.

pub mod record_store;
pub mod zone_store;

pub use record_store::RecordStore;
pub use zone_store::{Zone, ZoneStore};
