//! Record and zone value types
//!
//! - [`RecordType`]: open, string-keyed record type tag
//! - [`RecordSpec`]: caller-facing record (desired state in, results out)
//! - [`Record`]: a cached record carrying its remote identifier
//! - [`RecordPayload`]: typed create/update payload, only built for supported types
//! - [`RemoteZone`] / [`ZoneFilter`]: zone listing shapes

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::normalize::normalize_domain;

/// DNS record type
///
/// New tags may appear at any time, so unknown tags are kept verbatim
/// (upper-cased) in [`RecordType::Other`] rather than rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    Aaaa,
    /// CNAME record (alias)
    Cname,
    /// TXT record (text)
    Txt,
    /// Any other tag
    Other(String),
}

impl RecordType {
    /// Canonical tag as used on the wire
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Txt => "TXT",
            RecordType::Other(tag) => tag,
        }
    }
}

impl FromStr for RecordType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let tag = s.trim().to_uppercase();
        Ok(match tag.as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            "TXT" => RecordType::Txt,
            _ => RecordType::Other(tag),
        })
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        RecordType::from(value.to_string())
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record as seen by callers
///
/// Used both for desired state (where empty `content` means "this record
/// should not exist") and for results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSpec {
    /// Record name (fully qualified)
    pub name: String,
    /// Record type tag
    pub record_type: RecordType,
    /// Record value
    pub content: String,
    /// Time-to-live
    pub ttl: Duration,
}

impl RecordSpec {
    /// Create a new record description
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<RecordType>,
        content: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            content: content.into(),
            ttl,
        }
    }

    /// Desired-state entry asking for the (name, type) pair to be absent
    pub fn removal(name: impl Into<String>, record_type: impl Into<RecordType>) -> Self {
        Self::new(name, record_type, "", Duration::ZERO)
    }

    /// Whether this desired-state entry requests deletion
    pub fn is_removal(&self) -> bool {
        self.content.is_empty()
    }

    /// `name (TYPE)` label used in logs and error context
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.record_type)
    }
}

/// A cached record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Remote identifier, empty until the first successful remote create
    pub id: String,
    /// Normalized record name
    pub name: String,
    /// Record type tag
    pub record_type: RecordType,
    /// Record value
    pub content: String,
    /// Time-to-live
    pub ttl: Duration,
}

impl Record {
    /// Create a new record
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<RecordType>,
        content: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            record_type: record_type.into(),
            content: content.into(),
            ttl,
        }
    }

    /// Whether this record answers the (name, type) query
    ///
    /// `name` must already be normalized.
    pub fn matches(&self, name: &str, record_type: &RecordType) -> bool {
        self.name == name && &self.record_type == record_type
    }

    /// Caller-facing representation (drops the remote identifier)
    pub fn spec(&self) -> RecordSpec {
        RecordSpec {
            name: self.name.clone(),
            record_type: self.record_type.clone(),
            content: self.content.clone(),
            ttl: self.ttl,
        }
    }
}

/// Create/update payload for a supported record type
///
/// Built through record-type dispatch; there is no way to obtain a payload
/// for [`RecordType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPayload {
    #[serde(rename = "type")]
    record_type: RecordType,
    name: String,
    content: String,
    #[serde(serialize_with = "serialize_ttl")]
    ttl: Duration,
}

/// Smallest TTL the remote service accepts; `1` means "automatic"
pub const MIN_TTL_SECS: u64 = 1;

fn serialize_ttl<S: serde::Serializer>(ttl: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(ttl.as_secs().max(MIN_TTL_SECS))
}

impl RecordPayload {
    /// Map a desired record onto a payload, dispatching on its type
    pub fn for_spec(spec: &RecordSpec) -> Result<Self> {
        match spec.record_type {
            RecordType::A | RecordType::Aaaa | RecordType::Cname | RecordType::Txt => Ok(Self {
                record_type: spec.record_type.clone(),
                name: spec.name.clone(),
                content: spec.content.clone(),
                ttl: spec.ttl,
            }),
            RecordType::Other(ref tag) => Err(Error::unsupported_type(tag)),
        }
    }

    /// Record type tag
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Record name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record value
    pub fn content(&self) -> &str {
        &self.content
    }

    /// TTL in whole seconds as sent on the wire
    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs().max(MIN_TTL_SECS)
    }

    /// The record the remote service would hold after applying this payload
    pub fn to_record(&self, id: impl Into<String>) -> Record {
        Record::new(
            id,
            normalize_domain(&self.name),
            self.record_type.clone(),
            self.content.clone(),
            Duration::from_secs(self.ttl_secs()),
        )
    }
}

/// A zone as listed by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteZone {
    /// Remote identifier
    pub id: String,
    /// Zone name as returned by the service (not yet normalized)
    pub name: String,
    /// Remote status (e.g. "active", "pending")
    pub status: String,
}

/// Filter applied when listing zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneFilter {
    /// Only list zones the remote service reports as active
    pub active_only: bool,
}

impl ZoneFilter {
    /// Filter that lists only active zones
    pub fn active() -> Self {
        Self { active_only: true }
    }

    /// Filter that lists zones in any status
    pub fn any() -> Self {
        Self { active_only: false }
    }
}
