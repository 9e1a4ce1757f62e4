//! Error types for the DNS mirror
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for mirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DNS mirror
#[derive(Error, Debug)]
pub enum Error {
    /// The zone is not present in the cache
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// No cached record matches the requested (name, type) pair
    #[error("Record not found in zone {zone}: {name} ({record_type})")]
    RecordNotFound {
        /// Zone name
        zone: String,
        /// Record name
        name: String,
        /// Record type tag
        record_type: String,
    },

    /// Duplicate record on append, or several cached matches for one (name, type) pair
    #[error("Conflict in zone {zone}: {name} ({record_type}) {reason}")]
    Conflict {
        /// Zone name
        zone: String,
        /// Record name
        name: String,
        /// Record type tag
        record_type: String,
        /// What made the state ambiguous
        reason: String,
    },

    /// Record type tag without a create/update mapping
    #[error("Unsupported record type: {0}")]
    UnsupportedType(String),

    /// A remote call failed while reconciling `target` in `zone`
    #[error("Remote {operation} failed for {target}{}: {source}", in_zone(.zone))]
    RemoteCall {
        /// Remote operation name (create, update, delete, list_records, list_zones)
        operation: &'static str,
        /// Zone name; empty for calls not scoped to a zone
        zone: String,
        /// Record (or zone) the call was issued for
        target: String,
        /// Underlying transport or provider error
        #[source]
        source: Box<Error>,
    },

    /// An operation was invoked before the cache warm-up completed
    #[error("Cache not ready: warm-up has not completed")]
    CacheNotReady,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Remote resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "zone not found" error
    pub fn zone_not_found(zone: impl Into<String>) -> Self {
        Self::ZoneNotFound(zone.into())
    }

    /// Create a "record not found" error
    pub fn record_not_found(
        zone: impl Into<String>,
        name: impl Into<String>,
        record_type: impl ToString,
    ) -> Self {
        Self::RecordNotFound {
            zone: zone.into(),
            name: name.into(),
            record_type: record_type.to_string(),
        }
    }

    /// Create a conflict error
    pub fn conflict(
        zone: impl Into<String>,
        name: impl Into<String>,
        record_type: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            zone: zone.into(),
            name: name.into(),
            record_type: record_type.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported record type error
    pub fn unsupported_type(tag: impl ToString) -> Self {
        Self::UnsupportedType(tag.to_string())
    }

    /// Wrap a remote failure with the zone/record it was issued for
    pub fn remote_call(
        operation: &'static str,
        zone: impl Into<String>,
        target: impl Into<String>,
        source: Error,
    ) -> Self {
        Self::RemoteCall {
            operation,
            zone: zone.into(),
            target: target.into(),
            source: Box::new(source),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The underlying error of a [`Error::RemoteCall`], or `self`
    pub fn root(&self) -> &Error {
        match self {
            Self::RemoteCall { source, .. } => source.root(),
            other => other,
        }
    }
}

fn in_zone(zone: &str) -> String {
    if zone.is_empty() {
        String::new()
    } else {
        format!(" in zone {zone}")
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
