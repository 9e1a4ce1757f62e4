//! Configuration types for the DNS mirror
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

use crate::record::ZoneFilter;

/// Main mirror configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Remote DNS provider configuration
    pub provider: ProviderConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl MirrorConfig {
    /// Create a new configuration for the given provider with default engine settings
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Remote DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// Account ID (optional, narrows zone listing to one account)
        #[serde(default)]
        account_id: Option<String>,
        /// List for real, but only log create/update/delete
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

// Keeps the API token out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare {
                account_id,
                dry_run,
                ..
            } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("account_id", account_id)
                .field("dry_run", dry_run)
                .finish(),
            ProviderConfig::Custom { factory, config } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .field("config", config)
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { api_token, .. } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Cloudflare {
            api_token: String::new(),
            account_id: None,
            dry_run: false,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the reconciliation event channel
    ///
    /// When full, new events are dropped (with a warning log) rather than
    /// blocking a reconciliation.
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Mirror zones in every remote status, not only active ones
    #[serde(default)]
    pub include_inactive_zones: bool,

    /// Upper bound on the startup warm-up (in seconds)
    #[serde(default = "default_warmup_timeout_secs")]
    pub warmup_timeout_secs: u64,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        if self.warmup_timeout_secs == 0 {
            return Err(crate::Error::config("Warm-up timeout must be > 0"));
        }
        Ok(())
    }

    /// Zone filter used during warm-up
    pub fn zone_filter(&self) -> ZoneFilter {
        if self.include_inactive_zones {
            ZoneFilter::any()
        } else {
            ZoneFilter::active()
        }
    }

    /// Warm-up timeout as a duration
    pub fn warmup_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.warmup_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
            include_inactive_zones: false,
            warmup_timeout_secs: default_warmup_timeout_secs(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_warmup_timeout_secs() -> u64 {
    60
}
