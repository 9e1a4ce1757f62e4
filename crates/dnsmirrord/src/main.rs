// # dnsmirrord - DNS Mirror Command-Line Front End
//
// This binary is a THIN integration layer over dnsmirror-core:
// - DO NOT add reconciliation, caching or retry logic here
// - All record logic lives in `ReconciliationEngine`
// - Provider configuration comes from environment variables ONLY
//
// dnsmirrord is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering remote clients and warming the cache
// 4. Running one operation and printing its result
//
// ## Configuration
//
// ### Remote Provider
// - `DNSMIRROR_PROVIDER_TYPE`: Provider type (cloudflare)
// - `DNSMIRROR_PROVIDER_API_TOKEN`: API token (falls back to `CLOUDFLARE_API_TOKEN`)
// - `DNSMIRROR_ACCOUNT_ID`: Account ID (optional)
// - `DNSMIRROR_MODE`: `live` (default) or `dry-run`
//
// ### Engine
// - `DNSMIRROR_INCLUDE_INACTIVE_ZONES`: Mirror zones in any status (default false)
// - `DNSMIRROR_WARMUP_TIMEOUT_SECS`: Upper bound on cache warm-up (default 60)
//
// ### Logging
// - `DNSMIRROR_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// ## Example
//
// ```bash
// export DNSMIRROR_PROVIDER_API_TOKEN=your_token
// export DNSMIRROR_MODE=dry-run
//
// dnsmirrord zones
// dnsmirrord records example.com
// dnsmirrord set example.com www.example.com A 192.0.2.10 --ttl 300
// dnsmirrord set example.com old.example.com A          # empty content deletes
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dnsmirror_core::{
    EngineConfig, MirrorConfig, ProviderConfig, ProviderRegistry, ReconcileEvent,
    ReconciliationEngine, RecordAppender, RecordDeleter, RecordGetter, RecordSetter, RecordSpec,
    ZoneLister,
};
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Operation succeeded
/// - 1: Configuration or startup error (including cache warm-up)
/// - 2: Runtime error (the requested operation failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsMirrorExitCode {
    /// Operation succeeded
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The requested operation failed
    RuntimeError = 2,
}

impl From<DnsMirrorExitCode> for ExitCode {
    fn from(code: DnsMirrorExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Desired-state DNS record management against a mirrored remote service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log intended remote changes instead of making them
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// List mirrored zones
    Zones,

    /// List the records of a zone
    Records {
        /// Zone name
        zone: String,
    },

    /// Create, update or (with empty content) delete one record
    Set {
        zone: String,
        name: String,
        record_type: String,
        /// Record value; omit to request deletion
        #[arg(default_value = "")]
        content: String,
        /// Time-to-live in seconds
        #[arg(long, default_value_t = 300)]
        ttl: u64,
    },

    /// Create a record that must not exist yet
    Append {
        zone: String,
        name: String,
        record_type: String,
        content: String,
        /// Time-to-live in seconds
        #[arg(long, default_value_t = 300)]
        ttl: u64,
    },

    /// Delete an existing record
    Delete {
        zone: String,
        name: String,
        record_type: String,
        #[arg(default_value = "")]
        content: String,
    },
}

impl Command {
    fn record(name: &str, record_type: &str, content: &str, ttl: u64) -> RecordSpec {
        RecordSpec::new(name, record_type, content, Duration::from_secs(ttl))
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    provider_type: String,
    provider_api_token: String,
    account_id: Option<String>,
    mode: String,
    include_inactive_zones: bool,
    warmup_timeout_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider_api_token = lookup("DNSMIRROR_PROVIDER_API_TOKEN")
            .or_else(|| lookup("CLOUDFLARE_API_TOKEN"))
            .context(
                "DNSMIRROR_PROVIDER_API_TOKEN is required. \
                Set it via: export DNSMIRROR_PROVIDER_API_TOKEN=your_token",
            )?;

        let include_inactive_zones = match lookup("DNSMIRROR_INCLUDE_INACTIVE_ZONES") {
            Some(value) => parse_bool(&value)
                .with_context(|| format!("DNSMIRROR_INCLUDE_INACTIVE_ZONES: invalid value '{}'", value))?,
            None => false,
        };

        let warmup_timeout_secs = match lookup("DNSMIRROR_WARMUP_TIMEOUT_SECS") {
            Some(value) => value
                .parse()
                .with_context(|| format!("DNSMIRROR_WARMUP_TIMEOUT_SECS: invalid value '{}'", value))?,
            None => EngineConfig::default().warmup_timeout_secs,
        };

        Ok(Self {
            provider_type: lookup("DNSMIRROR_PROVIDER_TYPE")
                .unwrap_or_else(|| "cloudflare".to_string()),
            provider_api_token,
            account_id: lookup("DNSMIRROR_ACCOUNT_ID").filter(|s| !s.is_empty()),
            mode: lookup("DNSMIRROR_MODE").unwrap_or_else(|| "live".to_string()),
            include_inactive_zones,
            warmup_timeout_secs,
            log_level: lookup("DNSMIRROR_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.provider_api_token.is_empty() {
            anyhow::bail!("DNSMIRROR_PROVIDER_API_TOKEN cannot be empty");
        }

        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.provider_api_token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower == "token"
        {
            anyhow::bail!(
                "DNSMIRROR_PROVIDER_API_TOKEN appears to be a placeholder. \
                Use an actual API token from your DNS provider."
            );
        }

        match self.provider_type.as_str() {
            "cloudflare" => {}
            _ => anyhow::bail!(
                "DNSMIRROR_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: cloudflare",
                self.provider_type
            ),
        }

        match self.mode.as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "DNSMIRROR_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        if !(1..=3600).contains(&self.warmup_timeout_secs) {
            anyhow::bail!(
                "DNSMIRROR_WARMUP_TIMEOUT_SECS must be between 1 and 3600 seconds. Got: {}",
                self.warmup_timeout_secs
            );
        }

        parse_log_level(&self.log_level)?;

        Ok(())
    }

    /// Build the library configuration
    fn to_mirror_config(&self, force_dry_run: bool) -> MirrorConfig {
        MirrorConfig {
            provider: ProviderConfig::Cloudflare {
                api_token: self.provider_api_token.clone(),
                account_id: self.account_id.clone(),
                dry_run: force_dry_run || self.mode == "dry-run",
            },
            engine: EngineConfig {
                include_inactive_zones: self.include_inactive_zones,
                warmup_timeout_secs: self.warmup_timeout_secs,
                ..EngineConfig::default()
            },
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DNSMIRROR_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                DnsMirrorExitCode::ConfigError.into()
            } else {
                DnsMirrorExitCode::Success.into()
            };
        }
    };

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DnsMirrorExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DnsMirrorExitCode::ConfigError.into();
    }

    // Initialize tracing; logs go to stderr so stdout carries only results
    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsMirrorExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsMirrorExitCode::RuntimeError.into();
        }
    };

    let mirror_config = config.to_mirror_config(cli.dry_run);

    rt.block_on(async {
        let engine = match start(&mirror_config).await {
            Ok(engine) => engine,
            Err(e) => {
                error!("Startup failed: {:#}", e);
                return DnsMirrorExitCode::ConfigError;
            }
        };

        match execute(&engine, &cli.command).await {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
                DnsMirrorExitCode::Success
            }
            Err(e) => {
                error!("Operation failed: {:#}", e);
                DnsMirrorExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Build the engine and warm its cache
async fn start(config: &MirrorConfig) -> Result<ReconciliationEngine> {
    config.validate()?;

    let registry = ProviderRegistry::new();

    #[cfg(feature = "cloudflare")]
    {
        debug!("Registering Cloudflare provider");
        dnsmirror_provider_cloudflare::register(&registry);
    }

    let client = registry
        .create_client(&config.provider)
        .with_context(|| format!("Failed to create {} client", config.provider.type_name()))?;
    let (engine, events) = ReconciliationEngine::new(client, &config.engine)?;
    tokio::spawn(log_events(events));

    info!("Warming cache from {}", config.provider.type_name());
    tokio::time::timeout(config.engine.warmup_timeout(), engine.init_cache())
        .await
        .with_context(|| {
            format!(
                "Cache warm-up timed out after {:?}",
                config.engine.warmup_timeout()
            )
        })?
        .context("Cache warm-up failed")?;

    Ok(engine)
}

/// Run one operation and render its result, one line per item
async fn execute(engine: &ReconciliationEngine, command: &Command) -> Result<Vec<String>> {
    let records = match command {
        Command::Zones => return Ok(engine.list_zones().await?),
        Command::Records { zone } => engine.get_records(zone).await?,
        Command::Set {
            zone,
            name,
            record_type,
            content,
            ttl,
        } => {
            engine
                .set_records(zone, &[Command::record(name, record_type, content, *ttl)])
                .await?
        }
        Command::Append {
            zone,
            name,
            record_type,
            content,
            ttl,
        } => {
            engine
                .append_records(zone, &[Command::record(name, record_type, content, *ttl)])
                .await?
        }
        Command::Delete {
            zone,
            name,
            record_type,
            content,
        } => {
            engine
                .delete_records(zone, &[Command::record(name, record_type, content, 0)])
                .await?
        }
    };

    Ok(records.iter().map(format_record).collect())
}

fn format_record(record: &RecordSpec) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        record.name,
        record.record_type,
        record.ttl.as_secs(),
        record.content
    )
}

/// Log reconciliation events until the engine is dropped
async fn log_events(mut events: mpsc::Receiver<ReconcileEvent>) {
    while let Some(event) = events.recv().await {
        debug!("Reconcile event: {:?}", event);
    }
}
