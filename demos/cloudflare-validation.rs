// # Cloudflare Client Real Environment Validation Tool
//
// Exercises the Cloudflare client and the reconciliation engine against the
// real Cloudflare API: warm the cache, create a TXT record, update it, then
// remove it again.
//
// ## Usage
//
// ```bash
// # Dry-run mode (default - safe)
// CLOUDFLARE_API_TOKEN=your_token \
// DNSMIRROR_ZONE=example.com \
// cargo run -p dnsmirror-demos --bin cloudflare_validation
//
// # Live mode (makes actual changes!)
// DNSMIRROR_MODE=live \
// CLOUDFLARE_API_TOKEN=your_token \
// DNSMIRROR_ZONE=example.com \
// cargo run -p dnsmirror-demos --bin cloudflare_validation
// ```
//
// ## Environment Variables
//
// Required:
// - `CLOUDFLARE_API_TOKEN`: Cloudflare API token
// - `DNSMIRROR_ZONE`: Zone to test in (e.g., "example.com")
//
// Optional:
// - `DNSMIRROR_RECORD_NAME`: Record to create (default: `_dnsmirror-validation.<zone>`)
// - `DNSMIRROR_MODE`: "dry-run" or "live" (default: dry-run)

use dnsmirror_core::{
    EngineConfig, ReconciliationEngine, RecordGetter, RecordSetter, RecordSpec, ZoneLister,
};
use dnsmirror_provider_cloudflare::CloudflareClient;
use std::env;
use std::process::ExitCode;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("✗ Validation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("=== Cloudflare Client Real Environment Validation ===");

    let api_token = env::var("CLOUDFLARE_API_TOKEN")
        .map_err(|_| "CLOUDFLARE_API_TOKEN environment variable is required")?;
    let zone = env::var("DNSMIRROR_ZONE")
        .map_err(|_| "DNSMIRROR_ZONE environment variable is required")?;
    let record_name = env::var("DNSMIRROR_RECORD_NAME")
        .unwrap_or_else(|_| format!("_dnsmirror-validation.{}", zone));

    let mode = env::var("DNSMIRROR_MODE").unwrap_or_else(|_| "dry-run".to_string());
    let dry_run = mode.to_lowercase() != "live";

    if dry_run {
        tracing::warn!("Running in DRY-RUN mode - no changes will be made");
    } else {
        tracing::warn!("Running in LIVE mode - will make actual DNS changes!");
    }

    tracing::info!("Configuration:");
    tracing::info!("  Zone: {}", zone);
    tracing::info!("  Record: {} (TXT)", record_name);
    tracing::info!("  Mode: {}", mode);

    tracing::info!("--- Step 1: Creating Cloudflare client ---");
    let client = CloudflareClient::new(api_token, None, dry_run)?;
    tracing::info!("Client created (API token not shown for security)");

    tracing::info!("--- Step 2: Warming cache ---");
    let (engine, _events) = ReconciliationEngine::new(Box::new(client), &EngineConfig::default())?;
    engine.init_cache().await?;

    let zones = engine.list_zones().await?;
    tracing::info!("✓ Mirrored {} zone(s)", zones.len());
    let existing = engine.get_records(&zone).await?;
    tracing::info!("✓ Zone {} has {} record(s)", zone, existing.len());

    tracing::info!("--- Step 3: Creating TXT record ---");
    let created = engine
        .set_records(&zone, &[RecordSpec::new(&record_name, "TXT", "dnsmirror validation 1", TTL)])
        .await?;
    tracing::info!("✓ Set returned {:?}", created);

    tracing::info!("--- Step 4: Updating TXT record ---");
    let updated = engine
        .set_records(&zone, &[RecordSpec::new(&record_name, "TXT", "dnsmirror validation 2", TTL)])
        .await?;
    tracing::info!("✓ Set returned {:?}", updated);

    tracing::info!("--- Step 5: Removing TXT record (empty content) ---");
    engine
        .set_records(&zone, &[RecordSpec::removal(&record_name, "TXT")])
        .await?;
    let remaining = engine.get_records(&zone).await?;
    if remaining.iter().any(|r| r.name == record_name.to_lowercase()) {
        return Err("record still cached after removal".into());
    }
    tracing::info!("✓ Record removed");

    tracing::info!("=== Validation Summary ===");
    tracing::info!("✓ Client creation: OK");
    tracing::info!("✓ Warm-up: OK");
    tracing::info!("✓ Create / update / remove: OK");

    if dry_run {
        tracing::info!("No changes were made to DNS records. To make actual changes, set DNSMIRROR_MODE=live");
    }

    Ok(())
}
