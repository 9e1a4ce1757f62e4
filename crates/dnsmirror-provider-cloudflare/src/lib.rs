// # Cloudflare Remote Client
//
// This crate provides the Cloudflare API v4 implementation of
// `RemoteDnsClient` for the DNS mirror.
//
// ## Behaviour
//
// - ✅ One logical remote call per trait method (list calls follow pagination)
// - ✅ Full error propagation to the engine, mapped by HTTP status
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Dry-run mode: listing is real, mutations are only logged
// - ❌ NO retry or backoff (a failure is final for the record in progress)
// - ❌ NO caching (zones and records are mirrored by `ZoneStore`)
// - ❌ NO background tasks
//
// ## Trust Level: Untrusted (Remote Client)
//
// The client performs HTTP calls to its own endpoints and parses the
// responses. Deciding which calls to make is owned by
// `ReconciliationEngine`.
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Construction fails with a configuration error if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?status=active&page=N&per_page=50`
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=N&per_page=100`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

mod types;

use async_trait::async_trait;
use dnsmirror_core::config::ProviderConfig;
use dnsmirror_core::traits::{RemoteDnsClient, RemoteDnsClientFactory};
use dnsmirror_core::{Error, Record, RecordPayload, RemoteZone, Result, ZoneFilter};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::types::{CloudflareDeleted, CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest page size the zones endpoint accepts
const ZONES_PER_PAGE: u32 = 50;

/// Page size used when listing DNS records
const RECORDS_PER_PAGE: u32 = 100;

/// Cloudflare remote DNS client
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the client will:
/// - Perform all list requests
/// - Log the intended POST/PUT/DELETE and its payload
/// - Answer mutations locally (creates get a synthetic `dry-run-N` id)
///
/// The engine's cache then reflects the intended state while the remote
/// service stays untouched.
pub struct CloudflareClient {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Account ID (optional, narrows zone listing to one account)
    account_id: Option<String>,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: list for real, skip mutations
    dry_run: bool,

    /// Counter for synthetic record ids handed out in dry-run mode
    dry_run_ids: AtomicU64,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_token", &"<REDACTED>")
            .field("account_id", &self.account_id)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a new Cloudflare client
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    /// - `account_id`: Optional account ID to restrict zone listing
    /// - `dry_run`: If true, list for real but skip create/update/delete
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is empty and [`Error::Http`] if
    /// the HTTP client cannot be built.
    pub fn new(
        api_token: impl Into<String>,
        account_id: Option<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            account_id,
            client,
            dry_run,
            dry_run_ids: AtomicU64::new(0),
        })
    }

    /// Create a new Cloudflare client (production/live mode)
    pub fn new_live(api_token: impl Into<String>, account_id: Option<String>) -> Result<Self> {
        Self::new(api_token, account_id, false)
    }

    /// Create a new Cloudflare client (dry-run mode)
    pub fn new_dry_run(api_token: impl Into<String>, account_id: Option<String>) -> Result<Self> {
        Self::new(api_token, account_id, true)
    }

    /// Whether mutations are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn zones_path(&self, filter: ZoneFilter, page: u32) -> String {
        let mut path = format!("/zones?page={}&per_page={}", page, ZONES_PER_PAGE);
        if filter.active_only {
            path.push_str("&status=active");
        }
        if let Some(ref account_id) = self.account_id {
            path.push_str("&account.id=");
            path.push_str(account_id);
        }
        path
    }

    fn records_path(zone_id: &str, page: u32) -> String {
        format!(
            "/zones/{}/dns_records?page={}&per_page={}",
            zone_id, page, RECORDS_PER_PAGE
        )
    }

    fn record_url(zone_id: &str, record_id: &str) -> Result<String> {
        if zone_id.is_empty() || record_id.is_empty() {
            return Err(Error::invalid_input(format!(
                "zone id and record id are required (zone: '{}', record: '{}')",
                zone_id, record_id
            )));
        }
        Ok(format!("{}/zones/{}/dns_records/{}", CLOUDFLARE_API_BASE, zone_id, record_id))
    }

    /// Send an authenticated request and unwrap the API envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<CloudflareResponse<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        tracing::debug!("{} -> HTTP {}", what, status);

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("{} response unreadable: {}", what, e)))?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), what, &body));
        }

        parse_envelope(&body, what)
    }

    /// GET every page of a list endpoint
    async fn get_all<T: DeserializeOwned>(
        &self,
        path_for_page: impl Fn(u32) -> String,
        what: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let url = format!("{}{}", CLOUDFLARE_API_BASE, path_for_page(page));
            tracing::debug!("GET {}", url);

            let envelope = self.send::<Vec<T>>(self.client.get(&url), what).await?;
            let total_pages = envelope.result_info.as_ref().map_or(1, |i| i.total_pages);
            items.extend(envelope.result.unwrap_or_default());

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    fn next_dry_run_id(&self) -> String {
        format!("dry-run-{}", self.dry_run_ids.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Parse a response body into the API envelope, rejecting `success: false`
fn parse_envelope<T: DeserializeOwned>(body: &str, what: &str) -> Result<CloudflareResponse<T>> {
    let envelope: CloudflareResponse<T> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(Error::provider(
            "cloudflare",
            format!("{} rejected: {}", what, envelope.first_error()),
        ));
    }
    Ok(envelope)
}

/// Map a non-2xx HTTP status onto the mirror's error taxonomy
fn status_error(status: u16, what: &str, body: &str) -> Error {
    match status {
        401 | 403 => Error::auth(format!(
            "{}: invalid API token or insufficient permissions (HTTP {})",
            what, status
        )),
        404 => Error::not_found(format!("{}: HTTP 404", what)),
        429 => Error::rate_limited(format!("{}: HTTP 429", what)),
        _ => Error::provider("cloudflare", format!("{} failed: HTTP {} - {}", what, status, body)),
    }
}

fn into_record(record: CloudflareDnsRecord) -> Record {
    Record::new(
        record.id,
        record.name,
        record.record_type,
        record.content,
        Duration::from_secs(record.ttl),
    )
}

#[async_trait]
impl RemoteDnsClient for CloudflareClient {
    async fn list_zones(&self, filter: ZoneFilter) -> Result<Vec<RemoteZone>> {
        let zones: Vec<CloudflareZone> = self
            .get_all(|page| self.zones_path(filter, page), "list zones")
            .await?;

        tracing::debug!("Cloudflare listed {} zone(s)", zones.len());
        Ok(zones
            .into_iter()
            .map(|z| RemoteZone {
                id: z.id,
                name: z.name,
                status: z.status,
            })
            .collect())
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        let records: Vec<CloudflareDnsRecord> = self
            .get_all(|page| Self::records_path(zone_id, page), "list records")
            .await?;

        Ok(records.into_iter().map(into_record).collect())
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<Record> {
        let url = format!("{}/zones/{}/dns_records", CLOUDFLARE_API_BASE, zone_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST request to {} with payload: {}",
                url,
                serde_json::to_string(payload)?
            );
            return Ok(payload.to_record(self.next_dry_run_id()));
        }

        let envelope = self
            .send::<CloudflareDnsRecord>(self.client.post(&url).json(payload), "create record")
            .await?;
        let record = envelope
            .result
            .ok_or_else(|| Error::provider("cloudflare", "create record: response has no result"))?;

        tracing::info!("Cloudflare created {} {} ({})", record.record_type, record.name, record.id);
        Ok(into_record(record))
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<Record> {
        let url = Self::record_url(zone_id, record_id)?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(payload)?
            );
            return Ok(payload.to_record(record_id));
        }

        let envelope = self
            .send::<CloudflareDnsRecord>(self.client.put(&url).json(payload), "update record")
            .await?;
        let record = envelope
            .result
            .ok_or_else(|| Error::provider("cloudflare", "update record: response has no result"))?;

        tracing::info!("Cloudflare updated {} {} ({})", record.record_type, record.name, record.id);
        Ok(into_record(record))
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<String> {
        let url = Self::record_url(zone_id, record_id)?;

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send DELETE request to {}", url);
            return Ok(record_id.to_string());
        }

        let envelope = self
            .send::<CloudflareDeleted>(self.client.delete(&url), "delete record")
            .await?;
        let deleted_id = envelope
            .result
            .map(|d| d.id)
            .unwrap_or_else(|| record_id.to_string());

        tracing::info!("Cloudflare deleted record {}", deleted_id);
        Ok(deleted_id)
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

/// Factory for creating Cloudflare clients
pub struct CloudflareFactory;

impl RemoteDnsClientFactory for CloudflareFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn RemoteDnsClient>> {
        match config {
            ProviderConfig::Cloudflare {
                api_token,
                account_id,
                dry_run,
            } => {
                if *dry_run {
                    tracing::warn!(
                        "Cloudflare client running in DRY-RUN mode - no changes will be made"
                    );
                }

                Ok(Box::new(CloudflareClient::new(
                    api_token.clone(),
                    account_id.clone(),
                    *dry_run,
                )?))
            }
            _ => Err(Error::config("Invalid config for Cloudflare provider")),
        }
    }
}

/// Register the Cloudflare client with a registry
///
/// # Example
///
/// ```rust
/// use dnsmirror_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dnsmirror_provider_cloudflare::register(&registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &dnsmirror_core::ProviderRegistry) {
    registry.register_provider("cloudflare", Box::new(CloudflareFactory));
}
