//! Cloudflare API v4 wire types

use serde::Deserialize;

/// Response envelope shared by every Cloudflare API v4 endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<CloudflareError>,
    pub result: Option<T>,
    pub result_info: Option<CloudflareResultInfo>,
}

impl<T> CloudflareResponse<T> {
    /// First error message, if the API reported any
    pub fn first_error(&self) -> String {
        self.errors
            .first()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareError {
    pub code: i64,
    pub message: String,
}

/// Pagination block of list responses
#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareResultInfo {
    #[allow(dead_code)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareZone {
    pub id: String,
    pub name: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareDnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u64,
}

/// Body of a successful DELETE
#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareDeleted {
    pub id: String,
}
