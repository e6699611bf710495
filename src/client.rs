//! Report endpoint HTTP client.

use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::AttendanceRecord;

/// Action tag understood by the spreadsheet-script endpoint.
const REPORT_ACTION: &str = "getReportData";

/// Client for the company's spreadsheet-backed sync endpoint.
///
/// The endpoint speaks plain GET with query parameters and answers with
/// either a JSON array of attendance records or `{"error": ...}`.
pub struct ReportClient {
    client: Client,
    base_url: String,
}

impl ReportClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The configured sync URL (e.g. "https://script.google.com/macros/s/…/exec")
    /// * `timeout_secs` - Request timeout
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the attendance records visible to the given report account.
    ///
    /// Validates the preconditions locally before issuing the request so a
    /// missing endpoint or blank credential never leaves the machine.
    pub async fn fetch_report(&self, username: &str, password: &str) -> Result<Vec<AttendanceRecord>> {
        if self.base_url.is_empty() {
            return Err(AppError::NotConfigured);
        }
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(AppError::MissingCredentials);
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("action", REPORT_ACTION), ("user", username), ("pass", password)])
            .send()
            .await?;

        let body = response.text().await?;
        parse_report_body(&body)
    }

    /// Test reachability of the endpoint (no credentials).
    pub async fn test_connection(&self) -> Result<bool> {
        if self.base_url.is_empty() {
            return Err(AppError::NotConfigured);
        }
        let response = self.client.get(&self.base_url).send().await?;
        Ok(response.status().is_success())
    }
}

/// Parse the endpoint response body.
///
/// An object with an `error` member means the account was rejected; any
/// other object shape is a protocol error. Individual records with missing
/// fields deserialize with defaults rather than failing the batch.
fn parse_report_body(body: &str) -> Result<Vec<AttendanceRecord>> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| AppError::parse(format!("Invalid response: {e}")))?;

    if let Some(obj) = value.as_object() {
        if obj.contains_key("error") {
            return Err(AppError::InvalidCredentials);
        }
        return Err(AppError::parse("Expected a record array"));
    }

    serde_json::from_value(value).map_err(|e| AppError::parse(format!("Invalid record data: {e}")))
}
