//! Read-only market summary.
//!
//! `GET {base_url}/v1/summary`. The display is best effort: failures are
//! logged and an empty list is returned.

use crate::error::{TradeError, TradeResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Keys under which a wrapped summary response may carry its records.
const WRAPPER_KEYS: [&str; 3] = ["markets", "pairs", "data"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub decimals: u32,
    #[serde(rename = "type", default)]
    pub kind: String,
}

pub struct MarketDataClient {
    client: Client,
    summary_url: String,
}

impl MarketDataClient {
    pub fn new(base_url: &str) -> TradeResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| TradeError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            summary_url: format!("{}/v1/summary", base_url.trim_end_matches('/')),
        })
    }

    pub fn summary_url(&self) -> &str {
        &self.summary_url
    }

    pub async fn fetch_summary(&self) -> TradeResult<Vec<MarketSummary>> {
        info!(url = %self.summary_url, "Fetching market summary");

        let response = self
            .client
            .get(&self.summary_url)
            .send()
            .await
            .map_err(|e| TradeError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TradeError::HttpClient(format!("HTTP {status}: {body}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TradeError::HttpClient(format!("Failed to parse response: {e}")))?;

        let markets = parse_summary(&body);
        debug!(count = markets.len(), "Market summary received");
        Ok(markets)
    }

    /// [`Self::fetch_summary`], logging and swallowing any failure.
    pub async fn fetch_summary_or_empty(&self) -> Vec<MarketSummary> {
        match self.fetch_summary().await {
            Ok(markets) => markets,
            Err(e) => {
                warn!(error = %e, url = %self.summary_url, "Market summary unavailable");
                Vec::new()
            }
        }
    }
}

/// Extract summary records from a bare array or a wrapping object.
/// Entries that do not parse are skipped.
pub fn parse_summary(body: &serde_json::Value) -> Vec<MarketSummary> {
    let entries = match body {
        serde_json::Value::Array(entries) => entries,
        serde_json::Value::Object(map) => {
            match WRAPPER_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(|v| v.as_array()))
            {
                Some(entries) => entries,
                None => return Vec::new(),
            }
        }
        _ => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}
