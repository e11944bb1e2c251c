//! Venue order API boundary.
//!
//! Dyn-compatible async trait so the orchestrator can hold an
//! `Arc<dyn VenueClient>` and tests can swap in [`MockVenueClient`].

use crate::credential::VenueCredential;
use crate::error::{TradeError, TradeResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use vault_core::OrderSide;

/// Boxed future type for dyn-compatible async traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Default timeout for venue requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Two-valued position direction used by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueSide {
    Long,
    Short,
}

impl From<OrderSide> for VenueSide {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => Self::Long,
            OrderSide::Sell => Self::Short,
        }
    }
}

/// Market order request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueOrderRequest {
    pub pair: String,
    pub user_address: String,
    /// Floating size, not the on-chain ×100 signal.
    pub size_delta: f64,
    pub collateral_delta: f64,
    pub side: VenueSide,
    pub is_increase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VenueOrderAck {
    #[serde(alias = "orderId")]
    pub order_id: String,
}

/// External venue order API.
pub trait VenueClient: Send + Sync {
    fn create_order(&self, request: VenueOrderRequest) -> BoxFuture<'_, TradeResult<VenueOrderAck>>;
}

/// Arc wrapper for VenueClient trait objects.
pub type DynVenueClient = Arc<dyn VenueClient>;

// ============================================================================
// HTTP implementation
// ============================================================================

/// `POST {base_url}/v1/trade` with a bearer credential.
#[derive(Debug)]
pub struct HttpVenueClient {
    client: Client,
    trade_url: String,
    credential: VenueCredential,
}

impl HttpVenueClient {
    pub fn new(base_url: &str, credential: VenueCredential) -> TradeResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| TradeError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            trade_url: format!("{}/v1/trade", base_url.trim_end_matches('/')),
            credential,
        })
    }

    async fn post_order(&self, request: VenueOrderRequest) -> TradeResult<VenueOrderAck> {
        info!(
            url = %self.trade_url,
            pair = %request.pair,
            side = ?request.side,
            size = request.size_delta,
            "Submitting venue order"
        );

        let response = self
            .client
            .post(&self.trade_url)
            .bearer_auth(self.credential.token())
            .json(&request)
            .send()
            .await
            .map_err(|e| TradeError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TradeError::VenueRejected {
                status: status.as_u16(),
                body,
            });
        }

        let ack: VenueOrderAck = response
            .json()
            .await
            .map_err(|e| TradeError::HttpClient(format!("Failed to parse response: {e}")))?;

        debug!(order_id = %ack.order_id, "Venue order acknowledged");
        Ok(ack)
    }
}

impl VenueClient for HttpVenueClient {
    fn create_order(&self, request: VenueOrderRequest) -> BoxFuture<'_, TradeResult<VenueOrderAck>> {
        Box::pin(self.post_order(request))
    }
}

// ============================================================================
// Mock
// ============================================================================

/// Mock venue for testing.
#[derive(Debug)]
pub struct MockVenueClient {
    /// Recorded orders for verification.
    orders: parking_lot::Mutex<Vec<VenueOrderRequest>>,
    /// Failure returned by the next call, if set.
    next_failure: parking_lot::Mutex<Option<String>>,
    counter: AtomicU64,
}

impl Default for MockVenueClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVenueClient {
    pub fn new() -> Self {
        Self {
            orders: parking_lot::Mutex::new(Vec::new()),
            next_failure: parking_lot::Mutex::new(None),
            counter: AtomicU64::new(0),
        }
    }

    /// Make the next call fail with a transport error.
    pub fn set_next_failure(&self, message: impl Into<String>) {
        *self.next_failure.lock() = Some(message.into());
    }

    pub fn get_orders(&self) -> Vec<VenueOrderRequest> {
        self.orders.lock().clone()
    }
}

impl VenueClient for MockVenueClient {
    fn create_order(&self, request: VenueOrderRequest) -> BoxFuture<'_, TradeResult<VenueOrderAck>> {
        Box::pin(async move {
            self.orders.lock().push(request);
            if let Some(message) = self.next_failure.lock().take() {
                return Err(TradeError::HttpClient(message));
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(VenueOrderAck {
                order_id: format!("mock_order_{n}"),
            })
        })
    }
}
