//! Trade payloads and the external trading venue.
//!
//! - [`TradePayloadGenerator`]: builds demo or production payloads for
//!   `execute_trade` and submits production payloads to the venue
//! - [`VenueClient`]: venue order API boundary, with an HTTP implementation
//!   and a recording mock
//! - [`VenueCredential`]: bearer credential loaded from env or file
//! - [`MarketDataClient`]: read-only market summary fetch
//!
//! The trade mode is always an explicit argument. Nothing in this crate keeps
//! a mode flag.

pub mod credential;
pub mod error;
pub mod market_data;
pub mod payload;
pub mod venue;

pub use credential::{KeySource, VenueCredential};
pub use error::{TradeError, TradeResult};
pub use market_data::{MarketDataClient, MarketSummary};
pub use payload::{TradePayloadGenerator, TradeSettings};
pub use venue::{
    BoxFuture, DynVenueClient, HttpVenueClient, MockVenueClient, VenueClient, VenueOrderAck,
    VenueOrderRequest, VenueSide,
};
