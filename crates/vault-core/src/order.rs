//! Order-related types.
//!
//! Provides the order side and the venue-facing trade payload.

use crate::address::Address;
use crate::error::CoreError;
use crate::operation::TradeMode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "long" => Ok(Self::Buy),
            "sell" | "short" => Ok(Self::Sell),
            _ => Err(CoreError::UnknownSide(s.to_string())),
        }
    }
}

/// Order payload for the external venue.
///
/// In demo mode `price` and `venue_order_id` are synthetic. In production
/// mode `price` is `None` (market order) until the venue fills it in, and
/// `venue_order_id` is set once the venue acknowledges the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePayload {
    /// Venue market identifier (e.g. "BTC_USD").
    pub market: String,
    pub side: OrderSide,
    /// Order size in venue units.
    pub size: Decimal,
    /// Limit price, `None` for a market order.
    pub price: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
    /// Pseudo-random disambiguator.
    pub nonce: u64,
    pub signer_address: Address,
    pub mode: TradeMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_order_id: Option<String>,
}

impl TradePayload {
    pub fn is_production(&self) -> bool {
        self.mode == TradeMode::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_side_parse_aliases() {
        assert_eq!("LONG".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("sell".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert!("hold".parse::<OrderSide>().is_err());
    }
}
