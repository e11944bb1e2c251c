//! Trade payload generation.
//!
//! Demo payloads are synthetic and deterministic apart from `timestamp` and
//! `nonce`; generating one never performs I/O. Production payloads require a
//! configured venue and are only completed once the venue acknowledges the
//! order. A production request without a venue fails with
//! [`TradeError::ConfigurationMissing`]; it is never downgraded to demo.

use crate::error::{TradeError, TradeResult};
use crate::venue::{DynVenueClient, VenueOrderAck, VenueOrderRequest, VenueSide};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use vault_core::{Address, Amount, OrderSide, TradeMode, TradePayload};

/// Venue order id placed on every demo payload.
pub const DEMO_ORDER_ID: &str = "demo_order";

/// Static trade parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSettings {
    /// Venue market identifier.
    #[serde(default = "default_market")]
    pub market: String,
    /// Price stamped on demo payloads.
    #[serde(default = "default_demo_price")]
    pub demo_price: Decimal,
    /// Collateral attached to each venue order.
    #[serde(default = "default_collateral")]
    pub collateral: Decimal,
}

fn default_market() -> String {
    "BTC_USD".to_string()
}

fn default_demo_price() -> Decimal {
    Decimal::from(65_000)
}

fn default_collateral() -> Decimal {
    Decimal::from(1_000_000)
}

impl Default for TradeSettings {
    fn default() -> Self {
        Self {
            market: default_market(),
            demo_price: default_demo_price(),
            collateral: default_collateral(),
        }
    }
}

/// Builds payloads and submits production payloads to the venue.
pub struct TradePayloadGenerator {
    settings: TradeSettings,
    venue: Option<DynVenueClient>,
}

impl TradePayloadGenerator {
    /// `venue` is `None` when no venue credential is configured.
    pub fn new(settings: TradeSettings, venue: Option<DynVenueClient>) -> Self {
        Self { settings, venue }
    }

    pub fn settings(&self) -> &TradeSettings {
        &self.settings
    }

    pub fn has_venue(&self) -> bool {
        self.venue.is_some()
    }

    pub fn generate_payload(
        &self,
        amount: Amount,
        side: OrderSide,
        mode: TradeMode,
        signer: &Address,
    ) -> TradeResult<TradePayload> {
        let (price, venue_order_id) = match mode {
            TradeMode::Demo => (
                Some(self.settings.demo_price),
                Some(DEMO_ORDER_ID.to_string()),
            ),
            TradeMode::Production => {
                if self.venue.is_none() {
                    return Err(TradeError::ConfigurationMissing);
                }
                (None, None)
            }
        };

        let payload = TradePayload {
            market: self.settings.market.clone(),
            side,
            size: amount.inner(),
            price,
            timestamp: Utc::now(),
            nonce: Uuid::new_v4().as_u128() as u64,
            signer_address: signer.clone(),
            mode,
            venue_order_id,
        };

        debug!(
            market = %payload.market,
            side = %payload.side,
            size = %payload.size,
            mode = %payload.mode,
            nonce = payload.nonce,
            "Trade payload generated"
        );
        Ok(payload)
    }

    /// Place a production payload on the venue.
    ///
    /// Not atomic with the on-chain signal that follows.
    pub async fn submit_externally(&self, payload: &TradePayload) -> TradeResult<VenueOrderAck> {
        if !payload.is_production() {
            return Err(TradeError::InvalidPayload(
                "demo payloads are never submitted to the venue".to_string(),
            ));
        }
        let venue = self.venue.as_ref().ok_or(TradeError::ConfigurationMissing)?;

        let size_delta = payload.size.to_f64().ok_or_else(|| {
            TradeError::InvalidPayload(format!("size {} is not representable", payload.size))
        })?;
        let collateral_delta = self.settings.collateral.to_f64().ok_or_else(|| {
            TradeError::InvalidPayload(format!(
                "collateral {} is not representable",
                self.settings.collateral
            ))
        })?;

        let request = VenueOrderRequest {
            pair: payload.market.clone(),
            user_address: payload.signer_address.to_string(),
            size_delta,
            collateral_delta,
            side: VenueSide::from(payload.side),
            is_increase: true,
        };
        venue.create_order(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::MockVenueClient;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const SIGNER: &str = "0xf02e42e167e86430855e112267405f0bb4bb6a8fed16cd7e4e4a339ec7341f73";

    fn signer() -> Address {
        Address::parse(SIGNER).unwrap()
    }

    fn amount(v: Decimal) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn test_demo_payload_shape() {
        let generator = TradePayloadGenerator::new(TradeSettings::default(), None);
        let a = generator
            .generate_payload(amount(dec!(1.5)), OrderSide::Buy, TradeMode::Demo, &signer())
            .unwrap();
        let b = generator
            .generate_payload(amount(dec!(1.5)), OrderSide::Buy, TradeMode::Demo, &signer())
            .unwrap();

        assert_eq!(a.market, "BTC_USD");
        assert_eq!(a.price, Some(dec!(65000)));
        assert_eq!(a.size, dec!(1.5));
        assert_eq!(a.venue_order_id.as_deref(), Some(DEMO_ORDER_ID));
        assert_eq!(a.mode, TradeMode::Demo);
        assert_eq!(a.signer_address, signer());

        // Only the disambiguators differ.
        assert_eq!(a.market, b.market);
        assert_eq!(a.price, b.price);
        assert_eq!(a.venue_order_id, b.venue_order_id);
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn test_production_without_venue_is_configuration_missing() {
        let generator = TradePayloadGenerator::new(TradeSettings::default(), None);
        let err = generator
            .generate_payload(
                amount(dec!(2)),
                OrderSide::Sell,
                TradeMode::Production,
                &signer(),
            )
            .unwrap_err();
        assert!(matches!(err, TradeError::ConfigurationMissing));
    }

    #[tokio::test]
    async fn test_production_submit_uses_float_size() {
        let venue = Arc::new(MockVenueClient::new());
        let generator = TradePayloadGenerator::new(TradeSettings::default(), Some(venue.clone()));

        let payload = generator
            .generate_payload(
                amount(dec!(1.234)),
                OrderSide::Sell,
                TradeMode::Production,
                &signer(),
            )
            .unwrap();
        assert_eq!(payload.price, None);
        assert_eq!(payload.venue_order_id, None);

        let ack = generator.submit_externally(&payload).await.unwrap();
        assert_eq!(ack.order_id, "mock_order_1");

        let orders = venue.get_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].size_delta, 1.234);
        assert_eq!(orders[0].collateral_delta, 1_000_000.0);
        assert_eq!(orders[0].side, VenueSide::Short);
        assert_eq!(orders[0].user_address, SIGNER);
        // The on-chain signal is a separate, truncated integer.
        assert_eq!(amount(dec!(1.234)).to_signal(), Some(123));
    }

    #[tokio::test]
    async fn test_demo_payload_never_submitted() {
        let venue = Arc::new(MockVenueClient::new());
        let generator = TradePayloadGenerator::new(TradeSettings::default(), Some(venue.clone()));
        let payload = generator
            .generate_payload(amount(dec!(1)), OrderSide::Buy, TradeMode::Demo, &signer())
            .unwrap();

        let err = generator.submit_externally(&payload).await.unwrap_err();
        assert!(matches!(err, TradeError::InvalidPayload(_)));
        assert!(venue.get_orders().is_empty());
    }
}
