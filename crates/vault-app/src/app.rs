//! Application wiring.
//!
//! Builds the shared tables and clients once from [`AppConfig`]. The chain
//! client is supplied per orchestrator so the same application can drive a
//! real chain or a scripted one.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use std::sync::Arc;
use tracing::{info, warn};
use vault_core::{Address, OperationKind, OperationRequest, OrderSide, TradeMode};
use vault_executor::{DynChainClient, Orchestrator};
use vault_trade::{
    DynVenueClient, HttpVenueClient, MarketDataClient, MockVenueClient, TradePayloadGenerator,
    VenueCredential,
};
use vault_tx::{ErrorClassifier, FunctionRegistry, GasPolicy, TransactionBuilder};

/// Signer used by commands that never reach a wallet.
pub const DRY_RUN_ACCOUNT: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000001";

pub struct Application {
    config: AppConfig,
    builder: TransactionBuilder,
    classifier: Arc<ErrorClassifier>,
    trade: Arc<TradePayloadGenerator>,
    market_data: MarketDataClient,
}

impl Application {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let module_address = Address::parse(&config.contract.module_address)?;
        let registry = FunctionRegistry::new(
            module_address,
            config.contract.module_name.clone(),
            config.contract.amount_decimals,
        );
        let gas = GasPolicy::new().with_overrides(config.gas.overrides.clone());
        let builder = TransactionBuilder::new(Arc::new(registry), Arc::new(gas));

        let venue = Self::venue_client(&config)?;
        let trade = Arc::new(TradePayloadGenerator::new(
            config.trade.settings.clone(),
            venue,
        ));
        let market_data = MarketDataClient::new(&config.market_data.base_url)?;

        info!(
            network = %config.network,
            module = %builder.registry().module_address().short(4),
            venue = trade.has_venue(),
            gas_overrides = config.gas.overrides.len(),
            "Application initialized"
        );

        Ok(Self {
            config,
            builder,
            classifier: Arc::new(ErrorClassifier::new()),
            trade,
            market_data,
        })
    }

    /// Venue client, if a credential is configured and loads.
    ///
    /// A configured but unreadable credential is logged and treated as
    /// absent: demo trades keep working and production trades fail with
    /// `ConfigurationMissing`.
    fn venue_client(config: &AppConfig) -> AppResult<Option<DynVenueClient>> {
        let Some(source) = &config.venue.credential else {
            return Ok(None);
        };
        match VenueCredential::load(source) {
            Ok(credential) => {
                let client = HttpVenueClient::new(&config.venue.base_url, credential)?;
                Ok(Some(Arc::new(client)))
            }
            Err(e) => {
                warn!(source = %source, error = %e, "Venue credential unavailable, production trades disabled");
                Ok(None)
            }
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    pub fn trade_generator(&self) -> &TradePayloadGenerator {
        &self.trade
    }

    pub fn market_data(&self) -> &MarketDataClient {
        &self.market_data
    }

    /// Orchestrator bound to `chain`.
    pub fn orchestrator(&self, chain: DynChainClient) -> Orchestrator {
        Orchestrator::new(
            self.builder.clone(),
            self.classifier.clone(),
            self.trade.clone(),
            chain,
            self.config.orchestrator_config(),
        )
    }

    /// Orchestrator for dry runs: production trades go to an in-memory
    /// venue instead of the configured one.
    pub fn dry_run_orchestrator(&self, chain: DynChainClient) -> Orchestrator {
        let venue: DynVenueClient = Arc::new(MockVenueClient::new());
        let trade = TradePayloadGenerator::new(self.config.trade.settings.clone(), Some(venue));
        Orchestrator::new(
            self.builder.clone(),
            self.classifier.clone(),
            Arc::new(trade),
            chain,
            self.config.orchestrator_config(),
        )
    }
}

/// Turn command-line fields into a raw [`OperationRequest`].
///
/// `value` is the leader address, amount or signal, depending on the
/// operation. It is passed through untouched; validation happens in the
/// orchestrator.
pub fn parse_request(
    operation: OperationKind,
    value: Option<String>,
    side: OrderSide,
    mode: TradeMode,
) -> AppResult<OperationRequest> {
    let require = |what: &str| {
        value
            .clone()
            .ok_or_else(|| AppError::InvalidRequest(format!("{operation} requires {what}")))
    };

    Ok(match operation {
        OperationKind::Create => OperationRequest::Create,
        OperationKind::Pause => OperationRequest::Pause,
        OperationKind::Resume => OperationRequest::Resume,
        OperationKind::Join => OperationRequest::Join {
            leader: require("a leader address")?,
        },
        OperationKind::Leave => OperationRequest::Leave {
            leader: require("a leader address")?,
        },
        OperationKind::UpdateLeader => OperationRequest::UpdateLeader {
            new_leader: require("a new leader address")?,
        },
        OperationKind::Deposit => OperationRequest::Deposit {
            amount: require("an amount")?,
        },
        OperationKind::Withdraw => OperationRequest::Withdraw {
            amount: require("an amount")?,
        },
        OperationKind::PublishSignal => OperationRequest::PublishSignal {
            signal: require("a signal")?,
        },
        OperationKind::ExecuteTrade => OperationRequest::ExecuteTrade {
            amount: require("an amount")?,
            side,
            mode,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::{ErrorKind, TransactionStatus};
    use vault_executor::{MockChain, MockWallet, WalletSession};
    use vault_trade::KeySource;

    fn dry_run_account() -> Address {
        Address::parse(DRY_RUN_ACCOUNT).unwrap()
    }

    #[test]
    fn test_parse_request_requires_value() {
        let err = parse_request(
            OperationKind::Deposit,
            None,
            OrderSide::Buy,
            TradeMode::Demo,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: deposit requires an amount");

        let req = parse_request(
            OperationKind::ExecuteTrade,
            Some("1.5".to_string()),
            OrderSide::Sell,
            TradeMode::Demo,
        )
        .unwrap();
        assert_eq!(req.kind(), OperationKind::ExecuteTrade);
        assert_eq!(
            parse_request(OperationKind::Pause, None, OrderSide::Buy, TradeMode::Demo).unwrap(),
            OperationRequest::Pause
        );
    }

    #[test]
    fn test_custom_module_flows_into_calls() {
        let mut config = AppConfig::default();
        config.contract.module_address = format!("0x{}", "BEEF".repeat(10));
        config.contract.module_name = "Vaults".to_string();
        let app = Application::new(config).unwrap();

        let orchestrator = app.orchestrator(Arc::new(MockChain::new()));
        let built = orchestrator
            .build_call(&OperationRequest::Create, &dry_run_account())
            .unwrap();
        assert_eq!(
            built.call.function(),
            format!("0x{}::Vaults::create_vault", "beef".repeat(10))
        );
    }

    #[test]
    fn test_missing_credential_env_disables_venue() {
        let mut config = AppConfig::default();
        config.venue.credential = Some(KeySource::EnvVar {
            var_name: "VAULT_APP_TEST_UNSET_TOKEN".to_string(),
        });
        let app = Application::new(config).unwrap();
        assert!(!app.trade_generator().has_venue());
    }

    #[tokio::test]
    async fn test_dry_run_deposit_confirms() {
        let app = Application::new(AppConfig::default()).unwrap();
        let orchestrator = app.orchestrator(Arc::new(MockChain::new()));
        let session = WalletSession::new(Arc::new(MockWallet::new(dry_run_account())));

        let result = orchestrator
            .execute(
                OperationRequest::Deposit {
                    amount: "2".to_string(),
                },
                &session,
            )
            .await;
        assert_eq!(result.status, TransactionStatus::Confirmed);
        assert!(result.transaction_hash.is_some());
    }

    #[tokio::test]
    async fn test_dry_run_production_trade_uses_mock_venue() {
        let app = Application::new(AppConfig::default()).unwrap();
        let orchestrator = app.dry_run_orchestrator(Arc::new(MockChain::new()));
        let session = WalletSession::new(Arc::new(MockWallet::new(dry_run_account())));

        let result = orchestrator
            .execute(
                OperationRequest::ExecuteTrade {
                    amount: "1".to_string(),
                    side: OrderSide::Buy,
                    mode: TradeMode::Production,
                },
                &session,
            )
            .await;
        assert!(result.is_confirmed());
        let trade = result.trade.unwrap();
        assert_eq!(trade.venue_order_id.as_deref(), Some("mock_order_1"));
    }

    #[tokio::test]
    async fn test_production_trade_without_venue() {
        let app = Application::new(AppConfig::default()).unwrap();
        let orchestrator = app.orchestrator(Arc::new(MockChain::new()));
        let wallet = Arc::new(MockWallet::new(dry_run_account()));
        let session = WalletSession::new(wallet.clone());

        let result = orchestrator
            .execute(
                OperationRequest::ExecuteTrade {
                    amount: "1".to_string(),
                    side: OrderSide::Buy,
                    mode: TradeMode::Production,
                },
                &session,
            )
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::ConfigurationMissing));
        assert_eq!(wallet.call_count(), 0);
    }
}
