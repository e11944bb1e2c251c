//! End-to-end orchestrator scenarios against the in-memory wallet and chain.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vault_core::{
    Address, CallArg, ContractStatus, ErrorKind, Network, OperationKind, OperationRequest,
    OrderSide, TradeMode, TransactionStatus,
};
use vault_executor::{
    MockChain, MockWallet, Orchestrator, OrchestratorConfig, RetryPolicy, Wallet, WalletSession,
};
use vault_trade::{MockVenueClient, TradePayloadGenerator, TradeSettings};
use vault_tx::{ErrorClassifier, FunctionRegistry, GasOverride, GasPolicy, TransactionBuilder};

const OWN: &str = "0xf02e42e167e86430855e112267405f0bb4bb6a8fed16cd7e4e4a339ec7341f73";
const LEADER: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

struct Harness {
    orchestrator: Orchestrator,
    wallet: Arc<MockWallet>,
    chain: Arc<MockChain>,
    session: WalletSession,
}

fn own() -> Address {
    Address::parse(OWN).unwrap()
}

fn harness_with(venue: Option<Arc<MockVenueClient>>, gas: GasPolicy) -> Harness {
    let wallet = Arc::new(MockWallet::new(own()));
    let chain = Arc::new(MockChain::new());
    let venue = venue.map(|v| v as vault_trade::DynVenueClient);
    let orchestrator = Orchestrator::new(
        TransactionBuilder::new(Arc::new(FunctionRegistry::default()), Arc::new(gas)),
        Arc::new(ErrorClassifier::new()),
        Arc::new(TradePayloadGenerator::new(TradeSettings::default(), venue)),
        chain.clone(),
        OrchestratorConfig {
            network: Network::Testnet,
            poll_interval_ms: 1000,
        },
    );
    Harness {
        orchestrator,
        session: WalletSession::new(wallet.clone()),
        wallet,
        chain,
    }
}

fn harness() -> Harness {
    harness_with(None, GasPolicy::new())
}

// ============================================================================
// Happy paths
// ============================================================================

#[tokio::test]
async fn test_create_vault_confirmed_carries_hash() {
    let h = harness();
    let result = h
        .orchestrator
        .execute(OperationRequest::Create, &h.session)
        .await;

    assert_eq!(result.status, TransactionStatus::Confirmed);
    assert!(result.error.is_none());
    assert!(result.transaction_hash.as_deref().is_some_and(|s| !s.is_empty()));
    assert!(!result.gas_substituted);
    assert_eq!(
        h.wallet.submitted_functions(),
        vec![format!("{OWN}::VaultFactory::create_vault")]
    );
}

#[tokio::test]
async fn test_deposit_converts_to_base_units() {
    let h = harness();
    let result = h
        .orchestrator
        .execute(
            OperationRequest::Deposit {
                amount: "2.5".to_string(),
            },
            &h.session,
        )
        .await;
    assert!(result.is_confirmed());

    let calls = h.wallet.take_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arguments(), &[CallArg::U64(250_000_000)]);
    assert_eq!(calls[0].gas().max_execution_units, 15_000);
}

#[tokio::test]
async fn test_join_normalizes_leader_address() {
    let h = harness();
    let result = h
        .orchestrator
        .execute(
            OperationRequest::Join {
                leader: LEADER[2..].to_ascii_uppercase(),
            },
            &h.session,
        )
        .await;
    assert!(result.is_confirmed());
    let calls = h.wallet.take_calls();
    assert_eq!(calls[0].arguments(), &[CallArg::Address(LEADER.to_string())]);
}

#[tokio::test]
async fn test_demo_trade_sends_scaled_signal() {
    let h = harness();
    let result = h
        .orchestrator
        .execute(
            OperationRequest::ExecuteTrade {
                amount: "1.239".to_string(),
                side: OrderSide::Buy,
                mode: TradeMode::Demo,
            },
            &h.session,
        )
        .await;

    assert!(result.is_confirmed());
    let trade = result.trade.expect("demo payload attached");
    assert_eq!(trade.mode, TradeMode::Demo);
    assert_eq!(trade.signer_address, own());
    let calls = h.wallet.take_calls();
    assert_eq!(calls[0].arguments(), &[CallArg::U64(123)]);
    assert_eq!(calls[0].gas().max_execution_units, 25_000);
}

#[tokio::test]
async fn test_production_trade_places_venue_order_first() {
    let venue = Arc::new(MockVenueClient::new());
    let h = harness_with(Some(venue.clone()), GasPolicy::new());
    let result = h
        .orchestrator
        .execute(
            OperationRequest::ExecuteTrade {
                amount: "3".to_string(),
                side: OrderSide::Sell,
                mode: TradeMode::Production,
            },
            &h.session,
        )
        .await;

    assert!(result.is_confirmed());
    let trade = result.trade.expect("production payload attached");
    assert_eq!(trade.venue_order_id.as_deref(), Some("mock_order_1"));
    assert_eq!(venue.get_orders().len(), 1);
    assert_eq!(venue.get_orders()[0].size_delta, 3.0);
    assert_eq!(h.wallet.take_calls()[0].arguments(), &[CallArg::U64(300)]);
}

// ============================================================================
// Failures before the wallet
// ============================================================================

#[tokio::test]
async fn test_self_join_never_reaches_wallet() {
    let h = harness();
    let result = h
        .orchestrator
        .execute(
            OperationRequest::Join {
                leader: OWN.to_ascii_uppercase().replacen("0X", "0x", 1),
            },
            &h.session,
        )
        .await;

    assert_eq!(result.status, TransactionStatus::Failed);
    assert_eq!(result.error_kind(), Some(ErrorKind::ValidationError));
    assert!(result.transaction_hash.is_none());
    assert_eq!(h.wallet.call_count(), 0);
}

#[tokio::test]
async fn test_negative_deposit_is_validation_error() {
    let h = harness();
    let result = h
        .orchestrator
        .execute(
            OperationRequest::Deposit {
                amount: "-5".to_string(),
            },
            &h.session,
        )
        .await;

    let err = result.error.expect("validation error");
    assert_eq!(err.kind, ErrorKind::ValidationError);
    assert_eq!(err.message, "Amount must be a positive number");
    assert_eq!(h.wallet.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_leader_address_rejected() {
    let h = harness();
    let result = h
        .orchestrator
        .execute(
            OperationRequest::Leave {
                leader: "0x1234".to_string(),
            },
            &h.session,
        )
        .await;
    assert_eq!(result.error_kind(), Some(ErrorKind::ValidationError));
    assert_eq!(h.wallet.call_count(), 0);
}

#[tokio::test]
async fn test_production_trade_without_credential() {
    let h = harness();
    let result = h
        .orchestrator
        .execute(
            OperationRequest::ExecuteTrade {
                amount: "1".to_string(),
                side: OrderSide::Buy,
                mode: TradeMode::Production,
            },
            &h.session,
        )
        .await;

    assert_eq!(result.status, TransactionStatus::Failed);
    assert_eq!(result.error_kind(), Some(ErrorKind::ConfigurationMissing));
    assert!(result.trade.is_none());
    assert_eq!(h.wallet.call_count(), 0);
}

#[tokio::test]
async fn test_venue_failure_skips_onchain_signal() {
    let venue = Arc::new(MockVenueClient::new());
    venue.set_next_failure("connection refused");
    let h = harness_with(Some(venue.clone()), GasPolicy::new());
    let result = h
        .orchestrator
        .execute(
            OperationRequest::ExecuteTrade {
                amount: "1".to_string(),
                side: OrderSide::Buy,
                mode: TradeMode::Production,
            },
            &h.session,
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NetworkFault));
    assert_eq!(venue.get_orders().len(), 1);
    assert_eq!(h.wallet.call_count(), 0);
}

#[tokio::test]
async fn test_cancel_before_signing() {
    let h = harness();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = h
        .orchestrator
        .execute_with_cancel(OperationRequest::Resume, &h.session, &cancel)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::UserCancelled));
    assert_eq!(h.wallet.call_count(), 0);
}

#[tokio::test]
async fn test_cancel_before_production_trade_places_no_venue_order() {
    let venue = Arc::new(MockVenueClient::new());
    let h = harness_with(Some(venue.clone()), GasPolicy::new());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = h
        .orchestrator
        .execute_with_cancel(
            OperationRequest::ExecuteTrade {
                amount: "1".to_string(),
                side: OrderSide::Buy,
                mode: TradeMode::Production,
            },
            &h.session,
            &cancel,
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::UserCancelled));
    assert!(venue.get_orders().is_empty());
    assert_eq!(h.wallet.call_count(), 0);
}

// ============================================================================
// Wallet and chain failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_wallet_disconnect_during_signing_is_validation_error() {
    let h = harness();
    h.wallet.set_sign_delay(Duration::from_secs(5));

    let disconnect = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        h.wallet.disconnect().await;
    };
    let (result, ()) = tokio::join!(
        h.orchestrator.execute(OperationRequest::Pause, &h.session),
        disconnect
    );

    assert_eq!(result.error_kind(), Some(ErrorKind::ValidationError));
    assert_eq!(result.error.unwrap().message, "Wallet is not connected");
    assert!(result.transaction_hash.is_none());
    assert_eq!(h.wallet.call_count(), 1);
}

#[tokio::test]
async fn test_user_rejection_is_terminal() {
    let h = harness();
    h.wallet.push_failure("User rejected the request.");
    let result = h
        .orchestrator
        .execute(OperationRequest::Pause, &h.session)
        .await;

    assert_eq!(result.status, TransactionStatus::Failed);
    assert_eq!(result.error_kind(), Some(ErrorKind::UserRejected));
    assert!(result.transaction_hash.is_none());
    assert!(h.chain.polls().is_empty());
}

#[tokio::test]
async fn test_duplicate_vault_creation() {
    let h = harness();
    h.chain
        .set_abort("Move abort in 0xf02e::VaultFactory: EVAULT_ALREADY_EXISTS(1008)");
    let result = h
        .orchestrator
        .execute(OperationRequest::Create, &h.session)
        .await;

    assert_eq!(result.status, TransactionStatus::Failed);
    assert_eq!(
        result.error_kind(),
        Some(ErrorKind::ContractRejected(ContractStatus::VaultAlreadyExists))
    );
    assert_eq!(
        result.error.as_ref().map(|e| e.message.as_str()),
        Some("Vault already exists for this address")
    );
    assert!(result.transaction_hash.is_some());
}

#[tokio::test]
async fn test_vm_failure_without_code_is_classified() {
    let h = harness();
    h.chain.set_abort("OUT_OF_GAS");
    let result = h
        .orchestrator
        .execute(OperationRequest::Resume, &h.session)
        .await;
    assert_eq!(result.error_kind(), Some(ErrorKind::GasMisconfigured));
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_expiry_reports_submitted() {
    let h = harness();
    h.chain.set_never_confirms();
    let result = h
        .orchestrator
        .execute(
            OperationRequest::Withdraw {
                amount: "1".to_string(),
            },
            &h.session,
        )
        .await;

    assert_eq!(result.status, TransactionStatus::Submitted);
    assert_eq!(result.error_kind(), Some(ErrorKind::Expired));
    let hash = result.transaction_hash.expect("hash for re-check");
    assert!(result.error.unwrap().message.contains(&hash));
    assert!(h.chain.polls().len() >= 30);
}

#[tokio::test(start_paused = true)]
async fn test_transient_poll_errors_then_success() {
    let h = harness();
    h.chain.push_error("connection reset");
    h.chain.push_error("connection reset");
    h.chain.set_pending_polls(1);
    let result = h
        .orchestrator
        .execute(OperationRequest::Create, &h.session)
        .await;
    assert!(result.is_confirmed());
    assert_eq!(h.chain.polls().len(), 4);
}

#[tokio::test]
async fn test_gas_substitution_flagged_on_result() {
    let mut overrides = BTreeMap::new();
    overrides.insert(
        OperationKind::Pause,
        GasOverride {
            max_execution_units: Some(1),
            ..Default::default()
        },
    );
    let h = harness_with(None, GasPolicy::new().with_overrides(overrides));
    let result = h
        .orchestrator
        .execute(OperationRequest::Pause, &h.session)
        .await;

    assert!(result.is_confirmed());
    assert!(result.gas_substituted);
    assert_eq!(h.wallet.take_calls()[0].gas().max_execution_units, 20_000);
}

// ============================================================================
// Concurrency and retry
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_session_serializes_submissions() {
    let h = harness();
    h.chain.set_pending_polls(3);

    let first = h.orchestrator.execute(OperationRequest::Create, &h.session);
    let second = h.orchestrator.execute(
        OperationRequest::PublishSignal {
            signal: "42".to_string(),
        },
        &h.session,
    );
    let (a, b) = tokio::join!(first, second);
    assert!(a.is_confirmed());
    assert!(b.is_confirmed());

    // All polls for one hash finish before the other hash is submitted.
    let polls = h.chain.polls();
    let first_hash = polls[0].clone();
    let switch = polls.iter().position(|p| *p != first_hash).unwrap();
    assert!(polls[switch..].iter().all(|p| *p != first_hash));
    assert_eq!(switch, 4);
}

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_from_network_fault() {
    let h = harness();
    h.wallet.push_failure("Network request failed");
    h.wallet.push_failure("Network request failed");
    let result = h
        .orchestrator
        .execute_with_retry(
            OperationRequest::Create,
            &h.session,
            &RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await;

    assert!(result.is_confirmed());
    assert_eq!(h.wallet.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_never_repeats_user_rejection() {
    let h = harness();
    h.wallet.push_failure("User rejected the request.");
    let result = h
        .orchestrator
        .execute_with_retry(
            OperationRequest::Create,
            &h.session,
            &RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::UserRejected));
    assert_eq!(h.wallet.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_gives_up_after_max_attempts() {
    let h = harness();
    for _ in 0..5 {
        h.wallet.push_failure("Network request failed");
    }
    let policy = RetryPolicy {
        max_attempts: 2,
        base_delay_ms: 10,
    };
    let result = h
        .orchestrator
        .execute_with_retry(
            OperationRequest::Create,
            &h.session,
            &policy,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NetworkFault));
    assert_eq!(h.wallet.call_count(), 2);
}

#[tokio::test]
async fn test_sign_delay_does_not_break_confirmation() {
    let h = harness();
    h.wallet.set_sign_delay(Duration::from_millis(5));
    let result = h
        .orchestrator
        .execute(OperationRequest::Create, &h.session)
        .await;
    assert!(result.is_confirmed());
}
