//! Operation orchestrator.
//!
//! Runs one operation end to end:
//!
//! ```text
//! Idle -> Validating -> Building -> [ExternalSubmit] -> AwaitingSignature
//!      -> AwaitingConfirmation -> Confirmed | Failed
//! ```
//!
//! Every failure before `AwaitingSignature` leaves the wallet untouched.
//! The wallet session lock is taken before `AwaitingSignature` and released
//! only after confirmation resolves, so at most one chain-submitting
//! operation is outstanding per session.

use crate::chain::{DynChainClient, TxStatus};
use crate::error::WalletError;
use crate::wallet::WalletSession;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use vault_core::validate::{check_address, check_counterparty, check_positive_amount, check_signal};
use vault_core::{
    Address, Amount, CallArg, ErrorKind, Network, OperationError, OperationKind,
    OperationRequest, OrderSide, TradeMode, TradePayload, TransactionResult,
};
use vault_telemetry::Metrics;
use vault_trade::TradePayloadGenerator;
use vault_tx::{BuiltCall, ErrorClassifier, TransactionBuilder};

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub network: Network,
    /// Delay between chain status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Orchestrator state, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationState {
    Idle,
    Validating,
    Building,
    ExternalSubmit,
    AwaitingSignature,
    AwaitingConfirmation,
    Confirmed,
    Failed,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Validating => write!(f, "validating"),
            Self::Building => write!(f, "building"),
            Self::ExternalSubmit => write!(f, "external_submit"),
            Self::AwaitingSignature => write!(f, "awaiting_signature"),
            Self::AwaitingConfirmation => write!(f, "awaiting_confirmation"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Validated request: entry function arguments plus the trade leg.
struct Prepared {
    args: Vec<CallArg>,
    trade: Option<TradeLeg>,
}

struct TradeLeg {
    amount: Amount,
    side: OrderSide,
    mode: TradeMode,
}

/// Per-invocation bookkeeping carried onto the result.
struct Attempt {
    operation: OperationKind,
    gas_substituted: bool,
    trade: Option<TradePayload>,
}

impl Attempt {
    fn finish(&self, result: TransactionResult) -> TransactionResult {
        result
            .with_gas_substituted(self.gas_substituted)
            .with_trade(self.trade.clone())
    }

    fn fail(&self, error: OperationError) -> TransactionResult {
        self.finish(TransactionResult::failed(self.operation, error))
    }
}

pub struct Orchestrator {
    builder: TransactionBuilder,
    classifier: Arc<ErrorClassifier>,
    trade: Arc<TradePayloadGenerator>,
    chain: DynChainClient,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        builder: TransactionBuilder,
        classifier: Arc<ErrorClassifier>,
        trade: Arc<TradePayloadGenerator>,
        chain: DynChainClient,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            builder,
            classifier,
            trade,
            chain,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one operation to a terminal result.
    pub async fn execute(
        &self,
        request: OperationRequest,
        session: &WalletSession,
    ) -> TransactionResult {
        self.execute_with_cancel(request, session, &CancellationToken::new())
            .await
    }

    /// Run one operation, honoring `cancel` until the wallet is asked to sign
    /// or a venue order is placed, whichever comes first. Cancellation after
    /// that point is ignored.
    pub async fn execute_with_cancel(
        &self,
        request: OperationRequest,
        session: &WalletSession,
        cancel: &CancellationToken,
    ) -> TransactionResult {
        let operation = request.kind();
        let span = info_span!(
            "operation",
            operation = %operation,
            network = %self.config.network
        );

        async move {
            let started = Instant::now();
            let result = self.run(request, session, cancel).await;

            Metrics::operation_finished(operation.as_str(), result.outcome_label());
            match &result.error {
                None => info!(
                    hash = result.transaction_hash.as_deref().unwrap_or_default(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Operation confirmed"
                ),
                Some(err) => info!(
                    status = %result.status,
                    kind = %err.kind,
                    hash = result.transaction_hash.as_deref().unwrap_or_default(),
                    error = %err,
                    "Operation did not confirm"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        request: OperationRequest,
        session: &WalletSession,
        cancel: &CancellationToken,
    ) -> TransactionResult {
        let operation = request.kind();
        let mut attempt = Attempt {
            operation,
            gas_substituted: false,
            trade: None,
        };
        transition(OperationState::Idle);

        // Validating
        transition(OperationState::Validating);
        let Some(account) = session.account() else {
            transition(OperationState::Failed);
            return attempt.fail(OperationError::validation("Wallet is not connected"));
        };
        let prepared = match self.prepare(&request, &account) {
            Ok(p) => p,
            Err(err) => {
                debug!(reason = %err, "Validation failed");
                transition(OperationState::Failed);
                return attempt.fail(err);
            }
        };

        // Building
        transition(OperationState::Building);
        let built = match self
            .builder
            .build(operation, prepared.args, self.config.network)
        {
            Ok(built) => built,
            Err(e) => {
                error!(error = %e, "Transaction build rejected validated arguments");
                transition(OperationState::Failed);
                return attempt.fail(e.into());
            }
        };
        if let Some(sub) = &built.gas_substitution {
            warn!(
                rejected_units = sub.rejected.max_execution_units,
                rejected_price = sub.rejected.unit_price,
                rejected_expiration = sub.rejected.expiration_offset_secs,
                reason = %sub.reason,
                "Gas profile below chain floor, using safe default"
            );
            Metrics::gas_substituted(operation.as_str());
            attempt.gas_substituted = true;
        }
        let call = built.call;
        let expiration = Duration::from_secs(call.gas().expiration_offset_secs);

        // The venue order cannot be recalled, so cancellation is honored
        // before it is placed.
        if cancel.is_cancelled() {
            transition(OperationState::Failed);
            return attempt.fail(OperationError::user_cancelled());
        }

        // ExternalSubmit
        if let Some(leg) = prepared.trade {
            transition(OperationState::ExternalSubmit);
            let mut payload =
                match self
                    .trade
                    .generate_payload(leg.amount, leg.side, leg.mode, &account)
                {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(error = %e, mode = %leg.mode, "Trade payload unavailable");
                        transition(OperationState::Failed);
                        return attempt.fail(e.into());
                    }
                };

            if payload.is_production() {
                match self.trade.submit_externally(&payload).await {
                    Ok(ack) => {
                        Metrics::venue_submission(true);
                        info!(order_id = %ack.order_id, "Venue order placed");
                        payload.venue_order_id = Some(ack.order_id);
                    }
                    Err(e) => {
                        Metrics::venue_submission(false);
                        warn!(error = %e, "Venue submission failed, on-chain signal skipped");
                        attempt.trade = Some(payload);
                        transition(OperationState::Failed);
                        return attempt.fail(e.into());
                    }
                }
            }
            attempt.trade = Some(payload);
        }

        // A live venue order must get its on-chain signal, so cancellation
        // stops being honored once one is placed.
        let venue_order_live = attempt.trade.as_ref().is_some_and(TradePayload::is_production);

        // Exclusive from here through confirmation.
        let _guard = if venue_order_live {
            debug!("Venue order is live; on-chain signal is not atomic with it");
            session.acquire().await
        } else {
            if cancel.is_cancelled() {
                transition(OperationState::Failed);
                return attempt.fail(OperationError::user_cancelled());
            }
            let guard = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Cancelled while waiting for wallet session");
                    transition(OperationState::Failed);
                    return attempt.fail(OperationError::user_cancelled());
                }
                guard = session.acquire() => guard,
            };
            if cancel.is_cancelled() {
                transition(OperationState::Failed);
                return attempt.fail(OperationError::user_cancelled());
            }
            guard
        };

        // AwaitingSignature
        transition(OperationState::AwaitingSignature);
        let hash = match session.wallet().sign_and_submit(call).await {
            Ok(tx) if tx.hash.trim().is_empty() => {
                transition(OperationState::Failed);
                return attempt.fail(OperationError::new(
                    ErrorKind::Unknown,
                    "Wallet returned an empty transaction hash",
                ));
            }
            Ok(tx) => tx.hash,
            Err(WalletError::NotConnected) => {
                debug!("Wallet disconnected before signing");
                transition(OperationState::Failed);
                return attempt.fail(OperationError::validation("Wallet is not connected"));
            }
            Err(e) => {
                let classified = self.classifier.classify(&e.to_string());
                debug!(kind = %classified.kind, raw = %e, "Wallet submission failed");
                transition(OperationState::Failed);
                return attempt.fail(classified);
            }
        };
        debug!(hash = %hash, "Transaction submitted");

        // AwaitingConfirmation
        transition(OperationState::AwaitingConfirmation);
        let submitted_at = Instant::now();
        let result = match tokio::time::timeout(expiration, self.poll_until_terminal(&hash)).await
        {
            Ok(TxStatus::Success) => {
                Metrics::confirmation_latency(
                    operation.as_str(),
                    submitted_at.elapsed().as_secs_f64(),
                );
                transition(OperationState::Confirmed);
                TransactionResult::confirmed(operation, hash)
            }
            Ok(TxStatus::Failed { vm_status }) => {
                Metrics::confirmation_latency(
                    operation.as_str(),
                    submitted_at.elapsed().as_secs_f64(),
                );
                let classified = self.classifier.classify(&vm_status);
                debug!(kind = %classified.kind, vm_status = %vm_status, "Transaction aborted");
                transition(OperationState::Failed);
                TransactionResult::failed_on_chain(operation, hash, classified)
            }
            // poll_until_terminal only returns terminal statuses
            Ok(TxStatus::Pending) | Err(_) => {
                warn!(
                    hash = %hash,
                    window_secs = expiration.as_secs(),
                    "Confirmation window elapsed, transaction may still land"
                );
                transition(OperationState::Failed);
                let message = format!(
                    "Transaction not confirmed within {}s. Check {hash} before retrying.",
                    expiration.as_secs()
                );
                TransactionResult::expired(
                    operation,
                    hash,
                    OperationError::new(ErrorKind::Expired, message),
                )
            }
        };
        attempt.finish(result)
    }

    /// Validate and build the call for `request` as if signed by `account`,
    /// without touching a wallet, the venue or the chain.
    pub fn build_call(
        &self,
        request: &OperationRequest,
        account: &Address,
    ) -> Result<BuiltCall, OperationError> {
        let prepared = self.prepare(request, account)?;
        self.builder
            .build(request.kind(), prepared.args, self.config.network)
            .map_err(OperationError::from)
    }

    async fn poll_until_terminal(&self, hash: &str) -> TxStatus {
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        loop {
            match self.chain.wait_for_transaction(hash).await {
                Ok(status) if status.is_terminal() => return status,
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Status poll failed, retrying"),
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Validate raw input into entry function arguments.
    fn prepare(
        &self,
        request: &OperationRequest,
        account: &Address,
    ) -> Result<Prepared, OperationError> {
        let plain = |args: Vec<CallArg>| Prepared { args, trade: None };

        match request {
            OperationRequest::Create | OperationRequest::Pause | OperationRequest::Resume => {
                Ok(plain(Vec::new()))
            }
            OperationRequest::Join { leader } | OperationRequest::Leave { leader } => {
                let leader = check_address("Leader address", leader)?;
                check_counterparty("Leader address", &leader, account)?;
                Ok(plain(vec![CallArg::Address(leader.into())]))
            }
            OperationRequest::UpdateLeader { new_leader } => {
                let new_leader = check_address("New leader address", new_leader)?;
                check_counterparty("New leader address", &new_leader, account)?;
                Ok(plain(vec![CallArg::Address(new_leader.into())]))
            }
            OperationRequest::Deposit { amount } | OperationRequest::Withdraw { amount } => {
                let amount = check_positive_amount("Amount", amount)?;
                let decimals = self.builder.registry().amount_decimals();
                match amount.to_base_units(decimals) {
                    None => Err(OperationError::validation("Amount is too large")),
                    Some(0) => Err(OperationError::validation(
                        "Amount is below the smallest transferable unit",
                    )),
                    Some(units) => Ok(plain(vec![CallArg::U64(units)])),
                }
            }
            OperationRequest::PublishSignal { signal } => {
                let signal = check_signal("Signal", signal)?;
                Ok(plain(vec![CallArg::U64(signal)]))
            }
            OperationRequest::ExecuteTrade { amount, side, mode } => {
                let amount = check_positive_amount("Trade amount", amount)?;
                let signal = match amount.to_signal() {
                    None => return Err(OperationError::validation("Trade amount is too large")),
                    Some(0) => {
                        return Err(OperationError::validation(
                            "Trade amount must be at least 0.01",
                        ))
                    }
                    Some(signal) => signal,
                };
                Ok(Prepared {
                    args: vec![CallArg::U64(signal)],
                    trade: Some(TradeLeg {
                        amount,
                        side: *side,
                        mode: *mode,
                    }),
                })
            }
        }
    }
}

fn transition(state: OperationState) {
    debug!(state = %state, "State transition");
}
