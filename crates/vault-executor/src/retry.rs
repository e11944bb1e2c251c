//! Optional bounded retry around [`Orchestrator::execute_with_cancel`].
//!
//! Only failures that produced no transaction hash and whose kind is
//! transient are re-attempted. User intent, deterministic rejections and
//! anything that reached the chain are returned as-is. Production trades are
//! never retried: the venue order from the first attempt is already live.

use crate::orchestrator::Orchestrator;
use crate::wallet::WalletSession;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vault_core::{OperationRequest, TransactionResult, TransactionStatus};
use vault_telemetry::Metrics;

/// Linear backoff: the n-th retry waits `n * base_delay_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// A single attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    fn delay(&self, retry: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(u64::from(retry)))
    }

    /// True if `result` may be re-attempted.
    pub fn should_retry(result: &TransactionResult) -> bool {
        result.status == TransactionStatus::Failed
            && result.transaction_hash.is_none()
            && !result.trade.as_ref().is_some_and(|t| t.is_production())
            && result
                .error
                .as_ref()
                .is_some_and(|e| e.kind.is_retryable() && !e.kind.is_user_intent())
    }
}

impl Orchestrator {
    /// [`Orchestrator::execute_with_cancel`] with bounded retry.
    pub async fn execute_with_retry(
        &self,
        request: OperationRequest,
        session: &WalletSession,
        policy: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> TransactionResult {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = self
                .execute_with_cancel(request.clone(), session, cancel)
                .await;

            if attempt >= max_attempts || !RetryPolicy::should_retry(&result) {
                if attempt > 1 && !result.is_confirmed() {
                    warn!(
                        operation = %result.operation,
                        attempts = attempt,
                        outcome = result.outcome_label(),
                        "Giving up after retries"
                    );
                }
                return result;
            }

            let kind = result.outcome_label();
            let backoff = policy.delay(attempt);
            debug!(
                operation = %result.operation,
                attempt,
                max_attempts,
                kind,
                backoff_ms = backoff.as_millis() as u64,
                "Retrying operation"
            );
            Metrics::retry_attempt(result.operation.as_str(), kind);

            tokio::select! {
                _ = cancel.cancelled() => return result,
                _ = tokio::time::sleep(backoff) => {}
            }
            attempt += 1;
        }
    }
}
