//! Chain transaction status boundary.

use crate::error::{ChainError, ChainResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use vault_trade::BoxFuture;

/// Status of a submitted transaction as reported by the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Not yet committed.
    Pending,
    Success,
    /// Committed but aborted; `vm_status` is the raw chain text.
    Failed { vm_status: String },
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Read-only chain query. The orchestrator polls it until a terminal
/// status or its own deadline.
pub trait ChainClient: Send + Sync {
    fn wait_for_transaction(&self, hash: &str) -> BoxFuture<'_, ChainResult<TxStatus>>;
}

/// Arc wrapper for ChainClient trait objects.
pub type DynChainClient = Arc<dyn ChainClient>;

/// Scripted chain for tests and dry runs.
///
/// Every hash reports `Pending` for the configured number of polls, then the
/// final status. Queued errors are returned before any status.
#[derive(Debug)]
pub struct MockChain {
    pending_polls: parking_lot::Mutex<u32>,
    final_status: parking_lot::Mutex<TxStatus>,
    errors: parking_lot::Mutex<VecDeque<String>>,
    poll_counts: parking_lot::Mutex<HashMap<String, u32>>,
    /// Hashes in poll order.
    polls: parking_lot::Mutex<Vec<String>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    /// Every transaction succeeds on the first poll.
    pub fn new() -> Self {
        Self {
            pending_polls: parking_lot::Mutex::new(0),
            final_status: parking_lot::Mutex::new(TxStatus::Success),
            errors: parking_lot::Mutex::new(VecDeque::new()),
            poll_counts: parking_lot::Mutex::new(HashMap::new()),
            polls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn set_pending_polls(&self, n: u32) {
        *self.pending_polls.lock() = n;
    }

    /// Never leave `Pending`.
    pub fn set_never_confirms(&self) {
        self.set_pending_polls(u32::MAX);
    }

    pub fn set_final_status(&self, status: TxStatus) {
        *self.final_status.lock() = status;
    }

    /// Abort every transaction with `vm_status`.
    pub fn set_abort(&self, vm_status: impl Into<String>) {
        self.set_final_status(TxStatus::Failed {
            vm_status: vm_status.into(),
        });
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.errors.lock().push_back(message.into());
    }

    pub fn polls(&self) -> Vec<String> {
        self.polls.lock().clone()
    }
}

impl ChainClient for MockChain {
    fn wait_for_transaction(&self, hash: &str) -> BoxFuture<'_, ChainResult<TxStatus>> {
        let hash = hash.to_string();
        Box::pin(async move {
            self.polls.lock().push(hash.clone());
            if let Some(message) = self.errors.lock().pop_front() {
                return Err(ChainError(message));
            }

            let seen = {
                let mut counts = self.poll_counts.lock();
                let count = counts.entry(hash).or_insert(0);
                *count = count.saturating_add(1);
                *count
            };
            if seen <= *self.pending_polls.lock() {
                return Ok(TxStatus::Pending);
            }
            Ok(self.final_status.lock().clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_then_final() {
        let chain = MockChain::new();
        chain.set_pending_polls(2);
        assert_eq!(chain.wait_for_transaction("0x1").await.unwrap(), TxStatus::Pending);
        assert_eq!(chain.wait_for_transaction("0x1").await.unwrap(), TxStatus::Pending);
        assert_eq!(chain.wait_for_transaction("0x1").await.unwrap(), TxStatus::Success);
        // Counted per hash.
        assert_eq!(chain.wait_for_transaction("0x2").await.unwrap(), TxStatus::Pending);
        assert_eq!(chain.polls().len(), 4);
    }

    #[tokio::test]
    async fn test_errors_precede_status() {
        let chain = MockChain::new();
        chain.push_error("connection reset");
        chain.set_abort("Move abort: 1005");
        assert!(chain.wait_for_transaction("0x1").await.is_err());
        let status = chain.wait_for_transaction("0x1").await.unwrap();
        assert!(status.is_terminal());
        assert_eq!(
            status,
            TxStatus::Failed {
                vm_status: "Move abort: 1005".to_string()
            }
        );
    }
}
