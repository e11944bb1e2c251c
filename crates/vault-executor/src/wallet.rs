//! Wallet boundary and per-session submission lock.

use crate::error::{WalletError, WalletResult};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use vault_core::{Address, ContractCall};
use vault_telemetry::Metrics;
use vault_trade::BoxFuture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTx {
    pub hash: String,
}

/// Browser-wallet capability.
///
/// `sign_and_submit` takes the call by value: a built call is signed at most
/// once.
pub trait Wallet: Send + Sync {
    fn connect(&self) -> BoxFuture<'_, WalletResult<Address>>;

    fn disconnect(&self) -> BoxFuture<'_, ()>;

    fn state(&self) -> ConnectionState;

    /// Connected account, if any.
    fn account(&self) -> Option<Address>;

    fn sign_and_submit(&self, call: ContractCall) -> BoxFuture<'_, WalletResult<SubmittedTx>>;
}

/// Arc wrapper for Wallet trait objects.
pub type DynWallet = Arc<dyn Wallet>;

// ============================================================================
// WalletSession
// ============================================================================

/// One connected wallet plus the lock that keeps at most one
/// chain-submitting operation outstanding on it.
pub struct WalletSession {
    wallet: DynWallet,
    submit_lock: Mutex<()>,
}

impl WalletSession {
    pub fn new(wallet: DynWallet) -> Self {
        Self {
            wallet,
            submit_lock: Mutex::new(()),
        }
    }

    pub fn wallet(&self) -> &DynWallet {
        &self.wallet
    }

    /// Connected account, `None` unless the wallet reports `Connected`.
    pub fn account(&self) -> Option<Address> {
        match self.wallet.state() {
            ConnectionState::Connected => self.wallet.account(),
            _ => None,
        }
    }

    /// Wait for exclusive submission rights. Held from signature request
    /// through confirmation.
    pub async fn acquire(&self) -> SessionGuard<'_> {
        let guard = self.submit_lock.lock().await;
        Metrics::session_acquired();
        SessionGuard { _guard: guard }
    }
}

/// Exclusive submission rights on a [`WalletSession`].
pub struct SessionGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        Metrics::session_released();
    }
}

// ============================================================================
// MockWallet
// ============================================================================

/// In-memory wallet that accepts every call unless told otherwise.
///
/// Used by tests and by the CLI's dry-run simulation. Hashes are sequential:
/// `0x000..01`, `0x000..02`, ...
#[derive(Debug)]
pub struct MockWallet {
    account: Address,
    state: parking_lot::Mutex<ConnectionState>,
    /// Recorded calls for verification.
    calls: parking_lot::Mutex<Vec<ContractCall>>,
    /// Failures returned by the next calls, in order.
    failures: parking_lot::Mutex<VecDeque<String>>,
    sign_delay: parking_lot::Mutex<Option<Duration>>,
    counter: AtomicU64,
}

impl MockWallet {
    /// A wallet already connected as `account`.
    pub fn new(account: Address) -> Self {
        Self {
            account,
            state: parking_lot::Mutex::new(ConnectionState::Connected),
            calls: parking_lot::Mutex::new(Vec::new()),
            failures: parking_lot::Mutex::new(VecDeque::new()),
            sign_delay: parking_lot::Mutex::new(None),
            counter: AtomicU64::new(0),
        }
    }

    pub fn disconnected(account: Address) -> Self {
        let wallet = Self::new(account);
        *wallet.state.lock() = ConnectionState::Disconnected;
        wallet
    }

    /// Queue a failure for the next `sign_and_submit`.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.failures.lock().push_back(message.into());
    }

    /// Simulate the user taking `delay` to approve each request.
    pub fn set_sign_delay(&self, delay: Duration) {
        *self.sign_delay.lock() = Some(delay);
    }

    /// Number of `sign_and_submit` calls, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<ContractCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Target functions of the recorded calls, in order.
    pub fn submitted_functions(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|c| c.function().to_string())
            .collect()
    }
}

impl Wallet for MockWallet {
    fn connect(&self) -> BoxFuture<'_, WalletResult<Address>> {
        Box::pin(async move {
            *self.state.lock() = ConnectionState::Connected;
            Ok(self.account.clone())
        })
    }

    fn disconnect(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            *self.state.lock() = ConnectionState::Disconnected;
        })
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    fn account(&self) -> Option<Address> {
        match self.state() {
            ConnectionState::Connected => Some(self.account.clone()),
            _ => None,
        }
    }

    fn sign_and_submit(&self, call: ContractCall) -> BoxFuture<'_, WalletResult<SubmittedTx>> {
        Box::pin(async move {
            let delay = *self.sign_delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.calls.lock().push(call);

            if self.state() != ConnectionState::Connected {
                return Err(WalletError::NotConnected);
            }
            if let Some(message) = self.failures.lock().pop_front() {
                return Err(WalletError::Failed(message));
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(SubmittedTx {
                hash: format!("0x{n:064x}"),
            })
        })
    }
}
