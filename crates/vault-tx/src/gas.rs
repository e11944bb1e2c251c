//! Gas policy resolution.
//!
//! Profiles come from a static tier table: vault creation and trade execution
//! get larger budgets than simple state toggles. Each network contributes a
//! fixed expiration window. Configured per-operation overrides are applied on
//! top; a result below the chain floors is replaced with [`GasPolicy::SAFE_DEFAULT_UNITS`]
//! / [`GasPolicy::SAFE_DEFAULT_UNIT_PRICE`] and the replacement is reported back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use vault_core::{GasProfile, Network, OperationKind};

/// Budget tier an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GasTier {
    VaultCreation,
    VaultOperations,
    SimpleTransaction,
    ComplexTrading,
}

impl GasTier {
    pub fn for_operation(op: OperationKind) -> Self {
        match op {
            OperationKind::Create => Self::VaultCreation,
            OperationKind::Join
            | OperationKind::Leave
            | OperationKind::Deposit
            | OperationKind::Withdraw
            | OperationKind::PublishSignal
            | OperationKind::UpdateLeader => Self::VaultOperations,
            OperationKind::Pause | OperationKind::Resume => Self::SimpleTransaction,
            OperationKind::ExecuteTrade => Self::ComplexTrading,
        }
    }

    /// (max execution units, unit price).
    pub fn limits(&self) -> (u64, u64) {
        match self {
            Self::VaultCreation => (20_000, 100),
            Self::VaultOperations => (15_000, 100),
            Self::SimpleTransaction => (10_000, 100),
            Self::ComplexTrading => (25_000, 100),
        }
    }
}

impl fmt::Display for GasTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VaultCreation => write!(f, "vault_creation"),
            Self::VaultOperations => write!(f, "vault_operations"),
            Self::SimpleTransaction => write!(f, "simple_transaction"),
            Self::ComplexTrading => write!(f, "complex_trading"),
        }
    }
}

/// Partial profile supplied by configuration for one operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasOverride {
    #[serde(default)]
    pub max_execution_units: Option<u64>,
    #[serde(default)]
    pub unit_price: Option<u64>,
    #[serde(default)]
    pub expiration_offset_secs: Option<u64>,
}

/// Record of a profile that failed the floor check and was replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasSubstitution {
    pub operation: OperationKind,
    pub rejected: GasProfile,
    pub reason: String,
}

/// Output of [`GasPolicy::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGas {
    pub profile: GasProfile,
    /// Set when the resolved profile was invalid and the safe default was used.
    pub substitution: Option<GasSubstitution>,
}

impl ResolvedGas {
    pub fn is_substituted(&self) -> bool {
        self.substitution.is_some()
    }
}

/// Immutable gas table.
#[derive(Debug, Clone, Default)]
pub struct GasPolicy {
    overrides: BTreeMap<OperationKind, GasOverride>,
}

impl GasPolicy {
    pub const SAFE_DEFAULT_UNITS: u64 = 20_000;
    pub const SAFE_DEFAULT_UNIT_PRICE: u64 = 100;

    pub fn new() -> Self {
        Self::default()
    }

    /// Apply per-operation overrides from configuration.
    #[must_use]
    pub fn with_overrides(mut self, overrides: BTreeMap<OperationKind, GasOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Expiration window for a network.
    pub fn expiration_secs(network: Network) -> u64 {
        match network {
            Network::Testnet => 30,
            Network::Mainnet => 30,
            Network::Devnet => 30,
        }
    }

    /// Profile substituted when resolution fails the floor check.
    pub fn safe_default(network: Network) -> GasProfile {
        GasProfile::new(
            Self::SAFE_DEFAULT_UNITS,
            Self::SAFE_DEFAULT_UNIT_PRICE,
            Self::expiration_secs(network),
        )
    }

    /// Resolve the execution limits for `operation` on `network`.
    ///
    /// Never returns a profile below the chain floors.
    pub fn resolve(&self, operation: OperationKind, network: Network) -> ResolvedGas {
        let (units, price) = GasTier::for_operation(operation).limits();
        let mut profile = GasProfile::new(units, price, Self::expiration_secs(network));

        if let Some(o) = self.overrides.get(&operation) {
            if let Some(units) = o.max_execution_units {
                profile.max_execution_units = units;
            }
            if let Some(price) = o.unit_price {
                profile.unit_price = price;
            }
            if let Some(secs) = o.expiration_offset_secs {
                profile.expiration_offset_secs = secs;
            }
        }

        match profile.check() {
            Ok(()) => ResolvedGas {
                profile,
                substitution: None,
            },
            Err(reason) => ResolvedGas {
                profile: Self::safe_default(network),
                substitution: Some(GasSubstitution {
                    operation,
                    rejected: profile,
                    reason,
                }),
            },
        }
    }
}
