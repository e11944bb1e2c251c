//! Precision-safe decimal amounts.
//!
//! Uses `rust_decimal` so user-entered amounts are never routed through
//! binary floating point until the venue boundary explicitly asks for it.

use crate::error::{CoreError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strictly positive decimal amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Fixed factor applied to trade amounts to obtain the on-chain signal.
    pub const SIGNAL_SCALE: u64 = 100;

    /// Wrap a decimal, rejecting zero and negative values.
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount(format!(
                "{value} is not greater than zero"
            )));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    /// Convert to integer base units (`amount * 10^decimals`, truncated).
    ///
    /// Returns `None` on overflow or if the result does not fit `u64`.
    pub fn to_base_units(&self, decimals: u32) -> Option<u64> {
        let factor = 10u64.checked_pow(decimals)?;
        self.0
            .checked_mul(Decimal::from(factor))?
            .trunc()
            .to_u64()
    }

    /// On-chain trade signal: `amount * 100`, truncated.
    ///
    /// Deliberately independent of [`Amount::to_venue_size`]; the two
    /// representations are not reconciled.
    pub fn to_signal(&self) -> Option<u64> {
        self.0
            .checked_mul(Decimal::from(Self::SIGNAL_SCALE))?
            .trunc()
            .to_u64()
    }

    /// Floating representation handed to the external venue.
    pub fn to_venue_size(&self) -> Option<f64> {
        self.0.to_f64()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    /// Parse a user-entered amount. Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidAmount("empty".to_string()));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|e| CoreError::InvalidAmount(format!("{trimmed}: {e}")))?;
        Self::new(value)
    }
}
