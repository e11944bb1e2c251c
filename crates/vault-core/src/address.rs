//! Account addresses.
//!
//! Vault owners and members are identified by 32-byte account addresses
//! (64 hex characters). Legacy 20-byte (40 hex) addresses are also accepted.
//! Every address is stored in canonical form: `0x` followed by lowercase hex.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical `0x`-prefixed account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub const PREFIX: &'static str = "0x";

    /// Hex lengths accepted after the prefix is stripped.
    pub const HEX_LENGTHS: [usize; 2] = [64, 40];

    /// Parse and normalize an address.
    ///
    /// The `0x` prefix is optional. No whitespace trimming is performed.
    pub fn parse(s: &str) -> Result<Self> {
        let hex_part = strip_prefix(s);
        if !Self::HEX_LENGTHS.contains(&hex_part.len()) {
            return Err(CoreError::InvalidAddress(format!(
                "expected 64 or 40 hex characters, got {}",
                hex_part.len()
            )));
        }
        hex::decode(hex_part).map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        Ok(Self(format!("{}{}", Self::PREFIX, hex_part.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display, e.g. `0xabcd...7f73`.
    pub fn short(&self, len: usize) -> String {
        if self.0.len() <= len * 2 + 2 {
            return self.0.clone();
        }
        format!("{}...{}", &self.0[..len + 2], &self.0[self.0.len() - len..])
    }
}

/// Strip an optional `0x` prefix.
pub(crate) fn strip_prefix(s: &str) -> &str {
    s.strip_prefix(Address::PREFIX).unwrap_or(s)
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

/// Full-width account address from raw bytes.
impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(format!("{}{}", Self::PREFIX, hex::encode(bytes)))
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
