//! Contract call types.
//!
//! A [`ContractCall`] is the fully specified entry function invocation the
//! wallet signs. It has no `Clone` impl: it is built once per invocation and
//! moved into the signing step.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Transaction execution limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GasProfile {
    /// Maximum execution units the transaction may consume.
    pub max_execution_units: u64,
    /// Price per execution unit.
    pub unit_price: u64,
    /// Seconds after submission before the transaction is no longer valid.
    pub expiration_offset_secs: u64,
}

impl GasProfile {
    /// The chain rejects transactions with a lower budget.
    pub const MIN_EXECUTION_UNITS: u64 = 1000;
    pub const MIN_UNIT_PRICE: u64 = 1;

    pub const fn new(max_execution_units: u64, unit_price: u64, expiration_offset_secs: u64) -> Self {
        Self {
            max_execution_units,
            unit_price,
            expiration_offset_secs,
        }
    }

    /// Check the hard minimums. Returns the first violated constraint.
    pub fn check(&self) -> Result<(), String> {
        if self.max_execution_units < Self::MIN_EXECUTION_UNITS {
            return Err(format!(
                "max_execution_units {} is below minimum {}",
                self.max_execution_units,
                Self::MIN_EXECUTION_UNITS
            ));
        }
        if self.unit_price < Self::MIN_UNIT_PRICE {
            return Err(format!(
                "unit_price {} is below minimum {}",
                self.unit_price,
                Self::MIN_UNIT_PRICE
            ));
        }
        if self.expiration_offset_secs == 0 {
            return Err("expiration_offset_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }
}

/// Shape of an entry function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    Address,
    U64,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => write!(f, "address"),
            Self::U64 => write!(f, "u64"),
        }
    }
}

/// One positional entry function argument.
///
/// Serializes the way entry function JSON payloads expect: addresses and
/// `u64` values both as strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum CallArg {
    Address(String),
    U64(u64),
}

impl CallArg {
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::Address(_) => ArgKind::Address,
            Self::U64(_) => ArgKind::U64,
        }
    }
}

impl Serialize for CallArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Address(a) => serializer.serialize_str(a),
            Self::U64(v) => serializer.collect_str(v),
        }
    }
}

/// Fully specified entry function call.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ContractCall {
    function: String,
    type_arguments: Vec<String>,
    arguments: Vec<CallArg>,
    gas: GasProfile,
}

impl ContractCall {
    pub fn new(function: String, arguments: Vec<CallArg>, gas: GasProfile) -> Self {
        Self {
            function,
            type_arguments: Vec::new(),
            arguments,
            gas,
        }
    }

    /// Module-qualified target, e.g. `0x..::VaultFactory::deposit`.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn type_arguments(&self) -> &[String] {
        &self.type_arguments
    }

    pub fn arguments(&self) -> &[CallArg] {
        &self.arguments
    }

    pub fn gas(&self) -> &GasProfile {
        &self.gas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_profile_check_floors() {
        assert!(GasProfile::new(1000, 1, 30).is_valid());
        assert!(GasProfile::new(999, 100, 30).check().unwrap_err().contains("max_execution_units"));
        assert!(GasProfile::new(20000, 0, 30).check().unwrap_err().contains("unit_price"));
        assert!(!GasProfile::new(20000, 100, 0).is_valid());
    }

    #[test]
    fn test_call_serializes_args_as_strings() {
        let call = ContractCall::new(
            "0x1::VaultFactory::deposit".to_string(),
            vec![CallArg::U64(150), CallArg::Address("0xab".to_string())],
            GasProfile::new(15000, 100, 30),
        );
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["arguments"], serde_json::json!(["150", "0xab"]));
        assert_eq!(json["type_arguments"], serde_json::json!([]));
        assert_eq!(json["gas"]["max_execution_units"], 15000);
    }
}
