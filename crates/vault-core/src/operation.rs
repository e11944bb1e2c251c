//! Operation kinds and caller requests.
//!
//! An [`OperationRequest`] carries raw, user-supplied strings. Nothing in it
//! has been validated; the orchestrator turns it into typed call arguments.

use crate::error::CoreError;
use crate::order::OrderSide;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The ten vault entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Join,
    Leave,
    Deposit,
    Withdraw,
    PublishSignal,
    ExecuteTrade,
    Pause,
    Resume,
    UpdateLeader,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        Self::Create,
        Self::Join,
        Self::Leave,
        Self::Deposit,
        Self::Withdraw,
        Self::PublishSignal,
        Self::ExecuteTrade,
        Self::Pause,
        Self::Resume,
        Self::UpdateLeader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::PublishSignal => "publish_signal",
            Self::ExecuteTrade => "execute_trade",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::UpdateLeader => "update_leader",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownOperation(s.to_string()))
    }
}

/// Target network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
    Devnet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Testnet => write!(f, "testnet"),
            Self::Mainnet => write!(f, "mainnet"),
            Self::Devnet => write!(f, "devnet"),
        }
    }
}

impl FromStr for Network {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Self::Testnet),
            "mainnet" => Ok(Self::Mainnet),
            "devnet" => Ok(Self::Devnet),
            _ => Err(CoreError::UnknownNetwork(s.to_string())),
        }
    }
}

/// Whether a trade is also placed on the external venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeMode {
    /// Mocked payload, no venue I/O.
    #[default]
    Demo,
    /// Real order placed on the venue before the on-chain signal.
    Production,
}

impl fmt::Display for TradeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demo => write!(f, "demo"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl FromStr for TradeMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(Self::Demo),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(CoreError::UnknownTradeMode(s.to_string())),
        }
    }
}

/// Caller request for one operation, with raw user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationRequest {
    Create,
    Join { leader: String },
    Leave { leader: String },
    Deposit { amount: String },
    Withdraw { amount: String },
    PublishSignal { signal: String },
    ExecuteTrade {
        amount: String,
        side: OrderSide,
        mode: TradeMode,
    },
    Pause,
    Resume,
    UpdateLeader { new_leader: String },
}

impl OperationRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Create => OperationKind::Create,
            Self::Join { .. } => OperationKind::Join,
            Self::Leave { .. } => OperationKind::Leave,
            Self::Deposit { .. } => OperationKind::Deposit,
            Self::Withdraw { .. } => OperationKind::Withdraw,
            Self::PublishSignal { .. } => OperationKind::PublishSignal,
            Self::ExecuteTrade { .. } => OperationKind::ExecuteTrade,
            Self::Pause => OperationKind::Pause,
            Self::Resume => OperationKind::Resume,
            Self::UpdateLeader { .. } => OperationKind::UpdateLeader,
        }
    }

    /// Trade mode, for `ExecuteTrade` only.
    pub fn trade_mode(&self) -> Option<TradeMode> {
        match self {
            Self::ExecuteTrade { mode, .. } => Some(*mode),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_roundtrip() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.as_str().parse::<OperationKind>().unwrap(), kind);
        }
        assert_eq!(
            "publish-signal".parse::<OperationKind>().unwrap(),
            OperationKind::PublishSignal
        );
        assert!("mint".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_request_kind() {
        let req = OperationRequest::ExecuteTrade {
            amount: "1".to_string(),
            side: OrderSide::Buy,
            mode: TradeMode::Production,
        };
        assert_eq!(req.kind(), OperationKind::ExecuteTrade);
        assert_eq!(req.trade_mode(), Some(TradeMode::Production));
        assert_eq!(OperationRequest::Pause.trade_mode(), None);
    }

    #[test]
    fn test_request_serde_tag() {
        let json = r#"{"operation":"join","leader":"0xabc"}"#;
        let req: OperationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req,
            OperationRequest::Join {
                leader: "0xabc".to_string()
            }
        );
    }
}
