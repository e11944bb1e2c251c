//! Wallet and chain failure classification.
//!
//! Precedence, first match wins:
//! 1. a known contract abort code appearing as a standalone token
//! 2. ordered case-insensitive substring rules
//! 3. [`ErrorKind::Unknown`] with the raw text, truncated

use vault_core::{truncate_message, ContractStatus, ErrorKind, OperationError};

pub use vault_core::MAX_MESSAGE_CHARS;

const EMPTY_MESSAGE: &str = "Unknown error occurred";

#[derive(Debug, Clone)]
struct SubstringRule {
    kind: ErrorKind,
    /// Lowercase needles; any match selects the rule.
    needles: &'static [&'static str],
    message: &'static str,
}

/// Immutable classification table.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    statuses: Vec<ContractStatus>,
    rules: Vec<SubstringRule>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorClassifier {
    pub fn new() -> Self {
        let rules = vec![
            SubstringRule {
                kind: ErrorKind::InsufficientFunds,
                needles: &["insufficient"],
                message: "Insufficient balance for transaction fees",
            },
            SubstringRule {
                kind: ErrorKind::GasMisconfigured,
                needles: &["gas"],
                message: "Gas configuration error. Please try again.",
            },
            SubstringRule {
                kind: ErrorKind::StaleSequence,
                needles: &["sequence_number", "sequence number"],
                message: "Transaction sequence error. Please refresh and try again.",
            },
            SubstringRule {
                kind: ErrorKind::Expired,
                needles: &["expired", "timeout", "timed out"],
                message: "Transaction expired. Please try again.",
            },
            SubstringRule {
                kind: ErrorKind::UserRejected,
                needles: &["rejected", "denied", "declined"],
                message: "Transaction was rejected by user",
            },
            SubstringRule {
                kind: ErrorKind::NetworkFault,
                needles: &["network", "failed to fetch", "connection", "unreachable"],
                message: "Network error. Please check your connection.",
            },
        ];
        Self {
            statuses: ContractStatus::ALL.to_vec(),
            rules,
        }
    }

    /// Classify raw failure text. Total: every input maps to some kind.
    pub fn classify(&self, raw: &str) -> OperationError {
        if let Some(status) = self
            .statuses
            .iter()
            .find(|s| contains_code(raw, s.code()))
        {
            return OperationError::contract(*status);
        }

        let lower = raw.to_ascii_lowercase();
        if let Some(rule) = self
            .rules
            .iter()
            .find(|r| r.needles.iter().any(|n| lower.contains(n)))
        {
            return OperationError::new(rule.kind, rule.message);
        }

        let text = raw.trim();
        if text.is_empty() {
            return OperationError::new(ErrorKind::Unknown, EMPTY_MESSAGE);
        }
        OperationError::new(ErrorKind::Unknown, truncate_message(text))
    }
}

/// True if `code` appears in `haystack` as its own token. A code inside a
/// longer alphanumeric run (`10050`, `0xabcd1005ef`) does not count.
fn contains_code(haystack: &str, code: u64) -> bool {
    let needle = code.to_string();
    let bytes = haystack.as_bytes();
    haystack.match_indices(&needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        before_ok && after_ok
    })
}
