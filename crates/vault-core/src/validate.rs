//! Input validation.
//!
//! Every predicate is pure and total. Each `is_*` predicate has a `check_*`
//! counterpart that returns the parsed value or a [`ValidationFailure`] with
//! a user-facing reason naming the offending field.

use crate::address::{strip_prefix, Address};
use crate::amount::Amount;
use crate::error::OperationError;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// A rejected input, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationFailure {
    fn new(field: &'static str, reason: String) -> Self {
        Self { field, reason }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ValidationFailure {}

impl From<ValidationFailure> for OperationError {
    fn from(v: ValidationFailure) -> Self {
        OperationError::validation(v.reason)
    }
}

/// True iff `s`, after stripping an optional `0x`, is exactly 64 or 40 hex
/// characters.
pub fn is_valid_address(s: &str) -> bool {
    Address::parse(s).is_ok()
}

/// Case-insensitive inequality, ignoring an optional `0x` prefix.
pub fn is_distinct_from(candidate: &str, own: &str) -> bool {
    !strip_prefix(candidate).eq_ignore_ascii_case(strip_prefix(own))
}

/// True iff `s` parses as a finite decimal strictly greater than zero.
pub fn is_positive_amount(s: &str) -> bool {
    s.parse::<Amount>().is_ok()
}

/// True iff `s` is a non-negative whole number that fits in `u64`.
pub fn is_valid_signal(s: &str) -> bool {
    s.trim().parse::<u64>().is_ok()
}

pub fn check_address(field: &'static str, s: &str) -> Result<Address, ValidationFailure> {
    if s.is_empty() {
        return Err(ValidationFailure::new(field, format!("{field} is required")));
    }
    Address::parse(s).map_err(|_| {
        ValidationFailure::new(
            field,
            format!("{field} must be 64 or 40 hex characters, optionally prefixed with 0x"),
        )
    })
}

/// Reject a counterparty equal to the caller's own account.
pub fn check_counterparty(
    field: &'static str,
    candidate: &Address,
    own: &Address,
) -> Result<(), ValidationFailure> {
    if is_distinct_from(candidate.as_str(), own.as_str()) {
        Ok(())
    } else {
        Err(ValidationFailure::new(
            field,
            format!("{field} must be different from the connected account"),
        ))
    }
}

pub fn check_positive_amount(field: &'static str, s: &str) -> Result<Amount, ValidationFailure> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationFailure::new(field, format!("{field} is required")));
    }
    match Decimal::from_str(trimmed) {
        Err(_) => Err(ValidationFailure::new(field, format!("{field} must be a number"))),
        Ok(value) => Amount::new(value).map_err(|_| {
            ValidationFailure::new(field, format!("{field} must be a positive number"))
        }),
    }
}

pub fn check_signal(field: &'static str, s: &str) -> Result<u64, ValidationFailure> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationFailure::new(field, format!("{field} is required")));
    }
    trimmed.parse::<u64>().map_err(|_| {
        ValidationFailure::new(field, format!("{field} must be a non-negative whole number"))
    })
}
