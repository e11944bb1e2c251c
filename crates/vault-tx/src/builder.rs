//! Transaction builder.
//!
//! Turns an operation and its already-validated arguments into a
//! [`ContractCall`]. Argument count and kinds are checked against the entry
//! function's fixed shape; a mismatch is a caller bug and surfaces as
//! [`TxError::MalformedArguments`].

use crate::error::{TxError, TxResult};
use crate::gas::{GasPolicy, GasSubstitution};
use crate::registry::FunctionRegistry;
use std::sync::Arc;
use vault_core::{Address, CallArg, ContractCall, Network, OperationKind};

/// A built call plus the gas substitution record, if any.
#[derive(Debug)]
pub struct BuiltCall {
    pub call: ContractCall,
    pub gas_substitution: Option<GasSubstitution>,
}

#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    registry: Arc<FunctionRegistry>,
    gas: Arc<GasPolicy>,
}

impl TransactionBuilder {
    pub fn new(registry: Arc<FunctionRegistry>, gas: Arc<GasPolicy>) -> Self {
        Self { registry, gas }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn gas_policy(&self) -> &GasPolicy {
        &self.gas
    }

    /// Build the call for `operation` on `network`.
    ///
    /// Address arguments are re-normalized to canonical `0x` lowercase form.
    pub fn build(
        &self,
        operation: OperationKind,
        args: Vec<CallArg>,
        network: Network,
    ) -> TxResult<BuiltCall> {
        let entry = self.registry.entry(operation);

        if args.len() != entry.params.len() {
            return Err(TxError::MalformedArguments {
                operation,
                detail: format!(
                    "{} expects {} argument(s), got {}",
                    entry.name,
                    entry.params.len(),
                    args.len()
                ),
            });
        }

        let mut normalized = Vec::with_capacity(args.len());
        for (index, (arg, expected)) in args.into_iter().zip(entry.params).enumerate() {
            if arg.kind() != *expected {
                return Err(TxError::MalformedArguments {
                    operation,
                    detail: format!(
                        "argument {index} of {} must be {expected}, got {}",
                        entry.name,
                        arg.kind()
                    ),
                });
            }
            normalized.push(match arg {
                CallArg::Address(raw) => {
                    let addr = Address::parse(&raw).map_err(|e| TxError::MalformedArguments {
                        operation,
                        detail: format!("argument {index} of {}: {e}", entry.name),
                    })?;
                    CallArg::Address(addr.into())
                }
                other => other,
            });
        }

        let resolved = self.gas.resolve(operation, network);
        let call = ContractCall::new(
            self.registry.qualified_name(operation),
            normalized,
            resolved.profile,
        );

        Ok(BuiltCall {
            call,
            gas_substitution: resolved.substitution,
        })
    }
}
