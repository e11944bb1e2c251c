//! Entry function registry for the `VaultFactory` module.

use vault_core::{Address, ArgKind, OperationKind};

/// Entry function name and fixed parameter shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryFunction {
    pub name: &'static str,
    pub params: &'static [ArgKind],
}

const NO_PARAMS: &[ArgKind] = &[];
const ADDRESS_PARAM: &[ArgKind] = &[ArgKind::Address];
const U64_PARAM: &[ArgKind] = &[ArgKind::U64];

/// Maps operations to module-qualified entry functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRegistry {
    module_address: Address,
    module_name: String,
    amount_decimals: u32,
}

impl FunctionRegistry {
    pub const DEFAULT_MODULE_ADDRESS: &'static str =
        "0xf02e42e167e86430855e112267405f0bb4bb6a8fed16cd7e4e4a339ec7341f73";
    /// Raw bytes of [`Self::DEFAULT_MODULE_ADDRESS`].
    pub const DEFAULT_MODULE_ADDRESS_BYTES: [u8; 32] = [
        0xf0, 0x2e, 0x42, 0xe1, 0x67, 0xe8, 0x64, 0x30,
        0x85, 0x5e, 0x11, 0x22, 0x67, 0x40, 0x5f, 0x0b,
        0xb4, 0xbb, 0x6a, 0x8f, 0xed, 0x16, 0xcd, 0x7e,
        0x4e, 0x4a, 0x33, 0x9e, 0xc7, 0x34, 0x1f, 0x73,
    ];
    pub const DEFAULT_MODULE_NAME: &'static str = "VaultFactory";
    /// Deposit/withdraw amounts are expressed in 10^-8 units (octas).
    pub const DEFAULT_AMOUNT_DECIMALS: u32 = 8;

    pub fn new(module_address: Address, module_name: impl Into<String>, amount_decimals: u32) -> Self {
        Self {
            module_address,
            module_name: module_name.into(),
            amount_decimals,
        }
    }

    pub fn module_address(&self) -> &Address {
        &self.module_address
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Decimal places used to convert deposit/withdraw amounts to base units.
    pub fn amount_decimals(&self) -> u32 {
        self.amount_decimals
    }

    /// Entry function for an operation.
    pub fn entry(&self, op: OperationKind) -> EntryFunction {
        let (name, params) = match op {
            OperationKind::Create => ("create_vault", NO_PARAMS),
            OperationKind::Join => ("join_vault", ADDRESS_PARAM),
            OperationKind::Leave => ("leave_vault", ADDRESS_PARAM),
            OperationKind::Deposit => ("deposit", U64_PARAM),
            OperationKind::Withdraw => ("withdraw", U64_PARAM),
            OperationKind::PublishSignal => ("publish_signal", U64_PARAM),
            OperationKind::ExecuteTrade => ("execute_trade", U64_PARAM),
            OperationKind::Pause => ("pause_vault", NO_PARAMS),
            OperationKind::Resume => ("resume_vault", NO_PARAMS),
            OperationKind::UpdateLeader => ("update_leader", ADDRESS_PARAM),
        };
        EntryFunction { name, params }
    }

    /// `<address>::<module>::<function>`
    pub fn qualified_name(&self, op: OperationKind) -> String {
        format!(
            "{}::{}::{}",
            self.module_address,
            self.module_name,
            self.entry(op).name
        )
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self {
            module_address: Address::from(Self::DEFAULT_MODULE_ADDRESS_BYTES),
            module_name: Self::DEFAULT_MODULE_NAME.to_string(),
            amount_decimals: Self::DEFAULT_AMOUNT_DECIMALS,
        }
    }
}
