//! Application configuration.
//!
//! Loaded from TOML. Every section and field has a default, so an empty file
//! (or no file at all) yields a working testnet demo configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use vault_core::{Address, Network, OperationKind, TradeMode};
use vault_executor::{OrchestratorConfig, RetryPolicy};
use vault_trade::{KeySource, TradeSettings};
use vault_tx::{FunctionRegistry, GasOverride};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "VAULT_CONFIG";

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

const DEFAULT_API_BASE_URL: &str = "https://api.merkle.trade";

/// Largest amount scale whose `10^decimals` still fits a `u64`.
const MAX_AMOUNT_DECIMALS: u32 = 19;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub contract: ContractConfig,
    #[serde(default)]
    pub gas: GasConfig,
    #[serde(default)]
    pub trade: TradeConfig,
    #[serde(default)]
    pub venue: VenueConfig,
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub market_data: MarketDataConfig,
}

/// Deployed `VaultFactory` module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    #[serde(default = "default_module_address")]
    pub module_address: String,
    #[serde(default = "default_module_name")]
    pub module_name: String,
    /// Decimal places of the vault's deposit asset.
    #[serde(default = "default_amount_decimals")]
    pub amount_decimals: u32,
}

fn default_module_address() -> String {
    FunctionRegistry::DEFAULT_MODULE_ADDRESS.to_string()
}

fn default_module_name() -> String {
    FunctionRegistry::DEFAULT_MODULE_NAME.to_string()
}

fn default_amount_decimals() -> u32 {
    FunctionRegistry::DEFAULT_AMOUNT_DECIMALS
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            module_address: default_module_address(),
            module_name: default_module_name(),
            amount_decimals: default_amount_decimals(),
        }
    }
}

/// Per-operation gas overrides, keyed by operation name.
///
/// ```toml
/// [gas.overrides.deposit]
/// max_execution_units = 30000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GasConfig {
    #[serde(default)]
    pub overrides: BTreeMap<OperationKind, GasOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TradeConfig {
    /// Mode used when a trade request does not name one.
    #[serde(default)]
    pub mode: TradeMode,
    #[serde(flatten)]
    pub settings: TradeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Bearer credential source. Production trades fail without it.
    #[serde(default)]
    pub credential: Option<KeySource>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            credential: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    OrchestratorConfig::default().poll_interval_ms
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDataConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Pick the config file: `explicit`, then `$VAULT_CONFIG`, then
    /// `config/default.toml` if it exists. `None` means built-in defaults.
    pub fn resolve_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        fallback.exists().then(|| fallback.to_path_buf())
    }

    /// Load from the resolved path, or fall back to defaults.
    pub fn load(explicit: Option<&str>) -> AppResult<(Self, Option<PathBuf>)> {
        match Self::resolve_path(explicit) {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Reject values that would only surface as failures mid-operation.
    pub fn validate(&self) -> AppResult<()> {
        Address::parse(&self.contract.module_address).map_err(|e| {
            AppError::Config(format!("contract.module_address: {e}"))
        })?;
        if self.contract.module_name.trim().is_empty() {
            return Err(AppError::Config(
                "contract.module_name must not be empty".to_string(),
            ));
        }
        if self.contract.amount_decimals > MAX_AMOUNT_DECIMALS {
            return Err(AppError::Config(format!(
                "contract.amount_decimals must be at most {MAX_AMOUNT_DECIMALS}"
            )));
        }
        if self.confirmation.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "confirmation.poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            network: self.network,
            poll_interval_ms: self.confirmation.poll_interval_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.trade.mode, TradeMode::Demo);
        assert_eq!(config.trade.settings.market, "BTC_USD");
        assert_eq!(config.contract.amount_decimals, 8);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.venue.credential.is_none());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            network = "mainnet"

            [contract]
            module_address = "0x52908400098527886E0F7030069857D2E4169EE7"
            amount_decimals = 6

            [gas.overrides.deposit]
            max_execution_units = 30000

            [trade]
            mode = "production"
            market = "ETH_USD"
            demo_price = "3200.5"

            [venue]
            base_url = "https://venue.example"
            credential = { source = "env_var", var_name = "VENUE_TOKEN" }

            [confirmation]
            poll_interval_ms = 250

            [retry]
            max_attempts = 5
        "#;
        let config = AppConfig::from_toml(toml).unwrap();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.contract.amount_decimals, 6);
        assert_eq!(
            config.contract.module_address,
            "0x52908400098527886E0F7030069857D2E4169EE7"
        );
        assert_eq!(config.contract.module_name, "VaultFactory");
        assert_eq!(
            config.gas.overrides[&OperationKind::Deposit].max_execution_units,
            Some(30_000)
        );
        assert_eq!(config.trade.mode, TradeMode::Production);
        assert_eq!(config.trade.settings.market, "ETH_USD");
        assert_eq!(config.trade.settings.demo_price, dec!(3200.5));
        assert_eq!(
            config.venue.credential,
            Some(KeySource::EnvVar {
                var_name: "VENUE_TOKEN".to_string()
            })
        );
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 1000);

        let orch = config.orchestrator_config();
        assert_eq!(orch.network, Network::Mainnet);
        assert_eq!(orch.poll_interval_ms, 250);
    }

    #[test]
    fn test_shipped_default_config_parses() {
        let config = AppConfig::from_toml(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_rejects_bad_module_address() {
        let err = AppConfig::from_toml("[contract]\nmodule_address = \"vault\"\n").unwrap_err();
        assert!(err.to_string().contains("module_address"));
    }

    #[test]
    fn test_rejects_overflowing_decimals() {
        let err = AppConfig::from_toml("[contract]\namount_decimals = 20\n").unwrap_err();
        assert!(err.to_string().contains("amount_decimals"));
    }

    #[test]
    fn test_rejects_unknown_operation_override() {
        let err = AppConfig::from_toml("[gas.overrides.teleport]\nunit_price = 5\n").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "network = \"devnet\"").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.network, Network::Devnet);

        let (loaded, path) = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(loaded.network, Network::Devnet);
        assert_eq!(path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::from_file("/nonexistent/vault.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
