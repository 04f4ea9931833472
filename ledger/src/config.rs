//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use ubi_types::{Address, LedgerParams};
use ubi_utils::LogFormat;

use crate::ledger::TokenMetadata;
use crate::LedgerError;

/// Configuration for a UBI ledger.
///
/// Can be loaded from a TOML file via [`LedgerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Token name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Token symbol.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Raw units minted per second per accruing identity.
    #[serde(default = "default_accrual_rate")]
    pub accrual_rate: u64,

    /// The ledger's own asset identifier. Streams must reference it.
    #[serde(default = "default_ledger_address")]
    pub ledger_address: Address,

    /// The only caller allowed to change the oracle or the authority.
    #[serde(default = "default_authority")]
    pub authority: Address,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_name() -> String {
    "Universal Basic Income".to_string()
}

fn default_symbol() -> String {
    "UBI".to_string()
}

fn default_decimals() -> u8 {
    18
}

fn default_accrual_rate() -> u64 {
    u64::try_from(LedgerParams::RATE_1_PER_HOUR).unwrap_or(u64::MAX)
}

fn default_ledger_address() -> Address {
    LedgerParams::default().ledger_address
}

fn default_authority() -> Address {
    Address::new("ubi_governor")
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl LedgerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LedgerError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// The engine parameters this configuration describes.
    pub fn params(&self) -> LedgerParams {
        LedgerParams::new(u128::from(self.accrual_rate), self.ledger_address.clone())
    }

    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            decimals: default_decimals(),
            accrual_rate: default_accrual_rate(),
            ledger_address: default_ledger_address(),
            authority: default_authority(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = LedgerConfig::from_toml_str("").unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.params(), LedgerParams::default());
        assert_eq!(config.decimals, 18);
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = LedgerConfig::from_toml_str(
            r#"
            symbol = "TST"
            accrual_rate = 1
            authority = "ubi_admin"
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.symbol, "TST");
        assert_eq!(config.params().accrual_rate, 1);
        assert_eq!(config.authority, Address::new("ubi_admin"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.name, "Universal Basic Income");
    }

    #[test]
    fn malformed_address_is_a_config_error() {
        let err = LedgerConfig::from_toml_str(r#"authority = "admin""#).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
        assert_eq!(err.kind(), ubi_types::ErrorKind::Configuration);
    }

    #[test]
    fn toml_round_trip_through_file() {
        let config = LedgerConfig {
            accrual_rate: 42,
            ..LedgerConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(LedgerConfig::from_toml_file(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = LedgerConfig::from_toml_file("/nonexistent/ubi.toml").unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }
}
