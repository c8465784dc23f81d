//! Application configuration management.
//!
//! Layered with the `config` crate: `config/default`, then `config/{RUN_MODE}`,
//! then `FINNORM__*` environment variables. Every field has a serde default so an
//! empty environment yields a usable configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::CurrencyCode;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Normalization run settings.
    #[serde(default)]
    pub normalizer: NormalizerSettings,
    /// Rule repository location.
    #[serde(default)]
    pub rules: RulesSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Settings for a normalization run.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerSettings {
    /// Industry template used for classification.
    #[serde(default = "default_industry")]
    pub industry: String,
    /// Reporting currency every entity is converted into.
    #[serde(default = "default_base_currency")]
    pub base_currency: CurrencyCode,
    /// Whether multi-entity batches are consolidated with eliminations.
    #[serde(default = "default_consolidate")]
    pub consolidate: bool,
    /// Reject entities whose ledger does not net to zero.
    #[serde(default)]
    pub require_balanced_entities: bool,
    /// Absolute tolerance for the per-entity net check.
    #[serde(default = "default_reconciliation_tolerance")]
    pub reconciliation_tolerance: Decimal,
    /// Enterprise value for valuation multiples, when known.
    #[serde(default)]
    pub enterprise_value: Option<Decimal>,
}

fn default_industry() -> String {
    "generic".to_string()
}

fn default_base_currency() -> CurrencyCode {
    CurrencyCode::usd()
}

fn default_consolidate() -> bool {
    true
}

fn default_reconciliation_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            industry: default_industry(),
            base_currency: default_base_currency(),
            consolidate: default_consolidate(),
            require_balanced_entities: false,
            reconciliation_tolerance: default_reconciliation_tolerance(),
            enterprise_value: None,
        }
    }
}

/// Rule repository location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesSettings {
    /// Path to a JSON rule document. The built-in ruleset is used when absent.
    #[serde(default)]
    pub path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "finnorm=info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FINNORM").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
