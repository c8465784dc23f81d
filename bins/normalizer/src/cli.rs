//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use rust_decimal::Decimal;

use finnorm_core::NormalizationConfig;
use finnorm_shared::types::CurrencyCode;

#[derive(Debug, Parser)]
#[command(
    name = "finnorm",
    version,
    about = "Normalize trial-balance rows into reported, adjusted and normalized EBITDA."
)]
pub struct Cli {
    /// JSON input with `transactions`, and optionally `rates` and `manual_adjustments`
    pub input: PathBuf,

    /// Industry template (overrides `normalizer.industry`)
    #[arg(long)]
    pub industry: Option<String>,

    /// Reporting currency (overrides `normalizer.base_currency`)
    #[arg(long = "base-currency")]
    pub base_currency: Option<CurrencyCode>,

    /// Rule document (overrides `rules.path`)
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Enterprise value for valuation multiples
    #[arg(long = "enterprise-value")]
    pub enterprise_value: Option<Decimal>,

    /// Keep intercompany balances instead of eliminating them
    #[arg(long = "no-consolidate")]
    pub no_consolidate: bool,

    /// Fail when an entity's rows do not net to zero
    #[arg(long = "require-balanced")]
    pub require_balanced: bool,

    /// Write the view here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}

impl Cli {
    /// Applies command line overrides on top of the configured run settings.
    pub fn apply(&self, mut config: NormalizationConfig) -> NormalizationConfig {
        if let Some(industry) = &self.industry {
            config.industry.clone_from(industry);
        }
        if let Some(base_currency) = &self.base_currency {
            config.base_currency = base_currency.clone();
        }
        if self.enterprise_value.is_some() {
            config.enterprise_value = self.enterprise_value;
        }
        if self.no_consolidate {
            config.consolidate = false;
        }
        if self.require_balanced {
            config.require_balanced_entities = true;
        }
        config
    }
}
