//! Input batch file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use finnorm_core::adjustments::AdjustmentDetail;
use finnorm_core::currency::ExchangeRate;
use finnorm_core::ledger::Transaction;
use finnorm_shared::{AppError, AppResult};

/// Everything one run reads from disk.
#[derive(Debug, Deserialize)]
pub struct NormalizerInput {
    /// Rows from every entity.
    pub transactions: Vec<Transaction>,
    /// Quotes into (or out of) the base currency.
    #[serde(default)]
    pub rates: Vec<ExchangeRate>,
    /// Analyst adjustments.
    #[serde(default)]
    pub manual_adjustments: Vec<AdjustmentDetail>,
}

impl NormalizerInput {
    /// Reads and parses an input file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
            .map_err(|e| AppError::InvalidInput(format!("{}: {e}", path.display())))
    }

    /// Parses an input document.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finnorm_core::RuleRepository;
    use finnorm_core::currency::RateTable;
    use finnorm_core::normalization::{NormalizationConfig, NormalizedViewEngine};
    use finnorm_shared::types::CurrencyCode;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = include_str!("../../../demos/sample_input.json");

    #[test]
    fn test_sample_parses() {
        let input = NormalizerInput::from_json_str(SAMPLE).unwrap();
        assert_eq!(input.transactions.len(), 12);
        assert_eq!(input.rates.len(), 1);
        assert_eq!(input.manual_adjustments.len(), 1);
        assert_eq!(input.transactions[0].signed_amount, dec!(-1000000));
    }

    #[test]
    fn test_sample_runs_end_to_end() {
        let input = NormalizerInput::from_json_str(SAMPLE).unwrap();
        let repo = RuleRepository::builtin().unwrap();
        let rates = RateTable::new(CurrencyCode::usd(), input.rates).unwrap();
        let view = NormalizedViewEngine::new(&repo)
            .generate_normalized_view(
                input.transactions,
                input.manual_adjustments,
                &NormalizationConfig::default(),
                &rates,
            )
            .unwrap();

        assert_eq!(view.entities.len(), 2);
        assert_eq!(view.eliminations.len(), 1);
        assert_eq!(view.metrics.reported.ebitda, dec!(316000));
        assert_eq!(view.metrics.adjusted.ebitda, dec!(437000));
    }

    #[test]
    fn test_missing_transactions_rejected() {
        assert!(NormalizerInput::from_json_str(r#"{"rates": []}"#).is_err());
    }
}
