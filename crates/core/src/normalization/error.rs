//! Normalization run errors.

use finnorm_shared::AppError;
use thiserror::Error;

use crate::adjustments::AdjustmentError;
use crate::classification::ClassificationError;
use crate::consolidation::ConsolidationError;
use crate::rules::ConfigurationError;

/// Any error that stops a normalization run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizationError {
    /// Rule repository problem.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Input batch problem.
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    /// Adjustment validation problem.
    #[error(transparent)]
    Adjustment(#[from] AdjustmentError),

    /// Consolidation problem.
    #[error(transparent)]
    Consolidation(#[from] ConsolidationError),
}

impl NormalizationError {
    /// Returns the error code of the underlying error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(err) => err.error_code(),
            Self::Classification(err) => err.error_code(),
            Self::Adjustment(err) => err.error_code(),
            Self::Consolidation(err) => err.error_code(),
        }
    }
}

impl From<NormalizationError> for AppError {
    fn from(err: NormalizationError) -> Self {
        match err {
            NormalizationError::Configuration(err) => err.into(),
            NormalizationError::Classification(err) => err.into(),
            NormalizationError::Adjustment(err) => err.into(),
            NormalizationError::Consolidation(err) => err.into(),
        }
    }
}
