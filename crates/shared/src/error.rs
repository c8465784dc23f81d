//! Application-wide error types.
//!
//! Core modules keep their own error enums; at the application boundary they are
//! folded into [`AppError`], which decides the process exit code.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rule repository or configuration is malformed. Raised before any processing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input batch is unusable (missing row ids, duplicates, unknown industry).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An entity's ledger does not net within tolerance.
    #[error("Reconciliation failed: {0}")]
    Reconciliation(String),

    /// A currency conversion was required but no rate was available.
    #[error("Missing exchange rate: {0}")]
    MissingRate(String),

    /// An adjustment could not be applied.
    #[error("Adjustment error: {0}")]
    Adjustment(String),

    /// Input/output failure in a collaborator (reading inputs, writing output).
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 78,
            Self::InvalidInput(_) => 65,
            Self::Reconciliation(_) | Self::MissingRate(_) | Self::Adjustment(_) => 66,
            Self::Io(_) => 74,
            Self::Internal(_) => 70,
        }
    }

    /// Returns the stable error code for machine-readable output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Reconciliation(_) => "RECONCILIATION_ERROR",
            Self::MissingRate(_) => "MISSING_RATE",
            Self::Adjustment(_) => "ADJUSTMENT_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::Configuration(String::new()).exit_code(), 78);
        assert_eq!(AppError::InvalidInput(String::new()).exit_code(), 65);
        assert_eq!(AppError::Reconciliation(String::new()).exit_code(), 66);
        assert_eq!(AppError::MissingRate(String::new()).exit_code(), 66);
        assert_eq!(AppError::Adjustment(String::new()).exit_code(), 66);
        assert_eq!(AppError::Io(String::new()).exit_code(), 74);
        assert_eq!(AppError::Internal(String::new()).exit_code(), 70);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Configuration(String::new()).error_code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(
            AppError::InvalidInput(String::new()).error_code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            AppError::Reconciliation(String::new()).error_code(),
            "RECONCILIATION_ERROR"
        );
        assert_eq!(
            AppError::MissingRate(String::new()).error_code(),
            "MISSING_RATE"
        );
        assert_eq!(AppError::Io(String::new()).error_code(), "IO_ERROR");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Configuration("msg".into()).to_string(),
            "Configuration error: msg"
        );
        assert_eq!(
            AppError::MissingRate("msg".into()).to_string(),
            "Missing exchange rate: msg"
        );
        assert_eq!(
            AppError::Reconciliation("msg".into()).to_string(),
            "Reconciliation failed: msg"
        );
    }

    #[test]
    fn test_from_io_error() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
