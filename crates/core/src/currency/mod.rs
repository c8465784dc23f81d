//! Currency conversion into the reporting currency.

pub mod error;
pub mod exchange;
pub mod service;

#[cfg(test)]
mod tests;

pub use error::CurrencyError;
pub use exchange::{ExchangeRate, RateLookup, RateTable};
pub use service::CurrencyService;
