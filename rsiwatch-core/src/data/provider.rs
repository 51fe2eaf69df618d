//! Data provider traits and structured error types.
//!
//! The traits abstract over the market-data boundary (Yahoo Finance in
//! production, in-memory fixtures in tests). Every call is a blocking request
//! with no retry: a failure is reported once and the caller decides.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PriceSeries, SeriesError, Timeframe};

/// Raw bar from a data provider, before cleaning.
///
/// Providers report missing values for non-trading periods; those are kept as
/// `None` here and removed by [`super::clean::clean_bars`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub close: Option<f64>,
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {symbol}")]
    HttpStatus { symbol: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no usable price data for {symbol}")]
    EmptySeries { symbol: String },

    #[error("invalid price series for {symbol}: {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: SeriesError,
    },

    #[error("invalid FX rate for {pair}: {rate}")]
    InvalidRate { pair: String, rate: f64 },

    #[error("no display name available for {symbol}")]
    NameUnavailable { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Supplies the cleaned price series for one instrument and timeframe.
pub trait PriceSource {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch closes for `symbol` sampled at `timeframe`.
    ///
    /// A series that was fetched but has no usable bars is reported as
    /// [`DataError::EmptySeries`], distinct from transport failures.
    fn fetch_series(&self, symbol: &str, timeframe: &Timeframe) -> Result<PriceSeries, DataError>;
}

/// Supplies a spot foreign-exchange rate, e.g. `USDJPY=X`.
pub trait FxSource {
    fn spot_rate(&self, pair: &str) -> Result<f64, DataError>;
}

/// Resolves a human-readable instrument name. Cosmetic only.
pub trait NameLookup {
    fn display_name(&self, symbol: &str) -> Result<String, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_error_is_distinct_from_network_failure() {
        let empty = DataError::EmptySeries {
            symbol: "BTC-USD".into(),
        };
        let net = DataError::NetworkUnreachable("timed out".into());
        assert_eq!(empty.to_string(), "no usable price data for BTC-USD");
        assert_eq!(net.to_string(), "network unreachable: timed out");
    }
}
