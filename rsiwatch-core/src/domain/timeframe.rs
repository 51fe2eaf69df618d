//! Timeframes: bar interval plus lookback range.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Bar interval understood by the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarInterval {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

impl BarInterval {
    /// Provider query token (`1d`, `1wk`, `1mo`).
    pub fn as_query(&self) -> &'static str {
        match self {
            BarInterval::Daily => "1d",
            BarInterval::Weekly => "1wk",
            BarInterval::Monthly => "1mo",
        }
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Lookback range tokens accepted by the chart API.
pub const LOOKBACK_RANGES: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lookback range '{0}' (expected one of: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)")]
pub struct UnknownRange(pub String);

/// Lookback period for a fetch, e.g. `5y`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LookbackRange(String);

impl LookbackRange {
    pub fn parse(token: &str) -> Result<Self, UnknownRange> {
        let token = token.trim();
        if LOOKBACK_RANGES.contains(&token) {
            Ok(Self(token.to_string()))
        } else {
            Err(UnknownRange(token.to_string()))
        }
    }

    pub fn one_year() -> Self {
        Self("1y".to_string())
    }

    pub fn five_years() -> Self {
        Self("5y".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LookbackRange {
    type Error = UnknownRange;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LookbackRange> for String {
    fn from(value: LookbackRange) -> Self {
        value.0
    }
}

impl fmt::Display for LookbackRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labelled sampling of an instrument, e.g. "Weekly" = 1wk bars over 5y.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    pub label: String,
    pub interval: BarInterval,
    pub range: LookbackRange,
}

impl Timeframe {
    pub fn new(label: impl Into<String>, interval: BarInterval, range: LookbackRange) -> Self {
        Self {
            label: label.into(),
            interval,
            range,
        }
    }
}
