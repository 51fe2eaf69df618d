//! Threshold evaluation of the latest RSI value.
//!
//! Oversold-style only: a timeframe is breached when its most recent RSI is
//! strictly below the configured threshold.

use serde::Serialize;
use thiserror::Error;

use crate::domain::RsiSeries;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsufficientDataError {
    #[error("RSI series for '{label}' has no points")]
    Empty { label: String },

    #[error("latest RSI for '{label}' is undefined (need at least 2 bars, got {len})")]
    Undefined { label: String, len: usize },
}

/// Result of checking one timeframe against the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeEvaluation {
    pub label: String,
    pub latest_rsi: f64,
    pub breached: bool,
}

/// Evaluate the latest point of `series` against `threshold`.
pub fn evaluate(
    label: &str,
    series: &RsiSeries,
    threshold: f64,
) -> Result<TimeframeEvaluation, InsufficientDataError> {
    let latest = series.latest().ok_or_else(|| InsufficientDataError::Empty {
        label: label.to_string(),
    })?;
    let latest_rsi = latest.value.ok_or_else(|| InsufficientDataError::Undefined {
        label: label.to_string(),
        len: series.len(),
    })?;

    Ok(TimeframeEvaluation {
        label: label.to_string(),
        latest_rsi,
        breached: latest_rsi < threshold,
    })
}
