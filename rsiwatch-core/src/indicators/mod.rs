//! Indicator implementations.
//!
//! Only RSI is computed. Indicators take a cleaned `PriceSeries` and return a
//! new series of the same length; they never mutate their input.

pub mod rsi;

pub use rsi::{compute_rsi, Rsi, DEFAULT_WINDOW};

/// Create a synthetic series from close prices for testing, one bar per day.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::PriceSeries {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    crate::domain::PriceSeries::from_closes(base_date, closes).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
