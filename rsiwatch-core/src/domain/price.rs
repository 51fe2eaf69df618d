//! Price series: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closing price of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// A close that is finite and strictly positive.
    pub fn is_sane(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series is empty")]
    Empty,

    #[error("invalid close {close} on {date}")]
    InvalidClose { date: NaiveDate, close: f64 },

    #[error("dates not strictly increasing: {prev} followed by {next}")]
    NotIncreasing { prev: NaiveDate, next: NaiveDate },
}

/// Ordered closing prices, one per bar of a fixed interval.
///
/// Construction enforces: at least one point, strictly increasing dates,
/// finite positive closes. A `PriceSeries` is never mutated after that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        if points.is_empty() {
            return Err(SeriesError::Empty);
        }
        if let Some(bad) = points.iter().find(|p| !p.is_sane()) {
            return Err(SeriesError::InvalidClose {
                date: bad.date,
                close: bad.close,
            });
        }
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotIncreasing {
                    prev: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { points })
    }

    /// Build a series from bare closes on consecutive days starting at `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self, SeriesError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start + chrono::Duration::days(i as i64), close))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed series; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> &PricePoint {
        // non-empty by construction
        &self.points[self.points.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn series_accepts_increasing_dates() {
        let s = PriceSeries::new(vec![PricePoint::new(day(1), 10.0), PricePoint::new(day(2), 11.0)])
            .unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.last().close, 11.0);
    }

    #[test]
    fn series_rejects_empty() {
        assert_eq!(PriceSeries::new(vec![]), Err(SeriesError::Empty));
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let err = PriceSeries::new(vec![PricePoint::new(day(3), 10.0), PricePoint::new(day(3), 11.0)])
            .unwrap_err();
        assert!(matches!(err, SeriesError::NotIncreasing { .. }));
    }

    #[test]
    fn series_rejects_nan_and_non_positive_close() {
        let nan = PriceSeries::new(vec![PricePoint::new(day(1), f64::NAN)]).unwrap_err();
        assert!(matches!(nan, SeriesError::InvalidClose { .. }));
        let zero = PriceSeries::new(vec![PricePoint::new(day(1), 0.0)]).unwrap_err();
        assert!(matches!(zero, SeriesError::InvalidClose { .. }));
    }

    #[test]
    fn from_closes_assigns_consecutive_days() {
        let s = PriceSeries::from_closes(day(1), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.points()[2].date, day(3));
        assert_eq!(s.closes().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }
}
