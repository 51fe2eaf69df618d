//! Cleaning raw provider bars into a validated `PriceSeries`.
//!
//! - bars with a missing, non-finite or non-positive close are dropped
//! - rows are sorted by date
//! - duplicate dates keep the last observation (providers re-emit the
//!   in-progress bar)

use super::provider::RawBar;
use crate::domain::{PricePoint, PriceSeries, SeriesError};

/// Summary of what cleaning removed, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub dropped_missing: usize,
    pub dropped_duplicates: usize,
}

pub fn clean_bars(raw: Vec<RawBar>) -> Result<(PriceSeries, CleanReport), SeriesError> {
    let mut report = CleanReport::default();
    let mut points: Vec<PricePoint> = Vec::with_capacity(raw.len());

    for bar in raw {
        match bar.close {
            Some(close) if close.is_finite() && close > 0.0 => {
                points.push(PricePoint::new(bar.date, close))
            }
            _ => report.dropped_missing += 1,
        }
    }

    // stable sort keeps provider order among equal dates, so "last" is well defined
    points.sort_by_key(|p| p.date);

    let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
    for p in points {
        match deduped.last_mut() {
            Some(prev) if prev.date == p.date => {
                *prev = p;
                report.dropped_duplicates += 1;
            }
            _ => deduped.push(p),
        }
    }

    Ok((PriceSeries::new(deduped)?, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(day: u32, close: Option<f64>) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            open: close,
            close,
        }
    }

    #[test]
    fn drops_missing_closes() {
        let (series, report) =
            clean_bars(vec![raw(1, Some(10.0)), raw(2, None), raw(3, Some(f64::NAN)), raw(4, Some(11.0))])
                .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(report.dropped_missing, 2);
    }

    #[test]
    fn sorts_and_keeps_last_duplicate() {
        let (series, report) =
            clean_bars(vec![raw(3, Some(30.0)), raw(1, Some(10.0)), raw(3, Some(31.0))]).unwrap();
        let closes: Vec<f64> = series.closes().collect();
        assert_eq!(closes, vec![10.0, 31.0]);
        assert_eq!(report.dropped_duplicates, 1);
    }

    #[test]
    fn all_missing_is_empty() {
        let err = clean_bars(vec![raw(1, None), raw(2, Some(0.0))]).unwrap_err();
        assert_eq!(err, SeriesError::Empty);
    }
}
