//! Relative Strength Index (RSI).
//!
//! Simple (rolling mean) averages of gains and losses over `window` deltas.
//! While fewer than `window` deltas exist the average expands over whatever is
//! available, so early values rest on fewer observations.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: avg_loss == 0 → RSI = 100; both zero → RSI = 50.
//! The first point has no delta and carries no RSI.

use crate::domain::{PriceSeries, RsiPoint, RsiSeries};

/// Conventional RSI window.
pub const DEFAULT_WINDOW: usize = 14;

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "RSI window must be >= 1");
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn compute(&self, series: &PriceSeries) -> RsiSeries {
        let points = series.points();
        let deltas: Vec<f64> = points.windows(2).map(|w| w[1].close - w[0].close).collect();

        let mut out = Vec::with_capacity(points.len());
        out.push(RsiPoint {
            date: points[0].date,
            value: None,
        });

        // deltas[i - 1] is the change into bar i
        for (i, point) in points.iter().enumerate().skip(1) {
            let span = &deltas[i.saturating_sub(self.window)..i];
            let (avg_gain, avg_loss) = averages(span);
            out.push(RsiPoint {
                date: point.date,
                value: Some(rsi_from_averages(avg_gain, avg_loss)),
            });
        }

        RsiSeries::new(self.window, out)
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

/// Compute the RSI series for `series` over `window` deltas.
pub fn compute_rsi(series: &PriceSeries, window: usize) -> RsiSeries {
    Rsi::new(window).compute(series)
}

/// Mean gain and mean loss over `span` (non-empty).
fn averages(span: &[f64]) -> (f64, f64) {
    let count = span.len() as f64;
    let (gain, loss) = sum_moves(span, 1.0);
    if gain.is_finite() && loss.is_finite() {
        return (gain / count, loss / count);
    }
    // raw sums overflowed near f64::MAX; scale each delta first
    sum_moves(span, count)
}

fn sum_moves(span: &[f64], divisor: f64) -> (f64, f64) {
    span.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d / divisor, l)
        } else {
            (g, l - d / divisor)
        }
    })
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0 // no movement
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        if rs.is_nan() {
            // both averages infinite: equal weight either way
            50.0
        } else {
            (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn rsi_all_gains() {
        let series = make_series(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&series);
        assert!(result.points()[0].value.is_none());
        for v in result.values().skip(1) {
            assert_approx(v.unwrap(), 100.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rsi_all_losses() {
        let series = make_series(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&series);
        for v in result.values().skip(1) {
            assert_approx(v.unwrap(), 0.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rsi_flat_is_neutral() {
        let series = make_series(&[42.0; 8]);
        let result = Rsi::new(3).compute(&series);
        for v in result.values().skip(1) {
            assert_eq!(v, Some(50.0));
        }
    }

    #[test]
    fn rsi_expanding_then_rolling() {
        // Closes: 44, 44.34, 44.09, 43.61, 44.33
        // Changes: +0.34, -0.25, -0.48, +0.72
        // window=3:
        //   bar 2: gains 0.34, losses 0.25 (expanding, 2 samples)
        //   bar 4: last three changes → gains 0.72, losses 0.73
        let series = make_series(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&series);
        let v: Vec<Option<f64>> = result.values().collect();

        assert_eq!(v[0], None);
        assert_approx(v[1].unwrap(), 100.0, DEFAULT_EPSILON);
        let g2 = 0.34_f64;
        let l2 = 44.34_f64 - 44.09;
        assert_approx(v[2].unwrap(), 100.0 - 100.0 / (1.0 + g2 / l2), 1e-9);
        let g4 = 44.33_f64 - 43.61;
        let l4 = (44.34_f64 - 44.09) + (44.09 - 43.61);
        assert_approx(v[4].unwrap(), 100.0 - 100.0 / (1.0 + g4 / l4), 1e-9);
    }

    #[test]
    fn rsi_window_slides_old_losses_out() {
        // one early loss, then only gains: once the loss leaves the window RSI hits 100
        let series = make_series(&[10.0, 9.0, 10.0, 11.0, 12.0]);
        let result = Rsi::new(2).compute(&series);
        let v: Vec<Option<f64>> = result.values().collect();
        assert_approx(v[1].unwrap(), 0.0, DEFAULT_EPSILON);
        assert_approx(v[2].unwrap(), 50.0, DEFAULT_EPSILON);
        assert_approx(v[3].unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(v[4].unwrap(), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_single_point_has_no_value() {
        let result = compute_rsi(&make_series(&[10.0]), DEFAULT_WINDOW);
        assert_eq!(result.len(), 1);
        assert!(result.points()[0].value.is_none());
    }

    #[test]
    fn rsi_output_keeps_dates() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        let result = compute_rsi(&series, DEFAULT_WINDOW);
        let dates: Vec<_> = result.points().iter().map(|p| p.date).collect();
        let expected: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, expected);
        assert_eq!(result.window(), DEFAULT_WINDOW);
    }

    #[test]
    #[should_panic(expected = "RSI window must be >= 1")]
    fn rsi_zero_window_panics() {
        Rsi::new(0);
    }

    #[test]
    fn rsi_default_window() {
        assert_eq!(Rsi::default().window(), 14);
    }

    #[test]
    fn rsi_near_f64_max_stays_in_range() {
        let series = make_series(&[1.0, f64::MAX, 1.0, f64::MAX, 1.0]);
        let v: Vec<Option<f64>> = Rsi::new(14).compute(&series).values().collect();
        assert_eq!(v[1], Some(100.0));
        assert_eq!(v[4], Some(50.0));
    }

    #[test]
    fn infinite_averages_are_neutral() {
        assert_eq!(rsi_from_averages(f64::INFINITY, f64::INFINITY), 50.0);
        assert_eq!(rsi_from_averages(f64::INFINITY, 1.0), 100.0);
    }
}
