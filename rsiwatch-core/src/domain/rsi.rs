//! RSI series: output of the RSI engine, paired 1:1 with a price series.

use chrono::NaiveDate;
use serde::Serialize;

/// RSI at one bar. `value` is `None` only where no prior delta exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RsiPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiSeries {
    window: usize,
    points: Vec<RsiPoint>,
}

impl RsiSeries {
    pub fn new(window: usize, points: Vec<RsiPoint>) -> Self {
        Self { window, points }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn points(&self) -> &[RsiPoint] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&RsiPoint> {
        self.points.last()
    }
}
