//! Series store: CSV snapshot of a price series and its RSI.
//!
//! One file per timeframe, columns `Date,Close,RSI[,Close_Converted]`,
//! chronological, header row always present. Each write replaces the whole
//! file so a run leaves a complete, self-contained snapshot.
//!
//! Floats are written with Rust's shortest round-trip formatting, so re-running
//! on the same input reproduces the file byte for byte.

use std::path::PathBuf;

use chrono::NaiveDate;
use rsiwatch_core::domain::{PriceSeries, RsiSeries};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("price and RSI series are misaligned at row {row}")]
    Misaligned { row: usize },

    #[error("invalid FX rate {0}")]
    InvalidFxRate(f64),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV output is not valid UTF-8")]
    Utf8,
}

/// One exported bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
    pub close_converted: Option<f64>,
}

/// Pair price and RSI points into export rows, adding the converted close
/// when an FX rate is supplied.
pub fn export_rows(
    series: &PriceSeries,
    rsi: &RsiSeries,
    fx_rate: Option<f64>,
) -> Result<Vec<ExportRow>, ExportError> {
    if let Some(rate) = fx_rate {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(ExportError::InvalidFxRate(rate));
        }
    }
    if series.len() != rsi.len() {
        return Err(ExportError::Misaligned {
            row: series.len().min(rsi.len()),
        });
    }

    series
        .points()
        .iter()
        .zip(rsi.points())
        .enumerate()
        .map(|(row, (price, r))| {
            if price.date != r.date {
                return Err(ExportError::Misaligned { row });
            }
            Ok(ExportRow {
                date: price.date,
                close: price.close,
                rsi: r.value,
                close_converted: fx_rate.map(|rate| price.close * rate),
            })
        })
        .collect()
}

/// Render rows as CSV. The converted column appears only when `with_fx`.
pub fn export_csv(rows: &[ExportRow], with_fx: bool) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    if with_fx {
        wtr.write_record(["Date", "Close", "RSI", "Close_Converted"])?;
    } else {
        wtr.write_record(["Date", "Close", "RSI"])?;
    }

    for row in rows {
        let date = row.date.to_string();
        let close = row.close.to_string();
        let rsi = row.rsi.map(|v| v.to_string()).unwrap_or_default();
        if with_fx {
            let converted = row.close_converted.map(|v| v.to_string()).unwrap_or_default();
            wtr.write_record([&date, &close, &rsi, &converted])?;
        } else {
            wtr.write_record([&date, &close, &rsi])?;
        }
    }

    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(data).map_err(|_| ExportError::Utf8)
}

/// Writes per-timeframe snapshots under a fixed output directory.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    output_dir: PathBuf,
}

impl SeriesStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Export and overwrite `file_name`. Returns the written path and row count.
    pub fn save(
        &self,
        file_name: &str,
        series: &PriceSeries,
        rsi: &RsiSeries,
        fx_rate: Option<f64>,
    ) -> Result<(PathBuf, usize), ExportError> {
        let rows = export_rows(series, rsi, fx_rate)?;
        let text = export_csv(&rows, fx_rate.is_some())?;

        std::fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        let path = self.output_dir.join(file_name);
        std::fs::write(&path, text).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        Ok((path, rows.len()))
    }
}
