//! Yahoo Finance data provider.
//!
//! Fetches bars from Yahoo's v8 chart API for a lookback range and interval.
//! The same endpoint serves FX pairs (`USDJPY=X`) and carries the instrument's
//! long/short name in its metadata, so one provider covers all three
//! market-data boundaries.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; parse failures surface as `ResponseFormatChanged`.

use super::clean::clean_bars;
use super::provider::{DataError, FxSource, NameLookup, PriceSource, RawBar};
use crate::domain::{BarInterval, LookbackRange, PriceSeries, SeriesError, Timeframe};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    long_name: Option<String>,
    short_name: Option<String>,
    #[serde(rename = "gmtoffset")]
    gmt_offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Build the chart API URL for a symbol, range and interval.
    fn chart_url(symbol: &str, range: &LookbackRange, interval: BarInterval) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?range={range}&interval={interval}&includeAdjustedClose=true"
        )
    }

    /// Issue one request and decode the chart payload. No retry.
    fn fetch_chart(
        &self,
        symbol: &str,
        range: &LookbackRange,
        interval: BarInterval,
    ) -> Result<ChartData, DataError> {
        let url = Self::chart_url(symbol, range, interval);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;
        Self::first_result(symbol, chart)
    }

    fn first_result(symbol: &str, resp: ChartResponse) -> Result<ChartData, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))
    }

    /// Convert chart data into raw bars, dated in the exchange's local calendar.
    fn parse_bars(data: ChartData) -> Result<Vec<RawBar>, DataError> {
        // an empty range comes back without timestamps
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let offset = data.meta.and_then(|m| m.gmt_offset).unwrap_or(0);

        timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| {
                let date = ts
                    .checked_add(offset)
                    .and_then(|local| chrono::DateTime::from_timestamp(local, 0))
                    .map(|dt| dt.naive_utc().date())
                    .ok_or_else(|| {
                        DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                    })?;
                Ok(RawBar {
                    date,
                    open: quote.open.get(i).copied().flatten(),
                    close: quote.close.get(i).copied().flatten(),
                })
            })
            .collect()
    }

    fn to_series(symbol: &str, bars: Vec<RawBar>) -> Result<PriceSeries, DataError> {
        match clean_bars(bars) {
            Ok((series, report)) => {
                if report.dropped_missing > 0 || report.dropped_duplicates > 0 {
                    tracing::debug!(
                        symbol,
                        dropped_missing = report.dropped_missing,
                        dropped_duplicates = report.dropped_duplicates,
                        kept = series.len(),
                        "cleaned provider bars"
                    );
                }
                Ok(series)
            }
            Err(SeriesError::Empty) => Err(DataError::EmptySeries {
                symbol: symbol.to_string(),
            }),
            Err(source) => Err(DataError::InvalidSeries {
                symbol: symbol.to_string(),
                source,
            }),
        }
    }
}

impl PriceSource for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_series(&self, symbol: &str, timeframe: &Timeframe) -> Result<PriceSeries, DataError> {
        let data = self.fetch_chart(symbol, &timeframe.range, timeframe.interval)?;
        let bars = Self::parse_bars(data)?;
        Self::to_series(symbol, bars)
    }
}

impl FxSource for YahooProvider {
    /// Opening rate of the most recent daily bar.
    fn spot_rate(&self, pair: &str) -> Result<f64, DataError> {
        let range = LookbackRange::parse("1d").map_err(|e| DataError::Other(e.to_string()))?;
        let data = self.fetch_chart(pair, &range, BarInterval::Daily)?;
        let bars = Self::parse_bars(data)?;
        spot_from_bars(pair, &bars)
    }
}

impl NameLookup for YahooProvider {
    fn display_name(&self, symbol: &str) -> Result<String, DataError> {
        let range = LookbackRange::parse("1d").map_err(|e| DataError::Other(e.to_string()))?;
        let data = self.fetch_chart(symbol, &range, BarInterval::Daily)?;
        name_from_meta(symbol, data.meta)
    }
}

fn spot_from_bars(pair: &str, bars: &[RawBar]) -> Result<f64, DataError> {
    let last = bars.last().ok_or_else(|| DataError::EmptySeries {
        symbol: pair.to_string(),
    })?;
    match last.open.or(last.close) {
        Some(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        other => Err(DataError::InvalidRate {
            pair: pair.to_string(),
            rate: other.unwrap_or(f64::NAN),
        }),
    }
}

fn name_from_meta(symbol: &str, meta: Option<ChartMeta>) -> Result<String, DataError> {
    meta.and_then(|m| m.long_name.or(m.short_name))
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DataError::NameUnavailable {
            symbol: symbol.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"longName": "Apple Inc.", "shortName": "Apple", "gmtoffset": -14400},
                "timestamp": [1704171600, 1704258000, 1704344400],
                "indicators": {
                    "quote": [{
                        "open": [187.15, null, 182.15],
                        "close": [185.64, null, 181.91]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    fn sample_data() -> ChartData {
        let resp: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        YahooProvider::first_result("AAPL", resp).unwrap()
    }

    #[test]
    fn chart_url_uses_range_and_interval() {
        let url = YahooProvider::chart_url(
            "BTC-USD",
            &LookbackRange::parse("5y").unwrap(),
            BarInterval::Monthly,
        );
        assert!(url.contains("/chart/BTC-USD?"));
        assert!(url.contains("range=5y"));
        assert!(url.contains("interval=1mo"));
    }

    #[test]
    fn parses_bars_in_local_calendar() {
        let bars = YahooProvider::parse_bars(sample_data()).unwrap();
        assert_eq!(bars.len(), 3);
        // 2024-01-02 05:00 UTC minus 4h is still 2024-01-02
        assert_eq!(bars[0].date, chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, None);
    }

    #[test]
    fn series_drops_missing_bar() {
        let bars = YahooProvider::parse_bars(sample_data()).unwrap();
        let series = YahooProvider::to_series("AAPL", bars).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().close, 181.91);
    }

    #[test]
    fn empty_payload_is_empty_series() {
        let err = YahooProvider::to_series("AAPL", vec![]).unwrap_err();
        assert!(matches!(err, DataError::EmptySeries { .. }));
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let err = YahooProvider::first_result("NOPE", resp).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn name_prefers_long_name() {
        let name = name_from_meta("AAPL", sample_data().meta).unwrap();
        assert_eq!(name, "Apple Inc.");
    }

    #[test]
    fn missing_name_is_unavailable() {
        let err = name_from_meta("AAPL", None).unwrap_err();
        assert!(matches!(err, DataError::NameUnavailable { .. }));
    }

    #[test]
    fn spot_uses_latest_open() {
        let bars = YahooProvider::parse_bars(sample_data()).unwrap();
        assert_eq!(spot_from_bars("USDJPY=X", &bars).unwrap(), 182.15);
    }

    #[test]
    fn spot_rejects_missing_rate() {
        let bars = vec![RawBar {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: None,
            close: None,
        }];
        let err = spot_from_bars("USDJPY=X", &bars).unwrap_err();
        assert!(matches!(err, DataError::InvalidRate { .. }));
    }

    #[test]
    fn overflowing_timestamp_is_format_change() {
        let json = r#"{"chart":{"result":[{
            "meta": {"gmtoffset": 3600},
            "timestamp": [9223372036854775807],
            "indicators": {"quote": [{"open": [1.0], "close": [1.0]}]}
        }],"error":null}}"#;
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        let data = YahooProvider::first_result("AAPL", resp).unwrap();
        let err = YahooProvider::parse_bars(data).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(ref m) if m.contains("invalid timestamp")));
    }

    #[test]
    fn series_keeps_last_of_duplicate_dates() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bar = |close| RawBar {
            date: day,
            open: None,
            close: Some(close),
        };
        let series = YahooProvider::to_series("BTC-USD", vec![bar(10.0), bar(11.0)]).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.last().close, 11.0);
    }
}
