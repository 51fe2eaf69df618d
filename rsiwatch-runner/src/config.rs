//! Serializable alert-run configuration.
//!
//! Loaded once per run from a TOML file and passed by value into the
//! pipeline. Every key without a default is required; a missing file or key
//! is a fatal `ConfigError` before any fetch happens.

use rsiwatch_core::domain::{BarInterval, LookbackRange, Timeframe};
use rsiwatch_core::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing or empty config value: {0}")]
    Missing(&'static str),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Full configuration for one alert run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertConfig {
    pub instrument: InstrumentConfig,
    pub alert: ThresholdConfig,
    pub mail: MailConfig,
    pub timeframes: Vec<TimeframeConfig>,

    /// Optional currency conversion for the exported close column.
    #[serde(default)]
    pub fx: Option<FxConfig>,

    /// Directory the per-timeframe CSV files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Per-request HTTP timeout for the market-data provider.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentConfig {
    /// Provider symbol, e.g. `BTC-USD` or `AAPL`.
    pub symbol: String,

    /// Name used in messages. Defaults to the symbol.
    #[serde(default)]
    pub label: Option<String>,

    /// Resolve the display name from the provider before composing.
    #[serde(default)]
    pub lookup_name: bool,
}

impl InstrumentConfig {
    pub fn label_or_symbol(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.symbol)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdConfig {
    /// Oversold bound in (0, 100).
    pub threshold: f64,

    #[serde(default = "default_window")]
    pub window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MailConfig {
    pub from: String,
    pub password: String,
    pub to: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeframeConfig {
    pub label: String,
    pub interval: BarInterval,
    pub range: LookbackRange,
    /// CSV file name, relative to `output_dir`.
    pub output: String,
}

impl TimeframeConfig {
    pub fn timeframe(&self) -> Timeframe {
        Timeframe::new(self.label.clone(), self.interval, self.range.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FxConfig {
    /// Provider pair symbol, e.g. `USDJPY=X`.
    pub pair: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

impl AlertConfig {
    /// Read, parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AlertConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AlertConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.symbol.trim().is_empty() {
            return Err(ConfigError::Missing("instrument.symbol"));
        }

        let t = self.alert.threshold;
        if !(t > 0.0 && t < 100.0) {
            return Err(ConfigError::Invalid {
                field: "alert.threshold",
                reason: format!("{t} is outside (0, 100)"),
            });
        }
        if self.alert.window == 0 {
            return Err(ConfigError::Invalid {
                field: "alert.window",
                reason: "must be at least 1".into(),
            });
        }

        let mail = [
            ("mail.from", &self.mail.from),
            ("mail.password", &self.mail.password),
            ("mail.to", &self.mail.to),
            ("mail.smtp_server", &self.mail.smtp_server),
        ];
        for (field, value) in mail {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(field));
            }
        }
        if self.mail.smtp_port == 0 {
            return Err(ConfigError::Missing("mail.smtp_port"));
        }

        if self.timeframes.is_empty() {
            return Err(ConfigError::Missing("timeframes"));
        }
        let mut labels = HashSet::new();
        let mut outputs = HashSet::new();
        for tf in &self.timeframes {
            if tf.label.trim().is_empty() {
                return Err(ConfigError::Missing("timeframes.label"));
            }
            if tf.output.trim().is_empty() {
                return Err(ConfigError::Missing("timeframes.output"));
            }
            if !labels.insert(tf.label.as_str()) {
                return Err(ConfigError::Invalid {
                    field: "timeframes.label",
                    reason: format!("duplicate label '{}'", tf.label),
                });
            }
            if !outputs.insert(tf.output.as_str()) {
                return Err(ConfigError::Invalid {
                    field: "timeframes.output",
                    reason: format!("duplicate output '{}'", tf.output),
                });
            }
        }

        if let Some(fx) = &self.fx {
            if fx.pair.trim().is_empty() {
                return Err(ConfigError::Missing("fx.pair"));
            }
        }

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "http_timeout_secs",
                reason: "must be at least 1".into(),
            });
        }

        Ok(())
    }

    /// True when exactly one timeframe is configured.
    pub fn is_single_timeframe(&self) -> bool {
        self.timeframes.len() == 1
    }

    pub fn output_path(&self, tf: &TimeframeConfig) -> PathBuf {
        self.output_dir.join(&tf.output)
    }

    /// Bitcoin monthly RSI over five years, exported with a USD→JPY column.
    pub fn crypto_monthly(mail: MailConfig) -> Self {
        Self {
            instrument: InstrumentConfig {
                symbol: "BTC-USD".into(),
                label: Some("Bitcoin".into()),
                lookup_name: false,
            },
            alert: ThresholdConfig {
                threshold: 30.0,
                window: DEFAULT_WINDOW,
            },
            mail,
            timeframes: vec![TimeframeConfig {
                label: "Monthly".into(),
                interval: BarInterval::Monthly,
                range: LookbackRange::five_years(),
                output: "btc_rsi_data.csv".into(),
            }],
            fx: Some(FxConfig {
                pair: "USDJPY=X".into(),
            }),
            output_dir: default_output_dir(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }

    /// Equity RSI on monthly (5y), weekly (5y) and daily (1y) bars with name lookup.
    pub fn stock_multi(symbol: &str, mail: MailConfig) -> Self {
        let tf = |label: &str, interval, range, output: &str| TimeframeConfig {
            label: label.into(),
            interval,
            range,
            output: output.into(),
        };
        Self {
            instrument: InstrumentConfig {
                symbol: symbol.into(),
                label: None,
                lookup_name: true,
            },
            alert: ThresholdConfig {
                threshold: 30.0,
                window: DEFAULT_WINDOW,
            },
            mail,
            timeframes: vec![
                tf(
                    "Monthly",
                    BarInterval::Monthly,
                    LookbackRange::five_years(),
                    "monthly_rsi_data.csv",
                ),
                tf(
                    "Weekly",
                    BarInterval::Weekly,
                    LookbackRange::five_years(),
                    "weekly_rsi_data.csv",
                ),
                tf(
                    "Daily",
                    BarInterval::Daily,
                    LookbackRange::one_year(),
                    "daily_rsi_data.csv",
                ),
            ],
            fx: None,
            output_dir: default_output_dir(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}
