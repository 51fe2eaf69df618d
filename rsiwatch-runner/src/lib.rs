//! rsiwatch runner: alert run orchestration.
//!
//! This crate builds on `rsiwatch-core` to provide:
//! - TOML configuration with validation and deployment presets
//! - CSV series store (per-timeframe snapshots, optional FX column)
//! - Alert composition for single- and multi-timeframe runs
//! - Notifier boundary with an SMTP implementation
//! - Progress reporting through `tracing`
//! - The stage-by-stage pipeline that ties them together

pub mod alert;
pub mod config;
pub mod export;
pub mod notify;
pub mod pipeline;
pub mod progress;

pub use alert::{compose, AlertDecision};
pub use config::{AlertConfig, ConfigError, MailConfig, TimeframeConfig};
pub use export::{export_csv, export_rows, ExportError, ExportRow, SeriesStore};
pub use notify::{Notifier, NotifyError, SmtpNotifier};
pub use pipeline::{Pipeline, RunError, RunReport, RunStage, TimeframeOutcome};
pub use progress::{NoopProgress, RunProgress, TracingProgress};
