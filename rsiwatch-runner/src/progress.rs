//! Progress reporting for an alert run.
//!
//! The pipeline never logs directly; it reports through an injected
//! `RunProgress`. `TracingProgress` turns the callbacks into structured
//! `tracing` events, tests use a recorder or `NoopProgress`.

use std::path::Path;

use rsiwatch_core::TimeframeEvaluation;

use crate::alert::AlertDecision;
use crate::notify::NotifyError;
use crate::pipeline::{RunError, RunStage};

/// Callbacks for the progress trail of one run.
pub trait RunProgress {
    /// Called once before any fetch. `source` names the price provider.
    fn on_start(&self, symbol: &str, source: &str, timeframes: usize);

    /// Called on every stage transition. `timeframe` is set for per-timeframe stages.
    fn on_stage(&self, stage: RunStage, timeframe: Option<&str>);

    /// Called after a timeframe's CSV snapshot is written.
    fn on_saved(&self, timeframe: &str, path: &Path, rows: usize);

    fn on_evaluated(&self, evaluation: &TimeframeEvaluation);

    /// Non-fatal problem, e.g. the display name could not be resolved.
    fn on_warning(&self, message: &str);

    fn on_decision(&self, decision: &AlertDecision);

    fn on_notified(&self, result: &Result<(), NotifyError>);

    /// Called once when the run enters `Failed`.
    fn on_failed(&self, stage: RunStage, error: &RunError);
}

/// Emits the progress trail as `tracing` events.
pub struct TracingProgress;

impl RunProgress for TracingProgress {
    fn on_start(&self, symbol: &str, source: &str, timeframes: usize) {
        tracing::info!(symbol, source, timeframes, "Script started.");
    }

    fn on_stage(&self, stage: RunStage, timeframe: Option<&str>) {
        tracing::debug!(?stage, timeframe, "stage");
    }

    fn on_saved(&self, timeframe: &str, path: &Path, rows: usize) {
        tracing::info!(timeframe, path = %path.display(), rows, "{timeframe} RSI data saved.");
    }

    fn on_evaluated(&self, evaluation: &TimeframeEvaluation) {
        tracing::info!(
            timeframe = %evaluation.label,
            rsi = evaluation.latest_rsi,
            breached = evaluation.breached,
            "evaluated"
        );
    }

    fn on_warning(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn on_decision(&self, decision: &AlertDecision) {
        if decision.should_send {
            tracing::info!(subject = %decision.subject, "RSI threshold breached.");
        } else {
            tracing::info!("No RSI threshold breaches.");
        }
    }

    fn on_notified(&self, result: &Result<(), NotifyError>) {
        match result {
            Ok(()) => tracing::info!("Email sent successfully."),
            Err(e) => tracing::error!(error = %e, "Email delivery failed."),
        }
    }

    fn on_failed(&self, stage: RunStage, error: &RunError) {
        tracing::error!(?stage, error = %error, "Error occurred: {error}");
    }
}

/// Discards every callback.
pub struct NoopProgress;

impl RunProgress for NoopProgress {
    fn on_start(&self, _symbol: &str, _source: &str, _timeframes: usize) {}
    fn on_stage(&self, _stage: RunStage, _timeframe: Option<&str>) {}
    fn on_saved(&self, _timeframe: &str, _path: &Path, _rows: usize) {}
    fn on_evaluated(&self, _evaluation: &TimeframeEvaluation) {}
    fn on_warning(&self, _message: &str) {}
    fn on_decision(&self, _decision: &AlertDecision) {}
    fn on_notified(&self, _result: &Result<(), NotifyError>) {}
    fn on_failed(&self, _stage: RunStage, _error: &RunError) {}
}
