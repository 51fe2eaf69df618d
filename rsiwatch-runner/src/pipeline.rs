//! Alert run orchestration.
//!
//! One run walks the stages
//! `Fetching → Computing → Persisting → Evaluating` once per timeframe, then
//! `Composing → Notifying → Done` once over all evaluations. Any failure
//! before `Composing` moves the run to `Failed` and nothing is sent. A
//! delivery failure is recorded on the report but the run still ends `Done`:
//! the computation itself succeeded. Nothing is retried.
//!
//! The pipeline holds borrowed capabilities only (providers, notifier,
//! progress) and owns its config, so it can be exercised in tests without
//! network, mail or global logging state.

use std::path::PathBuf;

use rsiwatch_core::data::{DataError, FxSource, NameLookup, PriceSource};
use rsiwatch_core::domain::Instrument;
use rsiwatch_core::{compute_rsi, evaluate, InsufficientDataError, TimeframeEvaluation};
use serde::Serialize;
use thiserror::Error;

use crate::alert::{compose, AlertDecision};
use crate::config::{AlertConfig, ConfigError, TimeframeConfig};
use crate::export::{ExportError, SeriesStore};
use crate::notify::{NotifyError, Notifier};
use crate::progress::{RunProgress, TracingProgress};

/// Stage of an alert run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RunStage {
    Fetching,
    Computing,
    Persisting,
    Evaluating,
    Composing,
    Notifying,
    Done,
    Failed,
}

/// Errors that end or mark a run, tagged by kind.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration missing or invalid: {0}")]
    ConfigMissing(#[from] ConfigError),

    #[error("fetch failed for {target}: {source}")]
    FetchFailure {
        target: String,
        #[source]
        source: DataError,
    },

    #[error("insufficient data: {0}")]
    InsufficientData(#[from] InsufficientDataError),

    #[error("persist failed for {timeframe}: {source}")]
    PersistFailure {
        timeframe: String,
        #[source]
        source: ExportError,
    },

    #[error("notification failed: {0}")]
    NotifyFailure(#[from] NotifyError),
}

/// Everything one timeframe produced.
#[derive(Debug, Clone, Serialize)]
pub struct TimeframeOutcome {
    pub evaluation: TimeframeEvaluation,
    pub path: PathBuf,
    pub rows: usize,
}

/// Final state of a run.
#[derive(Debug)]
pub struct RunReport {
    /// `Done` or `Failed`.
    pub stage: RunStage,
    /// Stage that failed, when `stage == Failed`.
    pub failed_at: Option<RunStage>,
    pub error: Option<RunError>,
    pub instrument: Instrument,
    /// Timeframes that finished all per-timeframe stages, in config order.
    pub completed: Vec<TimeframeOutcome>,
    pub decision: Option<AlertDecision>,
    /// True when the alert was handed to the notifier and accepted.
    pub sent: bool,
}

impl RunReport {
    fn new(instrument: Instrument) -> Self {
        Self {
            stage: RunStage::Fetching,
            failed_at: None,
            error: None,
            instrument,
            completed: Vec::new(),
            decision: None,
            sent: false,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.stage == RunStage::Done
    }

    pub fn evaluations(&self) -> Vec<TimeframeEvaluation> {
        self.completed.iter().map(|o| o.evaluation.clone()).collect()
    }
}

pub struct Pipeline<'a> {
    config: AlertConfig,
    store: SeriesStore,
    prices: &'a dyn PriceSource,
    fx: Option<&'a dyn FxSource>,
    names: Option<&'a dyn NameLookup>,
    notifier: &'a dyn Notifier,
    progress: &'a dyn RunProgress,
}

impl<'a> Pipeline<'a> {
    /// Build a pipeline over a validated config.
    pub fn new(
        config: AlertConfig,
        prices: &'a dyn PriceSource,
        notifier: &'a dyn Notifier,
    ) -> Result<Self, RunError> {
        config.validate()?;
        Ok(Self {
            store: SeriesStore::new(config.output_dir.clone()),
            config,
            prices,
            fx: None,
            names: None,
            notifier,
            progress: &TracingProgress,
        })
    }

    pub fn with_fx(mut self, fx: &'a dyn FxSource) -> Self {
        self.fx = Some(fx);
        self
    }

    pub fn with_names(mut self, names: &'a dyn NameLookup) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn RunProgress) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Execute one run. Never panics on boundary failures; the outcome is in
    /// the returned report.
    pub fn run(&self) -> RunReport {
        let symbol = self.config.instrument.symbol.clone();
        let mut report = RunReport::new(Instrument::new(
            symbol.clone(),
            self.config.instrument.label_or_symbol(),
        ));
        self.progress
            .on_start(&symbol, self.prices.name(), self.config.timeframes.len());

        // Fetching (FX side input, shared by every timeframe)
        self.enter(&mut report, RunStage::Fetching, None);
        let fx_rate = match self.fetch_fx_rate() {
            Ok(rate) => rate,
            Err(e) => return self.fail(report, e),
        };

        for tf in &self.config.timeframes {
            match self.run_timeframe(&mut report, tf, fx_rate) {
                Ok(outcome) => report.completed.push(outcome),
                Err(e) => return self.fail(report, e),
            }
        }

        self.enter(&mut report, RunStage::Composing, None);
        report.instrument = self.resolve_instrument();
        let decision = compose(
            &report.instrument,
            &report.evaluations(),
            self.config.alert.threshold,
        );
        self.progress.on_decision(&decision);

        if decision.should_send {
            self.enter(&mut report, RunStage::Notifying, None);
            let result = self.notifier.send(&decision.subject, &decision.body);
            self.progress.on_notified(&result);
            match result {
                Ok(()) => report.sent = true,
                Err(e) => report.error = Some(RunError::NotifyFailure(e)),
            }
        }

        report.decision = Some(decision);
        self.enter(&mut report, RunStage::Done, None);
        report
    }

    fn run_timeframe(
        &self,
        report: &mut RunReport,
        tf: &TimeframeConfig,
        fx_rate: Option<f64>,
    ) -> Result<TimeframeOutcome, RunError> {
        let label = tf.label.as_str();

        self.enter(report, RunStage::Fetching, Some(label));
        let series = self
            .prices
            .fetch_series(&self.config.instrument.symbol, &tf.timeframe())
            .map_err(|source| RunError::FetchFailure {
                target: format!("{} {label}", self.config.instrument.symbol),
                source,
            })?;

        self.enter(report, RunStage::Computing, Some(label));
        let rsi = compute_rsi(&series, self.config.alert.window);

        self.enter(report, RunStage::Persisting, Some(label));
        let (path, rows) = self
            .store
            .save(&tf.output, &series, &rsi, fx_rate)
            .map_err(|source| RunError::PersistFailure {
                timeframe: label.to_string(),
                source,
            })?;
        self.progress.on_saved(label, &path, rows);

        self.enter(report, RunStage::Evaluating, Some(label));
        let evaluation = evaluate(label, &rsi, self.config.alert.threshold)?;
        self.progress.on_evaluated(&evaluation);

        Ok(TimeframeOutcome {
            evaluation,
            path,
            rows,
        })
    }

    fn fetch_fx_rate(&self) -> Result<Option<f64>, RunError> {
        let Some(fx) = &self.config.fx else {
            return Ok(None);
        };
        let provider = self.fx.ok_or_else(|| RunError::FetchFailure {
            target: fx.pair.clone(),
            source: DataError::Other("no FX source configured".into()),
        })?;
        provider
            .spot_rate(&fx.pair)
            .map(Some)
            .map_err(|source| RunError::FetchFailure {
                target: fx.pair.clone(),
                source,
            })
    }

    /// Display name for messages. A failed lookup falls back to the configured
    /// label (or raw symbol) and is reported as a warning only.
    fn resolve_instrument(&self) -> Instrument {
        let inst = &self.config.instrument;
        let fallback = Instrument::new(inst.symbol.clone(), inst.label_or_symbol());
        if !inst.lookup_name {
            return fallback;
        }
        let Some(names) = self.names else {
            self.progress
                .on_warning("name lookup enabled but no lookup configured; using symbol");
            return fallback;
        };
        match names.display_name(&inst.symbol) {
            Ok(name) => Instrument::new(inst.symbol.clone(), name),
            Err(e) => {
                self.progress.on_warning(&format!(
                    "name lookup failed for {}: {e}; using '{}'",
                    inst.symbol, fallback.display_name
                ));
                fallback
            }
        }
    }

    fn enter(&self, report: &mut RunReport, stage: RunStage, timeframe: Option<&str>) {
        report.stage = stage;
        self.progress.on_stage(stage, timeframe);
    }

    fn fail(&self, mut report: RunReport, error: RunError) -> RunReport {
        let at = report.stage;
        self.progress.on_failed(at, &error);
        report.failed_at = Some(at);
        report.error = Some(error);
        report.stage = RunStage::Failed;
        self.progress.on_stage(RunStage::Failed, None);
        report
    }
}
