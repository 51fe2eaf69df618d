//! rsiwatch CLI: scheduled RSI threshold alerts.
//!
//! Commands:
//! - `run`: fetch, compute, export and alert for the instrument in a TOML config
//! - `check-config`: validate a config file without touching the network

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use rsiwatch_core::data::YahooProvider;
use rsiwatch_runner::{AlertConfig, Pipeline, RunError, SmtpNotifier};

#[derive(Parser)]
#[command(name = "rsiwatch", about = "RSI threshold alerts for one instrument")]
struct Cli {
    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the alert pipeline once.
    Run {
        /// Path to the TOML config file.
        #[arg(long, default_value = "config/rsiwatch.toml")]
        config: PathBuf,
    },
    /// Validate a config file and print what a run would do.
    CheckConfig {
        /// Path to the TOML config file.
        #[arg(long, default_value = "config/rsiwatch.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let ok = match cli.command {
        Commands::Run { config } => run_alert(&config),
        Commands::CheckConfig { config } => check_config(&config),
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create log dir: {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

/// Execute one run. Failures are logged, never propagated as a panic.
fn run_alert(config_path: &Path) -> bool {
    let config = match AlertConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %RunError::from(e), "Cannot start run.");
            return false;
        }
    };

    let provider = match YahooProvider::new(Duration::from_secs(config.http_timeout_secs)) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Cannot create market-data client.");
            return false;
        }
    };
    let notifier = match SmtpNotifier::new(&config.mail) {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Cannot create mail transport.");
            return false;
        }
    };

    let pipeline = match Pipeline::new(config, &provider, &notifier) {
        Ok(p) => p.with_fx(&provider).with_names(&provider),
        Err(e) => {
            tracing::error!(error = %e, "Cannot start run.");
            return false;
        }
    };

    let report = pipeline.run();
    if report.succeeded() {
        tracing::info!(
            timeframes = report.completed.len(),
            sent = report.sent,
            "Run finished."
        );
    }
    report.succeeded()
}

fn check_config(config_path: &Path) -> bool {
    let config = match AlertConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid config.");
            return false;
        }
    };

    println!(
        "{} ({}): threshold {} over {} bars",
        config.instrument.label_or_symbol(),
        config.instrument.symbol,
        config.alert.threshold,
        config.alert.window
    );
    for tf in &config.timeframes {
        println!(
            "  {:<8} {:>4} over {:<4} → {}",
            tf.label,
            tf.interval.as_query(),
            tf.range.as_str(),
            config.output_path(tf).display()
        );
    }
    if let Some(fx) = &config.fx {
        println!("  converted close via {}", fx.pair);
    }
    if config.is_single_timeframe() {
        println!("  single-timeframe alert message");
    } else {
        println!("  one alert line per breached timeframe");
    }
    if config.instrument.lookup_name {
        println!("  display name resolved from provider");
    }
    println!("  mail {} → {}", config.mail.from, config.mail.to);
    true
}
