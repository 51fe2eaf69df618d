//! rsiwatch core: price series, RSI engine, threshold evaluation, market data.
//!
//! This crate contains the pure computation of the alert pipeline plus the
//! provider boundary it reads from:
//! - Domain types (price series, RSI series, timeframes, instruments)
//! - RSI engine with pinned division-by-zero policy
//! - Threshold evaluation of the latest RSI value
//! - Provider traits and the Yahoo Finance chart provider

pub mod data;
pub mod domain;
pub mod evaluate;
pub mod indicators;

pub use evaluate::{evaluate, InsufficientDataError, TimeframeEvaluation};
pub use indicators::{compute_rsi, Rsi, DEFAULT_WINDOW};
