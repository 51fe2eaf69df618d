//! Market-data boundary: provider traits, cleaning, and the Yahoo Finance provider.

pub mod clean;
pub mod provider;
pub mod yahoo;

pub use clean::{clean_bars, CleanReport};
pub use provider::{DataError, FxSource, NameLookup, PriceSource, RawBar};
pub use yahoo::YahooProvider;
