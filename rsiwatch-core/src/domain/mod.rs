//! Domain types for rsiwatch

pub mod instrument;
pub mod price;
pub mod rsi;
pub mod timeframe;

pub use instrument::Instrument;
pub use price::{PricePoint, PriceSeries, SeriesError};
pub use rsi::{RsiPoint, RsiSeries};
pub use timeframe::{BarInterval, LookbackRange, Timeframe, UnknownRange};
