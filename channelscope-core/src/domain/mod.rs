//! Domain types: bars, series, timeframes.

pub mod bar;
pub mod timeframe;

pub use bar::{Bar, BarSeries, SeriesError};
pub use timeframe::{AnalysisWindow, ParseTimeframeError, Timeframe};
