//! Series provider trait and structured error types.
//!
//! The SeriesProvider trait abstracts over data sources (CSV cache,
//! synthetic generation, or an external feed) so the orchestrator can swap
//! implementations and tests can mock failures per timeframe.

use thiserror::Error;

use crate::domain::{BarSeries, SeriesError, Timeframe};

/// Structured error types for series acquisition.
///
/// All variants are recoverable at timeframe granularity: the orchestrator
/// records the failed timeframe and proceeds with the rest.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no series for '{symbol}' at {timeframe}: {reason}")]
    Unavailable {
        symbol: String,
        timeframe: Timeframe,
        reason: String,
    },

    #[error("malformed bar data: {0}")]
    Malformed(String),

    #[error("malformed series: {0}")]
    Series(#[from] SeriesError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Trait for series providers.
///
/// Implementations handle the specifics of obtaining bars from a particular
/// source. Any blocking (file or network I/O) lives behind this trait; the
/// analysis core only ever sees a frozen, validated series.
pub trait SeriesProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Obtain the bar series for one (symbol, timeframe) pair.
    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<BarSeries, DataError>;
}
