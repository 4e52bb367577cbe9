//! Concrete indicator implementations.
//!
//! All indicators implement the `Indicator` trait: bar history in, numeric
//! series of the same length out, with `f64::NAN` during warmup. The channel
//! strategies compute them over the analysis window and read the trailing
//! values.
//!
//! Multi-series indicators (Bollinger, Donchian) are exposed as separate
//! named instances per band, keeping the single-series trait unchanged.

pub mod adx;
pub mod bollinger;
pub mod donchian;
pub mod regression;
pub mod sma;

pub use adx::Adx;
pub use bollinger::{Bollinger, BollingerBand};
pub use donchian::{Donchian, DonchianBand};
pub use regression::{fit_points, fit_series, LinearFit};
pub use sma::Sma;

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar slice and produce a numeric output series of
/// the same length. The first `lookback()` values should be `f64::NAN`.
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "adx_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar slice.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Last non-NaN value of a series, if any.
pub fn last_valid(series: &[f64]) -> Option<f64> {
    series.iter().rev().copied().find(|v| !v.is_nan())
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
/// Bars are spaced one day apart.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
