//! Synthetic series provider — a seeded random walk.
//!
//! Used by tests, benches, and the CLI's offline mode. The walk is
//! deterministic: the stream seed mixes the configured seed with the symbol
//! and timeframe, so the same request always produces the same series and
//! different timeframes differ.

use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Bar, BarSeries, Timeframe};

use super::provider::{DataError, SeriesProvider};

#[derive(Debug, Clone)]
pub struct SyntheticSeriesProvider {
    seed: u64,
    bars: usize,
    start_price: f64,
    /// Per-bar drift as a fraction of price.
    drift: f64,
    /// Per-bar shock scale as a fraction of price.
    volatility: f64,
}

impl SyntheticSeriesProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            bars: 320,
            start_price: 2400.0,
            drift: 0.0004,
            volatility: 0.008,
        }
    }

    pub fn with_bars(mut self, bars: usize) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    fn stream_seed(&self, symbol: &str, timeframe: Timeframe) -> u64 {
        let mut seed = self.seed ^ (timeframe.minutes() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        for b in symbol.bytes() {
            seed = seed.wrapping_mul(31).wrapping_add(b as u64);
        }
        seed
    }
}

impl SeriesProvider for SyntheticSeriesProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<BarSeries, DataError> {
        let mut rng = StdRng::seed_from_u64(self.stream_seed(symbol, timeframe));
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().ok_or_else(|| {
            DataError::Malformed("invalid synthetic epoch".to_string())
        })?;

        let mut close = self.start_price;
        let mut bars = Vec::with_capacity(self.bars);
        for i in 0..self.bars {
            let open = close;
            let shock: f64 = rng.gen_range(-1.0..1.0);
            close = (open * (1.0 + self.drift + self.volatility * shock)).max(0.01);
            let span = open.max(close) * self.volatility * rng.gen_range(0.1..0.6);
            let high = open.max(close) + span;
            let low = (open.min(close) - span).max(0.01);
            bars.push(Bar {
                timestamp: start + timeframe.step() * i as i32,
                open,
                high,
                low,
                close,
                volume: rng.gen_range(500..5_000),
            });
        }

        Ok(BarSeries::new(symbol, timeframe, bars)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_request() {
        let provider = SyntheticSeriesProvider::new(42);
        let a = provider.fetch("GC=F", Timeframe::Daily).unwrap();
        let b = provider.fetch("GC=F", Timeframe::Daily).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn timeframes_get_distinct_series() {
        let provider = SyntheticSeriesProvider::new(42);
        let daily = provider.fetch("GC=F", Timeframe::Daily).unwrap();
        let weekly = provider.fetch("GC=F", Timeframe::Weekly).unwrap();
        assert_ne!(daily.bars()[10].close, weekly.bars()[10].close);
    }

    #[test]
    fn bars_are_sane_and_ordered() {
        let provider = SyntheticSeriesProvider::new(7);
        let series = provider.fetch("GC=F", Timeframe::H1).unwrap();
        assert_eq!(series.len(), 320);
        assert!(series.bars().iter().all(|b| b.is_sane()));
    }

    #[test]
    fn bar_count_is_configurable() {
        let provider = SyntheticSeriesProvider::new(7).with_bars(50);
        let series = provider.fetch("GC=F", Timeframe::Daily).unwrap();
        assert_eq!(series.len(), 50);
    }
}
