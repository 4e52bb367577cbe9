//! Linear regression channel.
//!
//! Fits a least-squares line through close prices over the trailing lookback
//! window. Slope sign gives the candidate direction, R² measures how linear
//! the move is, and ADX confirms trend strength. Channel bounds are the line
//! endpoint ± `band_sigma` residual deviations. A direction call that
//! contradicts the SMA alignment (short vs long) is demoted to Transitioning.

use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisWindow, BarSeries};
use crate::indicators::{fit_series, last_valid, Indicator, Sma};

use super::{
    position_pct, window_adx, ChannelDirection, ChannelVerdict, StrategyError, StrategyKind,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionParams {
    /// Minimum R² before the window counts as directional.
    pub r2_threshold: f64,
    /// Minimum ADX before a directional window counts as confirmed.
    pub adx_threshold: f64,
    pub adx_period: usize,
    /// Channel half-width in residual standard deviations.
    pub band_sigma: f64,
}

impl Default for RegressionParams {
    fn default() -> Self {
        Self {
            r2_threshold: 0.5,
            adx_threshold: 25.0,
            adx_period: 14,
            band_sigma: 1.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegressionChannel {
    params: RegressionParams,
}

impl RegressionChannel {
    pub fn new(params: RegressionParams) -> Self {
        Self { params }
    }

    /// Needs the full lookback plus enough history for the long SMA to settle.
    pub fn min_bars(&self, window: &AnalysisWindow) -> usize {
        window.lookback.max(window.sma_long + 10)
    }

    pub fn classify(
        &self,
        series: &BarSeries,
        window: &AnalysisWindow,
    ) -> Result<ChannelVerdict, StrategyError> {
        let bars = series.bars();
        let required = self.min_bars(window);
        if bars.len() < required {
            return Err(StrategyError::InsufficientBars {
                required,
                available: bars.len(),
            });
        }

        let tail = series.tail(window.lookback);
        let closes: Vec<f64> = tail.iter().map(|b| b.close).collect();
        let fit = fit_series(&closes).ok_or(StrategyError::InsufficientBars {
            required,
            available: closes.iter().filter(|c| c.is_finite()).count(),
        })?;

        let close = closes[closes.len() - 1];
        let center = fit.value_at((closes.len() - 1) as f64);
        let upper = center + self.params.band_sigma * fit.residual_std;
        let lower = center - self.params.band_sigma * fit.residual_std;

        let adx = window_adx(tail, self.params.adx_period);

        let mut direction = if fit.r_squared >= self.params.r2_threshold
            && adx >= self.params.adx_threshold
        {
            if fit.slope > 0.0 {
                ChannelDirection::Up
            } else {
                ChannelDirection::Down
            }
        } else if fit.r_squared >= self.params.r2_threshold {
            // Linear structure without confirmed strength
            ChannelDirection::Transitioning
        } else {
            ChannelDirection::Sideways
        };

        // SMA alignment correction: a directional call against the prevailing
        // average stack is not yet confirmed.
        if let Some(bullish) = sma_alignment(series, window) {
            if bullish && direction == ChannelDirection::Down {
                direction = ChannelDirection::Transitioning;
            } else if !bullish && direction == ChannelDirection::Up {
                direction = ChannelDirection::Transitioning;
            }
        }

        let mut bars_above = 0;
        let mut bars_below = 0;
        for (i, &c) in closes.iter().enumerate() {
            let line = fit.value_at(i as f64);
            if c > line {
                bars_above += 1;
            } else if c < line {
                bars_below += 1;
            }
        }

        Ok(ChannelVerdict {
            strategy: StrategyKind::Regression,
            timeframe: series.timeframe(),
            direction,
            strength: fit.r_squared.clamp(0.0, 1.0),
            position_pct: position_pct(close, upper, lower),
            upper,
            lower,
            center,
            close,
            bars_above,
            bars_below,
        })
    }
}

/// SMA stack over the full series: `Some(true)` when short > long (bullish),
/// `Some(false)` when short < long, `None` when either average lacks data
/// or they are exactly equal.
fn sma_alignment(series: &BarSeries, window: &AnalysisWindow) -> Option<bool> {
    let bars = series.bars();
    let short = last_valid(&Sma::new(window.sma_short).compute(bars))?;
    let long = last_valid(&Sma::new(window.sma_long).compute(bars))?;
    if short > long {
        Some(true)
    } else if short < long {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timeframe;
    use crate::indicators::make_bars;

    fn window() -> AnalysisWindow {
        AnalysisWindow {
            lookback: 60,
            sma_short: 20,
            sma_long: 60,
        }
    }

    fn series(closes: &[f64]) -> BarSeries {
        BarSeries::new("TEST", Timeframe::Daily, make_bars(closes)).unwrap()
    }

    #[test]
    fn uptrend_classifies_up() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let verdict = RegressionChannel::new(RegressionParams::default())
            .classify(&series(&closes), &window())
            .unwrap();
        assert_eq!(verdict.direction, ChannelDirection::Up);
        assert!(verdict.strength > 0.9);
        assert!(verdict.upper >= verdict.lower);
    }

    #[test]
    fn downtrend_classifies_down() {
        let closes: Vec<f64> = (0..100).map(|i| 500.0 - 2.0 * i as f64).collect();
        let verdict = RegressionChannel::new(RegressionParams::default())
            .classify(&series(&closes), &window())
            .unwrap();
        assert_eq!(verdict.direction, ChannelDirection::Down);
        assert!(verdict.strength > 0.9);
    }

    #[test]
    fn flat_series_is_sideways_at_midpoint() {
        let closes = vec![100.0; 100];
        let verdict = RegressionChannel::new(RegressionParams::default())
            .classify(&series(&closes), &window())
            .unwrap();
        assert_eq!(verdict.direction, ChannelDirection::Sideways);
        assert_eq!(verdict.position_pct, 50.0);
        assert_eq!(verdict.bars_above, 0);
        assert_eq!(verdict.bars_below, 0);
    }

    #[test]
    fn too_few_bars_is_insufficient() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let err = RegressionChannel::new(RegressionParams::default())
            .classify(&series(&closes), &window())
            .unwrap_err();
        assert!(matches!(
            err,
            StrategyError::InsufficientBars { required: 70, available: 30 }
        ));
    }

    #[test]
    fn min_bars_covers_long_sma_warmup() {
        let s = RegressionChannel::new(RegressionParams::default());
        assert_eq!(s.min_bars(&window()), 70);
        let wide = AnalysisWindow {
            lookback: 240,
            sma_short: 20,
            sma_long: 60,
        };
        assert_eq!(s.min_bars(&wide), 240);
    }
}
