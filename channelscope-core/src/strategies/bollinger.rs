//! Bollinger band channel.
//!
//! SMA(period) ± multiplier·σ gives the channel. Bandwidth (band width over
//! middle) proxies volatility, %B locates the close inside the band, and the
//! middle-band slope plus ADX decide direction: a narrow band with a quiet
//! ADX is Sideways, a sloping middle band with a trending ADX is Up/Down,
//! a slope without the ADX confirmation is Transitioning.

use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisWindow, BarSeries};
use crate::indicators::{fit_series, Bollinger, Indicator};

use super::{
    position_pct, window_adx, ChannelDirection, ChannelVerdict, StrategyError, StrategyKind,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub period: usize,
    pub std_multiplier: f64,
    /// ADX at or above this counts as trending.
    pub trend_adx: f64,
    pub adx_period: usize,
    /// Bandwidth below this fraction of its lookback median counts as narrow.
    pub narrow_factor: f64,
    /// Minimum middle-band points for the slope fit.
    pub min_slope_points: usize,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_multiplier: 2.0,
            trend_adx: 20.0,
            adx_period: 14,
            narrow_factor: 0.7,
            min_slope_points: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BollingerChannel {
    params: BollingerParams,
}

impl BollingerChannel {
    pub fn new(params: BollingerParams) -> Self {
        Self { params }
    }

    pub fn min_bars(&self, _window: &AnalysisWindow) -> usize {
        self.params.period + 10
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

        let p = &self.params;
        let upper_s = Bollinger::upper(p.period, p.std_multiplier).compute(bars);
        let middle_s = Bollinger::middle(p.period, p.std_multiplier).compute(bars);
        let lower_s = Bollinger::lower(p.period, p.std_multiplier).compute(bars);

        let last = bars.len() - 1;
        let (upper, middle, lower) = (upper_s[last], middle_s[last], lower_s[last]);
        if upper.is_nan() || middle.is_nan() || lower.is_nan() {
            return Err(StrategyError::InsufficientBars {
                required,
                available: bars.iter().filter(|b| !b.is_void()).count(),
            });
        }

        let close = bars[last].close;

        // Bandwidth history over the lookback, for the narrow-band test
        let start = bars.len().saturating_sub(window.lookback);
        let mut bandwidths = Vec::new();
        for i in start..bars.len() {
            if !upper_s[i].is_nan() && !lower_s[i].is_nan() && middle_s[i] > 0.0 {
                bandwidths.push((upper_s[i] - lower_s[i]) / middle_s[i]);
            }
        }
        let bandwidth = *bandwidths.last().unwrap_or(&0.0);
        let bw_median = median(&bandwidths).unwrap_or(bandwidth);
        let is_narrow = bandwidth < bw_median * p.narrow_factor;

        // Middle-band slope over the lookback
        let middle_tail: Vec<f64> = middle_s[start..]
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        let ma_slope = if middle_tail.len() >= p.min_slope_points {
            fit_series(&middle_tail).map(|f| f.slope).unwrap_or(0.0)
        } else {
            0.0
        };

        let adx = window_adx(series.tail(window.lookback), p.adx_period);

        let direction = if is_narrow && adx < p.trend_adx {
            ChannelDirection::Sideways
        } else if ma_slope > 0.0 && adx >= p.trend_adx {
            ChannelDirection::Up
        } else if ma_slope < 0.0 && adx >= p.trend_adx {
            ChannelDirection::Down
        } else if ma_slope != 0.0 && adx < p.trend_adx {
            // Drifting toward a boundary without expansion
            ChannelDirection::Transitioning
        } else {
            ChannelDirection::Sideways
        };

        let mut bars_above = 0;
        let mut bars_below = 0;
        for i in start..bars.len() {
            if middle_s[i].is_nan() {
                continue;
            }
            if bars[i].close > middle_s[i] {
                bars_above += 1;
            } else if bars[i].close < middle_s[i] {
                bars_below += 1;
            }
        }

        Ok(ChannelVerdict {
            strategy: StrategyKind::Bollinger,
            timeframe: series.timeframe(),
            direction,
            strength: (adx / 100.0).clamp(0.0, 1.0),
            position_pct: position_pct(close, upper, lower),
            upper,
            lower,
            center: middle,
            close,
            bars_above,
            bars_below,
        })
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
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
    fn strong_uptrend_classifies_up() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let verdict = BollingerChannel::new(BollingerParams::default())
            .classify(&series(&closes), &window())
            .unwrap();
        assert_eq!(verdict.direction, ChannelDirection::Up);
        assert!(verdict.strength > 0.2);
    }

    #[test]
    fn flat_series_is_sideways_at_midpoint() {
        let closes = vec![100.0; 100];
        let verdict = BollingerChannel::new(BollingerParams::default())
            .classify(&series(&closes), &window())
            .unwrap();
        assert_eq!(verdict.direction, ChannelDirection::Sideways);
        assert_eq!(verdict.position_pct, 50.0);
        // Collapsed band: boundaries meet the average
        assert_eq!(verdict.upper, verdict.center);
        assert_eq!(verdict.lower, verdict.center);
    }

    #[test]
    fn too_few_bars_is_insufficient() {
        let closes = vec![100.0; 20];
        let err = BollingerChannel::new(BollingerParams::default())
            .classify(&series(&closes), &window())
            .unwrap_err();
        assert!(matches!(
            err,
            StrategyError::InsufficientBars { required: 30, available: 20 }
        ));
    }

    #[test]
    fn min_bars_is_period_plus_settle() {
        let s = BollingerChannel::new(BollingerParams::default());
        assert_eq!(s.min_bars(&window()), 30);
    }

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(median(&[1.0, 3.0, 2.0]), Some(2.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }
}
