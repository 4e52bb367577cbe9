//! Pivot trendline channel.
//!
//! Detects local pivot highs and lows over the lookback window, then fits
//! one line through the most recent pivot highs (resistance) and one through
//! the most recent pivot lows (support). Matching slope signs with solid
//! fits give Up/Down, two near-flat lines give Sideways, and disagreement
//! (converging or expanding structure) or a weak fit gives Transitioning.
//!
//! The most failure-prone variant: a short or unusually smooth window can
//! legitimately produce too few pivots, which is an `InsufficientPivots`
//! error rather than a guessed verdict.

use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisWindow, BarSeries};
use crate::indicators::{fit_points, LinearFit};

use super::pivots::{pivot_highs, pivot_lows, Pivot};
use super::{position_pct, ChannelDirection, ChannelVerdict, StrategyError, StrategyKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendlineParams {
    /// Neighborhood radius for the pivot scan.
    pub pivot_radius: usize,
    /// How many of the most recent pivots each line is fitted through.
    pub fit_pivots: usize,
    /// Minimum pivots per side before a fit is attempted.
    pub min_pivots: usize,
    /// Minimum fit R² before a directional call.
    pub r2_threshold: f64,
    /// Slopes below this (as % of price per bar) count as flat.
    pub flat_slope_pct: f64,
}

impl Default for TrendlineParams {
    fn default() -> Self {
        Self {
            pivot_radius: 5,
            fit_pivots: 5,
            min_pivots: 2,
            r2_threshold: 0.4,
            flat_slope_pct: 0.02,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrendlineChannel {
    params: TrendlineParams,
}

impl TrendlineChannel {
    pub fn new(params: TrendlineParams) -> Self {
        assert!(params.min_pivots >= 2, "min_pivots must be >= 2");
        Self { params }
    }

    pub fn min_bars(&self, window: &AnalysisWindow) -> usize {
        window.lookback
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
        let tail = series.tail(window.lookback);
        let highs: Vec<f64> = tail.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = tail.iter().map(|b| b.low).collect();

        let high_pivots = pivot_highs(&highs, p.pivot_radius);
        let low_pivots = pivot_lows(&lows, p.pivot_radius);

        if high_pivots.len() < p.min_pivots || low_pivots.len() < p.min_pivots {
            return Err(StrategyError::InsufficientPivots {
                highs: high_pivots.len(),
                lows: low_pivots.len(),
                required: p.min_pivots,
            });
        }

        let shortfall = StrategyError::InsufficientPivots {
            highs: high_pivots.len(),
            lows: low_pivots.len(),
            required: p.min_pivots,
        };
        let h_fit = fit_recent(&high_pivots, p.fit_pivots).ok_or_else(|| shortfall.clone())?;
        let l_fit = fit_recent(&low_pivots, p.fit_pivots).ok_or(shortfall)?;

        let last_x = (tail.len() - 1) as f64;
        let upper = h_fit.value_at(last_x);
        let lower = l_fit.value_at(last_x);
        let center = (upper + lower) / 2.0;
        let close = tail[tail.len() - 1].close;

        let h_slope_pct = slope_pct(h_fit.slope, close);
        let l_slope_pct = slope_pct(l_fit.slope, close);
        let flat = h_slope_pct.abs() < p.flat_slope_pct && l_slope_pct.abs() < p.flat_slope_pct;
        let both_up = h_fit.slope > 0.0 && l_fit.slope > 0.0;
        let both_down = h_fit.slope < 0.0 && l_fit.slope < 0.0;
        let fits_hold =
            h_fit.r_squared >= p.r2_threshold && l_fit.r_squared >= p.r2_threshold;

        let direction = if flat {
            ChannelDirection::Sideways
        } else if both_up && fits_hold {
            ChannelDirection::Up
        } else if both_down && fits_hold {
            ChannelDirection::Down
        } else {
            // Converging/expanding structure, or a line the pivots don't
            // really agree on yet
            ChannelDirection::Transitioning
        };

        let mut bars_above = 0;
        let mut bars_below = 0;
        for (i, bar) in tail.iter().enumerate() {
            let mid = (h_fit.value_at(i as f64) + l_fit.value_at(i as f64)) / 2.0;
            if bar.close > mid {
                bars_above += 1;
            } else if bar.close < mid {
                bars_below += 1;
            }
        }

        Ok(ChannelVerdict {
            strategy: StrategyKind::Trendline,
            timeframe: series.timeframe(),
            direction,
            strength: h_fit.r_squared.min(l_fit.r_squared).clamp(0.0, 1.0),
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

/// Fit through the `k` most recent pivots.
fn fit_recent(pivots: &[Pivot], k: usize) -> Option<LinearFit> {
    let recent = &pivots[pivots.len().saturating_sub(k)..];
    let xs: Vec<f64> = recent.iter().map(|p| p.index as f64).collect();
    let ys: Vec<f64> = recent.iter().map(|p| p.value).collect();
    fit_points(&xs, &ys)
}

fn slope_pct(slope: f64, price: f64) -> f64 {
    if price > 0.0 {
        slope / price * 100.0
    } else {
        0.0
    }
}
