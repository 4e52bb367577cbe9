//! Donchian breakout channel.
//!
//! Boundaries are the highest high / lowest low over the trailing period.
//! Breakout tests compare each close against the *previous* bar's boundary:
//! the unlagged window contains the current bar's own high, so a close could
//! never exceed it. Direction is Up/Down once a breakout run reaches
//! `follow_through` consecutive closes beyond the boundary, Sideways when
//! price held strictly inside the channel for the whole quiet span, and
//! Transitioning when a boundary was touched without enough follow-through.

use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisWindow, BarSeries};
use crate::indicators::{Donchian, Indicator};

use super::{position_pct, ChannelDirection, ChannelVerdict, StrategyError, StrategyKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonchianParams {
    pub period: usize,
    /// Consecutive closes beyond a boundary required to confirm a breakout.
    pub follow_through: usize,
    /// Recent bars that must stay strictly inside the channel for Sideways.
    pub quiet_span: usize,
}

impl Default for DonchianParams {
    fn default() -> Self {
        Self {
            period: 20,
            follow_through: 2,
            quiet_span: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DonchianChannel {
    params: DonchianParams,
}

impl DonchianChannel {
    pub fn new(params: DonchianParams) -> Self {
        assert!(params.follow_through >= 1, "follow_through must be >= 1");
        assert!(params.quiet_span >= 1, "quiet_span must be >= 1");
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
        let upper_s = Donchian::upper(p.period).compute(bars);
        let lower_s = Donchian::lower(p.period).compute(bars);

        let last = bars.len() - 1;
        let (upper, lower) = (upper_s[last], lower_s[last]);
        if upper.is_nan() || lower.is_nan() {
            return Err(StrategyError::InsufficientBars {
                required,
                available: bars.iter().filter(|b| !b.is_void()).count(),
            });
        }

        // Run of consecutive closes beyond the lagged boundary, ending at the
        // latest bar. `i` starts at `period` so the lagged value is valid.
        let mut up_run = 0;
        let mut down_run = 0;
        for i in (p.period..=last).rev() {
            if bars[i].close > upper_s[i - 1] {
                up_run += 1;
            } else {
                break;
            }
        }
        for i in (p.period..=last).rev() {
            if bars[i].close < lower_s[i - 1] {
                down_run += 1;
            } else {
                break;
            }
        }

        // Any boundary contact over the quiet span?
        let quiet_start = last.saturating_sub(p.quiet_span - 1).max(p.period);
        let mut touched = false;
        for i in quiet_start..=last {
            let c = bars[i].close;
            if c >= upper_s[i - 1] || c <= lower_s[i - 1] {
                touched = true;
                break;
            }
        }

        let direction = if up_run >= p.follow_through {
            ChannelDirection::Up
        } else if down_run >= p.follow_through {
            ChannelDirection::Down
        } else if !touched {
            ChannelDirection::Sideways
        } else {
            // Boundary contact without confirmation
            ChannelDirection::Transitioning
        };

        let run = up_run.max(down_run);
        let strength = (run as f64 / p.follow_through as f64).min(1.0);

        let center = (upper + lower) / 2.0;
        let close = bars[last].close;

        let mut bars_above = 0;
        let mut bars_below = 0;
        let count_start = bars.len().saturating_sub(window.lookback);
        for i in count_start..bars.len() {
            if upper_s[i].is_nan() || lower_s[i].is_nan() {
                continue;
            }
            let mid = (upper_s[i] + lower_s[i]) / 2.0;
            if bars[i].close > mid {
                bars_above += 1;
            } else if bars[i].close < mid {
                bars_below += 1;
            }
        }

        Ok(ChannelVerdict {
            strategy: StrategyKind::Donchian,
            timeframe: series.timeframe(),
            direction,
            strength,
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
