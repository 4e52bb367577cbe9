//! Channel classification strategies — four methods, one verdict vocabulary.
//!
//! Each strategy is a deterministic pure function from a bar window to a
//! [`ChannelVerdict`]. The set is closed: dispatch goes through the
//! [`Strategy`] enum rather than a name-keyed registry, so adding a method
//! means adding a variant. Verdicts share one direction/strength vocabulary
//! and are comparable by the consensus aggregator regardless of the internal
//! method.

pub mod bollinger;
pub mod donchian;
pub mod pivots;
pub mod regression;
pub mod trendline;

pub use bollinger::{BollingerChannel, BollingerParams};
pub use donchian::{DonchianChannel, DonchianParams};
pub use regression::{RegressionChannel, RegressionParams};
pub use trendline::{TrendlineChannel, TrendlineParams};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AnalysisWindow, BarSeries, Timeframe};

/// Direction label of a classified channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelDirection {
    Up,
    Down,
    Sideways,
    /// Emerging-but-unconfirmed trend: structure is present but one of the
    /// confirmation gates has not passed yet.
    Transitioning,
}

impl fmt::Display for ChannelDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelDirection::Up => "Up",
            ChannelDirection::Down => "Down",
            ChannelDirection::Sideways => "Sideways",
            ChannelDirection::Transitioning => "Transitioning",
        };
        f.write_str(s)
    }
}

/// Identifier of a strategy variant.
///
/// The derived `Ord` is the canonical report order; verdicts are always
/// listed in this order so repeated runs produce identical reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Regression,
    Bollinger,
    Donchian,
    Trendline,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Regression,
        StrategyKind::Bollinger,
        StrategyKind::Donchian,
        StrategyKind::Trendline,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Regression => "regression",
            StrategyKind::Bollinger => "bollinger",
            StrategyKind::Donchian => "donchian",
            StrategyKind::Trendline => "trendline",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regression" => Ok(StrategyKind::Regression),
            "bollinger" => Ok(StrategyKind::Bollinger),
            "donchian" => Ok(StrategyKind::Donchian),
            "trendline" => Ok(StrategyKind::Trendline),
            other => Err(SelectError::UnknownStrategy(other.to_string())),
        }
    }
}

/// One strategy's classification of one (symbol, timeframe) window.
///
/// Immutable once produced. `bars_above`/`bars_below` count window closes
/// above and below the strategy's centerline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelVerdict {
    pub strategy: StrategyKind,
    pub timeframe: Timeframe,
    pub direction: ChannelDirection,
    /// Trend conviction, normalized to [0, 1].
    pub strength: f64,
    /// Where the latest close sits within the channel, 0–100%.
    pub position_pct: f64,
    pub upper: f64,
    pub lower: f64,
    pub center: f64,
    pub close: f64,
    pub bars_above: usize,
    pub bars_below: usize,
}

/// Recoverable per-strategy failures. Both variants mean the window cannot
/// support this method; the orchestrator records them as N/A instead of
/// aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientBars { required: usize, available: usize },

    #[error("insufficient pivots: found {highs} highs / {lows} lows, need {required} of each")]
    InsufficientPivots {
        highs: usize,
        lows: usize,
        required: usize,
    },
}

/// Fatal strategy-selection failure, surfaced before any data is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// Tunable parameters for all four variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub regression: RegressionParams,
    pub bollinger: BollingerParams,
    pub donchian: DonchianParams,
    pub trendline: TrendlineParams,
}

/// The closed set of channel strategies.
#[derive(Debug, Clone)]
pub enum Strategy {
    Regression(RegressionChannel),
    Bollinger(BollingerChannel),
    Donchian(DonchianChannel),
    Trendline(TrendlineChannel),
}

impl Strategy {
    pub fn for_kind(kind: StrategyKind, params: &StrategyParams) -> Self {
        match kind {
            StrategyKind::Regression => {
                Strategy::Regression(RegressionChannel::new(params.regression.clone()))
            }
            StrategyKind::Bollinger => {
                Strategy::Bollinger(BollingerChannel::new(params.bollinger.clone()))
            }
            StrategyKind::Donchian => {
                Strategy::Donchian(DonchianChannel::new(params.donchian.clone()))
            }
            StrategyKind::Trendline => {
                Strategy::Trendline(TrendlineChannel::new(params.trendline.clone()))
            }
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Regression(_) => StrategyKind::Regression,
            Strategy::Bollinger(_) => StrategyKind::Bollinger,
            Strategy::Donchian(_) => StrategyKind::Donchian,
            Strategy::Trendline(_) => StrategyKind::Trendline,
        }
    }

    /// Minimum bars this variant needs under the given window.
    pub fn min_bars(&self, window: &AnalysisWindow) -> usize {
        match self {
            Strategy::Regression(s) => s.min_bars(window),
            Strategy::Bollinger(s) => s.min_bars(window),
            Strategy::Donchian(s) => s.min_bars(window),
            Strategy::Trendline(s) => s.min_bars(window),
        }
    }

    /// Classify the series. Deterministic: identical series and window always
    /// yield an identical verdict.
    pub fn classify(
        &self,
        series: &BarSeries,
        window: &AnalysisWindow,
    ) -> Result<ChannelVerdict, StrategyError> {
        match self {
            Strategy::Regression(s) => s.classify(series, window),
            Strategy::Bollinger(s) => s.classify(series, window),
            Strategy::Donchian(s) => s.classify(series, window),
            Strategy::Trendline(s) => s.classify(series, window),
        }
    }
}

/// Resolve requested strategy names to concrete instances.
///
/// `None` or an empty list selects all four. Names are case-insensitive and
/// whitespace-trimmed; duplicates collapse. The returned list is always in
/// canonical order regardless of request order.
pub fn select_strategies(
    names: Option<&[String]>,
    params: &StrategyParams,
) -> Result<Vec<Strategy>, SelectError> {
    let kinds: Vec<StrategyKind> = match names {
        None => StrategyKind::ALL.to_vec(),
        Some(names) if names.is_empty() => StrategyKind::ALL.to_vec(),
        Some(names) => {
            let mut kinds: Vec<StrategyKind> = names
                .iter()
                .map(|n| n.parse())
                .collect::<Result<_, _>>()?;
            kinds.sort();
            kinds.dedup();
            kinds
        }
    };

    Ok(kinds
        .into_iter()
        .map(|k| Strategy::for_kind(k, params))
        .collect())
}

/// Position of `price` within [lower, upper], as a percentage clamped to
/// [0, 100]. A degenerate zero-width channel reports the midpoint.
pub(crate) fn position_pct(price: f64, upper: f64, lower: f64) -> f64 {
    let width = upper - lower;
    if width > 0.0 {
        (((price - lower) / width) * 100.0).clamp(0.0, 100.0)
    } else {
        50.0
    }
}

/// Trailing ADX value over the window, or 0.0 when the window is too short
/// for the ADX warmup.
pub(crate) fn window_adx(bars: &[crate::domain::Bar], period: usize) -> f64 {
    use crate::indicators::{last_valid, Adx, Indicator};
    last_valid(&Adx::new(period).compute(bars)).unwrap_or(0.0)
}
