//! Timeframe — the closed set of analysis horizons.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Analysis horizon for one bar series.
///
/// Canonical order is the declaration order, shortest horizon first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    H1,
    H4,
    Daily,
    Weekly,
}

#[derive(Debug, Error)]
#[error("unknown timeframe: {0}")]
pub struct ParseTimeframeError(String);

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::Daily,
        Timeframe::Weekly,
    ];

    /// Horizon label used in report rendering.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::H1 => "intraday",
            Timeframe::H4 => "swing",
            Timeframe::Daily => "medium-term",
            Timeframe::Weekly => "long-term",
        }
    }

    /// Tag used in file names and config keys.
    pub fn tag(&self) -> &'static str {
        match self {
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
        }
    }

    /// Nominal bar spacing.
    pub fn step(&self) -> Duration {
        Duration::minutes(self.minutes())
    }

    /// Nominal bar spacing in minutes. Defines the coarseness ordering
    /// used by the resampler.
    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::Daily => 1_440,
            Timeframe::Weekly => 10_080,
        }
    }

    /// Default analysis window per horizon: shorter horizons look back over
    /// more bars; the weekly window uses shorter moving averages.
    pub fn default_window(&self) -> AnalysisWindow {
        match self {
            Timeframe::H1 => AnalysisWindow {
                lookback: 240,
                sma_short: 20,
                sma_long: 60,
            },
            Timeframe::H4 => AnalysisWindow {
                lookback: 180,
                sma_short: 20,
                sma_long: 60,
            },
            Timeframe::Daily => AnalysisWindow {
                lookback: 120,
                sma_short: 20,
                sma_long: 60,
            },
            Timeframe::Weekly => AnalysisWindow {
                lookback: 80,
                sma_short: 10,
                sma_long: 30,
            },
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::H1 => "1H",
            Timeframe::H4 => "4H",
            Timeframe::Daily => "Daily",
            Timeframe::Weekly => "Weekly",
        };
        f.write_str(s)
    }
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" | "h1" => Ok(Timeframe::H1),
            "4h" | "h4" => Ok(Timeframe::H4),
            "daily" | "1d" | "d" => Ok(Timeframe::Daily),
            "weekly" | "1w" | "w" => Ok(Timeframe::Weekly),
            other => Err(ParseTimeframeError(other.to_string())),
        }
    }
}

/// Per-timeframe analysis parameters: how many bars the strategies look back
/// over and which moving-average pair the regression strategy checks for
/// alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub lookback: usize,
    pub sma_short: usize,
    pub sma_long: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("1h".parse::<Timeframe>().unwrap(), Timeframe::H1);
        assert_eq!("H4".parse::<Timeframe>().unwrap(), Timeframe::H4);
        assert_eq!(" daily ".parse::<Timeframe>().unwrap(), Timeframe::Daily);
        assert_eq!("1w".parse::<Timeframe>().unwrap(), Timeframe::Weekly);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("monthly".parse::<Timeframe>().is_err());
    }

    #[test]
    fn canonical_order_is_shortest_first() {
        let mut tfs = vec![Timeframe::Weekly, Timeframe::H1, Timeframe::Daily];
        tfs.sort();
        assert_eq!(tfs, vec![Timeframe::H1, Timeframe::Daily, Timeframe::Weekly]);
    }

    #[test]
    fn coarseness_increases_along_canonical_order() {
        for pair in Timeframe::ALL.windows(2) {
            assert!(pair[0].minutes() < pair[1].minutes());
        }
    }

    #[test]
    fn weekly_window_uses_short_averages() {
        let w = Timeframe::Weekly.default_window();
        assert_eq!(w.sma_short, 10);
        assert_eq!(w.sma_long, 30);
    }
}
