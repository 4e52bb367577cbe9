//! Report assembly — the write-once result of one analysis run.
//!
//! The report collects, per requested timeframe, the ordered strategy
//! outcomes (verdict or recorded N/A) and the consensus, plus an overall
//! cross-timeframe summary. Assembly is pure; serialization is the
//! exporter's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use channelscope_core::consensus::{ConsensusCall, ConsensusResult};
use channelscope_core::domain::Timeframe;
use channelscope_core::strategies::{ChannelVerdict, StrategyKind};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// One strategy's slot in a timeframe row: a verdict, or the recorded
/// reason it could not vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyOutcome {
    Verdict { verdict: ChannelVerdict },
    Unavailable { strategy: StrategyKind, reason: String },
}

impl StrategyOutcome {
    pub fn strategy(&self) -> StrategyKind {
        match self {
            StrategyOutcome::Verdict { verdict } => verdict.strategy,
            StrategyOutcome::Unavailable { strategy, .. } => *strategy,
        }
    }

    pub fn verdict(&self) -> Option<&ChannelVerdict> {
        match self {
            StrategyOutcome::Verdict { verdict } => Some(verdict),
            StrategyOutcome::Unavailable { .. } => None,
        }
    }
}

/// What happened to one timeframe: analyzed (possibly with per-strategy
/// N/As) or failed outright at the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeframeResult {
    Analyzed {
        bar_count: usize,
        dataset_hash: String,
        strategies: Vec<StrategyOutcome>,
        consensus: ConsensusResult,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeOutcome {
    pub timeframe: Timeframe,
    pub label: String,
    pub result: TimeframeResult,
}

impl TimeframeOutcome {
    pub fn consensus(&self) -> Option<&ConsensusResult> {
        match &self.result {
            TimeframeResult::Analyzed { consensus, .. } => Some(consensus),
            TimeframeResult::Failed { .. } => None,
        }
    }

    pub fn verdicts(&self) -> Vec<&ChannelVerdict> {
        match &self.result {
            TimeframeResult::Analyzed { strategies, .. } => {
                strategies.iter().filter_map(|o| o.verdict()).collect()
            }
            TimeframeResult::Failed { .. } => Vec::new(),
        }
    }
}

/// Overall lean across timeframes, derived from per-timeframe vote tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallBias {
    AllBullish,
    LeanBullish,
    AllBearish,
    LeanBearish,
    Divergent,
    Inconclusive,
}

/// Disagreement between the longer and shorter horizons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonConflict {
    /// Longer horizons lean up while a shorter one leans down.
    ShortTermPullback,
    /// Longer horizons lean down while a shorter one leans up.
    ShortTermRebound,
}

/// Cross-timeframe conclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub bias: OverallBias,
    pub lines: Vec<String>,
    pub conflict: Option<HorizonConflict>,
}

impl Summary {
    pub fn from_timeframes(timeframes: &[TimeframeOutcome]) -> Self {
        let analyzed: Vec<&TimeframeOutcome> = timeframes
            .iter()
            .filter(|tf| tf.consensus().is_some())
            .collect();

        let lean = |tf: &TimeframeOutcome| -> i32 {
            let c = match tf.consensus() {
                Some(c) => c,
                None => return 0,
            };
            match c.up.cmp(&c.down) {
                std::cmp::Ordering::Greater => 1,
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Equal => 0,
            }
        };

        let bullish = analyzed.iter().filter(|tf| lean(tf) > 0).count();
        let bearish = analyzed.iter().filter(|tf| lean(tf) < 0).count();
        let total = analyzed.len();

        let bias = if total == 0 {
            OverallBias::Inconclusive
        } else if bullish == total {
            OverallBias::AllBullish
        } else if bearish == total {
            OverallBias::AllBearish
        } else if bullish > bearish {
            OverallBias::LeanBullish
        } else if bearish > bullish {
            OverallBias::LeanBearish
        } else {
            OverallBias::Divergent
        };

        let mut lines = Vec::new();
        for tf in timeframes {
            match &tf.result {
                TimeframeResult::Analyzed { consensus, .. } => {
                    lines.push(format!("{}: {}", tf.timeframe, describe(consensus)));
                }
                TimeframeResult::Failed { error } => {
                    lines.push(format!("{}: no data ({error})", tf.timeframe));
                }
            }
        }

        let longer_up = analyzed
            .iter()
            .any(|tf| tf.timeframe >= Timeframe::Daily && lean(tf) > 0);
        let longer_down = analyzed
            .iter()
            .any(|tf| tf.timeframe >= Timeframe::Daily && lean(tf) < 0);
        let shorter_up = analyzed
            .iter()
            .any(|tf| tf.timeframe < Timeframe::Daily && lean(tf) > 0);
        let shorter_down = analyzed
            .iter()
            .any(|tf| tf.timeframe < Timeframe::Daily && lean(tf) < 0);

        let conflict = if longer_up && shorter_down {
            Some(HorizonConflict::ShortTermPullback)
        } else if longer_down && shorter_up {
            Some(HorizonConflict::ShortTermRebound)
        } else {
            None
        };

        Summary {
            bias,
            lines,
            conflict,
        }
    }
}

fn describe(consensus: &ConsensusResult) -> String {
    match consensus.call {
        ConsensusCall::Majority(direction) => {
            let top = consensus.votes(direction);
            format!("{direction} {top}/{}", consensus.voters)
        }
        ConsensusCall::Mixed => {
            let other = consensus.sideways + consensus.transitioning;
            format!(
                "Mixed ({} up / {} down / {} other)",
                consensus.up, consensus.down, other
            )
        }
    }
}

/// Timestamped snapshot of one full analysis run. Write-once; handed to the
/// persistence layer as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub strategies_used: Vec<StrategyKind>,
    pub timeframes: Vec<TimeframeOutcome>,
    pub summary: Summary,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Report {
    /// Assemble the report and stamp it with the current time.
    pub fn assemble(
        symbol: impl Into<String>,
        strategies_used: Vec<StrategyKind>,
        timeframes: Vec<TimeframeOutcome>,
    ) -> Self {
        let summary = Summary::from_timeframes(&timeframes);
        Self {
            schema_version: SCHEMA_VERSION,
            symbol: symbol.into(),
            generated_at: Utc::now(),
            strategies_used,
            timeframes,
            summary,
        }
    }

    /// Number of (timeframe, strategy) pairs that produced a verdict.
    pub fn successful_pairs(&self) -> usize {
        self.timeframes.iter().map(|tf| tf.verdicts().len()).sum()
    }
}
