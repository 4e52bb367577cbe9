//! Timeframe orchestration — fetch, fan out, join, aggregate.
//!
//! Provider calls run serially, once per timeframe, before any analysis.
//! Classification then fans out as one task per (timeframe, strategy) cell
//! on the rayon pool: inputs are frozen series and pure functions, so the
//! grid needs no locking. Results join back per timeframe in canonical
//! strategy order before consensus.
//!
//! Failure never cascades: a timeframe the provider cannot serve is recorded
//! and skipped, and a strategy without enough data becomes an N/A entry.

use std::collections::BTreeMap;

use rayon::prelude::*;

use channelscope_core::consensus::{aggregate, DEFAULT_AGREEMENT_THRESHOLD};
use channelscope_core::data::SeriesProvider;
use channelscope_core::domain::{AnalysisWindow, BarSeries, Timeframe};
use channelscope_core::fingerprint::series_fingerprint;
use channelscope_core::strategies::{ChannelVerdict, Strategy, StrategyError, StrategyKind, StrategyParams};

use crate::report::{Report, StrategyOutcome, TimeframeOutcome, TimeframeResult};

/// Run-wide analysis knobs.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub agreement_threshold: f64,
    pub params: StrategyParams,
    /// Per-timeframe window overrides; unlisted timeframes use their defaults.
    pub windows: BTreeMap<Timeframe, AnalysisWindow>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            agreement_threshold: DEFAULT_AGREEMENT_THRESHOLD,
            params: StrategyParams::default(),
            windows: BTreeMap::new(),
        }
    }
}

impl AnalysisOptions {
    pub fn window_for(&self, timeframe: Timeframe) -> AnalysisWindow {
        self.windows
            .get(&timeframe)
            .copied()
            .unwrap_or_else(|| timeframe.default_window())
    }
}

/// Analyze `symbol` across the requested timeframes with the selected
/// strategies and assemble the report.
pub fn run_analysis(
    provider: &dyn SeriesProvider,
    symbol: &str,
    timeframes: &[Timeframe],
    strategies: &[Strategy],
    options: &AnalysisOptions,
) -> Report {
    // Serial fetch, one provider call per timeframe
    let fetched: Vec<(Timeframe, Result<BarSeries, _>)> = timeframes
        .iter()
        .map(|&tf| (tf, provider.fetch(symbol, tf)))
        .collect();

    // One task per (fetched timeframe, strategy) cell
    let tasks: Vec<(usize, &BarSeries, &Strategy)> = fetched
        .iter()
        .enumerate()
        .filter_map(|(i, (_, result))| result.as_ref().ok().map(|series| (i, series)))
        .flat_map(|(i, series)| strategies.iter().map(move |s| (i, series, s)))
        .collect();

    let cells: Vec<(usize, StrategyKind, Result<ChannelVerdict, StrategyError>)> = tasks
        .par_iter()
        .map(|&(i, series, strategy)| {
            let window = options.window_for(series.timeframe());
            (i, strategy.kind(), strategy.classify(series, &window))
        })
        .collect();

    // Join back per timeframe
    let mut by_timeframe: Vec<Vec<(StrategyKind, Result<ChannelVerdict, StrategyError>)>> =
        (0..fetched.len()).map(|_| Vec::new()).collect();
    for (i, kind, result) in cells {
        by_timeframe[i].push((kind, result));
    }

    let outcomes = fetched
        .into_iter()
        .zip(by_timeframe)
        .map(|((timeframe, result), mut cells)| {
            let result = match result {
                Err(err) => TimeframeResult::Failed {
                    error: err.to_string(),
                },
                Ok(series) => {
                    cells.sort_by_key(|(kind, _)| *kind);

                    let mut strategy_outcomes = Vec::with_capacity(cells.len());
                    let mut verdicts = Vec::new();
                    for (kind, cell) in cells {
                        match cell {
                            Ok(verdict) => {
                                verdicts.push(verdict.clone());
                                strategy_outcomes.push(StrategyOutcome::Verdict { verdict });
                            }
                            Err(err) => strategy_outcomes.push(StrategyOutcome::Unavailable {
                                strategy: kind,
                                reason: err.to_string(),
                            }),
                        }
                    }

                    TimeframeResult::Analyzed {
                        bar_count: series.len(),
                        dataset_hash: series_fingerprint(&series),
                        strategies: strategy_outcomes,
                        consensus: aggregate(timeframe, &verdicts, options.agreement_threshold),
                    }
                }
            };

            TimeframeOutcome {
                timeframe,
                label: timeframe.label().to_string(),
                result,
            }
        })
        .collect();

    Report::assemble(
        symbol,
        strategies.iter().map(|s| s.kind()).collect(),
        outcomes,
    )
}
