//! Plain-text report rendering for the terminal.

use channelscope_core::consensus::{ConsensusCall, ConsensusResult};
use channelscope_runner::{
    HorizonConflict, OverallBias, Report, StrategyOutcome, TimeframeResult,
};

pub fn print_report(report: &Report) {
    println!();
    println!(
        "═══ {} channel analysis — {} ═══",
        report.symbol,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for tf in &report.timeframes {
        println!();
        println!("{} ({})", tf.timeframe, tf.label);
        match &tf.result {
            TimeframeResult::Failed { error } => {
                println!("  !! {error}");
            }
            TimeframeResult::Analyzed {
                bar_count,
                strategies,
                consensus,
                ..
            } => {
                println!("  {bar_count} bars");
                for outcome in strategies {
                    match outcome {
                        StrategyOutcome::Verdict { verdict } => {
                            println!(
                                "  {:<12} {:<13} pos {:>5.1}%  strength {:.2}  [{:.2} / {:.2}]",
                                verdict.strategy.name(),
                                verdict.direction.to_string(),
                                verdict.position_pct,
                                verdict.strength,
                                verdict.lower,
                                verdict.upper,
                            );
                        }
                        StrategyOutcome::Unavailable { strategy, reason } => {
                            println!("  {:<12} N/A ({reason})", strategy.name());
                        }
                    }
                }
                println!("  ── consensus: {}", consensus_line(consensus));
            }
        }
    }

    println!();
    println!("Overall: {}", bias_line(report.summary.bias));
    if let Some(conflict) = report.summary.conflict {
        println!("Note: {}", conflict_line(conflict));
    }
    println!();
}

fn consensus_line(consensus: &ConsensusResult) -> String {
    match consensus.call {
        ConsensusCall::Majority(direction) => format!(
            "{direction} ({}/{} agree, {:.0}%)",
            consensus.votes(direction),
            consensus.voters,
            consensus.agreement * 100.0
        ),
        ConsensusCall::Mixed => format!(
            "Mixed ({} up / {} down / {} sideways / {} transitioning)",
            consensus.up, consensus.down, consensus.sideways, consensus.transitioning
        ),
    }
}

fn bias_line(bias: OverallBias) -> &'static str {
    match bias {
        OverallBias::AllBullish => "every timeframe leans bullish — strong uptrend",
        OverallBias::LeanBullish => "more timeframes lean bullish than bearish",
        OverallBias::AllBearish => "every timeframe leans bearish — strong downtrend",
        OverallBias::LeanBearish => "more timeframes lean bearish than bullish",
        OverallBias::Divergent => "timeframes disagree on direction",
        OverallBias::Inconclusive => "not enough data for a cross-timeframe view",
    }
}

fn conflict_line(conflict: HorizonConflict) -> &'static str {
    match conflict {
        HorizonConflict::ShortTermPullback => {
            "longer horizons lean up while shorter ones pull back"
        }
        HorizonConflict::ShortTermRebound => {
            "longer horizons lean down while shorter ones rebound"
        }
    }
}
