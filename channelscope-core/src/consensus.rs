//! Consensus aggregation — reconciling strategy verdicts for one timeframe.
//!
//! Pure reduction over a verdict list: tally votes by direction and call a
//! majority only when it is unique and clears the agreement threshold.
//! Strategies that failed (N/A) never reach this function, so the tally only
//! covers voting strategies. Deterministic under permutation of the input.

use serde::{Deserialize, Serialize};

use crate::domain::Timeframe;
use crate::strategies::{ChannelDirection, ChannelVerdict};

/// Fraction of voters the top direction must exceed to count as a majority.
pub const DEFAULT_AGREEMENT_THRESHOLD: f64 = 0.5;

/// The reconciled directional call for one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "direction", rename_all = "snake_case")]
pub enum ConsensusCall {
    Majority(ChannelDirection),
    Mixed,
}

/// Vote tally and call for one timeframe. Recomputed on every analysis run,
/// never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub timeframe: Timeframe,
    pub up: usize,
    pub down: usize,
    pub sideways: usize,
    pub transitioning: usize,
    /// Number of strategies that produced a verdict.
    pub voters: usize,
    pub call: ConsensusCall,
    /// Top vote count / voters; 0.0 with no voters.
    pub agreement: f64,
}

impl ConsensusResult {
    /// Votes for one direction.
    pub fn votes(&self, direction: ChannelDirection) -> usize {
        match direction {
            ChannelDirection::Up => self.up,
            ChannelDirection::Down => self.down,
            ChannelDirection::Sideways => self.sideways,
            ChannelDirection::Transitioning => self.transitioning,
        }
    }
}

/// Reduce one timeframe's verdicts to a consensus.
///
/// The call is `Majority(d)` only when `d` alone holds the top count and
/// top/voters strictly exceeds `agreement_threshold`; ties and sub-threshold
/// majorities are `Mixed`, as is an empty verdict list.
pub fn aggregate(
    timeframe: Timeframe,
    verdicts: &[ChannelVerdict],
    agreement_threshold: f64,
) -> ConsensusResult {
    let mut counts = [0usize; 4];
    for v in verdicts {
        let slot = match v.direction {
            ChannelDirection::Up => 0,
            ChannelDirection::Down => 1,
            ChannelDirection::Sideways => 2,
            ChannelDirection::Transitioning => 3,
        };
        counts[slot] += 1;
    }

    let voters = verdicts.len();
    let top = counts.iter().copied().max().unwrap_or(0);
    let agreement = if voters > 0 {
        top as f64 / voters as f64
    } else {
        0.0
    };

    let leaders = counts.iter().filter(|&&c| c == top && c > 0).count();
    let call = if voters > 0 && leaders == 1 && agreement > agreement_threshold {
        const DIRECTIONS: [ChannelDirection; 4] = [
            ChannelDirection::Up,
            ChannelDirection::Down,
            ChannelDirection::Sideways,
            ChannelDirection::Transitioning,
        ];
        let winner = DIRECTIONS[counts.iter().position(|&c| c == top).unwrap_or(0)];
        ConsensusCall::Majority(winner)
    } else {
        ConsensusCall::Mixed
    };

    ConsensusResult {
        timeframe,
        up: counts[0],
        down: counts[1],
        sideways: counts[2],
        transitioning: counts[3],
        voters,
        call,
        agreement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::StrategyKind;

    fn verdict(direction: ChannelDirection, strategy: StrategyKind) -> ChannelVerdict {
        ChannelVerdict {
            strategy,
            timeframe: Timeframe::Daily,
            direction,
            strength: 0.5,
            position_pct: 50.0,
            upper: 110.0,
            lower: 90.0,
            center: 100.0,
            close: 100.0,
            bars_above: 10,
            bars_below: 10,
        }
    }

    fn verdicts(directions: &[ChannelDirection]) -> Vec<ChannelVerdict> {
        directions
            .iter()
            .zip(StrategyKind::ALL)
            .map(|(&d, k)| verdict(d, k))
            .collect()
    }

    #[test]
    fn unanimous_up() {
        use ChannelDirection::*;
        let result = aggregate(
            Timeframe::Daily,
            &verdicts(&[Up, Up, Up, Up]),
            DEFAULT_AGREEMENT_THRESHOLD,
        );
        assert_eq!(result.call, ConsensusCall::Majority(Up));
        assert_eq!(result.agreement, 1.0);
        assert_eq!(result.voters, 4);
    }

    #[test]
    fn split_two_two_is_mixed() {
        use ChannelDirection::*;
        let result = aggregate(
            Timeframe::Daily,
            &verdicts(&[Up, Up, Down, Down]),
            DEFAULT_AGREEMENT_THRESHOLD,
        );
        assert_eq!(result.call, ConsensusCall::Mixed);
        assert_eq!(result.agreement, 0.5);
    }

    #[test]
    fn three_of_four_is_majority() {
        use ChannelDirection::*;
        let result = aggregate(
            Timeframe::Daily,
            &verdicts(&[Up, Up, Up, Sideways]),
            DEFAULT_AGREEMENT_THRESHOLD,
        );
        assert_eq!(result.call, ConsensusCall::Majority(Up));
        assert_eq!(result.agreement, 0.75);
        assert_eq!(result.votes(Up), 3);
        assert_eq!(result.votes(Sideways), 1);
    }

    #[test]
    fn bare_half_is_mixed() {
        use ChannelDirection::*;
        // 2 of 4 is not *more* than half
        let result = aggregate(
            Timeframe::Daily,
            &verdicts(&[Down, Down, Sideways, Transitioning]),
            DEFAULT_AGREEMENT_THRESHOLD,
        );
        assert_eq!(result.call, ConsensusCall::Mixed);
    }

    #[test]
    fn sideways_can_win() {
        use ChannelDirection::*;
        let result = aggregate(
            Timeframe::Daily,
            &verdicts(&[Sideways, Sideways, Sideways, Up]),
            DEFAULT_AGREEMENT_THRESHOLD,
        );
        assert_eq!(result.call, ConsensusCall::Majority(Sideways));
    }

    #[test]
    fn no_voters_is_mixed() {
        let result = aggregate(Timeframe::Weekly, &[], DEFAULT_AGREEMENT_THRESHOLD);
        assert_eq!(result.call, ConsensusCall::Mixed);
        assert_eq!(result.voters, 0);
        assert_eq!(result.agreement, 0.0);
    }

    #[test]
    fn order_does_not_matter() {
        use ChannelDirection::*;
        let a = aggregate(
            Timeframe::H4,
            &verdicts(&[Up, Sideways, Up, Up]),
            DEFAULT_AGREEMENT_THRESHOLD,
        );
        let b = aggregate(
            Timeframe::H4,
            &verdicts(&[Sideways, Up, Up, Up]),
            DEFAULT_AGREEMENT_THRESHOLD,
        );
        assert_eq!(a.call, b.call);
        assert_eq!(a.agreement, b.agreement);
        assert_eq!(a.up, b.up);
    }

    #[test]
    fn three_voters_majority() {
        use ChannelDirection::*;
        // One strategy was N/A: only three verdicts reach the aggregator
        let vs = verdicts(&[Down, Down, Sideways]);
        let result = aggregate(Timeframe::H1, &vs, DEFAULT_AGREEMENT_THRESHOLD);
        assert_eq!(result.call, ConsensusCall::Majority(Down));
        assert!((result.agreement - 2.0 / 3.0).abs() < 1e-12);
    }
}
