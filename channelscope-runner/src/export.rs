//! Report export — the shipped persistence collaborator.
//!
//! Writes the report as pretty JSON under the output directory with a
//! self-describing name: `channel_{symbol}_{yyyymmdd_hhmmss}_{strategies}.json`.

use anyhow::Result;
use std::path::{Path, PathBuf};

use channelscope_core::data::csv::symbol_tag;
use channelscope_core::strategies::StrategyKind;

use crate::report::Report;

pub fn save_report(output_dir: impl AsRef<Path>, report: &Report) -> Result<PathBuf> {
    std::fs::create_dir_all(&output_dir)?;

    let strategy_tag = if report.strategies_used.len() == StrategyKind::ALL.len() {
        "all".to_string()
    } else {
        report
            .strategies_used
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join("+")
    };

    let filename = format!(
        "channel_{}_{}_{}.json",
        symbol_tag(&report.symbol),
        report.generated_at.format("%Y%m%d_%H%M%S"),
        strategy_tag
    );
    let path = output_dir.as_ref().join(filename);

    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Summary, OverallBias};

    fn empty_report(strategies: Vec<StrategyKind>) -> Report {
        Report {
            schema_version: crate::report::SCHEMA_VERSION,
            symbol: "GC=F".into(),
            generated_at: chrono::Utc::now(),
            strategies_used: strategies,
            timeframes: Vec::new(),
            summary: Summary {
                bias: OverallBias::Inconclusive,
                lines: Vec::new(),
                conflict: None,
            },
        }
    }

    #[test]
    fn writes_timestamped_json() {
        let dir = tempfile::tempdir().unwrap();
        let report = empty_report(StrategyKind::ALL.to_vec());
        let path = save_report(dir.path(), &report).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("channel_gcf_"));
        assert!(name.ends_with("_all.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        let loaded: Report = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded.symbol, "GC=F");
    }

    #[test]
    fn subset_runs_name_their_strategies() {
        let dir = tempfile::tempdir().unwrap();
        let report = empty_report(vec![StrategyKind::Regression, StrategyKind::Donchian]);
        let path = save_report(dir.path(), &report).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_regression+donchian.json"));
    }
}
