//! ChannelScope Runner — timeframe orchestration, report assembly, config,
//! and report export.

pub mod config;
pub mod export;
pub mod orchestrator;
pub mod report;

pub use config::{AnalysisConfig, ConfigError};
pub use export::save_report;
pub use orchestrator::{run_analysis, AnalysisOptions};
pub use report::{
    HorizonConflict, OverallBias, Report, StrategyOutcome, Summary, TimeframeOutcome,
    TimeframeResult,
};
