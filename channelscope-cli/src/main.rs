//! ChannelScope CLI — multi-timeframe, multi-strategy channel analysis.
//!
//! Examples:
//! - `channelscope` — all four strategies, all timeframes, CSV data dir
//! - `channelscope --strategy bollinger` — single strategy
//! - `channelscope --strategy regression,donchian --timeframes daily,weekly`
//! - `channelscope --synthetic --seed 7` — offline, seeded random walk
//!
//! Exit code 0 when at least one (timeframe, strategy) pair produced a
//! verdict; non-zero when every timeframe failed from missing data.

mod render;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use channelscope_core::data::{CsvSeriesProvider, SeriesProvider, SyntheticSeriesProvider};
use channelscope_core::domain::Timeframe;
use channelscope_core::strategies::select_strategies;
use channelscope_runner::{run_analysis, save_report, AnalysisConfig, AnalysisOptions};

#[derive(Parser)]
#[command(
    name = "channelscope",
    about = "ChannelScope — multi-timeframe price channel classification"
)]
struct Cli {
    /// Strategies to run, comma-separated (regression, bollinger, donchian,
    /// trendline). Defaults to all four.
    #[arg(long, short = 's')]
    strategy: Option<String>,

    /// Instrument symbol.
    #[arg(long, default_value = "GC=F")]
    symbol: String,

    /// Timeframes to analyze, comma-separated (1h, 4h, daily, weekly).
    /// Defaults to all four.
    #[arg(long)]
    timeframes: Option<String>,

    /// Directory holding cached CSV bar files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Use a seeded synthetic series instead of the CSV cache.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Directory for the JSON report.
    #[arg(long, default_value = "reports")]
    output_dir: PathBuf,

    /// Skip writing the JSON report.
    #[arg(long, default_value_t = false)]
    no_save: bool,

    /// Optional TOML config with thresholds and window overrides.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let options: AnalysisOptions = match &cli.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?
            .to_options()?,
        None => AnalysisOptions::default(),
    };

    // Resolve the strategy selection before touching any data; an unknown
    // name must fail the run up front.
    let names = cli.strategy.as_ref().map(|s| {
        s.split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
    });
    let strategies = select_strategies(names.as_deref(), &options.params)?;

    let timeframes = match &cli.timeframes {
        None => Timeframe::ALL.to_vec(),
        Some(list) => {
            let mut parsed = Vec::new();
            for part in list.split(',').filter(|p| !p.trim().is_empty()) {
                parsed.push(part.parse::<Timeframe>()?);
            }
            parsed.sort();
            parsed.dedup();
            if parsed.is_empty() {
                bail!("no timeframes requested");
            }
            parsed
        }
    };

    let provider: Box<dyn SeriesProvider> = if cli.synthetic {
        Box::new(SyntheticSeriesProvider::new(cli.seed))
    } else {
        Box::new(CsvSeriesProvider::new(&cli.data_dir))
    };

    println!(
        "Analyzing {} over {} timeframe(s) with {} strategy(ies) [{} data]...",
        cli.symbol,
        timeframes.len(),
        strategies.len(),
        provider.name()
    );

    let report = run_analysis(&*provider, &cli.symbol, &timeframes, &strategies, &options);

    render::print_report(&report);

    if !cli.no_save {
        let path = save_report(&cli.output_dir, &report)?;
        println!("Report saved to {}", path.display());
    }

    if report.successful_pairs() == 0 {
        bail!("no timeframe produced a verdict — is the data directory populated?");
    }
    Ok(())
}
