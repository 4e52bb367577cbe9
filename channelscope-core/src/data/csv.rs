//! CSV-backed series provider.
//!
//! Reads one file per (symbol, timeframe) pair from a data directory:
//! `{dir}/{symbol_tag}_{timeframe_tag}.csv`, where the symbol tag is the
//! lowercased symbol with `=`, `.` and `/` stripped (so `GC=F` maps to
//! `gcf_daily.csv`). Columns: timestamp (RFC 3339), open, high, low, close,
//! volume. Bars must be sane and strictly ordered.
//!
//! A missing 4H file falls back to resampling the 1H file, matching how the
//! upstream feed only publishes hourly bars.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Bar, BarSeries, Timeframe};

use super::provider::{DataError, SeriesProvider};
use super::resample::resample;

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

#[derive(Debug, Clone)]
pub struct CsvSeriesProvider {
    data_dir: PathBuf,
}

impl CsvSeriesProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.data_dir
            .join(format!("{}_{}.csv", symbol_tag(symbol), timeframe.tag()))
    }

    fn read_series(
        &self,
        path: &Path,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<BarSeries, DataError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut bars = Vec::new();
        for (row, record) in reader.deserialize::<CsvBar>().enumerate() {
            let record = record?;
            let bar = Bar {
                timestamp: record.timestamp,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            };
            if !bar.is_sane() {
                return Err(DataError::Malformed(format!(
                    "insane OHLC at row {} of {}",
                    row + 1,
                    path.display()
                )));
            }
            bars.push(bar);
        }
        Ok(BarSeries::new(symbol, timeframe, bars)?)
    }
}

/// File-name tag for a symbol: lowercase, with `=`, `.` and `/` stripped.
pub fn symbol_tag(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !matches!(c, '=' | '.' | '/'))
        .collect::<String>()
        .to_ascii_lowercase()
}

impl SeriesProvider for CsvSeriesProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<BarSeries, DataError> {
        let path = self.path_for(symbol, timeframe);
        if path.exists() {
            return self.read_series(&path, symbol, timeframe);
        }

        // No native 4H file: build it from the hourly series
        if timeframe == Timeframe::H4 {
            let hourly = self.path_for(symbol, Timeframe::H1);
            if hourly.exists() {
                let series = self.read_series(&hourly, symbol, Timeframe::H1)?;
                return resample(&series, Timeframe::H4);
            }
        }

        Err(DataError::Unavailable {
            symbol: symbol.to_string(),
            timeframe,
            reason: format!("no file at {}", path.display()),
        })
    }
}
