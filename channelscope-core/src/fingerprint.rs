//! Dataset fingerprinting — a content hash of the analyzed series.
//!
//! Recorded per timeframe in the report so a reader can tell whether two
//! reports were produced from the same data.

use crate::domain::BarSeries;

/// Blake3 hash of the series' canonical byte encoding (symbol, timeframe,
/// then per-bar timestamp and OHLCV in little-endian).
pub fn series_fingerprint(series: &BarSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());
    hasher.update(series.timeframe().tag().as_bytes());
    for bar in series.bars() {
        hasher.update(&bar.timestamp.timestamp().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
