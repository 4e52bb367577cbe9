//! Resample a series to a coarser timeframe.
//!
//! Aggregation per bucket: open = first, high = max, low = min, close = last,
//! volume = sum. Buckets are aligned to the target spacing (4H buckets start
//! at 00/04/08/... UTC, daily at midnight, weekly on Monday).

use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc};

use crate::domain::{Bar, BarSeries, Timeframe};

use super::provider::DataError;

/// Aggregate `series` into `target` bars. The source timeframe must be
/// strictly finer than the target.
pub fn resample(series: &BarSeries, target: Timeframe) -> Result<BarSeries, DataError> {
    if series.timeframe().minutes() >= target.minutes() {
        return Err(DataError::Malformed(format!(
            "cannot resample {} into {}",
            series.timeframe(),
            target
        )));
    }

    let mut out: Vec<Bar> = Vec::new();
    let mut current: Option<(DateTime<Utc>, Bar)> = None;

    for bar in series.bars() {
        let bucket = bucket_start(bar.timestamp, target);
        match &mut current {
            Some((open_bucket, agg)) if *open_bucket == bucket => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            Some((_, agg)) => {
                out.push(agg.clone());
                current = Some((bucket, seed_bar(bucket, bar)));
            }
            None => {
                current = Some((bucket, seed_bar(bucket, bar)));
            }
        }
    }
    if let Some((_, agg)) = current {
        out.push(agg);
    }

    Ok(BarSeries::new(series.symbol(), target, out)?)
}

fn seed_bar(bucket: DateTime<Utc>, bar: &Bar) -> Bar {
    Bar {
        timestamp: bucket,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: bar.volume,
    }
}

fn bucket_start(ts: DateTime<Utc>, target: Timeframe) -> DateTime<Utc> {
    let day = ts.date_naive().and_time(NaiveTime::MIN).and_utc();
    match target {
        Timeframe::H1 => day + Duration::hours(ts.hour() as i64),
        Timeframe::H4 => day + Duration::hours((ts.hour() / 4 * 4) as i64),
        Timeframe::Daily => day,
        Timeframe::Weekly => day - Duration::days(ts.weekday().num_days_from_monday() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hourly_series(closes: &[f64]) -> BarSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: base + Duration::hours(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 100,
            })
            .collect();
        BarSeries::new("GC=F", Timeframe::H1, bars).unwrap()
    }

    #[test]
    fn four_hourly_buckets_aggregate_ohlcv() {
        let series = hourly_series(&[10.0, 12.0, 11.0, 13.0, 20.0, 21.0]);
        let resampled = resample(&series, Timeframe::H4).unwrap();

        assert_eq!(resampled.len(), 2);
        let first = &resampled.bars()[0];
        assert_eq!(first.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(first.open, 9.5); // first bar's open
        assert_eq!(first.high, 14.0); // max high = 13 + 1
        assert_eq!(first.low, 9.0); // min low = 10 - 1
        assert_eq!(first.close, 13.0); // last close of the bucket
        assert_eq!(first.volume, 400);

        let second = &resampled.bars()[1];
        assert_eq!(second.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 4, 0, 0).unwrap());
        assert_eq!(second.close, 21.0);
        assert_eq!(second.volume, 200);
    }

    #[test]
    fn daily_buckets_split_at_midnight() {
        let series = hourly_series(&(0..30).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let resampled = resample(&series, Timeframe::Daily).unwrap();
        assert_eq!(resampled.len(), 2);
        assert_eq!(resampled.bars()[0].volume, 2400);
        assert_eq!(resampled.bars()[1].volume, 600);
    }

    #[test]
    fn weekly_bucket_starts_monday() {
        // 2024-01-03 is a Wednesday; its week starts 2024-01-01
        let ts = Utc.with_ymd_and_hms(2024, 1, 3, 15, 0, 0).unwrap();
        assert_eq!(
            bucket_start(ts, Timeframe::Weekly),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn refuses_coarser_source() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = vec![Bar {
            timestamp: base,
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
            volume: 1,
        }];
        let daily = BarSeries::new("GC=F", Timeframe::Daily, bars).unwrap();
        assert!(resample(&daily, Timeframe::H4).is_err());
    }

    #[test]
    fn irregular_spacing_tolerated() {
        // A gap: hours 0, 1, then 9 (bucket 2 missing entirely)
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mk = |h: i64, close: f64| Bar {
            timestamp: base + Duration::hours(h),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10,
        };
        let series = BarSeries::new(
            "GC=F",
            Timeframe::H1,
            vec![mk(0, 10.0), mk(1, 11.0), mk(9, 30.0)],
        )
        .unwrap();
        let resampled = resample(&series, Timeframe::H4).unwrap();
        assert_eq!(resampled.len(), 2);
        assert_eq!(
            resampled.bars()[1].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
        );
    }
}
