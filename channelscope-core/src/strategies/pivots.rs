//! Pivot detection — local price extrema used to anchor trendlines.
//!
//! A bar is a pivot high when its value is the maximum within a symmetric
//! neighborhood of `radius` bars on each side (ties count); pivot lows are
//! the mirror. Implemented as a pure windowed scan producing an ordered
//! pivot sequence — no accumulator state survives between calls.

/// A local extremum: window-relative bar index and the extreme value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub index: usize,
    pub value: f64,
}

/// Scan for pivot highs. Bars within `radius` of either edge cannot qualify
/// (their neighborhood is truncated). NaN values never qualify and poison
/// the neighborhoods they appear in.
pub fn pivot_highs(values: &[f64], radius: usize) -> Vec<Pivot> {
    scan(values, radius, true)
}

/// Scan for pivot lows. Mirror of [`pivot_highs`].
pub fn pivot_lows(values: &[f64], radius: usize) -> Vec<Pivot> {
    scan(values, radius, false)
}

fn scan(values: &[f64], radius: usize, highs: bool) -> Vec<Pivot> {
    assert!(radius >= 1, "pivot radius must be >= 1");
    let n = values.len();
    let mut pivots = Vec::new();

    if n < 2 * radius + 1 {
        return pivots;
    }

    for i in radius..(n - radius) {
        let candidate = values[i];
        if candidate.is_nan() {
            continue;
        }

        let neighborhood = values[i - radius..i]
            .iter()
            .chain(values[i + 1..=i + radius].iter());

        let mut qualifies = true;
        for &v in neighborhood {
            if v.is_nan() {
                qualifies = false;
                break;
            }
            let beaten = if highs { candidate < v } else { candidate > v };
            if beaten {
                qualifies = false;
                break;
            }
        }

        if qualifies {
            pivots.push(Pivot {
                index: i,
                value: candidate,
            });
        }
    }

    pivots
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triangle wave: peaks at 5, 15, 25, ... troughs at 0, 10, 20, ...
    fn triangle(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let phase = i % 10;
                let v = if phase <= 5 { phase } else { 10 - phase };
                100.0 + v as f64
            })
            .collect()
    }

    #[test]
    fn finds_triangle_peaks() {
        let values = triangle(30);
        let highs = pivot_highs(&values, 3);
        let indices: Vec<_> = highs.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![5, 15, 25]);
        assert!(highs.iter().all(|p| p.value == 105.0));
    }

    #[test]
    fn finds_triangle_troughs() {
        let values = triangle(30);
        let lows = pivot_lows(&values, 3);
        let indices: Vec<_> = lows.iter().map(|p| p.index).collect();
        // Troughs at multiples of 10; index 0 is inside the edge margin
        assert_eq!(indices, vec![10, 20]);
    }

    #[test]
    fn monotonic_series_has_no_interior_pivots() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        assert!(pivot_highs(&values, 5).is_empty());
        assert!(pivot_lows(&values, 5).is_empty());
    }

    #[test]
    fn flat_series_ties_qualify_everywhere() {
        let values = vec![100.0; 20];
        let highs = pivot_highs(&values, 2);
        // Every interior bar ties its neighborhood
        assert_eq!(highs.len(), 16);
        assert_eq!(highs[0].index, 2);
    }

    #[test]
    fn short_series_yields_nothing() {
        let values = vec![1.0, 2.0, 1.0];
        assert!(pivot_highs(&values, 2).is_empty());
    }

    #[test]
    fn nan_poisons_neighborhood() {
        let mut values = triangle(30);
        values[4] = f64::NAN;
        let highs = pivot_highs(&values, 3);
        let indices: Vec<_> = highs.iter().map(|p| p.index).collect();
        // Peak at 5 has a NaN neighbor; 15 and 25 survive
        assert_eq!(indices, vec![15, 25]);
    }

    #[test]
    fn pivots_are_ordered_by_index() {
        let values = triangle(50);
        let highs = pivot_highs(&values, 3);
        assert!(highs.windows(2).all(|w| w[0].index < w[1].index));
    }
}
