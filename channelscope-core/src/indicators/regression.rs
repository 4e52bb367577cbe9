//! Least-squares line fit — the shared regression primitive.
//!
//! Used by the regression strategy (close vs bar index), the trendline
//! strategy (pivot values vs pivot index), and the Bollinger strategy
//! (middle-band slope).

/// Result of a least-squares line fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination. Zero when the series has no variance.
    pub r_squared: f64,
    /// Population stddev of the residuals around the fitted line.
    pub residual_std: f64,
}

impl LinearFit {
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a line through `values` against x = 0..n.
///
/// Returns `None` for fewer than two points or any non-finite value.
pub fn fit_series(values: &[f64]) -> Option<LinearFit> {
    let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    fit_points(&xs, values)
}

/// Fit a line through arbitrary (x, y) points.
///
/// Returns `None` for fewer than two points, any non-finite coordinate, or
/// zero x-variance (vertical line).
pub fn fit_points(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return None;
    }

    let nf = n as f64;
    let x_mean = xs.iter().sum::<f64>() / nf;
    let y_mean = ys.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for i in 0..n {
        let dx = xs[i] - x_mean;
        sxx += dx * dx;
        sxy += dx * (ys[i] - y_mean);
    }

    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for i in 0..n {
        let predicted = intercept + slope * xs[i];
        let res = ys[i] - predicted;
        ss_res += res * res;
        ss_tot += (ys[i] - y_mean) * (ys[i] - y_mean);
    }

    let r_squared = if ss_tot > 0.0 {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let residual_std = (ss_res / nf).sqrt();

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        residual_std,
    })
}
