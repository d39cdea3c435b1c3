//! Statistics Calculator Module
//! Summarises the estimation error series.

use serde::Serialize;
use statrs::statistics::Statistics;

/// Summary of an error series. Non-finite samples are ignored and counted
/// in `skipped`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorStats {
    pub count: usize,
    pub skipped: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub mae: f64,
    pub rmse: f64,
    pub max_abs: f64,
    pub p95_abs: f64,
}

impl Default for ErrorStats {
    fn default() -> Self {
        Self {
            count: 0,
            skipped: 0,
            mean: f64::NAN,
            std_dev: f64::NAN,
            mae: f64::NAN,
            rmse: f64::NAN,
            max_abs: f64::NAN,
            p95_abs: f64::NAN,
        }
    }
}

impl ErrorStats {
    /// Label/value rows for display.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("N", self.count.to_string()),
            ("Mean", format!("{:.3}", self.mean)),
            ("Std", format!("{:.3}", self.std_dev)),
            ("MAE", format!("{:.3}", self.mae)),
            ("RMSE", format!("{:.3}", self.rmse)),
            ("Max |e|", format!("{:.3}", self.max_abs)),
            ("P95 |e|", format!("{:.3}", self.p95_abs)),
        ]
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    pub fn error_stats(values: &[f64]) -> ErrorStats {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let skipped = values.len() - finite.len();

        if finite.is_empty() {
            return ErrorStats {
                skipped,
                ..ErrorStats::default()
            };
        }

        let abs: Vec<f64> = finite.iter().map(|v| v.abs()).collect();
        let mut sorted_abs = abs.clone();
        sorted_abs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // statrs returns NaN for a single-sample std_dev
        let std_dev = if finite.len() > 1 {
            finite.iter().std_dev()
        } else {
            0.0
        };

        ErrorStats {
            count: finite.len(),
            skipped,
            mean: finite.iter().mean(),
            std_dev,
            mae: abs.iter().mean(),
            rmse: finite.iter().quadratic_mean(),
            max_abs: finite.iter().abs_max(),
            p95_abs: Self::percentile(&sorted_abs, 95.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}
