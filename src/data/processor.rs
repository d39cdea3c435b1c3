//! Series Processor Module
//! Derives plot-ready series and the estimation error from two SOC logs.

use super::loader::{SocTable, TIME_COLUMN};
use polars::prelude::*;
use thiserror::Error;

pub const ERROR_COLUMN: &str = "error";
pub const ESTIMATED_COLUMN: &str = "estimated";
pub const REFERENCE_COLUMN: &str = "reference";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Row count mismatch: estimated log has {estimated} rows, reference log has {reference}")]
    LengthMismatch { estimated: usize, reference: usize },
}

/// Stateless transformations over loaded SOC tables.
pub struct SeriesProcessor;

impl SeriesProcessor {
    /// `(time, soc * scale)` pairs in row order.
    pub fn percent_points(table: &SocTable, scale: f64) -> Vec<[f64; 2]> {
        table
            .time()
            .into_iter()
            .zip(table.soc())
            .map(|(t, soc)| [t, soc * scale])
            .collect()
    }

    /// Build the error frame.
    ///
    /// Output columns: ["time", "estimated", "reference", "error"], where
    /// `error = (reference - estimated) * scale` and `time` comes from the
    /// reference log.
    pub fn error_frame(
        estimated: &SocTable,
        reference: &SocTable,
        scale: f64,
    ) -> Result<DataFrame, ProcessorError> {
        if estimated.len() != reference.len() {
            return Err(ProcessorError::LengthMismatch {
                estimated: estimated.len(),
                reference: reference.len(),
            });
        }

        let df = DataFrame::new(vec![
            Column::new(TIME_COLUMN.into(), reference.time()),
            Column::new(ESTIMATED_COLUMN.into(), estimated.soc()),
            Column::new(REFERENCE_COLUMN.into(), reference.soc()),
        ])?;

        let df = df
            .lazy()
            .with_column(
                ((col(REFERENCE_COLUMN) - col(ESTIMATED_COLUMN)) * lit(scale)).alias(ERROR_COLUMN),
            )
            .collect()?;

        Ok(df)
    }

    /// Error column of a frame built by [`Self::error_frame`].
    pub fn error_values(frame: &DataFrame) -> Vec<f64> {
        Self::f64_values(frame, ERROR_COLUMN)
    }

    /// `(time, error)` pairs in row order.
    pub fn error_points(frame: &DataFrame) -> Vec<[f64; 2]> {
        Self::f64_values(frame, TIME_COLUMN)
            .into_iter()
            .zip(Self::error_values(frame))
            .map(|(t, e)| [t, e])
            .collect()
    }

    fn f64_values(frame: &DataFrame, name: &str) -> Vec<f64> {
        frame
            .column(name)
            .ok()
            .and_then(|col| col.f64().ok())
            .map(|ca| ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeriesLoader;
    use std::io::Cursor;
    use std::path::Path;

    fn table(text: &str) -> SocTable {
        SeriesLoader::read_table(Cursor::new(text), Path::new("mem.txt")).unwrap()
    }

    #[test]
    fn percent_points_scale_soc_against_time() {
        let t = table("0.5 10\n0.25 20\n");
        assert_eq!(
            SeriesProcessor::percent_points(&t, 100.0),
            vec![[10.0, 50.0], [20.0, 25.0]]
        );
    }

    #[test]
    fn error_is_reference_minus_estimate_scaled() {
        let est = table("0.90 0\n0.80 1\n0.75 2\n0.60 3\n");
        let truth = table("0.91 0\n0.78 1\n0.75 2\n0.65 3\n");

        let frame = SeriesProcessor::error_frame(&est, &truth, 100.0).unwrap();
        let errors = SeriesProcessor::error_values(&frame);

        let expected: Vec<f64> = truth
            .soc()
            .iter()
            .zip(est.soc())
            .map(|(b, a)| (b - a) * 100.0)
            .collect();

        assert_eq!(errors.len(), expected.len());
        for (got, want) in errors.iter().zip(&expected) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn error_points_use_reference_time() {
        let est = table("0.5 100\n0.5 200\n");
        let truth = table("0.6 1\n0.4 2\n");

        let frame = SeriesProcessor::error_frame(&est, &truth, 100.0).unwrap();
        let points = SeriesProcessor::error_points(&frame);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0][0], 1.0);
        assert_eq!(points[1][0], 2.0);
        assert!((points[0][1] - 10.0).abs() < 1e-9);
        assert!((points[1][1] + 10.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let est = table("0.5 0\n0.4 1\n0.3 2\n");
        let truth = table("0.5 0\n0.4 1\n");

        let err = SeriesProcessor::error_frame(&est, &truth, 100.0).unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::LengthMismatch {
                estimated: 3,
                reference: 2
            }
        ));
    }

    #[test]
    fn inputs_are_not_mutated() {
        let est = table("0.9 0\n0.8 1\n");
        let truth = table("0.95 0\n0.85 1\n");
        let est_before = est.dataframe().clone();
        let truth_before = truth.dataframe().clone();

        let frame = SeriesProcessor::error_frame(&est, &truth, 100.0).unwrap();
        let _ = SeriesProcessor::percent_points(&est, 100.0);
        let _ = SeriesProcessor::error_points(&frame);

        assert!(est.dataframe().equals(&est_before));
        assert!(truth.dataframe().equals(&truth_before));
    }
}
