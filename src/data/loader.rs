//! SOC Log Loader Module
//! Reads whitespace-delimited numeric tables into Polars DataFrames.

use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Column holding the state-of-charge fraction.
pub const SOC_COLUMN: &str = "soc";
/// Column holding the timestamp.
pub const TIME_COLUMN: &str = "time";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: invalid number {token:?}", path.display())]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("{}:{line}: expected {expected} columns, found {found}", path.display())]
    RaggedRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("{}: need at least 2 columns (soc, time), found {found}", path.display())]
    TooFewColumns { path: PathBuf, found: usize },
    #[error("{}: no data rows", path.display())]
    Empty { path: PathBuf },
    #[error("Failed to build table: {0}")]
    Polars(#[from] PolarsError),
}

/// A loaded SOC log: column 0 is the SOC fraction, column 1 the timestamp.
#[derive(Debug, Clone)]
pub struct SocTable {
    df: DataFrame,
    source: PathBuf,
}

impl SocTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Number of columns, including any beyond soc and time.
    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn soc(&self) -> Vec<f64> {
        self.column_values(SOC_COLUMN)
    }

    pub fn time(&self) -> Vec<f64> {
        self.column_values(TIME_COLUMN)
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Path the table was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    fn column_values(&self, name: &str) -> Vec<f64> {
        self.df
            .column(name)
            .ok()
            .and_then(|col| col.f64().ok())
            .map(|ca| ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .unwrap_or_default()
    }
}

/// Loads SOC logs from disk.
pub struct SeriesLoader;

impl SeriesLoader {
    /// Load a whitespace-delimited numeric table from a file.
    pub fn load_table(path: &Path) -> Result<SocTable, LoaderError> {
        let file = File::open(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read_table(BufReader::new(file), path)
    }

    /// Parse a table from any buffered reader. `source` is only used for
    /// error messages and bookkeeping.
    pub fn read_table<R: BufRead>(reader: R, source: &Path) -> Result<SocTable, LoaderError> {
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|source_err| LoaderError::Io {
                path: source.to_path_buf(),
                source: source_err,
            })?;

            // Strip comments
            let content = match line.find('#') {
                Some(pos) => &line[..pos],
                None => line.as_str(),
            };

            let mut row: Vec<f64> = Vec::new();
            for token in content.split_whitespace() {
                let value = token
                    .parse::<f64>()
                    .map_err(|_| LoaderError::InvalidNumber {
                        path: source.to_path_buf(),
                        line: line_no,
                        token: token.to_string(),
                    })?;
                row.push(value);
            }

            if row.is_empty() {
                continue;
            }

            if columns.is_empty() {
                if row.len() < 2 {
                    return Err(LoaderError::TooFewColumns {
                        path: source.to_path_buf(),
                        found: row.len(),
                    });
                }
                columns = vec![Vec::new(); row.len()];
            } else if row.len() != columns.len() {
                return Err(LoaderError::RaggedRow {
                    path: source.to_path_buf(),
                    line: line_no,
                    expected: columns.len(),
                    found: row.len(),
                });
            }

            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        if columns.is_empty() {
            return Err(LoaderError::Empty {
                path: source.to_path_buf(),
            });
        }

        let df = DataFrame::new(
            columns
                .into_iter()
                .enumerate()
                .map(|(i, values)| Column::new(Self::column_name(i).into(), values))
                .collect(),
        )?;

        debug!(
            path = %source.display(),
            rows = df.height(),
            columns = df.width(),
            "parsed table"
        );

        Ok(SocTable {
            df,
            source: source.to_path_buf(),
        })
    }

    fn column_name(index: usize) -> String {
        match index {
            0 => SOC_COLUMN.to_string(),
            1 => TIME_COLUMN.to_string(),
            n => format!("column_{}", n),
        }
    }
}
