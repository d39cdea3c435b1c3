//! End-to-end run: load both logs, derive the error, report, render, show.

use crate::charts::{ChartPlotter, Figure, StaticChartRenderer};
use crate::config::PlotConfig;
use crate::data::{SeriesLoader, SeriesProcessor, SocTable};
use crate::gui;
use crate::stats::{ErrorStats, StatsCalculator};
use anyhow::{Context, Result};
use polars::prelude::*;
use rayon::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything derived from the two logs, ready to be written or shown.
pub struct Prepared {
    pub soc_figure: Figure,
    pub error_figure: Figure,
    pub error_frame: DataFrame,
    pub stats: ErrorStats,
}

/// Load both logs and derive figures, error frame and statistics.
pub fn prepare(config: &PlotConfig) -> Result<Prepared> {
    let (estimated, reference) = rayon::join(
        || SeriesLoader::load_table(&config.estimated_path),
        || SeriesLoader::load_table(&config.reference_path),
    );
    let estimated = estimated.context("loading estimated SOC log")?;
    let reference = reference.context("loading reference SOC log")?;
    log_table("estimated", &estimated);
    log_table("reference", &reference);

    let error_frame = SeriesProcessor::error_frame(&estimated, &reference, config.scale)
        .context("computing SOC error")?;
    let stats = StatsCalculator::error_stats(&SeriesProcessor::error_values(&error_frame));

    if stats.skipped > 0 {
        warn!(skipped = stats.skipped, "non-finite error samples ignored");
    }
    info!(
        n = stats.count,
        mean = stats.mean,
        std = stats.std_dev,
        mae = stats.mae,
        rmse = stats.rmse,
        max_abs = stats.max_abs,
        p95_abs = stats.p95_abs,
        "error summary"
    );

    Ok(Prepared {
        soc_figure: ChartPlotter::soc_figure(&estimated, &reference, config),
        error_figure: ChartPlotter::error_figure(&error_frame, config),
        error_frame,
        stats,
    })
}

fn log_table(role: &str, table: &SocTable) {
    info!(
        role,
        path = %table.source().display(),
        rows = table.len(),
        columns = table.width(),
        "loaded SOC log"
    );
}

/// Write the optional CSV/JSON/image outputs. Returns the rendered image paths.
pub fn write_outputs(config: &PlotConfig, prepared: &Prepared) -> Result<Vec<PathBuf>> {
    if let Some(path) = &config.export_csv {
        export_csv(&prepared.error_frame, path)?;
        info!(path = %path.display(), "error series exported");
    }

    if let Some(path) = &config.summary_json {
        let file = File::create(path)
            .with_context(|| format!("creating summary file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &prepared.stats)
            .with_context(|| format!("writing summary file {}", path.display()))?;
        info!(path = %path.display(), "error summary written");
    }

    let Some(dir) = &config.image.output_dir else {
        return Ok(Vec::new());
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let ext = config.image.format.extension();
    let size = (config.image.width, config.image.height);
    let jobs = [
        (&prepared.soc_figure, "soc"),
        (&prepared.error_figure, "error"),
    ];

    let written = jobs
        .par_iter()
        .map(|(figure, stem)| -> Result<PathBuf> {
            let path = dir.join(format!("{}.{}", stem, ext));
            StaticChartRenderer::render(figure, &path, config.image.format, size)
                .with_context(|| format!("rendering {}", path.display()))?;
            info!(path = %path.display(), "figure rendered");
            Ok(path)
        })
        .collect::<Result<Vec<PathBuf>>>()?;

    if config.image.open {
        for path in &written {
            if let Err(e) = open::that(path) {
                warn!(path = %path.display(), error = %e, "could not open figure");
            }
        }
    }

    Ok(written)
}

fn export_csv(frame: &DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating CSV file {}", path.display()))?;
    let mut frame = frame.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)
        .with_context(|| format!("writing CSV file {}", path.display()))?;
    Ok(())
}

/// Show the SOC window, then the error window. Each call blocks until closed.
pub fn show_windows(config: &PlotConfig, prepared: Prepared) -> Result<()> {
    let Prepared {
        soc_figure,
        error_figure,
        stats,
        ..
    } = prepared;

    gui::show_blocking(soc_figure, None, &config.window)?;
    gui::show_blocking(error_figure, Some(stats), &config.window)?;
    Ok(())
}

pub fn run(config: &PlotConfig) -> Result<()> {
    let prepared = prepare(config)?;
    write_outputs(config, &prepared)?;

    if config.window.enabled {
        show_windows(config, prepared)?;
    } else {
        info!("viewer windows disabled");
    }
    Ok(())
}
