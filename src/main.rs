//! SOC Plot - estimated vs. true state-of-charge viewer
//!
//! Loads an estimated and a reference SOC log, plots both against time,
//! then plots their difference.

mod charts;
mod config;
mod data;
mod gui;
mod pipeline;
mod stats;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use config::{ImageFormat, PlotConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare estimated and true SOC logs", long_about = None)]
struct Cli {
    /// JSON config file; flags below override it
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Estimated SOC log (columns: soc, time)
    #[arg(long, value_hint = ValueHint::FilePath)]
    estimated: Option<PathBuf>,

    /// Reference SOC log (columns: soc, time)
    #[arg(long, value_hint = ValueHint::FilePath)]
    reference: Option<PathBuf>,

    /// Factor applied to SOC fractions and their difference
    #[arg(long)]
    scale: Option<f64>,

    /// Write soc.<ext> and error.<ext> into this directory
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    output_dir: Option<PathBuf>,

    /// Image format for --output-dir
    #[arg(long, value_enum)]
    format: Option<ImageFormat>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Write the error series (time, estimated, reference, error) as CSV
    #[arg(long, value_hint = ValueHint::FilePath)]
    export_csv: Option<PathBuf>,

    /// Write error statistics as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    summary_json: Option<PathBuf>,

    /// Open rendered images with the system viewer
    #[arg(long, action = ArgAction::SetTrue)]
    open: bool,

    /// Skip the interactive windows
    #[arg(long, action = ArgAction::SetTrue)]
    no_window: bool,

    /// Debug logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

impl Cli {
    /// Resolve the run configuration: defaults, then config file, then flags.
    fn into_config(self) -> Result<PlotConfig> {
        let mut config = match &self.config {
            Some(path) => PlotConfig::from_file(path)?,
            None => PlotConfig::default(),
        };

        if let Some(path) = self.estimated {
            config.estimated_path = path;
        }
        if let Some(path) = self.reference {
            config.reference_path = path;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(dir) = self.output_dir {
            config.image.output_dir = Some(dir);
        }
        if let Some(format) = self.format {
            config.image.format = format;
        }
        if let Some(width) = self.width {
            config.image.width = width;
        }
        if let Some(height) = self.height {
            config.image.height = height;
        }
        if self.export_csv.is_some() {
            config.export_csv = self.export_csv;
        }
        if self.summary_json.is_some() {
            config.summary_json = self.summary_json;
        }
        if self.open {
            config.image.open = true;
        }
        if self.no_window {
            config.window.enabled = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = cli.into_config().context("resolving configuration")?;
    pipeline::run(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_keep_defaults() {
        let config = Cli::parse_from(["soc_plot"]).into_config().unwrap();
        assert_eq!(config, PlotConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = Cli::parse_from([
            "soc_plot",
            "--estimated",
            "a.txt",
            "--reference",
            "b.txt",
            "--scale",
            "1",
            "--output-dir",
            "plots",
            "--format",
            "svg",
            "--no-window",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.estimated_path, PathBuf::from("a.txt"));
        assert_eq!(config.reference_path, PathBuf::from("b.txt"));
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.image.output_dir, Some(PathBuf::from("plots")));
        assert_eq!(config.image.format, ImageFormat::Svg);
        assert!(!config.window.enabled);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let result = Cli::parse_from(["soc_plot", "--width", "0"]).into_config();
        assert!(result.is_err());
    }

    #[test]
    fn open_without_output_dir_is_rejected() {
        assert!(Cli::parse_from(["soc_plot", "--open"]).into_config().is_err());
        assert!(Cli::parse_from(["soc_plot", "--open", "--output-dir", "plots"])
            .into_config()
            .is_ok());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = Cli::parse_from(["soc_plot", "--config", "/nonexistent/soc_plot.json"])
            .into_config();
        assert!(result.is_err());
    }
}
