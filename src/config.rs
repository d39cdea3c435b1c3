//! Run configuration.
//!
//! Defaults reproduce the classic two-window SOC comparison; a JSON file
//! can override any subset of fields, and command-line flags override both.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Static image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Title and axis labels of one figure, after defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

/// Per-figure label overrides; unset fields fall back to the figure's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureLabels {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl FigureLabels {
    fn resolve(&self, title: &str, x_label: &str, y_label: &str) -> Labels {
        Labels {
            title: self.title.clone().unwrap_or_else(|| title.to_string()),
            x_label: self.x_label.clone().unwrap_or_else(|| x_label.to_string()),
            y_label: self.y_label.clone().unwrap_or_else(|| y_label.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Directory for rendered figures; nothing is written when unset.
    pub output_dir: Option<PathBuf>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Open rendered figures with the system viewer.
    pub open: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            format: ImageFormat::Png,
            width: 1280,
            height: 720,
            open: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub enabled: bool,
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 1000.0,
            height: 700.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub estimated_path: PathBuf,
    pub reference_path: PathBuf,
    /// Factor applied to SOC fractions and to their difference.
    pub scale: f64,
    pub soc_figure: FigureLabels,
    pub error_figure: FigureLabels,
    pub image: ImageSettings,
    pub window: WindowSettings,
    /// Write the error frame as CSV.
    pub export_csv: Option<PathBuf>,
    /// Write error statistics as JSON.
    pub summary_json: Option<PathBuf>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            estimated_path: PathBuf::from("./logs/SOC.txt"),
            reference_path: PathBuf::from("./logs/SOC_True.txt"),
            scale: 100.0,
            soc_figure: FigureLabels::default(),
            error_figure: FigureLabels::default(),
            image: ImageSettings::default(),
            window: WindowSettings::default(),
            export_csv: None,
            summary_json: None,
        }
    }
}

impl PlotConfig {
    pub fn soc_labels(&self) -> Labels {
        self.soc_figure.resolve("SOC graph", "Time", "Est. SOC vs True SOC")
    }

    pub fn error_labels(&self) -> Labels {
        self.error_figure.resolve("Error graph", "Time", "Error")
    }

    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "scale must be finite, got {}",
                self.scale
            )));
        }
        if self.image.width == 0 || self.image.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.image.width, self.image.height
            )));
        }
        if self.image.open && self.image.output_dir.is_none() {
            return Err(ConfigError::Invalid(
                "opening figures requires an output directory".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_layout() {
        let cfg = PlotConfig::default();
        assert_eq!(cfg.estimated_path, PathBuf::from("./logs/SOC.txt"));
        assert_eq!(cfg.reference_path, PathBuf::from("./logs/SOC_True.txt"));
        assert_eq!(cfg.scale, 100.0);
        assert_eq!(cfg.soc_labels().title, "SOC graph");
        assert_eq!(cfg.soc_labels().x_label, "Time");
        assert_eq!(cfg.soc_labels().y_label, "Est. SOC vs True SOC");
        assert_eq!(cfg.error_labels().title, "Error graph");
        assert_eq!(cfg.error_labels().y_label, "Error");
        assert!(cfg.window.enabled);
        assert!(cfg.image.output_dir.is_none());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PlotConfig::from_json(
            r#"{ "scale": 1.0, "image": { "format": "svg" }, "error_figure": { "title": "Residual" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.scale, 1.0);
        assert_eq!(cfg.image.format, ImageFormat::Svg);
        assert_eq!(cfg.image.width, 1280);
        assert_eq!(cfg.error_labels().title, "Residual");
        assert_eq!(cfg.error_labels().x_label, "Time");
        assert_eq!(cfg.error_labels().y_label, "Error");
        assert_eq!(cfg.reference_path, PathBuf::from("./logs/SOC_True.txt"));
    }

    #[test]
    fn rejects_unparseable_json() {
        assert!(PlotConfig::from_json("{ scale: ").is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = PlotConfig::default();
        cfg.scale = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = PlotConfig::default();
        cfg.image.height = 0;
        assert!(cfg.validate().is_err());

        assert!(PlotConfig::default().validate().is_ok());
    }

    #[test]
    fn open_requires_output_dir() {
        let mut cfg = PlotConfig::default();
        cfg.image.open = true;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("output directory"));

        cfg.image.output_dir = Some(PathBuf::from("plots"));
        assert!(cfg.validate().is_ok());
    }
}
