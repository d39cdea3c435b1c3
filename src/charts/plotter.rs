//! Chart Plotter Module
//! Builds SOC/error figures and draws them interactively using egui_plot.

use crate::config::{Labels, PlotConfig};
use crate::data::{SeriesProcessor, SocTable};
use egui::{Color32, RichText};
use egui_plot::{Legend, Line, Plot, PlotPoints};
use polars::prelude::DataFrame;
use std::ops::Range;

/// Series colours, following the usual matplotlib cycle.
pub const PALETTE: [(u8, u8, u8); 4] = [
    (31, 119, 180), // Blue
    (255, 127, 14), // Orange
    (44, 160, 44),  // Green
    (214, 39, 40),  // Red
];

/// One named line in a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub name: String,
    pub color: (u8, u8, u8),
    pub points: Vec<[f64; 2]>,
}

/// A titled x/y line figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<PlotSeries>,
}

impl Figure {
    fn new(labels: Labels) -> Self {
        Self {
            title: labels.title,
            x_label: labels.x_label,
            y_label: labels.y_label,
            series: Vec::new(),
        }
    }

    fn with_series(mut self, name: &str, points: Vec<[f64; 2]>) -> Self {
        let color = PALETTE[self.series.len() % PALETTE.len()];
        self.series.push(PlotSeries {
            name: name.to_string(),
            color,
            points,
        });
        self
    }
}

pub struct ChartPlotter;

impl ChartPlotter {
    /// Estimated and true SOC against time, both scaled.
    pub fn soc_figure(estimated: &SocTable, reference: &SocTable, config: &PlotConfig) -> Figure {
        Figure::new(config.soc_labels())
            .with_series(
                "Estimated SOC",
                SeriesProcessor::percent_points(estimated, config.scale),
            )
            .with_series(
                "True SOC",
                SeriesProcessor::percent_points(reference, config.scale),
            )
    }

    /// Error series against reference time.
    pub fn error_figure(frame: &DataFrame, config: &PlotConfig) -> Figure {
        Figure::new(config.error_labels())
            .with_series("Error", SeriesProcessor::error_points(frame))
    }

    /// Axis ranges covering every finite point. Degenerate ranges are widened
    /// by one unit each side and the y range gets 5% headroom.
    pub fn bounds(figure: &Figure) -> (Range<f64>, Range<f64>) {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for [x, y] in figure.series.iter().flat_map(|s| s.points.iter().copied()) {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        if x_min.is_infinite() {
            return (0.0..1.0, 0.0..1.0);
        }

        let x_range = if x_min == x_max {
            (x_min - 1.0)..(x_max + 1.0)
        } else {
            x_min..x_max
        };
        let y_range = if y_min == y_max {
            (y_min - 1.0)..(y_max + 1.0)
        } else {
            let pad = (y_max - y_min) * 0.05;
            let (lo, hi) = (y_min - pad, y_max + pad);
            // Padding near f64::MAX overflows; keep the raw extent then
            if lo.is_finite() && hi.is_finite() {
                lo..hi
            } else {
                y_min..y_max
            }
        };

        (x_range, y_range)
    }

    /// Draw a figure: title heading, then the plot filling the remaining space.
    pub fn draw_figure(ui: &mut egui::Ui, figure: &Figure) {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&figure.title).strong().size(18.0));
        });

        Plot::new(format!("figure_{}", figure.title))
            .legend(Legend::default())
            .x_axis_label(figure.x_label.clone())
            .y_axis_label(figure.y_label.clone())
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for series in &figure.series {
                    let (r, g, b) = series.color;
                    let points: PlotPoints = series.points.iter().copied().collect();
                    plot_ui.line(
                        Line::new(points)
                            .color(Color32::from_rgb(r, g, b))
                            .width(1.5)
                            .name(&series.name),
                    );
                }
            });
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

    fn figure(points: Vec<[f64; 2]>) -> Figure {
        Figure::new(PlotConfig::default().error_labels()).with_series("s", points)
    }

    #[test]
    fn soc_figure_has_two_scaled_series() {
        let cfg = PlotConfig::default();
        let est = table("0.9 0\n0.8 1\n");
        let truth = table("0.95 0\n0.85 1\n");

        let fig = ChartPlotter::soc_figure(&est, &truth, &cfg);

        assert_eq!(fig.title, "SOC graph");
        assert_eq!(fig.x_label, "Time");
        assert_eq!(fig.y_label, "Est. SOC vs True SOC");
        assert_eq!(fig.series.len(), 2);
        assert_eq!(fig.series[0].name, "Estimated SOC");
        assert_eq!(fig.series[0].color, PALETTE[0]);
        assert_eq!(fig.series[1].color, PALETTE[1]);
        assert!((fig.series[1].points[1][1] - 85.0).abs() < 1e-9);
    }

    #[test]
    fn error_figure_uses_error_labels() {
        let cfg = PlotConfig::default();
        let est = table("0.9 0\n0.8 1\n");
        let truth = table("0.95 0\n0.85 1\n");
        let frame = SeriesProcessor::error_frame(&est, &truth, cfg.scale).unwrap();

        let fig = ChartPlotter::error_figure(&frame, &cfg);

        assert_eq!(fig.title, "Error graph");
        assert_eq!(fig.y_label, "Error");
        assert_eq!(fig.series.len(), 1);
        assert_eq!(fig.series[0].points.len(), 2);
    }

    #[test]
    fn bounds_cover_points_with_padding() {
        let fig = figure(vec![[0.0, 10.0], [5.0, 30.0]]);
        let (x, y) = ChartPlotter::bounds(&fig);
        assert_eq!(x, 0.0..5.0);
        assert!((y.start - 9.0).abs() < 1e-9);
        assert!((y.end - 31.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_widen_degenerate_ranges() {
        let fig = figure(vec![[2.0, 50.0], [2.0, 50.0]]);
        let (x, y) = ChartPlotter::bounds(&fig);
        assert_eq!(x, 1.0..3.0);
        assert_eq!(y, 49.0..51.0);
    }

    #[test]
    fn bounds_skip_non_finite_points() {
        let fig = figure(vec![[f64::NAN, 1.0], [1.0, f64::INFINITY]]);
        assert_eq!(ChartPlotter::bounds(&fig), (0.0..1.0, 0.0..1.0));
    }

    #[test]
    fn bounds_stay_finite_for_huge_spans() {
        let fig = figure(vec![[0.0, -1.7e308], [1.0, 1.7e308]]);
        let (x, y) = ChartPlotter::bounds(&fig);
        assert_eq!(x, 0.0..1.0);
        assert_eq!(y, -1.7e308..1.7e308);
        assert!(y.start.is_finite() && y.end.is_finite());

        let fig = figure(vec![[0.0, -1.79e308], [1.0, 1.0e306]]);
        let (_, y) = ChartPlotter::bounds(&fig);
        assert_eq!(y, -1.79e308..1.0e306);
    }
}
