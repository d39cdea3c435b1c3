//! Static Chart Renderer
//! Writes figures to PNG or SVG using plotters.
//!
//! Layout mirrors the interactive window: title on top, labelled axes,
//! one line per series and a legend in the upper right.

use super::plotter::{ChartPlotter, Figure};
use crate::config::ImageFormat;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Figure {0:?} has no series to draw")]
    NoSeries(String),
    #[error("Plotting error: {0}")]
    Drawing(String),
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render `figure` to `path` in the given format and pixel size.
    pub fn render(
        figure: &Figure,
        path: &Path,
        format: ImageFormat,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        if figure.series.is_empty() {
            return Err(RenderError::NoSeries(figure.title.clone()));
        }

        match format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                Self::draw(root, figure)
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                Self::draw(root, figure)
            }
        }
    }

    fn draw<DB>(root: DrawingArea<DB, Shift>, figure: &Figure) -> Result<(), RenderError>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE).map_err(drawing)?;

        let (x_range, y_range) = ChartPlotter::bounds(figure);

        let mut chart = ChartBuilder::on(&root)
            .caption(&figure.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(65)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .light_line_style(&BLACK.mix(0.05))
            .label_style(("sans-serif", 16))
            .axis_desc_style(("sans-serif", 18))
            .draw()
            .map_err(drawing)?;

        for series in &figure.series {
            let (r, g, b) = series.color;
            let color = RGBColor(r, g, b);
            let style = ShapeStyle {
                color: color.to_rgba(),
                filled: false,
                stroke_width: 2,
            };
            chart
                .draw_series(LineSeries::new(
                    series
                        .points
                        .iter()
                        .copied()
                        .filter(|[x, y]| x.is_finite() && y.is_finite())
                        .map(|[x, y]| (x, y)),
                    style,
                ))
                .map_err(drawing)?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.3))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
        Ok(())
    }
}
