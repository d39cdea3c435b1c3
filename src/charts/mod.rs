//! Charts module - Figure building and rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, Figure};
pub use renderer::StaticChartRenderer;
