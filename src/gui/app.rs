//! Figure Window
//! One native window per figure; closing it hands control back to the caller.

use crate::charts::{ChartPlotter, Figure};
use crate::config::WindowSettings;
use crate::stats::ErrorStats;
use egui::{RichText, TopBottomPanel};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GuiError {
    #[error("Viewer window for {title:?} failed: {message}")]
    Viewer { title: String, message: String },
}

/// Shows a single figure, optionally with an error summary underneath.
pub struct FigureWindow {
    figure: Figure,
    stats: Option<ErrorStats>,
}

impl FigureWindow {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        figure: Figure,
        stats: Option<ErrorStats>,
    ) -> Self {
        Self { figure, stats }
    }

    fn draw_stats_table(ui: &mut egui::Ui, stats: &ErrorStats) {
        egui::Grid::new("error_stats")
            .striped(true)
            .min_col_width(55.0)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                let rows = stats.rows();
                for (label, _) in &rows {
                    ui.label(RichText::new(*label).strong().size(11.0));
                }
                ui.end_row();
                for (_, value) in &rows {
                    ui.label(RichText::new(value).size(11.0));
                }
                ui.end_row();
            });
    }
}

impl eframe::App for FigureWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(stats) = &self.stats {
            TopBottomPanel::bottom("error_stats_panel").show(ctx, |ui| {
                ui.add_space(4.0);
                Self::draw_stats_table(ui, stats);
                ui.add_space(4.0);
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ChartPlotter::draw_figure(ui, &self.figure);
        });
    }
}

/// Open a window for `figure` and block until the user closes it.
pub fn show_blocking(
    figure: Figure,
    stats: Option<ErrorStats>,
    window: &WindowSettings,
) -> Result<(), GuiError> {
    let title = figure.title.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window.width, window.height])
            .with_min_inner_size([400.0, 300.0])
            .with_title(&title),
        // Return from run_native on close so the next figure can follow
        run_and_return: true,
        ..Default::default()
    };

    debug!(title = %title, "opening viewer window");

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(FigureWindow::new(cc, figure, stats)))),
    )
    .map_err(|e| GuiError::Viewer {
        title,
        message: e.to_string(),
    })
}
