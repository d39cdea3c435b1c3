//! GUI module - blocking figure windows

mod app;

pub use app::show_blocking;
