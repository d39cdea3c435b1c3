//! Data module - SOC log loading and processing

mod loader;
mod processor;

pub use loader::{SeriesLoader, SocTable};
pub use processor::SeriesProcessor;
