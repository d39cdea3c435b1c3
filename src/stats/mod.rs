//! Stats module - error summaries

mod calculator;

pub use calculator::{ErrorStats, StatsCalculator};
