//! Reporting utilities: metric cards, detail lines, and the raw-data table.

pub mod format;

pub use format::*;
