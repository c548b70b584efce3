//! Input/output helpers.
//!
//! - enriched table CSV export (`export`)
//! - table JSON read/write (`table`)

pub mod export;
pub mod table;

pub use export::*;
pub use table::*;
