//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the series catalog (`SeriesCatalog`)
//! - normalized and enriched observations (`Observation`, `EnrichedObservation`)
//! - the request window and run configuration (`YearWindow`, `DashConfig`)

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
