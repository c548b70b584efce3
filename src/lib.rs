//! `econ-dash` library crate.
//!
//! The binary (`econ`) is a thin wrapper around this library so that:
//!
//! - the fetch -> transform pipeline is testable without spawning processes
//! - the enriched table can be consumed by other renderers
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod transform;
pub mod tui;
