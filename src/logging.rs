//! Tracing subscriber setup.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// One-shot commands log to stderr.
    Stderr,
    /// The TUI owns the terminal; logs are dropped unless a file is given.
    Discard,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("econ_dash=info"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(target: LogTarget, log_file: Option<&Path>) -> Result<(), AppError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false);

    let result = match (log_file, target) {
        (Some(path), _) => {
            let file = File::create(path)
                .map_err(|e| AppError::config(format!("Failed to create log file '{}': {e}", path.display())))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        (None, LogTarget::Stderr) => builder.with_writer(std::io::stderr).try_init(),
        (None, LogTarget::Discard) => builder.with_writer(std::io::sink).try_init(),
    };

    result.map_err(|e| AppError::config(format!("Failed to initialize logging: {e}")))
}
