use crate::data::FetchError;

/// Exit code for configuration and local IO problems.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code when the pipeline produced no data.
pub const EXIT_DATA: u8 = 4;

pub const DATA_UNAVAILABLE: &str = "Failed to load data. Please check your internet connection or try again later.";

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::data(format!("{DATA_UNAVAILABLE} (BLS fetch failed: {err})"))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_maps_to_data_exit_with_reason() {
        let err = AppError::from(FetchError::Shape);
        assert_eq!(err.exit_code(), EXIT_DATA);
        let msg = err.to_string();
        assert!(msg.starts_with(DATA_UNAVAILABLE));
        assert!(msg.contains("no Results.series"));
    }
}
