//! Error handling for the resume screener

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Scoring failed: {0}")]
    ScoringFailed(#[from] ScoringError),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

/// Failures reported by the AI scoring service.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("rate limited by the AI service: {0}")]
    RateLimited(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response blocked or empty: {0}")]
    Blocked(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),
}

impl ScoringError {
    /// Whether another attempt at the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ScoringError::Http(_) | ScoringError::Timeout(_) | ScoringError::RateLimited(_) => true,
            ScoringError::Api { status, .. } => *status >= 500,
            ScoringError::Blocked(_)
            | ScoringError::Malformed(_)
            | ScoringError::MissingApiKey(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

impl From<rust_xlsxwriter::XlsxError> for ScreenerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ScreenerError::ExportFailed(err.to_string())
    }
}

impl From<csv::Error> for ScreenerError {
    fn from(err: csv::Error) -> Self {
        ScreenerError::ExportFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ScoringError::Timeout(30).is_transient());
        assert!(ScoringError::RateLimited("quota".to_string()).is_transient());
        assert!(ScoringError::Api { status: 503, message: "unavailable".to_string() }.is_transient());
        assert!(!ScoringError::Api { status: 400, message: "bad request".to_string() }.is_transient());
        assert!(!ScoringError::Malformed("missing score".to_string()).is_transient());
        assert!(!ScoringError::MissingApiKey("GOOGLE_API_KEY".to_string()).is_transient());
    }
}
