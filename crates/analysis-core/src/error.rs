use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data for {what}: need at least {required}, got {actual}")]
    InsufficientData {
        what: String,
        required: usize,
        actual: usize,
    },

    #[error("No benchmark data available")]
    NoBenchmarkData,

    #[error("Insufficient overlapping data with benchmark: {overlap} common dates (need at least 2)")]
    InsufficientOverlap { overlap: usize },

    #[error("Upstream data unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl AnalysisError {
    pub fn insufficient(what: impl Into<String>, required: usize, actual: usize) -> Self {
        AnalysisError::InsufficientData {
            what: what.into(),
            required,
            actual,
        }
    }
}
