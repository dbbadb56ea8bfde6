//! Error types for the slip-extraction collaborator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Rate limited (retry after {retry_after}s)")]
    RateLimited { retry_after: u64 },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {code} - {message}")]
    Provider { code: String, message: String },

    #[error("Extraction cancelled")]
    Cancelled,

    #[error("Extraction failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

impl ExtractError {
    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Network(_) | Self::Timeout(_)
        )
    }
}
