//! Error types for the forecast map crates.

use thiserror::Error;

/// Result type alias using ForecastError.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Primary error type for data loading and rendering.
#[derive(Debug, Clone, Error)]
pub enum ForecastError {
    // === Transport Errors ===
    #[error("Network failure: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Request timeout: {0}")]
    Timeout(String),

    // === Data Errors ===
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("Failed to compute valid bounds: {0}")]
    BoundsResolution(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Render cycle cancelled")]
    Cancelled,
}

impl ForecastError {
    /// Message suitable for the status line shown next to the map.
    ///
    /// Transport errors are classified into the short hints operators are
    /// used to; everything else falls back to the error's display text.
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::Timeout(_) => {
                "Request timed out. Server may be processing data. Please try again.".to_string()
            }
            ForecastError::HttpStatus { status: 404, .. } => {
                "Data not available for this timestep. Try a different time or check if data has been fetched."
                    .to_string()
            }
            ForecastError::Network(_) => {
                "Cannot connect to server. Please check your internet connection.".to_string()
            }
            ForecastError::HttpStatus { message, .. } if message.to_lowercase().contains("timeout") => {
                "Request timed out. Server may be processing data. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether retrying the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ForecastError::Timeout(_) | ForecastError::Network(_) => true,
            ForecastError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP-ish status code for logging.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ForecastError::HttpStatus { status, .. } => Some(*status),
            ForecastError::Timeout(_) => Some(504),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::InvalidPayload(format!("JSON error: {}", err))
    }
}
