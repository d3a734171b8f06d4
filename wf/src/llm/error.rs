//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Missing credentials: set the {0} environment variable")]
    MissingApiKey(String),
}

impl LlmError {
    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            LlmError::Timeout(_) => true,
            LlmError::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_timeout() {
        assert!(LlmError::Timeout(Duration::from_secs(30)).is_timeout());
        assert!(
            !LlmError::ApiError {
                status: 500,
                message: "Server error".to_string()
            }
            .is_timeout()
        );
        assert!(!LlmError::InvalidResponse("Bad JSON".to_string()).is_timeout());
    }

    #[test]
    fn test_display_messages() {
        let err = LlmError::ApiError {
            status: 401,
            message: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: bad key");

        let err = LlmError::MissingApiKey("LLM_API_KEY".to_string());
        assert!(err.to_string().contains("LLM_API_KEY"));

        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(42),
        };
        assert_eq!(err.to_string(), "Rate limited, retry after 42s");
    }
}
