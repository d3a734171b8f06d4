//! Photo search errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Photo API error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Missing access key: environment variable {0} not set")]
    MissingAccessKey(String),
}
