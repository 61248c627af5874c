//! Error types for driver operations
//!
//! Flat on purpose. Transport problems live in [`CDPError`], everything the
//! page layer can reason about gets its own variant.

use thiserror::Error;

use crate::cdp::client::CDPError;

pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("CDP error: {0}")]
    Cdp(#[from] CDPError),

    #[error("No element matches {query}")]
    NoSuchElement { query: String },

    #[error("Script threw: {0}")]
    Script(String),

    #[error("Invalid driver response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
