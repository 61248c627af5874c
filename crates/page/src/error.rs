//! Error types for page object operations
//!
//! Driver errors pass through untouched. The page layer only adds the two
//! failures it can actually diagnose: no app, and no element.

use driver::DriverError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PageError>;

#[derive(Debug, Error)]
pub enum PageError {
    #[error(
        "Unable to find application root via `{id_query}` or `{class_query}`, \
         did you start your local server?"
    )]
    RootNotFound {
        id_query: String,
        class_query: String,
    },

    #[error("Element not found: {query}")]
    ElementNotFound { query: String },

    #[error("Filter link {position} requested but only {available} rendered")]
    FilterLinkMissing { position: usize, available: usize },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Driver(#[from] DriverError),
}
