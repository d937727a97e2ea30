//! Error types for the adoption pipeline.

use thiserror::Error;

/// The unified error type for the `user_adoption` crate.
#[derive(Debug, Error)]
pub enum AdoptionError {
    /// A timestamp or date cell could not be interpreted.
    #[error("cannot parse {value:?} at row {row}")]
    Parse {
        /// Zero-based row index in the stage's input.
        row: usize,
        /// The offending text.
        value: String,
    },

    /// An expected field is missing or carries the wrong kind of value.
    #[error("schema error: {0}")]
    Schema(String),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// An error from the Polars library.
    #[error("dataframe operation failed")]
    Frame(#[from] polars::prelude::PolarsError),
}

impl AdoptionError {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }
}

/// Result type for adoption operations.
pub type Result<T> = std::result::Result<T, AdoptionError>;
