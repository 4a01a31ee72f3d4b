//! Error types for dialstat-core

use crate::types::Column;
use thiserror::Error;

/// Main error type for the dialstat-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Required input columns are absent for the requested view
    #[error("missing required column(s) for {context}: {}", column_list(.missing))]
    Schema {
        context: String,
        missing: Vec<Column>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// View name not recognized
    #[error("unknown view: {0}")]
    UnknownView(String),

    /// Invalid sort, subset or dimension argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Whether this error is a missing-column failure.
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema { .. })
    }
}

fn column_list(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| format!("'{}'", c.header()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for dialstat-core
pub type Result<T> = std::result::Result<T, Error>;
