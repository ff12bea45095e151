//! Error types for the analytics core.
//!
//! Schema and range problems are caller errors: they are returned immediately
//! and never retried. An empty filtered dataset is not an error at all.

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

/// What is wrong with a required column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaProblem {
    #[error("is missing")]
    Missing,
    #[error("has type {found}, expected {expected}")]
    WrongType { expected: &'static str, found: String },
}

#[derive(Debug, Error)]
pub enum Error {
    /// A required column is absent or has an unusable type.
    #[error("schema error: column `{column}` {problem}")]
    Schema {
        column: String,
        problem: SchemaProblem,
    },

    /// The requested date range starts after it ends.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing_column(column: &str) -> Self {
        Self::Schema {
            column: column.to_string(),
            problem: SchemaProblem::Missing,
        }
    }

    pub(crate) fn wrong_type(column: &str, expected: &'static str, found: impl ToString) -> Self {
        Self::Schema {
            column: column.to_string(),
            problem: SchemaProblem::WrongType {
                expected,
                found: found.to_string(),
            },
        }
    }

    /// Name of the offending column for schema errors.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Schema { column, .. } => Some(column),
            _ => None,
        }
    }
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;
