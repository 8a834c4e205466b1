//! Custom error types for Tally
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::{BalanceOverflow, Money};

/// The main error type for Tally operations
#[derive(Error, Debug)]
pub enum TallyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV reader errors that are not tied to a row's content
    #[error("CSV error: {0}")]
    Csv(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// An outcome would take the balance below zero
    #[error("You don't have enough money to complete this transaction (need {needed}, have {available})")]
    InsufficientFunds { needed: Money, available: Money },

    /// A CSV row is missing a field or has one that cannot be parsed
    #[error("Invalid format of the csv at row {row}: {reason}")]
    InvalidFormat { row: usize, reason: String },

    /// A CSV row has a type other than income/outcome
    #[error("Wrong type value at row {row}: '{value}'")]
    InvalidType { row: usize, value: String },

    /// Import errors that are not about a row (missing file, etc.)
    #[error("Import error: {0}")]
    Import(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TallyError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<BalanceOverflow> for TallyError {
    fn from(err: BalanceOverflow) -> Self {
        Self::Storage(format!("Stored transactions do not fit in a balance: {}", err))
    }
}

impl From<csv::Error> for TallyError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for Tally operations
pub type TallyResult<T> = Result<T, TallyError>;
