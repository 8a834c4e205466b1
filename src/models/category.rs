//! Category model
//!
//! A category is just a unique title that transactions are filed under.
//! Categories are created the first time a title is used and are never
//! renamed or removed afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;

/// A transaction category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Category title, unique across the store (exact match)
    pub title: String,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last modified
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new, not yet persisted category
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            title: title.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.title.trim().is_empty() {
            return Err(CategoryValidationError::EmptyTitle);
        }

        if self.title.len() > MAX_TITLE_LEN {
            return Err(CategoryValidationError::TitleTooLong(self.title.len()));
        }

        Ok(())
    }
}

const MAX_TITLE_LEN: usize = 100;

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyTitle,
    TitleTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Category title cannot be empty"),
            Self::TitleTooLong(len) => write!(
                f,
                "Category title too long ({} chars, max {})",
                len, MAX_TITLE_LEN
            ),
        }
    }
}

impl std::error::Error for CategoryValidationError {}
