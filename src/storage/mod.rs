//! Storage layer for Tally
//!
//! Provides JSON file storage with atomic writes, the store traits the
//! services depend on, and the audit hook every create goes through.

pub mod categories;
pub mod file_io;
pub mod store;
pub mod transactions;

pub use categories::CategoryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use store::{CategoryStore, TransactionStore};
pub use transactions::TransactionRepository;

use crate::audit::AuditLogger;
use crate::config::paths::TallyPaths;
use crate::error::TallyError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TallyPaths,
    pub transactions: TransactionRepository,
    pub categories: CategoryRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: TallyPaths) -> Result<Self, TallyError> {
        paths.ensure_directories()?;

        Ok(Self {
            transactions: TransactionRepository::new(paths.transactions_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &TallyPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), TallyError> {
        self.transactions.load()?;
        self.categories.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), TallyError> {
        self.transactions.save()?;
        self.categories.save()?;
        Ok(())
    }
}
