//! Service layer for Tally
//!
//! The services hold the business rules (balance checks, category
//! resolution, CSV validation) and talk to persistence only through the
//! store traits in [`crate::storage::store`].

pub mod category;
pub mod import;
pub mod transaction;

pub use category::{CategoryService, CategorySummary};
pub use import::{CsvRow, CsvRowReader, ImportService};
pub use transaction::{
    CreateTransactionInput, TransactionFilter, TransactionListing, TransactionService,
    TransactionWithCategory,
};
