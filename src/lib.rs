//! Tally - a small personal finance tracker
//!
//! Tally records incomes and outcomes filed under categories, refuses
//! outcomes the current balance cannot cover, and bulk-imports transactions
//! from CSV files.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (transactions, categories, money)
//! - `storage`: JSON file storage behind the store traits
//! - `services`: Transaction creation, CSV import, category resolution
//! - `audit`: Audit logging system
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `tally` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_cli::config::paths::TallyPaths;
//! use tally_cli::models::{Money, TransactionType};
//! use tally_cli::services::{CreateTransactionInput, TransactionService};
//! use tally_cli::storage::Storage;
//!
//! let paths = TallyPaths::new()?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let service = TransactionService::from_storage(&storage);
//! service.create(CreateTransactionInput {
//!     title: "Salary".into(),
//!     value: Money::from_units(5000),
//!     kind: TransactionType::Income,
//!     category_title: "Job".into(),
//! })?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::TallyError;
