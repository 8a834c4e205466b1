//! Audit logging system for Tally
//!
//! Every transaction and category that gets created is recorded in an
//! append-only, line-delimited JSON log next to the data files.
//!
//! - `AuditEntry`: one logged operation with a snapshot of the entity.
//! - `AuditLogger`: appends entries to the log file and reads them back.
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_cli::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(audit_log_path);
//! let entry = AuditEntry::create(
//!     EntityType::Category,
//!     category.id.to_string(),
//!     Some(category.title.clone()),
//!     &category,
//! );
//! logger.log(&entry)?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
