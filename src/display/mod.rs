//! Display formatting for terminal output
//!
//! Plain-text tables for transactions, categories, the balance and the
//! audit log.

pub mod audit;
pub mod category;
pub mod transaction;

pub use audit::format_audit_log;
pub use category::format_category_list;
pub use transaction::{
    format_balance, format_import_summary, format_transaction_details,
    format_transaction_register,
};
