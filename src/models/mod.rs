//! Core data models for Tally
//!
//! Transactions, the categories they are filed under, and the derived
//! balance.

pub mod balance;
pub mod category;
pub mod ids;
pub mod money;
pub mod transaction;

pub use balance::{Balance, BalanceOverflow};
pub use category::Category;
pub use ids::{CategoryId, TransactionId};
pub use money::{Money, MoneyParseError};
pub use transaction::{Transaction, TransactionType, UnknownTransactionType};
