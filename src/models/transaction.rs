//! Transaction model
//!
//! A transaction moves money in (`income`) or out (`outcome`). Values are
//! always stored as positive amounts; the direction lives in
//! [`TransactionType`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CategoryId, TransactionId};
use super::money::Money;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    Income,
    /// Money going out
    Outcome,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Outcome => "outcome",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    /// Exact, case-sensitive match on `income` / `outcome`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "outcome" => Ok(Self::Outcome),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

/// Returned when a string is neither `income` nor `outcome`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTransactionType(pub String);

impl fmt::Display for UnknownTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown transaction type '{}' (expected income or outcome)",
            self.0
        )
    }
}

impl std::error::Error for UnknownTransactionType {}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Short description, e.g. "Salary"
    pub title: String,

    /// Positive amount
    pub value: Money,

    /// Income or outcome
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// The category this transaction is filed under
    pub category_id: CategoryId,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new, not yet persisted transaction
    pub fn new(
        title: impl Into<String>,
        value: Money,
        kind: TransactionType,
        category_id: CategoryId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            title: title.into(),
            value,
            kind,
            category_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_outcome(&self) -> bool {
        self.kind == TransactionType::Outcome
    }

    /// Value with its direction applied (outcomes are negative)
    pub fn signed_value(&self) -> Money {
        match self.kind {
            TransactionType::Income => self.value,
            TransactionType::Outcome => Money::zero() - self.value,
        }
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.title.trim().is_empty() {
            return Err(TransactionValidationError::EmptyTitle);
        }

        if !self.value.is_positive() {
            return Err(TransactionValidationError::NonPositiveValue(self.value));
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.title, self.signed_value(), self.kind)
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    EmptyTitle,
    NonPositiveValue(Money),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Transaction title cannot be empty"),
            Self::NonPositiveValue(value) => {
                write!(f, "Transaction value must be positive, got {}", value)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parsing_is_exact() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("outcome".parse(), Ok(TransactionType::Outcome));
        assert!("Income".parse::<TransactionType>().is_err());
        assert_eq!(
            "transfer".parse::<TransactionType>(),
            Err(UnknownTransactionType("transfer".into()))
        );
    }

    #[test]
    fn test_signed_value() {
        let category = CategoryId::new();
        let salary = Transaction::new("Salary", Money::from_units(5000), TransactionType::Income, category);
        let rent = Transaction::new("Rent", Money::from_units(1200), TransactionType::Outcome, category);

        assert!(salary.is_income());
        assert!(rent.is_outcome());
        assert_eq!(salary.signed_value(), Money::from_units(5000));
        assert_eq!(rent.signed_value(), Money::from_cents(-120000));
    }

    #[test]
    fn test_validation() {
        let category = CategoryId::new();
        let ok = Transaction::new("Coffee", Money::from_cents(350), TransactionType::Outcome, category);
        assert!(ok.validate().is_ok());

        let untitled = Transaction::new(" ", Money::from_cents(350), TransactionType::Outcome, category);
        assert_eq!(untitled.validate(), Err(TransactionValidationError::EmptyTitle));

        let zero = Transaction::new("Coffee", Money::zero(), TransactionType::Outcome, category);
        assert_eq!(
            zero.validate(),
            Err(TransactionValidationError::NonPositiveValue(Money::zero()))
        );
    }

    #[test]
    fn test_serializes_type_field() {
        let txn = Transaction::new("Salary", Money::from_units(1), TransactionType::Income, CategoryId::new());
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["type"], "income");
        assert_eq!(json["value"], 100);

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, txn);
    }
}
