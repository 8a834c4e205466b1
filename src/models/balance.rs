//! Balance aggregate
//!
//! Derived on demand from the transaction list and never persisted.

use serde::Serialize;
use std::fmt;

use super::money::Money;
use super::transaction::{Transaction, TransactionType};

/// Sum of incomes, sum of outcomes and their difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Balance {
    pub income: Money,
    pub outcome: Money,
    pub total: Money,
}

impl Balance {
    /// Fold a set of transactions into a balance
    ///
    /// Fails instead of wrapping when a sum leaves the `i64` cent range.
    pub fn from_transactions<'a, I>(transactions: I) -> Result<Self, BalanceOverflow>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut income = Money::zero();
        let mut outcome = Money::zero();

        for txn in transactions {
            let sum = match txn.kind {
                TransactionType::Income => &mut income,
                TransactionType::Outcome => &mut outcome,
            };
            *sum = sum.checked_add(txn.value).ok_or(BalanceOverflow)?;
        }

        Ok(Self {
            income,
            outcome,
            total: income.checked_sub(outcome).ok_or(BalanceOverflow)?,
        })
    }

    /// Whether an outcome of `value` fits in the current total
    pub fn covers(&self, value: Money) -> bool {
        self.total >= value
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "income {} / outcome {} / total {}",
            self.income, self.outcome, self.total
        )
    }
}

/// Returned when transaction values sum past what a balance can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceOverflow;

impl fmt::Display for BalanceOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("balance out of range")
    }
}

impl std::error::Error for BalanceOverflow {}
