//! Transaction service
//!
//! Creates single transactions (balance check, category resolution,
//! persistence) and lists them together with the current balance.

use crate::audit::{AuditLogger, EntityType, AuditEntry};
use crate::error::{TallyError, TallyResult};
use crate::models::{Balance, Category, Money, Transaction, TransactionType};
use crate::storage::{CategoryStore, Storage, TransactionStore};

use super::category::CategoryService;

/// Service for transaction management
pub struct TransactionService<'a> {
    transactions: &'a dyn TransactionStore,
    categories: &'a dyn CategoryStore,
    audit: Option<&'a AuditLogger>,
    allow_overdraft: bool,
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub title: String,
    pub value: Money,
    pub kind: TransactionType,
    pub category_title: String,
}

/// A transaction together with the category it is filed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionWithCategory {
    pub transaction: Transaction,
    pub category: Category,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only transactions filed under this category title
    pub category_title: Option<String>,
    /// Only incomes or only outcomes
    pub kind: Option<TransactionType>,
    /// Maximum number of transactions to return
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, title: impl Into<String>) -> Self {
        self.category_title = Some(title.into());
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A page of transactions plus the balance over the whole store
#[derive(Debug, Clone)]
pub struct TransactionListing {
    pub transactions: Vec<TransactionWithCategory>,
    pub balance: Balance,
}

impl<'a> TransactionService<'a> {
    /// Create a service over explicit stores, without audit logging
    pub fn new(transactions: &'a dyn TransactionStore, categories: &'a dyn CategoryStore) -> Self {
        Self {
            transactions,
            categories,
            audit: None,
            allow_overdraft: false,
        }
    }

    /// Create a service wired to the JSON storage and its audit log
    pub fn from_storage(storage: &'a Storage) -> Self {
        Self {
            transactions: &storage.transactions,
            categories: &storage.categories,
            audit: Some(storage.audit()),
            allow_overdraft: false,
        }
    }

    /// Let outcomes take the balance below zero
    pub fn with_overdraft(mut self, allow: bool) -> Self {
        self.allow_overdraft = allow;
        self
    }

    /// Create a new transaction
    ///
    /// Outcomes larger than the current balance total fail with
    /// [`TallyError::InsufficientFunds`] and write nothing, not even a new
    /// category. The category is looked up by exact title and created if it
    /// does not exist yet.
    pub fn create(&self, input: CreateTransactionInput) -> TallyResult<TransactionWithCategory> {
        let title = input.title.trim();
        let category_title = input.category_title.trim();

        if title.is_empty() {
            return Err(TallyError::Validation(
                "Transaction title cannot be empty".into(),
            ));
        }
        if category_title.is_empty() {
            return Err(TallyError::Validation(
                "Category title cannot be empty".into(),
            ));
        }
        if !input.value.is_positive() {
            return Err(TallyError::Validation(format!(
                "Transaction value must be positive, got {}",
                input.value
            )));
        }
        if input.value > Money::MAX_VALUE {
            return Err(TallyError::Validation(format!(
                "Transaction value must not exceed {}, got {}",
                Money::MAX_VALUE,
                input.value
            )));
        }

        let categories = CategoryService::with_audit(self.categories, self.audit);
        let mut filed_under = None;
        let mut build = || -> TallyResult<Transaction> {
            let category = categories.find_or_create(category_title)?;
            let txn = Transaction::new(title, input.value, input.kind, category.id);
            txn.validate()
                .map_err(|e| TallyError::Validation(e.to_string()))?;
            filed_under = Some(category);
            Ok(txn)
        };

        let txn = if input.kind == TransactionType::Outcome && !self.allow_overdraft {
            // The category is only created once the balance check has passed
            self.transactions
                .save_outcome_within_balance(input.value, &mut build)?
        } else {
            let txn = build()?;
            self.transactions.save_transaction(&txn)?;
            txn
        };

        let category = filed_under.ok_or_else(|| {
            TallyError::Storage(format!("Transaction {} was saved without a category", txn.id))
        })?;

        if let Some(audit) = self.audit {
            audit.log(&AuditEntry::create(
                EntityType::Transaction,
                txn.id.to_string(),
                Some(txn.title.clone()),
                &txn,
            ))?;
        }

        Ok(TransactionWithCategory {
            transaction: txn,
            category,
        })
    }

    /// Current balance over all transactions
    pub fn balance(&self) -> TallyResult<Balance> {
        self.transactions.balance()
    }

    /// List transactions (newest first) with their categories
    pub fn list(&self, filter: TransactionFilter) -> TallyResult<Vec<TransactionWithCategory>> {
        let mut transactions = match &filter.category_title {
            Some(title) => {
                let category = self
                    .categories
                    .find_by_title(title)?
                    .ok_or_else(|| TallyError::category_not_found(title.as_str()))?;
                self.transactions.get_by_category(category.id)?
            }
            None => self.transactions.get_all()?,
        };

        if let Some(kind) = filter.kind {
            transactions.retain(|t| t.kind == kind);
        }

        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }

        transactions
            .into_iter()
            .map(|transaction| {
                let category = self
                    .categories
                    .get(transaction.category_id)?
                    .ok_or_else(|| TallyError::category_not_found(transaction.category_id.to_string()))?;
                Ok(TransactionWithCategory {
                    transaction,
                    category,
                })
            })
            .collect()
    }

    /// List transactions together with the overall balance
    pub fn list_with_balance(&self, filter: TransactionFilter) -> TallyResult<TransactionListing> {
        Ok(TransactionListing {
            transactions: self.list(filter)?,
            balance: self.balance()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TallyPaths;
    use crate::models::{CategoryId, TransactionId};
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn input(title: &str, units: i64, kind: TransactionType, category: &str) -> CreateTransactionInput {
        CreateTransactionInput {
            title: title.into(),
            value: Money::from_units(units),
            kind,
            category_title: category.into(),
        }
    }

    #[test]
    fn test_create_income_creates_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::from_storage(&storage);

        let created = service
            .create(input("Salary", 5000, TransactionType::Income, "Job"))
            .unwrap();

        assert_eq!(created.transaction.title, "Salary");
        assert_eq!(created.category.title, "Job");
        assert_eq!(created.transaction.category_id, created.category.id);
        assert_eq!(storage.transactions.count().unwrap(), 1);
        assert_eq!(storage.categories.count().unwrap(), 1);
        assert_eq!(service.balance().unwrap().total, Money::from_units(5000));
    }

    #[test]
    fn test_second_create_reuses_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::from_storage(&storage);

        let first = service
            .create(input("Salary", 5000, TransactionType::Income, "Job"))
            .unwrap();
        let second = service
            .create(input("Bonus", 500, TransactionType::Income, "Job"))
            .unwrap();

        assert_eq!(first.category.id, second.category.id);
        assert_eq!(storage.categories.count().unwrap(), 1);
    }

    #[test]
    fn test_outcome_over_balance_has_no_side_effects() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::from_storage(&storage);

        service
            .create(input("Salary", 100, TransactionType::Income, "Job"))
            .unwrap();

        let err = service
            .create(input("Laptop", 101, TransactionType::Outcome, "Electronics"))
            .unwrap_err();

        assert!(matches!(err, TallyError::InsufficientFunds { .. }));
        assert_eq!(storage.transactions.count().unwrap(), 1);
        assert_eq!(storage.categories.count().unwrap(), 1);
        assert!(storage
            .categories
            .find_by_title("Electronics")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_outcome_equal_to_balance_is_allowed() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::from_storage(&storage);

        service
            .create(input("Salary", 100, TransactionType::Income, "Job"))
            .unwrap();
        service
            .create(input("Rent", 100, TransactionType::Outcome, "Housing"))
            .unwrap();

        assert_eq!(service.balance().unwrap().total, Money::zero());
    }

    #[test]
    fn test_overdraft_setting_skips_balance_check() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::from_storage(&storage).with_overdraft(true);

        service
            .create(input("Rent", 1200, TransactionType::Outcome, "Housing"))
            .unwrap();

        assert_eq!(service.balance().unwrap().total, Money::zero() - Money::from_units(1200));
    }

    #[test]
    fn test_rejects_invalid_input() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::from_storage(&storage);

        assert!(service
            .create(input("  ", 1, TransactionType::Income, "Job"))
            .unwrap_err()
            .is_validation());
        assert!(service
            .create(input("Salary", 1, TransactionType::Income, ""))
            .unwrap_err()
            .is_validation());
        assert!(service
            .create(input("Salary", 0, TransactionType::Income, "Job"))
            .unwrap_err()
            .is_validation());
        assert_eq!(storage.categories.count().unwrap(), 0);
    }

    #[test]
    fn test_create_is_audited() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::from_storage(&storage);

        service
            .create(input("Salary", 10, TransactionType::Income, "Job"))
            .unwrap();

        let log = storage.audit().read_all().unwrap();
        let types: Vec<_> = log.iter().map(|e| e.entity_type).collect();
        assert_eq!(types, vec![EntityType::Category, EntityType::Transaction]);
    }

    #[test]
    fn test_list_with_filters() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::from_storage(&storage);

        service
            .create(input("Salary", 5000, TransactionType::Income, "Job"))
            .unwrap();
        service
            .create(input("Rent", 1200, TransactionType::Outcome, "Housing"))
            .unwrap();
        service
            .create(input("Repairs", 300, TransactionType::Outcome, "Housing"))
            .unwrap();

        let listing = service.list_with_balance(TransactionFilter::new()).unwrap();
        assert_eq!(listing.transactions.len(), 3);
        assert_eq!(listing.balance.total, Money::from_units(3500));

        let housing = service
            .list(TransactionFilter::new().category("Housing"))
            .unwrap();
        assert_eq!(housing.len(), 2);
        assert!(housing.iter().all(|t| t.category.title == "Housing"));

        let incomes = service
            .list(TransactionFilter::new().kind(TransactionType::Income))
            .unwrap();
        assert_eq!(incomes.len(), 1);

        assert_eq!(service.list(TransactionFilter::new().limit(1)).unwrap().len(), 1);

        let err = service
            .list(TransactionFilter::new().category("Travel"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    /// Store that refuses every outcome at insert time, whatever its
    /// `balance` reports.
    struct RefusingStore {
        saved: RefCell<Vec<Transaction>>,
    }

    impl TransactionStore for RefusingStore {
        fn balance(&self) -> TallyResult<Balance> {
            Ok(Balance {
                income: Money::from_units(100),
                outcome: Money::zero(),
                total: Money::from_units(100),
            })
        }
        fn get(&self, _id: TransactionId) -> TallyResult<Option<Transaction>> {
            Ok(None)
        }
        fn get_all(&self) -> TallyResult<Vec<Transaction>> {
            Ok(self.saved.borrow().clone())
        }
        fn get_by_category(&self, _id: CategoryId) -> TallyResult<Vec<Transaction>> {
            Ok(Vec::new())
        }
        fn count(&self) -> TallyResult<usize> {
            Ok(self.saved.borrow().len())
        }
        fn save_transaction(&self, txn: &Transaction) -> TallyResult<()> {
            self.saved.borrow_mut().push(txn.clone());
            Ok(())
        }
        fn save_outcome_within_balance(
            &self,
            value: Money,
            _build: &mut dyn FnMut() -> TallyResult<Transaction>,
        ) -> TallyResult<Transaction> {
            Err(TallyError::InsufficientFunds {
                needed: value,
                available: Money::zero(),
            })
        }
        fn save_transactions(&self, txns: &[Transaction]) -> TallyResult<()> {
            self.saved.borrow_mut().extend_from_slice(txns);
            Ok(())
        }
    }

    #[test]
    fn test_insert_time_refusal_leaves_no_category() {
        let (_temp_dir, storage) = create_test_storage();
        let refusing = RefusingStore {
            saved: RefCell::new(Vec::new()),
        };
        let service = TransactionService::new(&refusing, &storage.categories);

        let err = service
            .create(input("Rent", 50, TransactionType::Outcome, "Housing"))
            .unwrap_err();

        assert!(matches!(err, TallyError::InsufficientFunds { .. }));
        assert!(refusing.saved.borrow().is_empty());
        assert_eq!(storage.categories.count().unwrap(), 0);
    }

    #[test]
    fn test_rejects_value_above_cap() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::from_storage(&storage);

        let err = service
            .create(CreateTransactionInput {
                title: "Lottery".into(),
                value: Money::from_cents(i64::MAX),
                kind: TransactionType::Income,
                category_title: "Luck".into(),
            })
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(storage.categories.count().unwrap(), 0);
        assert_eq!(service.balance().unwrap(), Balance::default());
    }
}
