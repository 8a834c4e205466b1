//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{TallyError, TallyResult};
use crate::models::{Balance, CategoryId, Money, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::store::TransactionStore;

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence with a per-category index
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: category_id -> transaction_ids
    by_category: RwLock<HashMap<CategoryId, Vec<TransactionId>>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_category: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build the index
    pub fn load(&self) -> TallyResult<()> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_category = self
            .by_category
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_category.clear();

        for txn in file_data.transactions {
            by_category.entry(txn.category_id).or_default().push(txn.id);
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Flush the in-memory set to disk
    pub fn save(&self) -> TallyResult<()> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        self.write_file(&data)
    }

    fn write_file(&self, data: &HashMap<TransactionId, Transaction>) -> TallyResult<()> {
        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });

        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// Insert a batch into `data`, write the file, and only then index it.
    /// On a failed write the in-memory set is restored.
    fn insert_and_persist(
        &self,
        data: &mut HashMap<TransactionId, Transaction>,
        txns: &[Transaction],
    ) -> TallyResult<()> {
        let mut previous = Vec::with_capacity(txns.len());
        for txn in txns {
            previous.push((txn.id, data.insert(txn.id, txn.clone())));
        }

        if let Err(e) = self.write_file(data) {
            for (id, old) in previous.into_iter().rev() {
                match old {
                    Some(old) => {
                        data.insert(id, old);
                    }
                    None => {
                        data.remove(&id);
                    }
                }
            }
            return Err(e);
        }

        let mut by_category = self
            .by_category
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        for (txn, (_, old)) in txns.iter().zip(previous) {
            if let Some(old) = old {
                if let Some(ids) = by_category.get_mut(&old.category_id) {
                    ids.retain(|&id| id != old.id);
                }
            }
            by_category.entry(txn.category_id).or_default().push(txn.id);
        }

        Ok(())
    }
}

fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl TransactionStore for TransactionRepository {
    fn balance(&self) -> TallyResult<Balance> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(Balance::from_transactions(data.values())?)
    }

    fn get(&self, id: TransactionId) -> TallyResult<Option<Transaction>> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    fn get_all(&self) -> TallyResult<Vec<Transaction>> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    fn get_by_category(&self, category_id: CategoryId) -> TallyResult<Vec<Transaction>> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_category = self
            .by_category
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let ids = by_category
            .get(&category_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut transactions: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        sort_newest_first(&mut transactions);
        Ok(transactions)
    }

    fn count(&self) -> TallyResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }

    fn save_transaction(&self, txn: &Transaction) -> TallyResult<()> {
        self.save_transactions(std::slice::from_ref(txn))
    }

    fn save_outcome_within_balance(
        &self,
        value: Money,
        build: &mut dyn FnMut() -> TallyResult<Transaction>,
    ) -> TallyResult<Transaction> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let balance = Balance::from_transactions(data.values())?;
        if !balance.covers(value) {
            return Err(TallyError::InsufficientFunds {
                needed: value,
                available: balance.total,
            });
        }

        let txn = build()?;
        self.insert_and_persist(&mut data, std::slice::from_ref(&txn))?;
        Ok(txn)
    }

    fn save_transactions(&self, txns: &[Transaction]) -> TallyResult<()> {
        if txns.is_empty() {
            return Ok(());
        }

        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        self.insert_and_persist(&mut data, txns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, TransactionType};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let repo = TransactionRepository::new(path);
        (temp_dir, repo)
    }

    fn income(units: i64, category: CategoryId) -> Transaction {
        Transaction::new("Salary", Money::from_units(units), TransactionType::Income, category)
    }

    fn outcome(units: i64, category: CategoryId) -> Transaction {
        Transaction::new("Rent", Money::from_units(units), TransactionType::Outcome, category)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert_eq!(repo.balance().unwrap(), Balance::default());
    }

    #[test]
    fn test_save_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let txn = income(10, CategoryId::new());
        repo.save_transaction(&txn).unwrap();

        let retrieved = repo.get(txn.id).unwrap().unwrap();
        assert_eq!(retrieved, txn);
    }

    #[test]
    fn test_save_writes_through_to_disk() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let cat = CategoryId::new();
        let batch = vec![income(5000, cat), outcome(1200, cat)];
        repo.save_transactions(&batch).unwrap();

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 2);
        assert_eq!(repo2.balance().unwrap().total, Money::from_units(3800));
    }

    #[test]
    fn test_get_by_category() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let job = CategoryId::new();
        let housing = CategoryId::new();
        repo.save_transactions(&[income(1, job), income(2, job), outcome(1, housing)])
            .unwrap();

        assert_eq!(repo.get_by_category(job).unwrap().len(), 2);
        assert_eq!(repo.get_by_category(housing).unwrap().len(), 1);
        assert!(repo.get_by_category(CategoryId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_within_balance_rejects_overdraft() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let cat = CategoryId::new();
        repo.save_transaction(&income(100, cat)).unwrap();

        let mut built = 0;
        let err = repo
            .save_outcome_within_balance(Money::from_units(101), &mut || {
                built += 1;
                Ok(outcome(101, cat))
            })
            .unwrap_err();
        assert!(matches!(
            err,
            TallyError::InsufficientFunds { needed, available }
                if needed == Money::from_units(101) && available == Money::from_units(100)
        ));
        assert_eq!(built, 0);
        assert_eq!(repo.count().unwrap(), 1);

        let saved = repo
            .save_outcome_within_balance(Money::from_units(100), &mut || Ok(outcome(100, cat)))
            .unwrap();
        assert_eq!(repo.get(saved.id).unwrap(), Some(saved));
        assert_eq!(repo.balance().unwrap().total, Money::zero());
    }

    #[test]
    fn test_within_balance_build_error_writes_nothing() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        repo.save_transaction(&income(100, CategoryId::new())).unwrap();

        let err = repo
            .save_outcome_within_balance(Money::from_units(1), &mut || {
                Err(TallyError::Validation("bad category".into()))
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_overflowing_store_reports_storage_error() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let cat = CategoryId::new();
        let big = Money::from_cents(i64::MAX - 1);
        repo.save_transactions(&[
            Transaction::new("A", big, TransactionType::Income, cat),
            Transaction::new("B", big, TransactionType::Income, cat),
        ])
        .unwrap();

        assert!(matches!(repo.balance(), Err(TallyError::Storage(_))));
        let err = repo
            .save_outcome_within_balance(Money::from_units(1), &mut || Ok(outcome(1, cat)))
            .unwrap_err();
        assert!(matches!(err, TallyError::Storage(_)));
    }

    #[test]
    fn test_failed_write_leaves_memory_untouched() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail
        let path = temp_dir.path().join("transactions.json");
        std::fs::create_dir_all(path.join("blocker")).unwrap();
        let repo = TransactionRepository::new(path);

        let err = repo.save_transaction(&income(1, CategoryId::new()));
        assert!(err.is_err());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
