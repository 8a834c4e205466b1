//! Store traits the services are written against
//!
//! The services never reach for a global repository; they are handed a
//! `&dyn TransactionStore` and a `&dyn CategoryStore`. The JSON-backed
//! repositories in this module's siblings are the production
//! implementations.
//!
//! "Save" always means persisted: when a save returns `Ok`, the rows are on
//! disk (or wherever the implementation keeps them).

use crate::error::TallyResult;
use crate::models::{Balance, Category, CategoryId, Money, Transaction, TransactionId};

/// Persistence and aggregation for transactions
pub trait TransactionStore {
    /// Current income/outcome/total over every stored transaction
    fn balance(&self) -> TallyResult<Balance>;

    fn get(&self, id: TransactionId) -> TallyResult<Option<Transaction>>;

    /// All transactions, newest first
    fn get_all(&self) -> TallyResult<Vec<Transaction>>;

    /// Transactions filed under one category, newest first
    fn get_by_category(&self, category_id: CategoryId) -> TallyResult<Vec<Transaction>>;

    fn count(&self) -> TallyResult<usize>;

    /// Persist a single transaction
    fn save_transaction(&self, txn: &Transaction) -> TallyResult<()>;

    /// Persist an outcome only if the current total covers `value`
    ///
    /// The balance check, the call to `build` and the insert happen in one
    /// critical section. When the total does not cover `value` the call
    /// fails with `InsufficientFunds` and `build` is never run, so nothing
    /// it would have written (a new category, say) exists. `build` must not
    /// call back into this store.
    fn save_outcome_within_balance(
        &self,
        value: Money,
        build: &mut dyn FnMut() -> TallyResult<Transaction>,
    ) -> TallyResult<Transaction>;

    /// Persist a batch of transactions in one write
    fn save_transactions(&self, txns: &[Transaction]) -> TallyResult<()>;
}

/// Lookup and persistence for categories
///
/// Titles are unique. Both save methods are upserts keyed on title: if a
/// category with the same title is already stored, the stored row wins and
/// is returned in place of the one passed in.
pub trait CategoryStore {
    /// Exact, case-sensitive title lookup
    fn find_by_title(&self, title: &str) -> TallyResult<Option<Category>>;

    /// Every stored category whose title is in `titles` (no particular order)
    fn find_by_titles(&self, titles: &[String]) -> TallyResult<Vec<Category>>;

    fn get(&self, id: CategoryId) -> TallyResult<Option<Category>>;

    /// All categories, sorted by title
    fn get_all(&self) -> TallyResult<Vec<Category>>;

    fn count(&self) -> TallyResult<usize>;

    /// Persist one category, returning the canonical stored row
    fn save_category(&self, category: Category) -> TallyResult<Category>;

    /// Persist a batch in one write, returning canonical rows in input order
    fn save_categories(&self, categories: Vec<Category>) -> TallyResult<Vec<Category>>;
}
