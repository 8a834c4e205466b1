//! Category service
//!
//! Resolves category titles to stored categories, creating them on first
//! use, and summarizes what has been filed under each one.

use std::collections::{HashMap, HashSet};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::error::{TallyError, TallyResult};
use crate::models::{Balance, Category};
use crate::storage::{CategoryStore, Storage, TransactionStore};

/// Service for category resolution and listing
pub struct CategoryService<'a> {
    categories: &'a dyn CategoryStore,
    audit: Option<&'a AuditLogger>,
}

/// A category with the totals of the transactions filed under it
#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category: Category,
    pub transaction_count: usize,
    pub balance: Balance,
}

impl<'a> CategoryService<'a> {
    /// Create a service over an explicit store, without audit logging
    pub fn new(categories: &'a dyn CategoryStore) -> Self {
        Self {
            categories,
            audit: None,
        }
    }

    /// Create a service wired to the JSON storage and its audit log
    pub fn from_storage(storage: &'a Storage) -> Self {
        Self {
            categories: &storage.categories,
            audit: Some(storage.audit()),
        }
    }

    pub(crate) fn with_audit(
        categories: &'a dyn CategoryStore,
        audit: Option<&'a AuditLogger>,
    ) -> Self {
        Self { categories, audit }
    }

    /// Find a category by exact title, creating and persisting it if absent
    pub fn find_or_create(&self, title: &str) -> TallyResult<Category> {
        if let Some(category) = self.categories.find_by_title(title)? {
            return Ok(category);
        }

        let candidate = Category::new(title);
        candidate
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;
        let candidate_id = candidate.id;

        // Another writer may have claimed the title since the lookup; the
        // store hands back its row in that case.
        let category = self.categories.save_category(candidate)?;

        if category.id == candidate_id {
            self.log_created(std::slice::from_ref(&category), None)?;
        }

        Ok(category)
    }

    /// Resolve a list of distinct titles in one batch
    ///
    /// Existing categories are reused, missing ones are created, and the
    /// whole list is saved with a single write. The result is in the same
    /// order as `titles`.
    pub fn resolve_titles(
        &self,
        titles: &[String],
        origin: Option<&str>,
    ) -> TallyResult<Vec<Category>> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let existing: HashMap<String, Category> = self
            .categories
            .find_by_titles(titles)?
            .into_iter()
            .map(|c| (c.title.clone(), c))
            .collect();

        let mut fresh_ids = HashSet::new();
        let mut batch = Vec::with_capacity(titles.len());
        for title in titles {
            match existing.get(title) {
                Some(category) => batch.push(category.clone()),
                None => {
                    let category = Category::new(title.as_str());
                    category
                        .validate()
                        .map_err(|e| TallyError::Validation(e.to_string()))?;
                    fresh_ids.insert(category.id);
                    batch.push(category);
                }
            }
        }

        let saved = self.categories.save_categories(batch)?;

        let created: Vec<Category> = saved
            .iter()
            .filter(|c| fresh_ids.contains(&c.id))
            .cloned()
            .collect();
        self.log_created(&created, origin)?;

        Ok(saved)
    }

    /// All categories, sorted by title
    pub fn list(&self) -> TallyResult<Vec<Category>> {
        self.categories.get_all()
    }

    /// All categories with per-category transaction totals
    pub fn summaries(&self, transactions: &dyn TransactionStore) -> TallyResult<Vec<CategorySummary>> {
        self.list()?
            .into_iter()
            .map(|category| {
                let filed = transactions.get_by_category(category.id)?;
                Ok(CategorySummary {
                    transaction_count: filed.len(),
                    balance: Balance::from_transactions(&filed)?,
                    category,
                })
            })
            .collect()
    }

    fn log_created(&self, created: &[Category], origin: Option<&str>) -> TallyResult<()> {
        let Some(audit) = self.audit else {
            return Ok(());
        };

        let entries: Vec<AuditEntry> = created
            .iter()
            .map(|category| {
                let entry = AuditEntry::create(
                    EntityType::Category,
                    category.id.to_string(),
                    Some(category.title.clone()),
                    category,
                );
                match origin {
                    Some(origin) => entry.with_origin(origin),
                    None => entry,
                }
            })
            .collect();

        audit.log_batch(&entries)
    }
}
