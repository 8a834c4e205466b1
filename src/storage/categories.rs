//! Category repository for JSON storage
//!
//! Manages loading and saving categories to categories.json. A title index
//! backs the uniqueness guarantee: saving a category whose title is already
//! taken returns the stored row instead of inserting a duplicate.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{TallyError, TallyResult};
use crate::models::{Category, CategoryId};

use super::file_io::{read_json, write_json_atomic};
use super::store::CategoryStore;

/// Serializable category data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    categories: RwLock<HashMap<CategoryId, Category>>,
    /// Index: exact title -> category_id
    by_title: RwLock<HashMap<String, CategoryId>>,
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            categories: RwLock::new(HashMap::new()),
            by_title: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    ///
    /// A file with two rows sharing a title is rejected rather than silently
    /// merged.
    pub fn load(&self) -> TallyResult<()> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut categories = self
            .categories
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_title = self
            .by_title
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        categories.clear();
        by_title.clear();

        for category in file_data.categories {
            if by_title.insert(category.title.clone(), category.id).is_some() {
                return Err(TallyError::Storage(format!(
                    "Duplicate category title in {}: {}",
                    self.path.display(),
                    category.title
                )));
            }
            categories.insert(category.id, category);
        }

        Ok(())
    }

    /// Flush the in-memory set to disk
    pub fn save(&self) -> TallyResult<()> {
        let categories = self
            .categories
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        self.write_file(&categories)
    }

    fn write_file(&self, categories: &HashMap<CategoryId, Category>) -> TallyResult<()> {
        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(|a, b| a.title.cmp(&b.title));

        write_json_atomic(&self.path, &CategoryData { categories: list })
    }
}

impl CategoryStore for CategoryRepository {
    fn find_by_title(&self, title: &str) -> TallyResult<Option<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_title = self
            .by_title
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(by_title
            .get(title)
            .and_then(|id| categories.get(id))
            .cloned())
    }

    fn find_by_titles(&self, titles: &[String]) -> TallyResult<Vec<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_title = self
            .by_title
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut seen = HashSet::new();
        Ok(titles
            .iter()
            .filter(|title| seen.insert(title.as_str()))
            .filter_map(|title| by_title.get(title.as_str()))
            .filter_map(|id| categories.get(id).cloned())
            .collect())
    }

    fn get(&self, id: CategoryId) -> TallyResult<Option<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(categories.get(&id).cloned())
    }

    fn get_all(&self) -> TallyResult<Vec<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(list)
    }

    fn count(&self) -> TallyResult<usize> {
        let categories = self
            .categories
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(categories.len())
    }

    fn save_category(&self, category: Category) -> TallyResult<Category> {
        let mut saved = self.save_categories(vec![category])?;
        saved
            .pop()
            .ok_or_else(|| TallyError::Storage("Category batch save returned no rows".into()))
    }

    fn save_categories(&self, batch: Vec<Category>) -> TallyResult<Vec<Category>> {
        let mut categories = self
            .categories
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_title = self
            .by_title
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let mut canonical = Vec::with_capacity(batch.len());
        let mut inserted = Vec::new();

        for category in batch {
            if let Some(existing_id) = by_title.get(&category.title) {
                if let Some(existing) = categories.get(existing_id) {
                    canonical.push(existing.clone());
                    continue;
                }
            }

            by_title.insert(category.title.clone(), category.id);
            categories.insert(category.id, category.clone());
            inserted.push(category.id);
            canonical.push(category);
        }

        if inserted.is_empty() {
            return Ok(canonical);
        }

        if let Err(e) = self.write_file(&categories) {
            for id in inserted {
                if let Some(category) = categories.remove(&id) {
                    by_title.remove(&category.title);
                }
            }
            return Err(e);
        }

        Ok(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CategoryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("categories.json");
        let repo = CategoryRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_find_by_title_is_exact() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let saved = repo.save_category(Category::new("Food")).unwrap();

        assert_eq!(repo.find_by_title("Food").unwrap(), Some(saved));
        assert!(repo.find_by_title("food").unwrap().is_none());
        assert!(repo.find_by_title("Fuel").unwrap().is_none());
    }

    #[test]
    fn test_save_existing_title_returns_stored_row() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let first = repo.save_category(Category::new("Job")).unwrap();
        let second = repo.save_category(Category::new("Job")).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_batch_save_mixes_existing_and_new() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let job = repo.save_category(Category::new("Job")).unwrap();
        let saved = repo
            .save_categories(vec![
                Category::new("Housing"),
                job.clone(),
                Category::new("Job"),
            ])
            .unwrap();

        assert_eq!(saved.len(), 3);
        assert_eq!(saved[0].title, "Housing");
        assert_eq!(saved[1].id, job.id);
        assert_eq!(saved[2].id, job.id);
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_find_by_titles_skips_unknown() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        repo.save_categories(vec![Category::new("Job"), Category::new("Housing")])
            .unwrap();

        let found = repo
            .find_by_titles(&["Job".into(), "Travel".into(), "Job".into()])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Job");
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let housing = repo.save_category(Category::new("Housing")).unwrap();

        let repo2 = CategoryRepository::new(temp_dir.path().join("categories.json"));
        repo2.load().unwrap();

        assert_eq!(repo2.count().unwrap(), 1);
        assert_eq!(repo2.get(housing.id).unwrap(), Some(housing));
    }

    #[test]
    fn test_load_rejects_duplicate_titles() {
        let (temp_dir, repo) = create_test_repo();
        let data = CategoryData {
            categories: vec![Category::new("Job"), Category::new("Job")],
        };
        write_json_atomic(temp_dir.path().join("categories.json"), &data).unwrap();

        assert!(matches!(repo.load(), Err(TallyError::Storage(_))));
    }
}
