//! CSV Import service
//!
//! Imports transactions from a `title,type,value,category` CSV file. Every
//! row is validated before anything is written; categories are resolved in a
//! single batch and the transactions are saved with one write.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::Settings;
use crate::error::{TallyError, TallyResult};
use crate::models::{Category, Money, Transaction, TransactionType};
use crate::storage::{CategoryStore, Storage, TransactionStore};

use super::category::CategoryService;
use super::transaction::TransactionWithCategory;

/// Number of columns every data row must have
pub const COLUMN_COUNT: usize = 4;

/// A data row that passed the format checks
///
/// The type is kept as written so that type errors can be reported after the
/// whole file has been checked for format errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// Line number in the file (the header is line 1)
    pub row: usize,
    pub title: String,
    pub kind: String,
    pub value: Money,
    pub category_title: String,
}

/// Lazy reader over the data rows of an import file
///
/// Yields one `CsvRow` per record, skipping the header. Rows with a wrong
/// field count, an empty field or an unusable value come out as
/// [`TallyError::InvalidFormat`].
pub struct CsvRowReader<R: Read> {
    records: StringRecordsIntoIter<R>,
}

impl<R: Read> CsvRowReader<R> {
    pub fn from_reader(reader: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        Self {
            records: reader.into_records(),
        }
    }
}

impl CsvRowReader<File> {
    pub fn from_path(path: &Path) -> TallyResult<Self> {
        let file = File::open(path).map_err(|e| {
            TallyError::Import(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> Iterator for CsvRowReader<R> {
    type Item = TallyResult<CsvRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        Some(parse_record(&record))
    }
}

fn parse_record(record: &StringRecord) -> TallyResult<CsvRow> {
    let row = record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or_default();

    if record.len() != COLUMN_COUNT {
        return Err(TallyError::InvalidFormat {
            row,
            reason: format!("expected {} fields, found {}", COLUMN_COUNT, record.len()),
        });
    }

    let field = |index: usize, name: &str| -> TallyResult<String> {
        match record.get(index) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(TallyError::InvalidFormat {
                row,
                reason: format!("missing {}", name),
            }),
        }
    };

    let title = field(0, "title")?;
    let kind = field(1, "type")?;
    let raw_value = field(2, "value")?;
    let category_title = field(3, "category")?;

    let value = Money::parse(&raw_value).map_err(|e| TallyError::InvalidFormat {
        row,
        reason: e.to_string(),
    })?;

    let parsed = CsvRow {
        row,
        title,
        kind,
        value,
        category_title,
    };
    check_format(&parsed)?;
    Ok(parsed)
}

/// Field checks shared by rows from the reader and rows handed in directly
fn check_format(row: &CsvRow) -> TallyResult<()> {
    let invalid = |reason: String| TallyError::InvalidFormat {
        row: row.row,
        reason,
    };

    if row.title.trim().is_empty() {
        return Err(invalid("missing title".into()));
    }
    if row.category_title.trim().is_empty() {
        return Err(invalid("missing category".into()));
    }
    if !row.value.is_positive() {
        return Err(invalid(format!("value must be positive, got {}", row.value)));
    }
    if row.value > Money::MAX_VALUE {
        return Err(invalid(format!(
            "value must not exceed {}, got {}",
            Money::MAX_VALUE,
            row.value
        )));
    }
    Ok(())
}

/// Service for CSV import
pub struct ImportService<'a> {
    transactions: &'a dyn TransactionStore,
    categories: &'a dyn CategoryStore,
    audit: Option<&'a AuditLogger>,
    uploads_dir: Option<PathBuf>,
}

impl<'a> ImportService<'a> {
    /// Create a service over explicit stores, without audit logging
    pub fn new(transactions: &'a dyn TransactionStore, categories: &'a dyn CategoryStore) -> Self {
        Self {
            transactions,
            categories,
            audit: None,
            uploads_dir: None,
        }
    }

    /// Create a service wired to the JSON storage, its audit log and the
    /// configured uploads directory
    pub fn from_storage(storage: &'a Storage, settings: &Settings) -> Self {
        Self {
            transactions: &storage.transactions,
            categories: &storage.categories,
            audit: Some(storage.audit()),
            uploads_dir: Some(settings.uploads_dir(storage.paths())),
        }
    }

    pub fn with_uploads_dir(mut self, dir: PathBuf) -> Self {
        self.uploads_dir = Some(dir);
        self
    }

    /// Find the file to import
    ///
    /// A path that exists is used as is. A relative path that does not is
    /// looked up in the uploads directory.
    pub fn resolve_path(&self, path: &Path) -> TallyResult<PathBuf> {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }

        if path.is_relative() {
            if let Some(dir) = &self.uploads_dir {
                let candidate = dir.join(path);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }

        Err(TallyError::NotFound {
            entity_type: "Import file",
            identifier: path.display().to_string(),
        })
    }

    /// Import every row of a CSV file
    pub fn import_from_file(&self, path: &Path) -> TallyResult<Vec<TransactionWithCategory>> {
        let resolved = self.resolve_path(path)?;
        let origin = format!(
            "import:{}",
            resolved
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| resolved.display().to_string())
        );

        self.import_rows(CsvRowReader::from_path(&resolved)?, &origin)
    }

    /// Import every row read from `reader`
    pub fn import_from_reader<R: Read>(
        &self,
        reader: R,
        origin: &str,
    ) -> TallyResult<Vec<TransactionWithCategory>> {
        self.import_rows(CsvRowReader::from_reader(reader), origin)
    }

    /// Validate, resolve categories for, and persist a sequence of rows
    ///
    /// Format errors anywhere in the input win over type errors. On any
    /// error nothing has been written.
    pub fn import_rows<I>(&self, rows: I, origin: &str) -> TallyResult<Vec<TransactionWithCategory>>
    where
        I: IntoIterator<Item = TallyResult<CsvRow>>,
    {
        let rows = rows.into_iter().collect::<TallyResult<Vec<_>>>()?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        for row in &rows {
            check_format(row)?;
        }

        let kinds = rows
            .iter()
            .map(|row| {
                row.kind
                    .parse::<TransactionType>()
                    .map_err(|_| TallyError::InvalidType {
                        row: row.row,
                        value: row.kind.clone(),
                    })
            })
            .collect::<TallyResult<Vec<_>>>()?;

        let mut seen = HashSet::new();
        let titles: Vec<String> = rows
            .iter()
            .filter(|row| seen.insert(row.category_title.as_str()))
            .map(|row| row.category_title.clone())
            .collect();

        let resolved = CategoryService::with_audit(self.categories, self.audit)
            .resolve_titles(&titles, Some(origin))?;
        let by_title: HashMap<&str, &Category> = resolved
            .iter()
            .map(|category| (category.title.as_str(), category))
            .collect();

        let mut imported = Vec::with_capacity(rows.len());
        for (row, kind) in rows.into_iter().zip(kinds) {
            let category = by_title
                .get(row.category_title.as_str())
                .copied()
                .ok_or_else(|| TallyError::category_not_found(row.category_title.as_str()))?;

            let txn = Transaction::new(row.title, row.value, kind, category.id);
            imported.push(TransactionWithCategory {
                transaction: txn,
                category: category.clone(),
            });
        }

        let txns: Vec<Transaction> = imported.iter().map(|t| t.transaction.clone()).collect();
        self.transactions.save_transactions(&txns)?;

        if let Some(audit) = self.audit {
            let entries: Vec<AuditEntry> = txns
                .iter()
                .map(|txn| {
                    AuditEntry::create(
                        EntityType::Transaction,
                        txn.id.to_string(),
                        Some(txn.title.clone()),
                        txn,
                    )
                    .with_origin(origin)
                })
                .collect();
            audit.log_batch(&entries)?;
        }

        Ok(imported)
    }
}
