//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types of operations that can be audited
///
/// Transactions and categories are append-only, so creation is the only
/// operation recorded today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Transaction,
    Category,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Transaction => write!(f, "Transaction"),
            EntityType::Category => write!(f, "Category"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    /// Short display ID of the affected entity (e.g. `txn-1a2b3c4d`)
    pub entity_id: String,

    /// Human-readable description (transaction or category title)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Where the change came from, e.g. the CSV file of an import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// JSON snapshot of the entity as created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
}

impl AuditEntry {
    /// Create a new audit entry for a create operation
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Create,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            origin: None,
            after: serde_json::to_value(entity).ok(),
        }
    }

    /// Tag the entry with where the change came from
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(origin) = &self.origin {
            output.push_str(&format!(" via {}", origin));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(EntityType::Category.to_string(), "Category");
    }

    #[test]
    fn test_create_entry() {
        let entry = AuditEntry::create(
            EntityType::Transaction,
            "txn-12345678",
            Some("Salary".to_string()),
            &json!({"title": "Salary", "value": 500000}),
        );

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::Transaction);
        assert_eq!(entry.after.as_ref().unwrap()["value"], 500000);
        assert!(entry.origin.is_none());
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let entry = AuditEntry::create(EntityType::Category, "cat-1", None, &json!({}));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["operation"], "create");
        assert_eq!(json["entity_type"], "category");
        assert!(json.get("entity_name").is_none());
        assert!(json.get("origin").is_none());

        let back: AuditEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back.entity_id, "cat-1");
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::create(
            EntityType::Category,
            "cat-12345678",
            Some("Housing".to_string()),
            &json!({"title": "Housing"}),
        )
        .with_origin("import:bank.csv");

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("CREATE Category cat-12345678 (Housing)"));
        assert!(formatted.ends_with("via import:bank.csv"));
    }
}
