//! Audit log display formatting

use crate::audit::AuditEntry;

/// Format audit entries one per line, oldest first
pub fn format_audit_log(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "Audit log is empty.\n".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.format_human_readable());
        output.push('\n');
    }
    output
}
