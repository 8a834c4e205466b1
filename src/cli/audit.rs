//! CLI command handler for the audit log

use crate::display::audit::format_audit_log;
use crate::error::TallyResult;
use crate::storage::Storage;

/// Show the most recent audit entries
pub fn handle_audit_command(storage: &Storage, limit: usize) -> TallyResult<()> {
    let entries = storage.audit().read_recent(limit)?;
    print!("{}", format_audit_log(&entries));
    Ok(())
}
