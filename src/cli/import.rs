//! CLI command handler for CSV import

use std::path::Path;

use crate::config::Settings;
use crate::display::transaction::format_import_summary;
use crate::error::TallyResult;
use crate::services::ImportService;
use crate::storage::Storage;

/// Handle the import command
///
/// The file must have a `title,type,value,category` header. A bare file
/// name that does not exist in the working directory is looked up in the
/// uploads directory.
pub fn handle_import_command(storage: &Storage, settings: &Settings, file: &str) -> TallyResult<()> {
    let service = ImportService::from_storage(storage, settings);

    let imported = service.import_from_file(Path::new(file))?;
    print!(
        "{}",
        format_import_summary(&imported, &settings.currency_symbol)
    );

    Ok(())
}
