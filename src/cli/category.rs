//! Category CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::category::format_category_list;
use crate::error::TallyResult;
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories with their totals
    List,
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CategoryCommands,
) -> TallyResult<()> {
    let service = CategoryService::from_storage(storage);

    match cmd {
        CategoryCommands::List => {
            let summaries = service.summaries(&storage.transactions)?;
            print!(
                "{}",
                format_category_list(&summaries, &settings.currency_symbol)
            );
        }
    }

    Ok(())
}
