use anyhow::Result;
use clap::{Parser, Subcommand};

use tally_cli::cli::{
    handle_audit_command, handle_balance_command, handle_category_command, handle_import_command,
    handle_transaction_command, CategoryCommands, TransactionCommands,
};
use tally_cli::config::{paths::TallyPaths, settings::Settings};
use tally_cli::storage::Storage;

#[derive(Parser)]
#[command(
    name = "tally",
    author = "Kaylee Beyene",
    version,
    about = "Track incomes and outcomes from the command line",
    long_about = "Tally records incomes and outcomes filed under categories. \
                  Outcomes larger than the current balance are refused, and \
                  transactions can be bulk-imported from CSV files."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Category commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Show income, outcome and total
    Balance,

    /// Import transactions from a CSV file (title,type,value,category)
    Import {
        /// Path to CSV file, or a file name inside the uploads directory
        file: String,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = TallyPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Category(cmd)) => {
            handle_category_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Balance) => {
            handle_balance_command(&storage, &settings)?;
        }
        Some(Commands::Import { file }) => {
            handle_import_command(&storage, &settings, &file)?;
        }
        Some(Commands::Audit { limit }) => {
            handle_audit_command(&storage, limit)?;
        }
        Some(Commands::Init) => {
            println!("Initializing Tally at: {}", paths.base_dir().display());
            storage.save_all()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!(
                "Drop CSV files into {} to import them by name.",
                settings.uploads_dir(&paths).display()
            );
        }
        Some(Commands::Config) => {
            println!("Tally Configuration");
            println!("===================");
            println!("Base directory:    {}", paths.base_dir().display());
            println!("Data directory:    {}", paths.data_dir().display());
            println!("Uploads directory: {}", settings.uploads_dir(&paths).display());
            println!("Audit log:         {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Allow overdraft: {}", settings.allow_overdraft);
        }
        None => {
            println!("Tally - personal finance tracker");
            println!();
            println!("Run 'tally --help' for usage information.");
        }
    }

    Ok(())
}
