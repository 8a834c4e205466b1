//! Transaction CLI commands
//!
//! Implements CLI commands for adding and listing transactions.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::transaction::{format_balance, format_transaction_details, format_transaction_register};
use crate::error::{TallyError, TallyResult};
use crate::models::{Money, TransactionType};
use crate::services::{CreateTransactionInput, TransactionFilter, TransactionService};
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Add a new transaction
    Add {
        /// Short description, e.g. "Salary"
        title: String,
        /// Positive amount (e.g., "5000" or "12.50")
        value: String,
        /// income or outcome
        #[arg(short = 't', long = "type")]
        kind: TransactionType,
        /// Category title (created if it does not exist)
        #[arg(short, long)]
        category: String,
    },
    /// List transactions, newest first
    List {
        /// Filter by category title
        #[arg(short = 'C', long)]
        category: Option<String>,
        /// Only incomes or only outcomes
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> TallyResult<()> {
    let service = TransactionService::from_storage(storage).with_overdraft(settings.allow_overdraft);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        TransactionCommands::Add {
            title,
            value,
            kind,
            category,
        } => {
            let value = Money::parse(&value)
                .map_err(|e| TallyError::Validation(format!("Invalid value: {}", e)))?;

            let created = service.create(CreateTransactionInput {
                title,
                value,
                kind,
                category_title: category,
            })?;

            println!("Created transaction:");
            print!("{}", format_transaction_details(&created, symbol));
        }

        TransactionCommands::List {
            category,
            kind,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(category) = category {
                filter = filter.category(category);
            }
            if let Some(kind) = kind {
                filter = filter.kind(kind);
            }

            let listing = service.list_with_balance(filter)?;
            print!("{}", format_transaction_register(&listing.transactions, symbol));
            println!();
            print!("{}", format_balance(&listing.balance, symbol));
        }
    }

    Ok(())
}

/// Handle the balance command
pub fn handle_balance_command(storage: &Storage, settings: &Settings) -> TallyResult<()> {
    let balance = TransactionService::from_storage(storage).balance()?;
    print!("{}", format_balance(&balance, &settings.currency_symbol));
    Ok(())
}
