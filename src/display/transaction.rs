//! Transaction display formatting
//!
//! Provides utilities for formatting transactions and the balance for
//! terminal display.

use crate::models::{Balance, TransactionType};
use crate::services::TransactionWithCategory;

/// Format a single transaction for display (register row)
pub fn format_transaction_row(entry: &TransactionWithCategory, symbol: &str) -> String {
    let txn = &entry.transaction;
    let direction = match txn.kind {
        TransactionType::Income => "+",
        TransactionType::Outcome => "-",
    };

    format!(
        "{} {} {} {} {:>12}",
        direction,
        txn.created_at.format("%Y-%m-%d"),
        truncate(&txn.title, 24),
        truncate(&entry.category.title, 16),
        txn.signed_value().format_with_symbol(symbol)
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(entries: &[TransactionWithCategory], symbol: &str) -> String {
    if entries.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:1} {:10} {:24} {:16} {:>12}\n",
        "", "Date", "Title", "Category", "Value"
    ));
    output.push_str(&"-".repeat(67));
    output.push('\n');

    for entry in entries {
        output.push_str(&format_transaction_row(entry, symbol));
        output.push('\n');
    }

    output
}

/// Format transaction details for display
pub fn format_transaction_details(entry: &TransactionWithCategory, symbol: &str) -> String {
    let txn = &entry.transaction;
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Title:       {}\n", txn.title));
    output.push_str(&format!("Type:        {}\n", txn.kind));
    output.push_str(&format!("Value:       {}\n", txn.value.format_with_symbol(symbol)));
    output.push_str(&format!("Category:    {}\n", entry.category.title));
    output.push_str(&format!(
        "Created:     {}\n",
        txn.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

/// Format the income/outcome/total summary
pub fn format_balance(balance: &Balance, symbol: &str) -> String {
    format!(
        "Income:  {:>14}\nOutcome: {:>14}\nTotal:   {:>14}\n",
        balance.income.format_with_symbol(symbol),
        balance.outcome.format_with_symbol(symbol),
        balance.total.format_with_symbol(symbol)
    )
}

/// Summarize the result of a CSV import
pub fn format_import_summary(imported: &[TransactionWithCategory], symbol: &str) -> String {
    if imported.is_empty() {
        return "No rows to import.\n".to_string();
    }

    let mut output = format!("Imported {} transaction(s):\n\n", imported.len());
    output.push_str(&format_transaction_register(imported, symbol));
    output
}

/// Pad or truncate a string to exactly `width` characters
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        format!("{:width$}", s, width = width)
    } else {
        let cut: String = s.chars().take(width - 3).collect();
        format!("{}...", cut)
    }
}
