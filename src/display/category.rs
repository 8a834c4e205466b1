//! Category display formatting

use crate::services::CategorySummary;

/// Format categories with their transaction counts and totals
pub fn format_category_list(summaries: &[CategorySummary], symbol: &str) -> String {
    if summaries.is_empty() {
        return "No categories found.\n\nCategories are created when you add or import a transaction."
            .to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:24} {:>6} {:>14}\n",
        "Category", "Count", "Total"
    ));
    output.push_str(&"-".repeat(46));
    output.push('\n');

    for summary in summaries {
        output.push_str(&format!(
            "{:24} {:>6} {:>14}\n",
            summary.category.title,
            summary.transaction_count,
            summary.balance.total.format_with_symbol(symbol)
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Balance, Category, Money};

    #[test]
    fn test_format_empty_list() {
        assert!(format_category_list(&[], "$").contains("No categories found"));
    }

    #[test]
    fn test_format_category_list() {
        let summaries = vec![CategorySummary {
            category: Category::new("Housing"),
            transaction_count: 2,
            balance: Balance {
                income: Money::zero(),
                outcome: Money::from_units(1500),
                total: Money::zero() - Money::from_units(1500),
            },
        }];

        let output = format_category_list(&summaries, "$");
        assert!(output.contains("Housing"));
        assert!(output.contains("-$1500.00"));
    }
}
