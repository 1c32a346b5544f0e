//! Expense ledger subcommands.

use super::ui;
use crate::store::PortfolioStore;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

pub fn add(
    store: &PortfolioStore,
    category: String,
    description: String,
    amount: f64,
    date: NaiveDate,
) -> Result<()> {
    let expense = store.add_expense(category, description, amount, date)?;
    println!(
        "Added expense #{}: {} {:.2} on {}",
        expense.id, expense.category, expense.amount, expense.date
    );
    Ok(())
}

pub fn list(store: &PortfolioStore, currency: &str) -> Result<()> {
    let expenses = store.list_expenses()?;
    if expenses.is_empty() {
        println!("No expenses recorded.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Date"),
        ui::header_cell("Category"),
        ui::header_cell("Description"),
        ui::header_cell(&format!("Amount ({currency})")),
    ]);

    let mut total = 0.0;
    for expense in &expenses {
        total += expense.amount;
        table.add_row(vec![
            ui::number_cell(expense.id.to_string()),
            Cell::new(expense.date.to_string()),
            Cell::new(&expense.category),
            Cell::new(&expense.description),
            ui::number_cell(format!("{:.2}", expense.amount)),
        ]);
    }

    println!("{table}");
    println!(
        "\nTotal ({currency}): {}",
        ui::style_text(&format!("{total:.2}"), ui::StyleType::TotalLabel)
    );
    Ok(())
}
