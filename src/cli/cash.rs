//! Cash ledger subcommands.

use super::ui;
use crate::core::portfolio::CashFlow;
use crate::store::PortfolioStore;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

pub fn record(
    store: &PortfolioStore,
    flow: CashFlow,
    amount: f64,
    note: Option<String>,
    date: NaiveDate,
) -> Result<()> {
    let txn = store.add_cash_transaction(flow, amount, note, date)?;
    let verb = match txn.flow {
        CashFlow::Deposit => "Deposited",
        CashFlow::Withdrawal => "Withdrew",
    };
    println!("{verb} {:.2} on {} (#{})", txn.amount, txn.date, txn.id);
    println!("Balance: {:.2}", store.cash_balance()?);
    Ok(())
}

pub fn list(store: &PortfolioStore, currency: &str) -> Result<()> {
    let txns = store.list_cash_transactions()?;
    if txns.is_empty() {
        println!("No cash transactions recorded.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Date"),
        ui::header_cell("Type"),
        ui::header_cell(&format!("Amount ({currency})")),
        ui::header_cell("Note"),
    ]);

    for txn in &txns {
        let (label, signed) = match txn.flow {
            CashFlow::Deposit => ("deposit", txn.amount),
            CashFlow::Withdrawal => ("withdrawal", -txn.amount),
        };
        table.add_row(vec![
            ui::number_cell(txn.id.to_string()),
            Cell::new(txn.date.to_string()),
            Cell::new(label),
            ui::signed_cell(signed, |a| format!("{a:+.2}")),
            Cell::new(txn.note.as_deref().unwrap_or("")),
        ]);
    }

    println!("{table}");
    println!(
        "\nBalance ({currency}): {}",
        ui::style_text(&format!("{:.2}", store.cash_balance()?), ui::StyleType::TotalLabel)
    );
    Ok(())
}
