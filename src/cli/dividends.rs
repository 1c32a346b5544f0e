//! Dividend ledger subcommands.

use super::ui;
use crate::core::symbol::Symbol;
use crate::store::PortfolioStore;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

pub fn add(
    store: &PortfolioStore,
    symbol: Symbol,
    per_share: f64,
    shares_held: f64,
    tax_deducted: f64,
    date: NaiveDate,
) -> Result<()> {
    let dividend = store.add_dividend(symbol, per_share, shares_held, tax_deducted, date)?;
    println!(
        "Added dividend #{}: {} {:.2} x {:.2} = {:.2} net on {}",
        dividend.id,
        dividend.symbol,
        dividend.per_share,
        dividend.shares_held,
        dividend.net(),
        dividend.date
    );
    Ok(())
}

pub fn list(store: &PortfolioStore, currency: &str) -> Result<()> {
    let dividends = store.list_dividends()?;
    if dividends.is_empty() {
        println!("No dividends recorded.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Date"),
        ui::header_cell("Symbol"),
        ui::header_cell("Per share"),
        ui::header_cell("Shares"),
        ui::header_cell("Gross"),
        ui::header_cell("Tax"),
        ui::header_cell(&format!("Net ({currency})")),
    ]);

    for dividend in &dividends {
        table.add_row(vec![
            ui::number_cell(dividend.id.to_string()),
            Cell::new(dividend.date.to_string()),
            Cell::new(dividend.symbol.as_str()),
            ui::number_cell(format!("{:.2}", dividend.per_share)),
            ui::number_cell(format!("{:.2}", dividend.shares_held)),
            ui::number_cell(format!("{:.2}", dividend.gross())),
            ui::number_cell(format!("{:.2}", dividend.tax_deducted)),
            ui::number_cell(format!("{:.2}", dividend.net())),
        ]);
    }

    println!("{table}");
    println!(
        "\nTotal net ({currency}): {}",
        ui::style_text(
            &format!("{:.2}", store.dividend_income()?),
            ui::StyleType::TotalLabel
        )
    );
    Ok(())
}
