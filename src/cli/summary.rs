//! Portfolio summary: positions joined with live quotes, valuation totals
//! and tax holding classes.

use super::ui;
use crate::core::portfolio::{self, ValuedPosition};
use crate::fetch::PriceService;
use crate::store::PortfolioStore;
use anyhow::Result;
use comfy_table::Cell;
use tracing::debug;

pub async fn run(store: &PortfolioStore, prices: &PriceService, currency: &str) -> Result<()> {
    let positions = store.list_positions()?;
    if positions.is_empty() {
        println!("No positions yet. Add one with `eqtrack add`.");
        return Ok(());
    }

    let symbols = store.unique_symbols()?;
    let pb = ui::new_spinner(&format!("Fetching prices for {} symbols...", symbols.len()));
    let quotes = prices.fetch_all(&symbols).await;
    pb.finish_and_clear();
    debug!("Priced {}/{} symbols", quotes.len(), symbols.len());

    // Persist successful prices as the last-resort fallback for next time.
    for quote in quotes.values() {
        store.record_price(&quote.symbol, quote.price)?;
    }

    let valued: Vec<ValuedPosition> = positions
        .into_iter()
        .map(|position| match quotes.get(&position.symbol) {
            Some(quote) => Ok(ValuedPosition {
                price: Some(quote.price),
                stale: false,
                position,
            }),
            None => {
                // Live fetch failed; show the persisted last-known price.
                let last = store.last_known_price(&position.symbol)?;
                Ok(ValuedPosition {
                    price: last.map(|p| p.price),
                    stale: true,
                    position,
                })
            }
        })
        .collect::<Result<_>>()?;

    let summary = portfolio::summarize(&valued);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Qty"),
        ui::header_cell("Buy"),
        ui::header_cell("Price"),
        ui::header_cell(&format!("Value ({currency})")),
        ui::header_cell("P/L"),
        ui::header_cell("P/L %"),
        ui::header_cell("Days"),
        ui::header_cell("Tax"),
    ]);

    let mut any_stale = false;
    for v in &valued {
        let pos = &v.position;
        let stale_marker = if v.stale && v.price.is_some() {
            any_stale = true;
            "*"
        } else {
            ""
        };

        let price_cell = ui::format_optional_cell(v.price, |p| format!("{p:.2}{stale_marker}"));
        let value_cell =
            ui::format_optional_cell(v.price, |p| format!("{:.2}", pos.current_value(p)));
        let pl_cell = match v.price {
            Some(p) => ui::signed_cell(pos.profit_loss(p), |a| format!("{a:+.2}")),
            None => ui::na_cell(),
        };
        let pl_pct_cell = match v.price {
            Some(p) => ui::signed_cell(pos.profit_loss_percent(p), ui::format_percent),
            None => ui::na_cell(),
        };

        table.add_row(vec![
            Cell::new(pos.symbol.as_str()),
            ui::number_cell(format!("{:.2}", pos.quantity)),
            ui::number_cell(format!("{:.2}", pos.purchase_price)),
            price_cell,
            value_cell,
            pl_cell,
            pl_pct_cell,
            ui::number_cell(pos.days_held().to_string()),
            Cell::new(pos.holding_class().to_string()),
        ]);
    }

    println!(
        "Portfolio {}\n",
        ui::style_text(&format!("({} positions)", summary.total_positions), ui::StyleType::Subtle)
    );
    println!("{table}");

    if any_stale {
        println!(
            "{}",
            ui::style_text("* last known price; live fetch failed", ui::StyleType::Subtle)
        );
    }
    if summary.priced_positions < summary.total_positions {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "{} of {} positions could not be priced this round",
                    summary.total_positions - summary.priced_positions,
                    summary.total_positions
                ),
                ui::StyleType::Error
            )
        );
    }

    let pl_style = if summary.profit_loss >= 0.0 {
        ui::StyleType::TotalValue
    } else {
        ui::StyleType::Error
    };
    println!(
        "\nInvested ({currency}): {}",
        ui::style_text(&format!("{:.2}", summary.total_invested), ui::StyleType::TotalLabel)
    );
    println!(
        "Current value ({currency}): {}",
        ui::style_text(&format!("{:.2}", summary.current_value), ui::StyleType::TotalLabel)
    );
    println!(
        "P/L ({currency}): {}",
        ui::style_text(
            &format!(
                "{:+.2} ({})",
                summary.profit_loss,
                ui::format_percent(summary.profit_loss_percent)
            ),
            pl_style
        )
    );

    if let Some((symbol, pct)) = &summary.best_performer {
        println!("Best performer: {symbol} ({})", ui::format_percent(*pct));
    }
    if let Some((symbol, pct)) = &summary.worst_performer {
        println!("Worst performer: {symbol} ({})", ui::format_percent(*pct));
    }

    let cash = store.cash_balance()?;
    println!(
        "Cash balance ({currency}): {}",
        ui::style_text(&format!("{cash:.2}"), ui::StyleType::TotalLabel)
    );

    Ok(())
}
