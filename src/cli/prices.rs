//! Ad-hoc quote lookup with cache statistics.

use super::ui;
use crate::core::symbol::Symbol;
use crate::fetch::PriceService;
use crate::store::PortfolioStore;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(
    store: &PortfolioStore,
    prices: &PriceService,
    symbols: &[Symbol],
    ttl_secs: Option<u64>,
) -> Result<()> {
    if let Some(ttl) = ttl_secs {
        prices.set_cache_ttl_secs(ttl).await;
    }

    if symbols.is_empty() {
        println!("No symbols to price.");
        return Ok(());
    }

    let pb = ui::new_spinner(&format!("Fetching prices for {} symbols...", symbols.len()));
    let quotes = prices.fetch_all(symbols).await;
    pb.finish_and_clear();

    // Keep the persisted last-known prices current after any batch fetch,
    // not only the summary flow.
    for quote in quotes.values() {
        store.record_price(&quote.symbol, quote.price)?;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Price"),
        ui::header_cell("Prev Close"),
        ui::header_cell("Change"),
        ui::header_cell("Change %"),
        ui::header_cell("Source"),
    ]);

    for symbol in symbols {
        match quotes.get(symbol) {
            Some(quote) => {
                let change_cell = match quote.change {
                    Some(change) => ui::signed_cell(change, |c| format!("{c:+.2}")),
                    None => ui::na_cell(),
                };
                let change_pct_cell = match quote.change_percent {
                    Some(pct) => ui::signed_cell(pct, ui::format_percent),
                    None => ui::na_cell(),
                };
                table.add_row(vec![
                    Cell::new(symbol.as_str()),
                    ui::number_cell(format!("{:.2}", quote.price)),
                    ui::format_optional_cell(quote.previous_close, |p| format!("{p:.2}")),
                    change_cell,
                    change_pct_cell,
                    Cell::new(quote.source.to_string()),
                ]);
            }
            None => {
                table.add_row(vec![
                    Cell::new(symbol.as_str()),
                    ui::na_cell(),
                    ui::na_cell(),
                    ui::na_cell(),
                    ui::na_cell(),
                    Cell::new(ui::style_text("unavailable", ui::StyleType::Error)),
                ]);
            }
        }
    }

    println!("{table}");

    let stats = prices.cache_stats().await;
    println!(
        "\n{}",
        ui::style_text(
            &format!(
                "Cache: {} fresh / {} total entries, TTL {}s",
                stats.fresh_entries,
                stats.total_entries,
                stats.ttl.as_secs()
            ),
            ui::StyleType::Subtle
        )
    );

    Ok(())
}
