//! Position add/remove subcommands.

use super::ui;
use crate::store::{NewPosition, PortfolioStore};
use anyhow::Result;

pub fn add(store: &PortfolioStore, input: NewPosition) -> Result<()> {
    let position = store.add_position(input)?;
    println!(
        "Added position #{}: {} x {:.2} @ {:.2} ({})",
        position.id,
        position.symbol,
        position.quantity,
        position.purchase_price,
        position.purchase_date
    );
    Ok(())
}

pub fn remove(store: &PortfolioStore, id: u64) -> Result<()> {
    if store.delete_position(id)? {
        println!("Removed position #{id}");
    } else {
        println!(
            "{}",
            ui::style_text(&format!("No position with id {id}"), ui::StyleType::Error)
        );
    }
    Ok(())
}
