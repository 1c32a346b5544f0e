pub mod cli;
pub mod core;
pub mod fetch;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::portfolio::CashFlow;
use crate::core::quote::PriceSource;
use crate::core::symbol::Symbol;
use crate::fetch::PriceService;
use crate::providers::{NseSource, YahooSource};
use crate::store::{NewPosition, PortfolioStore};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AddPositionArgs {
    pub symbol: String,
    pub company_name: Option<String>,
    pub quantity: f64,
    pub price: f64,
    pub date: Option<NaiveDate>,
    pub broker: Option<String>,
    pub cash_invested: Option<f64>,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Setup,
    Summary,
    Prices {
        symbols: Vec<String>,
        ttl_secs: Option<u64>,
    },
    AddPosition(AddPositionArgs),
    RemovePosition {
        id: u64,
    },
    Cash {
        flow: CashFlow,
        amount: f64,
        note: Option<String>,
        date: Option<NaiveDate>,
    },
    CashList,
    ExpenseAdd {
        category: String,
        description: String,
        amount: f64,
        date: Option<NaiveDate>,
    },
    ExpenseList,
    DividendAdd {
        symbol: String,
        per_share: f64,
        shares_held: f64,
        tax_deducted: f64,
        date: Option<NaiveDate>,
    },
    DividendList,
}

/// Builds the price service from config: one explicitly constructed
/// instance per process, passed by reference to consumers.
fn build_price_service(config: &AppConfig) -> Result<PriceService> {
    let request_timeout = Duration::from_secs(config.fetch.request_timeout_secs);

    let nse_url = config
        .providers
        .nse
        .as_ref()
        .map_or("https://www.nseindia.com", |p| p.base_url.as_str());
    let yahoo_url = config
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query1.finance.yahoo.com", |p| p.base_url.as_str());

    let domestic: Arc<dyn PriceSource> = Arc::new(NseSource::new(nse_url, request_timeout)?);
    let general: Arc<dyn PriceSource> = Arc::new(YahooSource::new(yahoo_url, request_timeout)?);

    Ok(PriceService::new(domestic, general, &config.fetch))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("eqtrack starting...");

    // Setup writes the config rather than reading it; give it defaults so
    // a not-yet-existing --config path is not an error.
    let config = match (&command, config_path) {
        (AppCommand::Setup, _) => AppConfig::default(),
        (_, Some(path)) => AppConfig::load_from_path(path)?,
        (_, None) => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = PortfolioStore::open(&config.data_path()?)?;
    let today = || chrono::Utc::now().date_naive();

    match command {
        AppCommand::Setup => match config_path {
            Some(path) => cli::setup::run_at_path(path),
            None => cli::setup::run(),
        },
        AppCommand::Summary => {
            let prices = build_price_service(&config)?;
            cli::summary::run(&store, &prices, &config.currency).await
        }
        AppCommand::Prices { symbols, ttl_secs } => {
            let prices = build_price_service(&config)?;
            let symbols: Vec<Symbol> = if symbols.is_empty() {
                store.unique_symbols()?
            } else {
                symbols.iter().map(|s| Symbol::new(s)).collect()
            };
            cli::prices::run(&store, &prices, &symbols, ttl_secs).await
        }
        AppCommand::AddPosition(args) => cli::positions::add(
            &store,
            NewPosition {
                symbol: Symbol::new(&args.symbol),
                company_name: args.company_name,
                quantity: args.quantity,
                purchase_price: args.price,
                purchase_date: args.date.unwrap_or_else(today),
                broker: args.broker,
                cash_invested: args.cash_invested,
            },
        ),
        AppCommand::RemovePosition { id } => cli::positions::remove(&store, id),
        AppCommand::Cash {
            flow,
            amount,
            note,
            date,
        } => cli::cash::record(&store, flow, amount, note, date.unwrap_or_else(today)),
        AppCommand::CashList => cli::cash::list(&store, &config.currency),
        AppCommand::ExpenseAdd {
            category,
            description,
            amount,
            date,
        } => cli::expenses::add(
            &store,
            category,
            description,
            amount,
            date.unwrap_or_else(today),
        ),
        AppCommand::ExpenseList => cli::expenses::list(&store, &config.currency),
        AppCommand::DividendAdd {
            symbol,
            per_share,
            shares_held,
            tax_deducted,
            date,
        } => cli::dividends::add(
            &store,
            Symbol::new(&symbol),
            per_share,
            shares_held,
            tax_deducted,
            date.unwrap_or_else(today),
        ),
        AppCommand::DividendList => cli::dividends::list(&store, &config.currency),
    }
}
