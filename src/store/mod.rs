//! File-backed portfolio store.
//!
//! One fjall partition per table (positions, cash transactions, expenses,
//! last-known prices), JSON values, big-endian id keys so listings iterate
//! in insertion order. Quotes are joined to positions at read time and
//! never persisted on a position.

use crate::core::portfolio::{CashFlow, CashTransaction, Dividend, Expense, Position};
use crate::core::symbol::Symbol;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Input for a new purchase record. `cash_invested` defaults to
/// quantity * price when not given.
#[derive(Debug, Clone)]
pub struct NewPosition {
    pub symbol: Symbol,
    pub company_name: Option<String>,
    pub quantity: f64,
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    pub broker: Option<String>,
    pub cash_invested: Option<f64>,
}

/// Last-resort price shown when a live fetch fails. Unlike the in-memory
/// quote cache this has no TTL; it is better-than-nothing data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedPrice {
    pub price: f64,
    pub updated_at: DateTime<Utc>,
}

pub struct PortfolioStore {
    keyspace: Keyspace,
    positions: PartitionHandle,
    cash: PartitionHandle,
    expenses: PartitionHandle,
    dividends: PartitionHandle,
    prices: PartitionHandle,
    meta: PartitionHandle,
}

impl PortfolioStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data dir: {}", data_dir.display()))?;
        let keyspace = fjall::Config::new(data_dir.join("portfolio"))
            .open()
            .context("Failed to open portfolio store")?;

        let open = |name: &str| -> Result<PartitionHandle> {
            keyspace
                .open_partition(name, PartitionCreateOptions::default())
                .with_context(|| format!("Failed to open partition: {name}"))
        };

        Ok(Self {
            positions: open("positions")?,
            cash: open("cash_transactions")?,
            expenses: open("expenses")?,
            dividends: open("dividends")?,
            prices: open("price_cache")?,
            meta: open("meta")?,
            keyspace,
        })
    }

    fn next_id(&self) -> Result<u64> {
        let id = match self.meta.get("next_id")? {
            Some(bytes) => serde_json::from_slice::<u64>(&bytes)?,
            None => 1,
        };
        self.meta.insert("next_id", serde_json::to_vec(&(id + 1))?)?;
        Ok(id)
    }

    fn persist(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    // Positions

    pub fn add_position(&self, new: NewPosition) -> Result<Position> {
        let position = Position {
            id: self.next_id()?,
            cash_invested: new
                .cash_invested
                .filter(|c| *c > 0.0)
                .unwrap_or(new.quantity * new.purchase_price),
            symbol: new.symbol,
            company_name: new.company_name,
            quantity: new.quantity,
            purchase_price: new.purchase_price,
            purchase_date: new.purchase_date,
            broker: new.broker,
        };
        self.positions.insert(
            position.id.to_be_bytes(),
            serde_json::to_vec(&position)?,
        )?;
        self.persist()?;
        debug!("Added position {} ({})", position.id, position.symbol);
        Ok(position)
    }

    pub fn get_position(&self, id: u64) -> Result<Option<Position>> {
        match self.positions.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn update_position(&self, position: &Position) -> Result<()> {
        self.positions.insert(
            position.id.to_be_bytes(),
            serde_json::to_vec(position)?,
        )?;
        self.persist()
    }

    pub fn delete_position(&self, id: u64) -> Result<bool> {
        let existed = self.positions.contains_key(id.to_be_bytes())?;
        self.positions.remove(id.to_be_bytes())?;
        self.persist()?;
        Ok(existed)
    }

    pub fn list_positions(&self) -> Result<Vec<Position>> {
        self.positions
            .iter()
            .map(|kv| {
                let (_, value) = kv?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    /// Distinct symbols across all positions, the set to price in a batch.
    pub fn unique_symbols(&self) -> Result<Vec<Symbol>> {
        let mut symbols: Vec<Symbol> = self
            .list_positions()?
            .into_iter()
            .map(|p| p.symbol)
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    // Cash transactions

    pub fn add_cash_transaction(
        &self,
        flow: CashFlow,
        amount: f64,
        note: Option<String>,
        date: NaiveDate,
    ) -> Result<CashTransaction> {
        let txn = CashTransaction {
            id: self.next_id()?,
            flow,
            amount,
            note,
            date,
        };
        self.cash
            .insert(txn.id.to_be_bytes(), serde_json::to_vec(&txn)?)?;
        self.persist()?;
        Ok(txn)
    }

    pub fn list_cash_transactions(&self) -> Result<Vec<CashTransaction>> {
        self.cash
            .iter()
            .map(|kv| {
                let (_, value) = kv?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    pub fn delete_cash_transaction(&self, id: u64) -> Result<bool> {
        let existed = self.cash.contains_key(id.to_be_bytes())?;
        self.cash.remove(id.to_be_bytes())?;
        self.persist()?;
        Ok(existed)
    }

    /// Deposits minus withdrawals.
    pub fn cash_balance(&self) -> Result<f64> {
        Ok(self
            .list_cash_transactions()?
            .iter()
            .map(|t| match t.flow {
                CashFlow::Deposit => t.amount,
                CashFlow::Withdrawal => -t.amount,
            })
            .sum())
    }

    // Expenses

    pub fn add_expense(
        &self,
        category: String,
        description: String,
        amount: f64,
        date: NaiveDate,
    ) -> Result<Expense> {
        let expense = Expense {
            id: self.next_id()?,
            category,
            description,
            amount,
            date,
        };
        self.expenses
            .insert(expense.id.to_be_bytes(), serde_json::to_vec(&expense)?)?;
        self.persist()?;
        Ok(expense)
    }

    pub fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.expenses
            .iter()
            .map(|kv| {
                let (_, value) = kv?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    pub fn delete_expense(&self, id: u64) -> Result<bool> {
        let existed = self.expenses.contains_key(id.to_be_bytes())?;
        self.expenses.remove(id.to_be_bytes())?;
        self.persist()?;
        Ok(existed)
    }

    // Dividends

    pub fn add_dividend(
        &self,
        symbol: Symbol,
        per_share: f64,
        shares_held: f64,
        tax_deducted: f64,
        date: NaiveDate,
    ) -> Result<Dividend> {
        let dividend = Dividend {
            id: self.next_id()?,
            symbol,
            per_share,
            shares_held,
            date,
            tax_deducted,
        };
        self.dividends
            .insert(dividend.id.to_be_bytes(), serde_json::to_vec(&dividend)?)?;
        self.persist()?;
        Ok(dividend)
    }

    pub fn list_dividends(&self) -> Result<Vec<Dividend>> {
        self.dividends
            .iter()
            .map(|kv| {
                let (_, value) = kv?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    pub fn delete_dividend(&self, id: u64) -> Result<bool> {
        let existed = self.dividends.contains_key(id.to_be_bytes())?;
        self.dividends.remove(id.to_be_bytes())?;
        self.persist()?;
        Ok(existed)
    }

    /// Sum of net dividend amounts across the ledger.
    pub fn dividend_income(&self) -> Result<f64> {
        Ok(self.list_dividends()?.iter().map(|d| d.net()).sum())
    }

    // Persisted last-known prices

    pub fn record_price(&self, symbol: &Symbol, price: f64) -> Result<()> {
        let entry = PersistedPrice {
            price,
            updated_at: Utc::now(),
        };
        self.prices
            .insert(symbol.as_str(), serde_json::to_vec(&entry)?)?;
        self.persist()
    }

    pub fn last_known_price(&self, symbol: &Symbol) -> Result<Option<PersistedPrice>> {
        match self.prices.get(symbol.as_str())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_position(symbol: &str, quantity: f64, price: f64) -> NewPosition {
        NewPosition {
            symbol: Symbol::new(symbol),
            company_name: None,
            quantity,
            purchase_price: price,
            purchase_date: "2024-06-01".parse().unwrap(),
            broker: None,
            cash_invested: None,
        }
    }

    #[test]
    fn test_position_crud_roundtrip() {
        let dir = tempdir().unwrap();
        let store = PortfolioStore::open(dir.path()).unwrap();

        let added = store.add_position(new_position("RELIANCE", 10.0, 2400.0)).unwrap();
        assert_eq!(added.cash_invested, 24000.0);

        let loaded = store.get_position(added.id).unwrap().unwrap();
        assert_eq!(loaded.symbol, Symbol::new("RELIANCE"));
        assert_eq!(loaded.quantity, 10.0);

        let mut updated = loaded.clone();
        updated.quantity = 15.0;
        store.update_position(&updated).unwrap();
        assert_eq!(
            store.get_position(added.id).unwrap().unwrap().quantity,
            15.0
        );

        assert!(store.delete_position(added.id).unwrap());
        assert!(store.get_position(added.id).unwrap().is_none());
        assert!(!store.delete_position(added.id).unwrap());
    }

    #[test]
    fn test_explicit_cash_invested_is_kept() {
        let dir = tempdir().unwrap();
        let store = PortfolioStore::open(dir.path()).unwrap();

        let mut input = new_position("TCS", 5.0, 3000.0);
        input.cash_invested = Some(15100.0); // includes brokerage
        let added = store.add_position(input).unwrap();
        assert_eq!(added.cash_invested, 15100.0);
    }

    #[test]
    fn test_unique_symbols_deduplicates() {
        let dir = tempdir().unwrap();
        let store = PortfolioStore::open(dir.path()).unwrap();

        store.add_position(new_position("TCS", 1.0, 1.0)).unwrap();
        store.add_position(new_position("TCS", 2.0, 1.0)).unwrap();
        store.add_position(new_position("INFY", 1.0, 1.0)).unwrap();

        let symbols = store.unique_symbols().unwrap();
        assert_eq!(symbols, vec![Symbol::new("INFY"), Symbol::new("TCS")]);
    }

    #[test]
    fn test_cash_balance() {
        let dir = tempdir().unwrap();
        let store = PortfolioStore::open(dir.path()).unwrap();
        let date: NaiveDate = "2024-06-01".parse().unwrap();

        store
            .add_cash_transaction(CashFlow::Deposit, 50_000.0, None, date)
            .unwrap();
        store
            .add_cash_transaction(CashFlow::Withdrawal, 12_500.0, Some("rent".into()), date)
            .unwrap();
        assert_eq!(store.cash_balance().unwrap(), 37_500.0);

        let txns = store.list_cash_transactions().unwrap();
        assert_eq!(txns.len(), 2);
        assert!(store.delete_cash_transaction(txns[1].id).unwrap());
        assert_eq!(store.cash_balance().unwrap(), 50_000.0);
    }

    #[test]
    fn test_expense_crud() {
        let dir = tempdir().unwrap();
        let store = PortfolioStore::open(dir.path()).unwrap();
        let date: NaiveDate = "2024-06-15".parse().unwrap();

        let e = store
            .add_expense("electricity".into(), "June bill".into(), 1_850.0, date)
            .unwrap();
        assert_eq!(store.list_expenses().unwrap().len(), 1);
        assert!(store.delete_expense(e.id).unwrap());
        assert!(store.list_expenses().unwrap().is_empty());
    }

    #[test]
    fn test_dividend_ledger() {
        let dir = tempdir().unwrap();
        let store = PortfolioStore::open(dir.path()).unwrap();
        let date: NaiveDate = "2024-07-05".parse().unwrap();

        let d = store
            .add_dividend(Symbol::new("ITC"), 6.25, 40.0, 25.0, date)
            .unwrap();
        store
            .add_dividend(Symbol::new("INFY"), 18.0, 10.0, 0.0, date)
            .unwrap();

        let listed = store.list_dividends().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].symbol, Symbol::new("ITC"));
        // 250 gross - 25 tax, plus 180 untaxed
        assert_eq!(store.dividend_income().unwrap(), 405.0);

        assert!(store.delete_dividend(d.id).unwrap());
        assert_eq!(store.dividend_income().unwrap(), 180.0);
        assert!(!store.delete_dividend(d.id).unwrap());
    }

    #[test]
    fn test_last_known_price_roundtrip() {
        let dir = tempdir().unwrap();
        let store = PortfolioStore::open(dir.path()).unwrap();
        let tcs = Symbol::new("TCS");

        assert!(store.last_known_price(&tcs).unwrap().is_none());
        store.record_price(&tcs, 3_512.40).unwrap();
        let entry = store.last_known_price(&tcs).unwrap().unwrap();
        assert_eq!(entry.price, 3_512.40);

        // Overwritten by the next write-back, no merge
        store.record_price(&tcs, 3_520.00).unwrap();
        assert_eq!(store.last_known_price(&tcs).unwrap().unwrap().price, 3_520.00);
    }

    #[test]
    fn test_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let store = PortfolioStore::open(dir.path()).unwrap();
            store
                .add_position(new_position("RELIANCE", 10.0, 2400.0))
                .unwrap()
                .id
        };

        let reopened = PortfolioStore::open(dir.path()).unwrap();
        assert!(reopened.get_position(id).unwrap().is_some());
        // Id counter continues past persisted ids
        let next = reopened.add_position(new_position("TCS", 1.0, 1.0)).unwrap();
        assert!(next.id > id);
    }
}
