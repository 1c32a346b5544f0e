//! Portfolio models and pure valuation/tax-holding derivations

use crate::core::symbol::Symbol;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Days after which a holding qualifies as long-term for tax purposes.
pub const LONG_TERM_HOLDING_DAYS: i64 = 365;

/// A purchase record. Quotes are joined in at read time and never persisted
/// on the position itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: u64,
    pub symbol: Symbol,
    pub company_name: Option<String>,
    pub quantity: f64,
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub broker: Option<String>,
    /// Actual cash spent including fees; defaults to quantity * price.
    pub cash_invested: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldingClass {
    ShortTerm,
    LongTerm,
}

impl Display for HoldingClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoldingClass::ShortTerm => write!(f, "STCG"),
            HoldingClass::LongTerm => write!(f, "LTCG"),
        }
    }
}

impl Position {
    pub fn invested(&self) -> f64 {
        self.quantity * self.purchase_price
    }

    pub fn current_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    pub fn profit_loss(&self, price: f64) -> f64 {
        self.current_value(price) - self.invested()
    }

    pub fn profit_loss_percent(&self, price: f64) -> f64 {
        let invested = self.invested();
        if invested == 0.0 {
            return 0.0;
        }
        self.profit_loss(price) / invested * 100.0
    }

    pub fn days_held(&self) -> i64 {
        self.days_held_on(Utc::now().date_naive())
    }

    pub fn days_held_on(&self, today: NaiveDate) -> i64 {
        (today - self.purchase_date).num_days().max(0)
    }

    pub fn holding_class(&self) -> HoldingClass {
        self.holding_class_on(Utc::now().date_naive())
    }

    pub fn holding_class_on(&self, today: NaiveDate) -> HoldingClass {
        if self.days_held_on(today) >= LONG_TERM_HOLDING_DAYS {
            HoldingClass::LongTerm
        } else {
            HoldingClass::ShortTerm
        }
    }

    /// Simple linear annualization of the holding-period return.
    pub fn annualized_return_percent(&self, price: f64, today: NaiveDate) -> Option<f64> {
        let days = self.days_held_on(today);
        if days == 0 {
            return None;
        }
        Some(self.profit_loss_percent(price) / days as f64 * 365.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlow {
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashTransaction {
    pub id: u64,
    pub flow: CashFlow,
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
}

/// A dividend received on a holding, entered manually. Gross and net
/// amounts are derived, not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dividend {
    pub id: u64,
    pub symbol: Symbol,
    pub per_share: f64,
    pub shares_held: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub tax_deducted: f64,
}

impl Dividend {
    pub fn gross(&self) -> f64 {
        self.per_share * self.shares_held
    }

    pub fn net(&self) -> f64 {
        self.gross() - self.tax_deducted
    }
}

/// A position joined with whatever price is known for it, if any.
#[derive(Debug, Clone)]
pub struct ValuedPosition {
    pub position: Position,
    pub price: Option<f64>,
    /// True when the price came from the persisted last-known cache rather
    /// than a live fetch.
    pub stale: bool,
}

#[derive(Debug, Clone)]
pub struct PortfolioSummary {
    pub total_invested: f64,
    pub current_value: f64,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
    pub total_positions: usize,
    pub priced_positions: usize,
    pub best_performer: Option<(Symbol, f64)>,
    pub worst_performer: Option<(Symbol, f64)>,
}

/// Derives the portfolio summary from valued positions. Positions without a
/// price contribute to invested totals but not to current value.
pub fn summarize(positions: &[ValuedPosition]) -> PortfolioSummary {
    let total_invested: f64 = positions.iter().map(|v| v.position.invested()).sum();
    let current_value: f64 = positions
        .iter()
        .filter_map(|v| v.price.map(|p| v.position.current_value(p)))
        .sum();
    let profit_loss = current_value - total_invested;
    let profit_loss_percent = if total_invested > 0.0 {
        profit_loss / total_invested * 100.0
    } else {
        0.0
    };

    let mut performers: Vec<(Symbol, f64)> = positions
        .iter()
        .filter_map(|v| {
            v.price
                .map(|p| (v.position.symbol.clone(), v.position.profit_loss_percent(p)))
        })
        .collect();
    performers.sort_by(|a, b| a.1.total_cmp(&b.1));

    PortfolioSummary {
        total_invested,
        current_value,
        profit_loss,
        profit_loss_percent,
        total_positions: positions.len(),
        priced_positions: positions.iter().filter(|v| v.price.is_some()).count(),
        best_performer: performers.last().cloned(),
        worst_performer: performers.first().cloned(),
    }
}
