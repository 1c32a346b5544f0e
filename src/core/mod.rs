//! Core domain types and app-wide concerns

pub mod config;
pub mod errors;
pub mod log;
pub mod portfolio;
pub mod quote;
pub mod symbol;

pub use errors::{AllSourcesFailed, SourceUnavailable};
pub use quote::{PriceSource, Quote, SourceId};
pub use symbol::{Market, Symbol};
