//! Terminal rendering for each subcommand.

pub mod cash;
pub mod dividends;
pub mod expenses;
pub mod positions;
pub mod prices;
pub mod setup;
pub mod summary;
pub mod ui;
