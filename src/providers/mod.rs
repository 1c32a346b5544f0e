//! External price providers. Each one converts its provider-specific
//! failures into `SourceUnavailable` at the boundary.

pub mod nse;
pub mod yahoo;

pub use nse::NseSource;
pub use yahoo::YahooSource;
