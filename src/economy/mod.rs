//! Production, valuation and exchange of numbers

pub mod company;
pub mod market;
pub mod valuation;

pub use company::Company;
pub use market::{Market, OrderBook, Side, Trade, TraderId};
