pub mod provider;

pub use provider::{HttpMarketData, MarketData};
