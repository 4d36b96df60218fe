pub mod collaborators;
pub mod config;
pub mod error;
pub mod types;

pub use collaborators::{BalanceSource, MarketDataSource, OrderGateway, SettingsSource};
pub use config::{Config, TradingMode};
pub use error::{Error, Result};
pub use types::*;
