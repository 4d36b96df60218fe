pub mod coinex;

pub use coinex::CoinexClient;
