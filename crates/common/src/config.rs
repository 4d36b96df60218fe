/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Exchange credentials. Empty = unauthenticated (public data only).
    pub coinex_api_key: String,
    pub coinex_api_secret: String,

    // Trading
    pub trading_mode: TradingMode,
    pub paper_slippage_bps: f64,
    pub paper_quote_balance: f64,

    // Bot settings served to the scheduler
    pub bot_active: bool,
    pub max_daily_trades: u32,
    pub max_trade_size: f64,

    // Strategy config file path
    pub strategy_config_path: String,
}

/// Whether orders go to the real exchange or an in-memory simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradingMode {
    Live,
    Paper,
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingMode::Live => write!(f, "live"),
            TradingMode::Paper => write!(f, "paper"),
        }
    }
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let trading_mode = match required_env("TRADING_MODE").to_lowercase().as_str() {
            "paper" => TradingMode::Paper,
            "live" => TradingMode::Live,
            other => panic!("ERROR: TRADING_MODE must be 'paper' or 'live', got: '{other}'"),
        };

        Config {
            coinex_api_key: optional_env("COINEX_API_KEY").unwrap_or_default(),
            coinex_api_secret: optional_env("COINEX_API_SECRET").unwrap_or_default(),
            trading_mode,
            paper_slippage_bps: optional_env("PAPER_SLIPPAGE_BPS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10.0),
            paper_quote_balance: optional_env("PAPER_QUOTE_BALANCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000.0),
            bot_active: optional_env("BOT_ACTIVE")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            max_daily_trades: optional_env("MAX_DAILY_TRADES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            max_trade_size: optional_env("MAX_TRADE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.01),
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategies.toml".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
