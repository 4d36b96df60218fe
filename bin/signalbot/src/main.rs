mod sources;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use common::{BalanceSource, Config, OrderGateway, TradeRecord, TradingMode};
use engine::{BotWorker, Scheduler, SchedulerConfig};
use exchange::CoinexClient;
use paper::PaperGateway;
use strategy::StrategyFileConfig;

use crate::sources::{FileStrategySource, StaticSettings};

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(mode = %cfg.trading_mode, "SignalBot starting");

    let strategy_file = match StrategyFileConfig::load(&cfg.strategy_config_path) {
        Ok(file) => file,
        Err(e) => {
            error!(path = %cfg.strategy_config_path, "Failed to load strategy config: {e}");
            std::process::exit(1);
        }
    };
    info!(
        strategies = strategy_file.strategies.len(),
        path = %cfg.strategy_config_path,
        "Strategy config loaded"
    );

    // ── Collaborators (injected based on TRADING_MODE) ────────────────────────
    // Market data always comes from CoinEx; paper mode only swaps the
    // balance and order sides for the in-memory simulation.
    let coinex = Arc::new(CoinexClient::new(&cfg.coinex_api_key, &cfg.coinex_api_secret));
    let (balances, orders): (Arc<dyn BalanceSource>, Arc<dyn OrderGateway>) =
        match cfg.trading_mode {
            TradingMode::Live => {
                info!("Live trading mode — orders go to CoinEx");
                (coinex.clone(), coinex.clone())
            }
            TradingMode::Paper => {
                info!(
                    slippage_bps = cfg.paper_slippage_bps,
                    quote_balance = cfg.paper_quote_balance,
                    "Paper trading mode — orders are simulated"
                );
                let paper = Arc::new(PaperGateway::seeded(
                    "USDT",
                    cfg.paper_quote_balance,
                    cfg.paper_slippage_bps,
                ));
                (paper.clone(), paper)
            }
        };

    let settings = Arc::new(StaticSettings::from_config(&cfg));
    let strategies = Arc::new(FileStrategySource::new(&strategy_file));

    // ── Scheduler ─────────────────────────────────────────────────────────────
    let (trade_tx, mut trade_rx) = mpsc::channel::<TradeRecord>(128);
    let scheduler = Arc::new(Scheduler::new(
        coinex,
        balances,
        orders,
        settings,
        strategies,
        trade_tx,
        SchedulerConfig::default(),
    ));

    // Trade record consumer: here just logged, a host could persist these.
    tokio::spawn(async move {
        while let Some(record) = trade_rx.recv().await {
            info!(
                order_id = %record.order_id,
                pair = %record.pair,
                strategy = %record.strategy_name,
                side = %record.side,
                price = record.price,
                amount = record.amount,
                status = %record.status,
                "Trade executed"
            );
        }
    });

    let mut worker = BotWorker::new(scheduler, Duration::from_secs(30));
    worker.start();

    info!("Scheduler running. Waiting for shutdown signal.");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received. Stopping worker.");
    worker.stop().await;
}
