use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use common::{
    AssetBalance, BalanceSource, Error, OrderGateway, OrderReceipt, OrderSide, OrderStatus,
    Result, TradeIntent,
};

/// Simulated balance and order collaborators for paper trading.
///
/// Fills happen at the intent's reference price with configurable slippage.
/// No real orders are ever sent to the exchange.
pub struct PaperGateway {
    /// Simulated per-currency balances.
    balances: Arc<RwLock<HashMap<String, AssetBalance>>>,
    /// Slippage in basis points applied to all fills.
    slippage_bps: f64,
}

impl PaperGateway {
    pub fn new(initial: HashMap<String, f64>, slippage_bps: f64) -> Self {
        info!(slippage_bps, "PaperGateway initialized");
        let balances = initial
            .into_iter()
            .map(|(ccy, free)| (ccy, AssetBalance { free, locked: 0.0 }))
            .collect();
        Self {
            balances: Arc::new(RwLock::new(balances)),
            slippage_bps,
        }
    }

    /// Start with a single funded quote currency, the usual paper setup.
    pub fn seeded(currency: &str, amount: f64, slippage_bps: f64) -> Self {
        Self::new(HashMap::from([(currency.to_string(), amount)]), slippage_bps)
    }
}

#[async_trait]
impl BalanceSource for PaperGateway {
    async fn balances(&self) -> Result<HashMap<String, AssetBalance>> {
        Ok(self.balances.read().await.clone())
    }
}

#[async_trait]
impl OrderGateway for PaperGateway {
    async fn submit_order(&self, intent: &TradeIntent) -> Result<OrderReceipt> {
        // Slippage: buys pay more, sells receive less
        let fill_price = match intent.side {
            OrderSide::Buy => intent.reference_price * (1.0 + self.slippage_bps / 10_000.0),
            OrderSide::Sell => intent.reference_price * (1.0 - self.slippage_bps / 10_000.0),
        };
        let notional = fill_price * intent.amount;

        let mut balances = self.balances.write().await;
        match intent.side {
            OrderSide::Buy => {
                let quote = balances.entry(intent.pair.quote.clone()).or_default();
                if quote.free < notional {
                    return Err(Error::ExecutionFailure(format!(
                        "insufficient {} for paper buy: have {}, need {}",
                        intent.pair.quote, quote.free, notional
                    )));
                }
                quote.free -= notional;
                balances.entry(intent.pair.base.clone()).or_default().free += intent.amount;
            }
            OrderSide::Sell => {
                let base = balances.entry(intent.pair.base.clone()).or_default();
                if base.free < intent.amount {
                    return Err(Error::ExecutionFailure(format!(
                        "insufficient {} for paper sell: have {}, need {}",
                        intent.pair.base, base.free, intent.amount
                    )));
                }
                base.free -= intent.amount;
                balances.entry(intent.pair.quote.clone()).or_default().free += notional;
            }
        }
        drop(balances);

        debug!(
            pair = %intent.pair,
            side = %intent.side,
            reference = intent.reference_price,
            fill = fill_price,
            amount = intent.amount,
            "Paper fill simulated"
        );

        Ok(OrderReceipt {
            order_id: format!("paper-{}", Uuid::new_v4()),
            price: fill_price,
            amount: intent.amount,
            fee: 0.0,
            status: OrderStatus::Filled,
        })
    }
}
