use std::collections::HashMap;

use tracing::warn;

use common::{AssetBalance, OrderSide, TradingPair};

/// Fraction of the free balance a single trade may consume.
const BALANCE_FRACTION: f64 = 0.1;

/// Compute the base-currency amount for a trade, or `None` when the trade
/// should be skipped.
///
/// BUY spends quote currency: amount = min(10% of free quote,
/// max_trade_size) / price. SELL spends base currency: amount = min(10% of
/// free base, max_trade_size / price). `max_trade_size` is a quote-notional
/// cap. Missing balance, non-positive price, or a non-positive result all
/// yield `None`.
pub fn position_size(
    side: OrderSide,
    pair: &TradingPair,
    balances: &HashMap<String, AssetBalance>,
    price: f64,
    max_trade_size: f64,
) -> Option<f64> {
    if price <= 0.0 {
        warn!(pair = %pair, price, "Cannot size trade at non-positive price");
        return None;
    }

    let amount = match side {
        OrderSide::Buy => {
            let Some(balance) = balances.get(&pair.quote) else {
                warn!(pair = %pair, currency = %pair.quote, "No quote balance available for buying");
                return None;
            };
            let trade_value = (balance.free * BALANCE_FRACTION).min(max_trade_size);
            trade_value / price
        }
        OrderSide::Sell => {
            let Some(balance) = balances.get(&pair.base) else {
                warn!(pair = %pair, currency = %pair.base, "No base balance available for selling");
                return None;
            };
            (balance.free * BALANCE_FRACTION).min(max_trade_size / price)
        }
    };

    if amount <= 0.0 {
        warn!(pair = %pair, amount, "Computed trade amount is zero or negative");
        return None;
    }
    Some(amount)
}
