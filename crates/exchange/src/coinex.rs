use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use common::{
    AssetBalance, BalanceSource, Candle, Error, MarketDataSource, OrderGateway, OrderReceipt,
    OrderSide, OrderStatus, Result, TradeIntent,
};

const BASE_URL: &str = "https://api.coinex.com";

/// REST client for the CoinEx v2 API.
///
/// Public market-data endpoints work without credentials; balance and
/// order endpoints require an API key pair and fail with
/// `AuthenticationRequired` otherwise.
pub struct CoinexClient {
    api_key: String,
    api_secret: String,
    http: Client,
}

impl CoinexClient {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            http: Client::builder()
                .use_rustls_tls()
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    pub fn authenticated(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64
    }

    /// CoinEx v2 signature: HMAC-SHA256 over method + path (incl. query) +
    /// body + timestamp, hex-encoded lowercase.
    fn sign(&self, method: &str, path: &str, body: &str, timestamp: u64) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let payload = format!("{method}{path}{body}{timestamp}");
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    async fn public_get(&self, path_and_query: &str) -> Result<String> {
        let url = format!("{BASE_URL}{path_and_query}");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    async fn signed_get(&self, path_and_query: &str) -> Result<String> {
        if !self.authenticated() {
            return Err(Error::AuthenticationRequired);
        }

        let ts = Self::timestamp_ms();
        let signature = self.sign("GET", path_and_query, "", ts);
        let url = format!("{BASE_URL}{path_and_query}");

        let resp = self
            .http
            .get(&url)
            .header("X-COINEX-KEY", &self.api_key)
            .header("X-COINEX-SIGN", signature)
            .header("X-COINEX-TIMESTAMP", ts.to_string())
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    async fn signed_post(&self, path: &str, body: &str) -> Result<String> {
        if !self.authenticated() {
            return Err(Error::AuthenticationRequired);
        }

        let ts = Self::timestamp_ms();
        let signature = self.sign("POST", path, body, ts);
        let url = format!("{BASE_URL}{path}");

        let resp = self
            .http
            .post(&url)
            .header("X-COINEX-KEY", &self.api_key)
            .header("X-COINEX-SIGN", signature)
            .header("X-COINEX-TIMESTAMP", ts.to_string())
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {text}")));
        }
        Ok(text)
    }
}

/// "BTC/USDT" -> "BTCUSDT" (CoinEx market code).
fn market_code(symbol: &str) -> String {
    symbol.replace('/', "")
}

/// Map common timeframe shorthands to CoinEx kline periods; unknown values
/// pass through unchanged and let the API reject them.
fn kline_period(timeframe: &str) -> &str {
    match timeframe {
        "1m" => "1min",
        "3m" => "3min",
        "5m" => "5min",
        "15m" => "15min",
        "30m" => "30min",
        "1h" => "1hour",
        "2h" => "2hour",
        "4h" => "4hour",
        "6h" => "6hour",
        "12h" => "12hour",
        "1d" => "1day",
        "3d" => "3day",
        "1w" => "1week",
        other => other,
    }
}

fn parse_price(value: &str, what: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| Error::Exchange(format!("unparseable {what}: '{value}'")))
}

#[async_trait]
impl MarketDataSource for CoinexClient {
    async fn candles(&self, symbol: &str, timeframe: &str, limit: usize) -> Result<Vec<Candle>> {
        let path = format!(
            "/v2/spot/kline?market={}&period={}&limit={}",
            market_code(symbol),
            kline_period(timeframe),
            limit
        );
        debug!(symbol, timeframe, limit, "Fetching candles from CoinEx");

        let body = self.public_get(&path).await?;
        let resp: ApiResponse<Vec<KlineRow>> = serde_json::from_str(&body)?;
        let rows = resp.into_data()?;

        let mut candles = Vec::with_capacity(rows.len());
        for row in rows {
            let timestamp = Utc
                .timestamp_millis_opt(row.created_at)
                .single()
                .ok_or_else(|| {
                    Error::Exchange(format!("invalid kline timestamp {}", row.created_at))
                })?;
            candles.push(Candle {
                timestamp,
                open: parse_price(&row.open, "open")?,
                high: parse_price(&row.high, "high")?,
                low: parse_price(&row.low, "low")?,
                close: parse_price(&row.close, "close")?,
                volume: parse_price(&row.volume, "volume")?,
            });
        }

        if candles.is_empty() {
            return Err(Error::DataUnavailable(format!(
                "CoinEx returned no candles for {symbol}"
            )));
        }
        Ok(candles)
    }

    async fn ticker_price(&self, symbol: &str) -> Result<f64> {
        let path = format!("/v2/spot/ticker?market={}", market_code(symbol));
        let body = self.public_get(&path).await?;
        let resp: ApiResponse<Vec<TickerRow>> = serde_json::from_str(&body)?;
        let rows = resp.into_data()?;
        let row = rows
            .first()
            .ok_or_else(|| Error::DataUnavailable(format!("no ticker for {symbol}")))?;
        parse_price(&row.last, "last price")
    }
}

#[async_trait]
impl BalanceSource for CoinexClient {
    async fn balances(&self) -> Result<HashMap<String, AssetBalance>> {
        let body = self.signed_get("/v2/assets/spot/balance").await?;
        let resp: ApiResponse<Vec<BalanceRow>> = serde_json::from_str(&body)?;
        let rows = resp.into_data()?;

        let mut balances = HashMap::with_capacity(rows.len());
        for row in rows {
            balances.insert(
                row.ccy,
                AssetBalance {
                    free: row.available.parse().unwrap_or(0.0),
                    locked: row.frozen.parse().unwrap_or(0.0),
                },
            );
        }
        Ok(balances)
    }
}

#[async_trait]
impl OrderGateway for CoinexClient {
    async fn submit_order(&self, intent: &TradeIntent) -> Result<OrderReceipt> {
        let side = match intent.side {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        };
        let payload = serde_json::json!({
            "market": market_code(&intent.pair.symbol),
            "market_type": "SPOT",
            "side": side,
            "type": "market",
            "amount": intent.amount.to_string(),
        });

        debug!(pair = %intent.pair, side, amount = intent.amount, "Submitting order to CoinEx");
        let body = self
            .signed_post("/v2/spot/order", &payload.to_string())
            .await?;
        let resp: ApiResponse<OrderRow> = serde_json::from_str(&body)?;
        let row = resp
            .into_data()
            .map_err(|e| Error::ExecutionFailure(e.to_string()))?;

        let price = row
            .last_fill_price
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(intent.reference_price);
        let amount = row
            .amount
            .as_deref()
            .and_then(|a| a.parse::<f64>().ok())
            .unwrap_or(intent.amount);

        Ok(OrderReceipt {
            order_id: row.order_id.to_string(),
            price,
            amount,
            fee: row
                .quote_fee
                .as_deref()
                .and_then(|f| f.parse::<f64>().ok())
                .unwrap_or(0.0),
            status: match row.status.as_deref() {
                Some("filled") | Some("done") => OrderStatus::Filled,
                Some("cancelled") => OrderStatus::Cancelled,
                _ => OrderStatus::Open,
            },
        })
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ApiResponse<T> {
    code: i64,
    message: Option<String>,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn into_data(self) -> Result<T> {
        if self.code != 0 {
            return Err(Error::Exchange(format!(
                "CoinEx error {}: {}",
                self.code,
                self.message.unwrap_or_default()
            )));
        }
        self.data
            .ok_or_else(|| Error::Exchange("CoinEx response missing data".into()))
    }
}

#[derive(Debug, Deserialize)]
struct KlineRow {
    created_at: i64,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

#[derive(Deserialize)]
struct TickerRow {
    last: String,
}

#[derive(Deserialize)]
struct BalanceRow {
    ccy: String,
    available: String,
    frozen: String,
}

#[derive(Deserialize)]
struct OrderRow {
    order_id: u64,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    last_fill_price: Option<String>,
    #[serde(default)]
    quote_fee: Option<String>,
    #[serde(default)]
    status: Option<String>,
}
