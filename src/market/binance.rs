//! Binance REST client for candle history and spot prices

use super::decode_klines;
use crate::config::{BinanceConfig, ProxyConfig, MAX_KLINE_LIMIT};
use crate::error::{ForecastError, Result};
use crate::types::Candle;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Binance market-data client
#[derive(Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    #[allow(dead_code)]
    symbol: String,
    price: Decimal,
}

/// 24h rolling ticker statistics
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker24h {
    pub symbol: String,
    #[serde(rename = "priceChangePercent")]
    pub price_change_percent: Decimal,
    #[serde(rename = "lastPrice")]
    pub last_price: Decimal,
}

impl BinanceClient {
    pub fn new(config: &BinanceConfig, proxy: &ProxyConfig) -> Result<Self> {
        let builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        let http = proxy.apply(builder)?.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the most recent `limit` candles, oldest first.
    ///
    /// `limit` is capped at the exchange's page size of 1000.
    pub async fn klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        if limit > MAX_KLINE_LIMIT {
            warn!("Kline limit {} exceeds {}, capping", limit, MAX_KLINE_LIMIT);
        }
        let limit = limit.min(MAX_KLINE_LIMIT);
        let url = format!("{}/api/v3/klines", self.base_url);
        debug!("GET {} symbol={} interval={} limit={}", url, symbol, interval, limit);

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;
        let body: serde_json::Value = Self::check(resp).await?.json().await?;

        let candles = decode_klines(&body)?;
        debug!("Fetched {} candles for {}", candles.len(), symbol);
        Ok(candles)
    }

    /// Latest traded price
    pub async fn latest_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let resp = self.http.get(&url).query(&[("symbol", symbol)]).send().await?;
        let ticker: TickerPrice = Self::check(resp).await?.json().await?;
        Ok(ticker.price)
    }

    /// 24h change and last price
    pub async fn ticker_24h(&self, symbol: &str) -> Result<Ticker24h> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let resp = self.http.get(&url).query(&[("symbol", symbol)]).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Connectivity check against `/api/v3/ping`
    pub async fn ping(&self) -> Result<()> {
        let url = format!("{}/api/v3/ping", self.base_url);
        let resp = self.http.get(&url).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        Err(ForecastError::Api(format!("HTTP {} from Binance: {}", status.as_u16(), text)))
    }
}
