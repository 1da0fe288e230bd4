//! End-to-end forecasting service

use super::{PredictionPipeline, Report};
use crate::config::{Config, ReplyLanguage};
use crate::error::Result;
use crate::forecast::{build_prompt, ForecastProvider, LlmForecaster};
use crate::market::BinanceClient;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches candles, asks the forecaster and runs the pipeline
pub struct ForecastService {
    market: BinanceClient,
    forecaster: Arc<dyn ForecastProvider>,
    pipeline: PredictionPipeline,
    interval: String,
    limit: u32,
    language: ReplyLanguage,
}

impl ForecastService {
    pub fn new(config: &Config, forecaster: Arc<dyn ForecastProvider>) -> Result<Self> {
        Ok(Self {
            market: BinanceClient::new(&config.binance, &config.proxy)?,
            forecaster,
            pipeline: PredictionPipeline::from_config(config),
            interval: config.binance.interval.clone(),
            limit: config.binance.limit,
            language: config.pipeline.language,
        })
    }

    /// Service backed by the configured LLM provider
    pub fn from_config(config: &Config) -> Result<Self> {
        let forecaster = LlmForecaster::new(&config.llm, &config.proxy)?;
        Self::new(config, Arc::new(forecaster))
    }

    pub fn market(&self) -> &BinanceClient {
        &self.market
    }

    pub fn pipeline(&self) -> &PredictionPipeline {
        &self.pipeline
    }

    /// Trading pair for a coin, quoted in USDT
    pub fn symbol_for(coin: &str) -> String {
        let coin = coin.trim().to_uppercase();
        if coin.ends_with("USDT") {
            coin
        } else {
            format!("{}USDT", coin)
        }
    }

    /// Produce a report for `coin`.
    ///
    /// Candle, statistics and forecaster failures are returned as errors.
    /// The live price is best-effort.
    pub async fn predict(&self, coin: &str) -> Result<Report> {
        let symbol = Self::symbol_for(coin);
        let asset = symbol.trim_end_matches("USDT");
        info!("Forecasting {} with {}", symbol, self.forecaster.name());

        let candles = self.market.klines(&symbol, &self.interval, self.limit).await?;
        let summary = self.pipeline.summarize(&symbol, &candles)?;

        let prompt = build_prompt(asset, &summary, self.pipeline.horizons(), self.language);
        debug!("Prompt:\n{}", prompt);

        let text = self.forecaster.forecast(&prompt).await?;
        debug!("Forecast reply:\n{}", text);

        let report = self.pipeline.assemble(summary, &text);
        match self.market.latest_price(&symbol).await {
            Ok(price) => Ok(report.with_live_price(price)),
            Err(e) => {
                warn!("Live price unavailable for {}: {}", symbol, e);
                Ok(report)
            }
        }
    }
}
