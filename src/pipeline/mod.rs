//! Prediction pipeline
//!
//! ```text
//! candles ──► MarketStatsComputer ──► MarketSummary ──► prompt ──► ForecastProvider
//!                                          │                             │
//!                                          ▼                             ▼ text
//!                                       Report ◄── KellyPositionSizer ◄── PredictionTextParser
//! ```
//!
//! [`PredictionPipeline`] is the synchronous core: given candles and the
//! forecaster's reply it always yields a report covering every configured
//! horizon. [`ForecastService`] adds the network edges around it.

mod report;
mod service;

pub use report::{HorizonStatus, Report, ReportEntry};
pub use service::ForecastService;

use crate::config::{Config, SizingConfig};
use crate::error::{ForecastError, Result};
use crate::market::MarketStatsComputer;
use crate::parser::PredictionTextParser;
use crate::sizing::KellyPositionSizer;
use crate::types::{Candle, Horizon, HorizonPrediction, MarketSummary};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Stats → parse → size, aggregated per horizon
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    stats: MarketStatsComputer,
    parser: PredictionTextParser,
    sizer: KellyPositionSizer,
    horizons: Vec<Horizon>,
}

impl Default for PredictionPipeline {
    fn default() -> Self {
        Self::new(SizingConfig::default(), Horizon::ALL.to_vec())
    }
}

impl PredictionPipeline {
    /// Repeated horizons are collapsed, keeping first-seen order
    pub fn new(sizing: SizingConfig, horizons: Vec<Horizon>) -> Self {
        let mut unique: Vec<Horizon> = Vec::with_capacity(horizons.len());
        for horizon in horizons {
            if unique.contains(&horizon) {
                warn!("Ignoring repeated horizon {}", horizon);
            } else {
                unique.push(horizon);
            }
        }

        Self {
            stats: MarketStatsComputer::new(),
            parser: PredictionTextParser::new(),
            sizer: KellyPositionSizer::new(sizing),
            horizons: unique,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sizing.clone(), config.pipeline.horizons.clone())
    }

    /// Horizons every report covers, in report order
    pub fn horizons(&self) -> &[Horizon] {
        &self.horizons
    }

    pub fn sizer(&self) -> &KellyPositionSizer {
        &self.sizer
    }

    pub fn summarize(&self, symbol: &str, candles: &[Candle]) -> Result<MarketSummary> {
        self.stats.summarize(symbol, candles)
    }

    /// Run the full core over a candle window and a forecast reply.
    ///
    /// Statistics failures are returned as errors. A reply with no usable
    /// lines still produces a report, with every horizon pending.
    pub fn run(&self, symbol: &str, candles: &[Candle], forecast_text: &str) -> Result<Report> {
        let summary = self.summarize(symbol, candles)?;
        Ok(self.assemble(summary, forecast_text))
    }

    /// Build the report for an already computed summary
    pub fn assemble(&self, summary: MarketSummary, forecast_text: &str) -> Report {
        let mut by_horizon: HashMap<Horizon, HorizonPrediction> = HashMap::new();
        let mut parsed = 0usize;

        for prediction in self.parser.parse(forecast_text) {
            parsed += 1;
            let horizon = prediction.horizon;
            if !self.horizons.contains(&horizon) {
                debug!("Dropping prediction for unconfigured horizon {}", horizon);
                continue;
            }
            if by_horizon.contains_key(&horizon) {
                debug!("Dropping duplicate {} line: {}", horizon, prediction.line);
                continue;
            }
            by_horizon.insert(horizon, prediction);
        }

        let issue = if parsed == 0 {
            warn!("No qualifying prediction lines in forecast for {}", summary.symbol);
            Some(ForecastError::UnparseableForecast.to_string())
        } else {
            None
        };

        let entries: Vec<ReportEntry> = self
            .horizons
            .iter()
            .map(|&horizon| match by_horizon.remove(&horizon) {
                Some(prediction) => {
                    let recommendation = self.sizer.size(&prediction);
                    ReportEntry {
                        horizon,
                        status: HorizonStatus::Ready {
                            prediction,
                            recommendation,
                        },
                    }
                }
                None => ReportEntry {
                    horizon,
                    status: HorizonStatus::Pending,
                },
            })
            .collect();

        let report = Report {
            symbol: summary.symbol.clone(),
            summary,
            live_price: None,
            generated_at: Utc::now(),
            payout_ratio: self.sizer.config().payout_ratio,
            kelly_multiplier: self.sizer.config().kelly_multiplier,
            entries,
            issue,
        };

        info!(
            "Report for {}: {} ready, {} pending, {} trades",
            report.symbol,
            report.entries.len() - report.pending_horizons().len(),
            report.pending_horizons().len(),
            report.trades().count()
        );
        report
    }
}
