//! Horizon-filled forecast report

use crate::types::{Horizon, HorizonPrediction, MarketSummary, PositionRecommendation};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Outcome of one pipeline run.
///
/// `entries` always holds exactly the configured horizons, in order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub symbol: String,
    pub summary: MarketSummary,
    /// Spot price at report time, when the ticker could be reached
    pub live_price: Option<Decimal>,
    pub generated_at: DateTime<Utc>,
    pub payout_ratio: f64,
    pub kelly_multiplier: f64,
    pub entries: Vec<ReportEntry>,
    /// Soft failure note, e.g. an unparseable forecast
    pub issue: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub horizon: Horizon,
    #[serde(flatten)]
    pub status: HorizonStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HorizonStatus {
    Ready {
        prediction: HorizonPrediction,
        recommendation: PositionRecommendation,
    },
    /// The forecast did not cover this horizon
    Pending,
}

impl ReportEntry {
    pub fn is_pending(&self) -> bool {
        matches!(self.status, HorizonStatus::Pending)
    }

    pub fn recommendation(&self) -> Option<&PositionRecommendation> {
        match &self.status {
            HorizonStatus::Ready { recommendation, .. } => Some(recommendation),
            HorizonStatus::Pending => None,
        }
    }

    pub fn prediction(&self) -> Option<&HorizonPrediction> {
        match &self.status {
            HorizonStatus::Ready { prediction, .. } => Some(prediction),
            HorizonStatus::Pending => None,
        }
    }
}

impl Report {
    pub fn entry(&self, horizon: Horizon) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.horizon == horizon)
    }

    pub fn pending_horizons(&self) -> Vec<Horizon> {
        self.entries.iter().filter(|e| e.is_pending()).map(|e| e.horizon).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| !e.is_pending())
    }

    /// Recommendations that actually take a position
    pub fn trades(&self) -> impl Iterator<Item = &PositionRecommendation> {
        self.entries
            .iter()
            .filter_map(|e| e.recommendation())
            .filter(|r| r.is_trade())
    }

    pub fn with_live_price(mut self, price: Decimal) -> Self {
        self.live_price = Some(price);
        self
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(
            f,
            "=== {} forecast ({}) ===",
            self.symbol,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        match self.live_price {
            Some(live) => writeln!(f, "Price: {} USDT (window close {:.2})", live, s.latest_price)?,
            None => writeln!(f, "Price: {:.2} USDT", s.latest_price)?,
        }
        writeln!(
            f,
            "Window: {} samples, change {:.2}%, volatility {:.2}%, range {:.2}-{:.2}",
            s.sample_count, s.price_change_percent, s.volatility_percent, s.lowest_price, s.highest_price
        )?;
        writeln!(
            f,
            "Sizing: {:.2}x Kelly, a win pays {:.2}x the stake, a loss costs 1x",
            self.kelly_multiplier, self.payout_ratio
        )?;
        if let Some(issue) = &self.issue {
            writeln!(f, "Note: {}", issue)?;
        }

        for entry in &self.entries {
            writeln!(f)?;
            match &entry.status {
                HorizonStatus::Ready {
                    prediction,
                    recommendation,
                } => {
                    writeln!(f, "{}", prediction.line)?;
                    writeln!(f, "{}", recommendation)?;
                }
                HorizonStatus::Pending => writeln!(f, "{}: pending/unavailable", entry.horizon)?,
            }
        }
        Ok(())
    }
}
