//! Core data types shared across the pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One OHLCV sample for a fixed time bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Statistical summary of a candle window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub symbol: String,
    /// Close of the last candle
    pub latest_price: f64,
    pub highest_price: f64,
    pub lowest_price: f64,
    /// Last close vs first open, in percent
    pub price_change_percent: f64,
    /// Coefficient of variation of closes, in percent
    pub volatility_percent: f64,
    pub avg_volume: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub sample_count: usize,
}

impl MarketSummary {
    /// Time covered by the window, from the first to the last open time
    pub fn span(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

/// Forecast horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "10m", alias = "10-minute")]
    TenMinutes,
    #[serde(rename = "30m", alias = "30-minute")]
    ThirtyMinutes,
    #[serde(rename = "60m", alias = "60-minute")]
    SixtyMinutes,
}

impl Horizon {
    /// Canonical order, also the tie-break order when a line names several
    pub const ALL: [Horizon; 3] = [Horizon::TenMinutes, Horizon::ThirtyMinutes, Horizon::SixtyMinutes];

    pub fn minutes(&self) -> u32 {
        match self {
            Horizon::TenMinutes => 10,
            Horizon::ThirtyMinutes => 30,
            Horizon::SixtyMinutes => 60,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::TenMinutes => "10-minute",
            Horizon::ThirtyMinutes => "30-minute",
            Horizon::SixtyMinutes => "60-minute",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Horizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
        match digits.as_str() {
            "10" => Ok(Horizon::TenMinutes),
            "30" => Ok(Horizon::ThirtyMinutes),
            "60" => Ok(Horizon::SixtyMinutes),
            _ => Err(format!("unknown horizon: {}", s)),
        }
    }
}

/// Overall trend classification reported by the forecaster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Oscillating,
}

impl Trend {
    /// Map a free-text label (English or Chinese) to a trend
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label
            .trim()
            .trim_end_matches(|c: char| c.is_ascii_punctuation() || "。，；！".contains(c));
        match label.to_lowercase().as_str() {
            "rising" | "up" | "uptrend" | "bullish" | "上升" | "上涨" => Some(Trend::Rising),
            "falling" | "down" | "downtrend" | "bearish" | "下跌" | "下降" => Some(Trend::Falling),
            "oscillating" | "sideways" | "neutral" | "ranging" | "震荡" => Some(Trend::Oscillating),
            _ => None,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Rising => write!(f, "Rising"),
            Trend::Falling => write!(f, "Falling"),
            Trend::Oscillating => write!(f, "Oscillating"),
        }
    }
}

/// Target price band `low-high`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    pub low: f64,
    pub high: f64,
}

impl fmt::Display for TargetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Structured prediction extracted from one forecast line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonPrediction {
    pub horizon: Horizon,
    /// Probability of an up move in [0, 1]; `None` when the line had no usable figure
    pub up_probability: Option<f64>,
    pub trend: Option<Trend>,
    pub target_range: Option<TargetRange>,
    pub rationale: Option<String>,
    /// The source line, trimmed
    pub line: String,
}

/// Side of a recommended position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
    NoTrade,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG 📈"),
            Direction::Short => write!(f, "SHORT 📉"),
            Direction::NoTrade => write!(f, "NO TRADE ❌"),
        }
    }
}

/// Qualitative strength of a sized position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Cautious,
    Moderate,
    Strong,
}

impl ConfidenceTier {
    pub fn advice(&self) -> &'static str {
        match self {
            ConfidenceTier::Strong => "Strongly recommended",
            ConfidenceTier::Moderate => "Build a moderate position",
            ConfidenceTier::Cautious => "Small cautious position",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            ConfidenceTier::Strong => "💰💰💰",
            ConfidenceTier::Moderate => "💰💰",
            ConfidenceTier::Cautious => "💰",
        }
    }
}

/// Sizing outcome for one horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRecommendation {
    pub horizon: Horizon,
    pub direction: Direction,
    /// Fraction of capital to stake; zero for `NoTrade`
    pub fraction: f64,
    /// `None` for `NoTrade`
    pub confidence_tier: Option<ConfidenceTier>,
    /// Probability of the chosen side winning
    pub win_probability: Option<f64>,
    pub explanation: String,
}

impl PositionRecommendation {
    pub fn no_trade(horizon: Horizon, explanation: impl Into<String>) -> Self {
        Self {
            horizon,
            direction: Direction::NoTrade,
            fraction: 0.0,
            confidence_tier: None,
            win_probability: None,
            explanation: explanation.into(),
        }
    }

    pub fn is_trade(&self) -> bool {
        self.direction != Direction::NoTrade
    }
}

impl fmt::Display for PositionRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.direction, self.confidence_tier) {
            (Direction::NoTrade, _) | (_, None) => {
                writeln!(f, "[{} position: {}]", self.horizon, self.direction)?;
                write!(f, "  Reason: {}", self.explanation)
            }
            (direction, Some(tier)) => {
                let pct = self.fraction * 100.0;
                writeln!(f, "[{} position: {} {:.1}% {}]", self.horizon, direction, pct, tier.badge())?;
                let action = if direction == Direction::Long { "buy calls" } else { "buy puts" };
                writeln!(f, "  Advice: {}, {} with {:.1}% of capital", tier.advice(), action, pct)?;
                write!(f, "  Reason: {}", self.explanation)
            }
        }
    }
}
