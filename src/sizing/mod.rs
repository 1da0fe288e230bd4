//! Kelly position sizing
//!
//! Turns a directional probability into a bounded position fraction.
//! Payout model: a win returns `b` per unit staked (default 0.8), a loss
//! costs the full stake.

#[cfg(test)]
mod tests;

use crate::config::SizingConfig;
use crate::types::{ConfidenceTier, Direction, HorizonPrediction, PositionRecommendation, Trend};
use tracing::debug;

/// Full Kelly for a bet with win probability `p` and payout ratio `b`,
/// floored at zero.
///
/// Kelly formula: f* = (b * p - q) / b, with q = 1 - p
pub fn full_kelly(p: f64, b: f64) -> f64 {
    let q = 1.0 - p;
    ((b * p - q) / b).max(0.0)
}

/// Position sizer based on fractional Kelly
#[derive(Debug, Clone)]
pub struct KellyPositionSizer {
    config: SizingConfig,
}

impl Default for KellyPositionSizer {
    fn default() -> Self {
        Self::new(SizingConfig::default())
    }
}

impl KellyPositionSizer {
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// Fractional Kelly stake for a side that wins with `win_probability`
    pub fn kelly_fraction(&self, win_probability: f64) -> f64 {
        full_kelly(win_probability, self.config.payout_ratio) * self.config.kelly_multiplier
    }

    /// (long, short) fractions for an up probability, before flooring
    pub fn side_fractions(&self, up_probability: f64) -> (f64, f64) {
        (
            self.kelly_fraction(up_probability),
            self.kelly_fraction(1.0 - up_probability),
        )
    }

    pub fn tier_for(&self, fraction: f64) -> ConfidenceTier {
        if fraction > self.config.strong_threshold {
            ConfidenceTier::Strong
        } else if fraction > self.config.moderate_threshold {
            ConfidenceTier::Moderate
        } else {
            ConfidenceTier::Cautious
        }
    }

    /// Size a position for one horizon prediction.
    ///
    /// A prediction without an up probability, or whose best side falls
    /// under the floor, yields `NoTrade` with zero fraction.
    pub fn size(&self, prediction: &HorizonPrediction) -> PositionRecommendation {
        let horizon = prediction.horizon;
        let up = match prediction.up_probability {
            Some(p) if (0.0..=1.0).contains(&p) => p,
            _ => {
                return PositionRecommendation::no_trade(
                    horizon,
                    "Cannot size: the forecast gave no usable up probability",
                );
            }
        };

        let (long, short) = self.side_fractions(up);
        // Ties go long
        let (direction, fraction, win_probability) = if long >= short {
            (Direction::Long, long, up)
        } else {
            (Direction::Short, short, 1.0 - up)
        };

        debug!(
            "{}: up={:.2} long={:.4} short={:.4} -> {:?}",
            horizon, up, long, short, direction
        );

        if fraction < self.config.min_fraction {
            return PositionRecommendation::no_trade(
                horizon,
                "Win rate too low: predicted edge does not outweigh the risk",
            );
        }

        let fraction = fraction.min(self.config.max_fraction);
        let tier = self.tier_for(fraction);

        PositionRecommendation {
            horizon,
            direction,
            fraction,
            confidence_tier: Some(tier),
            win_probability: Some(win_probability),
            explanation: explain(direction, win_probability, prediction),
        }
    }
}

fn explain(direction: Direction, win_probability: f64, prediction: &HorizonPrediction) -> String {
    let pct = win_probability * 100.0;
    let (side, move_word, against_word) = match direction {
        Direction::Short => ("Short", "Down", "upside"),
        _ => ("Long", "Up", "downside"),
    };

    let mut reason = match prediction.trend {
        None => format!("{} win rate {:.0}%", side, pct),
        Some(trend) => {
            let confirming = match direction {
                Direction::Short => Trend::Falling,
                _ => Trend::Rising,
            };
            if trend == confirming {
                format!(
                    "{} probability {:.0}% and trend {}, signals agree",
                    move_word, pct, trend
                )
            } else if trend == Trend::Oscillating {
                format!(
                    "{} probability {:.0}% is favourable; trend {} but the move is still open",
                    move_word, pct, trend
                )
            } else {
                format!(
                    "{} probability {:.0}% beats the {}, but trend {} disagrees, be cautious",
                    move_word, pct, against_word, trend
                )
            }
        }
    };

    if let Some(target) = prediction.target_range {
        reason.push_str(&format!(", target {}", target));
    }
    reason
}
