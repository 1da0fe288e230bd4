//! Unit tests for Kelly sizing

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::types::{Horizon, TargetRange};

    const EPS: f64 = 1e-9;

    fn prediction(up: Option<f64>, trend: Option<Trend>) -> HorizonPrediction {
        HorizonPrediction {
            horizon: Horizon::TenMinutes,
            up_probability: up,
            trend,
            target_range: None,
            rationale: None,
            line: String::new(),
        }
    }

    /// Closed form from the payout model, b = 0.8, half Kelly
    fn closed_form(p: f64) -> f64 {
        let b = 0.8;
        ((b * p - (1.0 - p)) / b).max(0.0) / 2.0
    }

    #[test]
    fn test_reference_long_sizing() {
        let sizer = KellyPositionSizer::default();
        let mut p = prediction(Some(0.65), Some(Trend::Rising));
        p.target_range = Some(TargetRange { low: 95000.0, high: 96000.0 });

        let rec = sizer.size(&p);
        assert_eq!(rec.direction, Direction::Long);
        // (0.8 * 0.65 - 0.35) / 0.8 / 2
        assert!((rec.fraction - 0.10625).abs() < EPS);
        assert!((rec.fraction - closed_form(0.65)).abs() < EPS);
        assert_eq!(rec.confidence_tier, Some(ConfidenceTier::Moderate));
        assert_eq!(rec.win_probability, Some(0.65));
        assert!(rec.explanation.contains("signals agree"));
        assert!(rec.explanation.contains("target 95000-96000"));
    }

    #[test]
    fn test_short_chosen_below_half() {
        let sizer = KellyPositionSizer::default();
        let (long, short) = sizer.side_fractions(0.40);
        assert_eq!(long, 0.0);
        assert!((short - 0.05).abs() < EPS);

        let rec = sizer.size(&prediction(Some(0.40), None));
        assert_eq!(rec.direction, Direction::Short);
        assert!((rec.fraction - 0.05).abs() < EPS);
        assert_eq!(rec.confidence_tier, Some(ConfidenceTier::Cautious));
        assert!((rec.win_probability.unwrap() - 0.60).abs() < EPS);
        assert_eq!(rec.explanation, "Short win rate 60%");
    }

    #[test]
    fn test_even_odds_fixture() {
        // 0.8 * 0.5 - 0.5 < 0 on both sides
        let sizer = KellyPositionSizer::default();
        let (long, short) = sizer.side_fractions(0.5);
        assert_eq!(long, 0.0);
        assert_eq!(short, 0.0);
        assert!((long - closed_form(0.5)).abs() < EPS);

        let rec = sizer.size(&prediction(Some(0.5), Some(Trend::Rising)));
        assert_eq!(rec.direction, Direction::NoTrade);
        assert_eq!(rec.fraction, 0.0);
        assert!(rec.explanation.contains("Win rate too low"));
    }

    #[test]
    fn test_matches_closed_form_everywhere() {
        let sizer = KellyPositionSizer::default();
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let (long, short) = sizer.side_fractions(p);
            assert!((long - closed_form(p)).abs() < EPS, "long mismatch at p={}", p);
            assert!((short - closed_form(1.0 - p)).abs() < EPS, "short mismatch at p={}", p);
        }
    }

    #[test]
    fn test_fraction_bounds_and_no_trade_invariant() {
        let sizer = KellyPositionSizer::default();
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let rec = sizer.size(&prediction(Some(p), None));
            assert!(rec.fraction >= 0.0 && rec.fraction <= 0.5 + EPS, "p={} fraction={}", p, rec.fraction);
            if rec.direction == Direction::NoTrade {
                assert_eq!(rec.fraction, 0.0);
                assert!(rec.confidence_tier.is_none());
            } else {
                assert!(rec.fraction >= 0.01);
            }
        }
    }

    #[test]
    fn test_extremes() {
        let sizer = KellyPositionSizer::default();
        let rec = sizer.size(&prediction(Some(1.0), None));
        assert_eq!(rec.direction, Direction::Long);
        assert!((rec.fraction - 0.5).abs() < EPS);
        assert_eq!(rec.confidence_tier, Some(ConfidenceTier::Strong));

        let rec = sizer.size(&prediction(Some(0.0), None));
        assert_eq!(rec.direction, Direction::Short);
        assert!((rec.fraction - 0.5).abs() < EPS);
    }

    #[test]
    fn test_floor_suppresses_noise() {
        // break-even is 1 / 1.8 = 0.5556
        let sizer = KellyPositionSizer::default();
        let rec = sizer.size(&prediction(Some(0.56), None));
        assert_eq!(rec.direction, Direction::NoTrade);

        let rec = sizer.size(&prediction(Some(0.58), None));
        assert_eq!(rec.direction, Direction::Long);
    }

    #[test]
    fn test_missing_probability_cannot_size() {
        let rec = KellyPositionSizer::default().size(&prediction(None, Some(Trend::Rising)));
        assert_eq!(rec.direction, Direction::NoTrade);
        assert_eq!(rec.fraction, 0.0);
        assert!(rec.explanation.starts_with("Cannot size"));
    }

    #[test]
    fn test_tiers() {
        let sizer = KellyPositionSizer::default();
        assert_eq!(sizer.tier_for(0.25), ConfidenceTier::Strong);
        assert_eq!(sizer.tier_for(0.20), ConfidenceTier::Moderate);
        assert_eq!(sizer.tier_for(0.15), ConfidenceTier::Moderate);
        assert_eq!(sizer.tier_for(0.10), ConfidenceTier::Cautious);
        assert_eq!(sizer.tier_for(0.02), ConfidenceTier::Cautious);

        let rec = sizer.size(&prediction(Some(0.9), None));
        assert_eq!(rec.confidence_tier, Some(ConfidenceTier::Strong));
    }

    #[test]
    fn test_trend_branches() {
        let sizer = KellyPositionSizer::default();

        let long = |trend| sizer.size(&prediction(Some(0.7), Some(trend))).explanation;
        assert!(long(Trend::Rising).contains("signals agree"));
        assert!(long(Trend::Oscillating).contains("still open"));
        assert!(long(Trend::Falling).contains("disagrees"));

        let short = |trend| sizer.size(&prediction(Some(0.3), Some(trend))).explanation;
        assert!(short(Trend::Falling).contains("signals agree"));
        assert!(short(Trend::Oscillating).contains("still open"));
        assert!(short(Trend::Rising).contains("disagrees"));
        assert!(short(Trend::Rising).starts_with("Down probability 70%"));
    }

    #[test]
    fn test_sizing_is_idempotent() {
        let sizer = KellyPositionSizer::default();
        let p = prediction(Some(0.72), Some(Trend::Oscillating));
        assert_eq!(sizer.size(&p), sizer.size(&p));
    }

    #[test]
    fn test_custom_policy_cap() {
        let sizer = KellyPositionSizer::new(SizingConfig {
            max_fraction: 0.25,
            ..Default::default()
        });
        let rec = sizer.size(&prediction(Some(0.95), None));
        assert_eq!(rec.fraction, 0.25);
        assert_eq!(rec.confidence_tier, Some(ConfidenceTier::Strong));
    }

    #[test]
    fn test_full_kelly() {
        assert!((full_kelly(0.65, 0.8) - 0.2125).abs() < EPS);
        assert_eq!(full_kelly(0.3, 0.8), 0.0);
        assert!((full_kelly(0.6, 1.0) - 0.2).abs() < EPS);
    }
}
