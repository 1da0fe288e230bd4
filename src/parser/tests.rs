//! Unit tests for prediction text parser

#[cfg(test)]
mod tests {
    use super::super::*;

    const REPLY: &str = "\
Here is my analysis:
10-minute: ⬆️65% ⬇️35% - Trend: Rising - Target: 95000-96000 - Reason: x
30-minute: ⬆️55% ⬇️45% - Trend: Oscillating - Target: 94000-97000 - Reason: sentiment is cautious
60-minute: ⬆️45% ⬇️55% - Trend: Falling - Target: 92000-95000 - Reason: profit taking pressure
Hope this helps!";

    #[test]
    fn test_reference_line() {
        let parser = PredictionTextParser::new();
        let p = parser
            .parse_line("10-minute: ⬆️65% ⬇️35% - Trend: Rising - Target: 95000-96000 - Reason: x")
            .unwrap();

        assert_eq!(p.horizon, Horizon::TenMinutes);
        assert_eq!(p.up_probability, Some(0.65));
        assert_eq!(p.trend, Some(Trend::Rising));
        assert_eq!(p.target_range, Some(TargetRange { low: 95000.0, high: 96000.0 }));
        assert_eq!(p.rationale.as_deref(), Some("x"));
    }

    #[test]
    fn test_full_reply_preserves_order_and_skips_noise() {
        let predictions = PredictionTextParser::new().parse_all(REPLY);
        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0].horizon, Horizon::TenMinutes);
        assert_eq!(predictions[1].horizon, Horizon::ThirtyMinutes);
        assert_eq!(predictions[2].horizon, Horizon::SixtyMinutes);
        assert_eq!(predictions[1].trend, Some(Trend::Oscillating));
        assert_eq!(predictions[2].up_probability, Some(0.45));
        assert_eq!(predictions[2].rationale.as_deref(), Some("profit taking pressure"));
    }

    #[test]
    fn test_parse_is_idempotent_and_restartable() {
        let parser = PredictionTextParser::new();
        assert_eq!(parser.parse_all(REPLY), parser.parse_all(REPLY));

        let mut iter = parser.parse(REPLY);
        let first = iter.next().unwrap();
        let rest: Vec<_> = iter.clone().collect();
        assert_eq!(rest.len(), 2);

        let restarted: Vec<_> = iter.restart().collect();
        assert_eq!(restarted.len(), 3);
        assert_eq!(restarted[0], first);
        assert!(iter.next().is_some());
    }

    #[test]
    fn test_lazy_iterator_is_fused() {
        let mut iter = PredictionTextParser::new().parse("10-minute: ⬆️60%");
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_requires_horizon_and_glyph() {
        let parser = PredictionTextParser::new();
        assert!(parser.parse_line("10-minute: 65% up - Trend: Rising").is_none());
        assert!(parser.parse_line("⬆️65% ⬇️35% - Trend: Rising").is_none());
        assert!(parser.parse_line("").is_none());
        assert!(parser.parse_line("10-minute: ⬇️70%").is_some());
    }

    #[test]
    fn test_no_glyphs_anywhere_yields_empty() {
        let text = "The market looks uncertain.\n10 minutes: likely up\n30 minutes: flat";
        assert_eq!(PredictionTextParser::new().parse(text).count(), 0);
    }

    #[test]
    fn test_qualifying_line_without_up_probability() {
        let p = PredictionTextParser::new()
            .parse_line("30-minute: ⬇️70% - Trend: Falling")
            .unwrap();
        assert_eq!(p.horizon, Horizon::ThirtyMinutes);
        assert_eq!(p.up_probability, None);
        assert_eq!(p.trend, Some(Trend::Falling));
    }

    #[test]
    fn test_up_glyph_must_be_followed_by_percentage() {
        let p = PredictionTextParser::new()
            .parse_line("10-minute: ⬆️/⬇️x% - Trend: Rising")
            .unwrap();
        assert_eq!(p.up_probability, None);
    }

    #[test]
    fn test_out_of_range_probability_discarded() {
        let p = PredictionTextParser::new()
            .parse_line("10-minute: ⬆️150% ⬇️0%")
            .unwrap();
        assert_eq!(p.up_probability, None);
    }

    #[test]
    fn test_probability_bounds_inclusive() {
        let parser = PredictionTextParser::new();
        assert_eq!(parser.parse_line("10-minute: ⬆️100%").unwrap().up_probability, Some(1.0));
        assert_eq!(parser.parse_line("10-minute: ⬆️0%").unwrap().up_probability, Some(0.0));
    }

    #[test]
    fn test_first_up_pattern_wins() {
        let p = PredictionTextParser::new()
            .parse_line("10-minute: ⬆️40% then ⬆️90%")
            .unwrap();
        assert_eq!(p.up_probability, Some(0.40));
    }

    #[test]
    fn test_glyph_without_variation_selector() {
        let p = PredictionTextParser::new().parse_line("10-minute: ⬆62% ⬇38%").unwrap();
        assert_eq!(p.up_probability, Some(0.62));
    }

    #[test]
    fn test_horizon_tie_break_canonical_order() {
        let parser = PredictionTextParser::new();
        let p = parser
            .parse_line("60-minute: ⬆️45% - Reason: the 10-minute move fades")
            .unwrap();
        assert_eq!(p.horizon, Horizon::TenMinutes);

        let p = parser.parse_line("60 minutes vs 30 minutes: ⬆️51%").unwrap();
        assert_eq!(p.horizon, Horizon::ThirtyMinutes);
    }

    #[test]
    fn test_horizon_token_variants() {
        let parser = PredictionTextParser::new();
        assert_eq!(parser.parse_line("10 minutes: ⬆️60%").unwrap().horizon, Horizon::TenMinutes);
        assert_eq!(parser.parse_line("30min ⬆️60%").unwrap().horizon, Horizon::ThirtyMinutes);
        assert_eq!(parser.parse_line("60m: ⬆️60%").unwrap().horizon, Horizon::SixtyMinutes);
        assert_eq!(parser.parse_line("60分钟: ⬆️60%").unwrap().horizon, Horizon::SixtyMinutes);
        assert!(parser.parse_line("110-minute: ⬆️60%").is_none());
        assert!(parser.parse_line("10 more: ⬆️60%").is_none());
    }

    #[test]
    fn test_chinese_line() {
        let p = PredictionTextParser::new()
            .parse_line("10分钟: ⬆️65% ⬇️35% - 趋势: 上升 - 目标价: 95000-96000 - 理由: 技术指标显示短期看涨")
            .unwrap();
        assert_eq!(p.horizon, Horizon::TenMinutes);
        assert_eq!(p.up_probability, Some(0.65));
        assert_eq!(p.trend, Some(Trend::Rising));
        assert_eq!(p.target_range, Some(TargetRange { low: 95000.0, high: 96000.0 }));
        assert_eq!(p.rationale.as_deref(), Some("技术指标显示短期看涨"));
    }

    #[test]
    fn test_unknown_trend_label_is_absent() {
        let p = PredictionTextParser::new()
            .parse_line("10-minute: ⬆️60% - Trend: Choppy-ish")
            .unwrap();
        assert_eq!(p.trend, None);

        let p = PredictionTextParser::new()
            .parse_line("10-minute: ⬆️60% - Trend: Moonshot")
            .unwrap();
        assert_eq!(p.trend, None);
    }

    #[test]
    fn test_trend_label_followed_by_sentence_punctuation() {
        let parser = PredictionTextParser::new();
        let p = parser
            .parse_line("10-minute: ⬆️60% ⬇️40%. Trend: Rising. Target: 95000-96000.")
            .unwrap();
        assert_eq!(p.trend, Some(Trend::Rising));
        assert_eq!(p.target_range, Some(TargetRange { low: 95000.0, high: 96000.0 }));

        let p = parser.parse_line("30分钟: ⬆️40% - 趋势: 下跌。目标价: 93000-94000").unwrap();
        assert_eq!(p.trend, Some(Trend::Falling));
    }

    #[test]
    fn test_target_variants() {
        let parser = PredictionTextParser::new();
        let p = parser.parse_line("10-minute: ⬆️60% - Target price: $95,000.50 - $96,100").unwrap();
        assert_eq!(p.target_range, Some(TargetRange { low: 95000.5, high: 96100.0 }));

        let p = parser.parse_line("10-minute: ⬆️60% - Target: 96000-95000").unwrap();
        assert_eq!(p.target_range, Some(TargetRange { low: 95000.0, high: 96000.0 }));
    }

    #[test]
    fn test_malformed_target_is_absent() {
        let parser = PredictionTextParser::new();
        assert_eq!(parser.parse_line("10-minute: ⬆️60% - Target: 95000").unwrap().target_range, None);
        assert_eq!(parser.parse_line("10-minute: ⬆️60% - Target: a-b").unwrap().target_range, None);
    }

    #[test]
    fn test_rationale_without_reason_marker() {
        let parser = PredictionTextParser::new();
        let p = parser
            .parse_line("10-minute: ⬆️65% ⬇️35% - Trend: Rising - strong bid support")
            .unwrap();
        assert_eq!(p.rationale.as_deref(), Some("strong bid support"));

        let p = parser.parse_line("10-minute: ⬆️65% ⬇️35%").unwrap();
        assert_eq!(p.rationale, None);
    }
}
