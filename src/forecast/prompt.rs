//! Forecast request builder

use crate::config::ReplyLanguage;
use crate::types::{Horizon, MarketSummary};
use std::fmt::Write;

/// Compose the forecast prompt for `asset` from a market summary.
///
/// Pure formatting: identical inputs always produce the identical prompt.
pub fn build_prompt(
    asset: &str,
    summary: &MarketSummary,
    horizons: &[Horizon],
    language: ReplyLanguage,
) -> String {
    let hours = summary.span().num_minutes() as f64 / 60.0;
    let horizon_list = horizons
        .iter()
        .map(|h| format!("{} minutes", h.minutes()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Analyze the current {asset} price trend and predict price trends for the next {horizon_list}."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Below is market data from the past {:.1} hours:", hours);
    let _ = writeln!(prompt, "Latest price: {:.2} USDT", summary.latest_price);
    let _ = writeln!(prompt, "Price change: {:.2}%", summary.price_change_percent);
    let _ = writeln!(prompt, "Highest price: {:.2} USDT", summary.highest_price);
    let _ = writeln!(prompt, "Lowest price: {:.2} USDT", summary.lowest_price);
    let _ = writeln!(prompt, "Volatility: {:.2}%", summary.volatility_percent);
    let _ = writeln!(prompt, "Average volume: {:.2}", summary.avg_volume);
    let _ = writeln!(
        prompt,
        "Data range: {} to {} ({} samples)",
        summary.start_time.format("%Y-%m-%d %H:%M"),
        summary.end_time.format("%Y-%m-%d %H:%M"),
        summary.sample_count
    );
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Combine the price data above with your knowledge of the cryptocurrency market, \
         current sentiment, technical indicators and macroeconomic factors."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "For each time period ({horizon_list}), provide:");
    let _ = writeln!(prompt, "1. Probability of rise and fall (percentage)");
    let _ = writeln!(prompt, "2. Overall trend classification: \"Oscillating\", \"Rising\", or \"Falling\"");
    let _ = writeln!(prompt, "3. Target price range (approximate price levels that may be reached)");
    let _ = writeln!(prompt, "4. Brief reason for the prediction (one sentence)");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Use these emojis to indicate rise and fall: ⬆️ ⬇️");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Format, one line per time period:");
    for (horizon, trend) in horizons.iter().zip(example_trends(language).iter().cycle()) {
        let _ = writeln!(prompt, "{}", example_line(*horizon, trend, language));
    }
    let _ = writeln!(prompt);
    let _ = write!(
        prompt,
        "Important: reply in plain text without HTML tags{}. \
         Do not add explanations or other content, output exactly {} lines in the format above.",
        match language {
            ReplyLanguage::English => "",
            ReplyLanguage::Chinese => ", in Chinese, keeping the markers exactly as shown",
        },
        horizons.len()
    );

    prompt
}

fn example_trends(language: ReplyLanguage) -> [&'static str; 3] {
    match language {
        ReplyLanguage::English => ["Rising", "Oscillating", "Falling"],
        ReplyLanguage::Chinese => ["上升", "震荡", "下跌"],
    }
}

fn example_line(horizon: Horizon, trend: &str, language: ReplyLanguage) -> String {
    match language {
        ReplyLanguage::English => format!(
            "{}: ⬆️x% ⬇️y% - Trend: {} - Target: a-b - Reason: one-sentence summary",
            horizon.label(),
            trend
        ),
        ReplyLanguage::Chinese => format!(
            "{}分钟: ⬆️x% ⬇️y% - 趋势: {} - 目标价: a-b - 理由: 一句话总结",
            horizon.minutes(),
            trend
        ),
    }
}
