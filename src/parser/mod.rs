//! Prediction text parser
//!
//! Extracts per-horizon predictions from the forecaster's free-text reply.
//! A line is considered only when it names a horizon (`10-minute`,
//! `30 minutes`, `60分钟`, ...) and carries a direction glyph (⬆ or ⬇).
//! Everything else is noise and is skipped without error.
//!
//! Recognized fields on a qualifying line:
//!
//! ```text
//! 10-minute: ⬆️65% ⬇️35% - Trend: Rising - Target: 95000-96000 - Reason: ...
//!            ^^^^^          ^^^^^^^^^^^^^   ^^^^^^^^^^^^^^^^^^^   ^^^^^^^^^^^
//!            up prob        trend label     target range          rationale
//! ```

#[cfg(test)]
mod tests;

use crate::types::{Horizon, HorizonPrediction, TargetRange, Trend};
use regex::Regex;
use std::str::Lines;
use std::sync::LazyLock;
use tracing::debug;

macro_rules! re {
    ($pat:expr) => {
        LazyLock::new(|| Regex::new($pat).unwrap())
    };
}

static RE_H10: LazyLock<Regex> = re!(r"(?i)(?:^|\D)10\s*-?\s*(?:minutes?|mins?|分钟|m\b)");
static RE_H30: LazyLock<Regex> = re!(r"(?i)(?:^|\D)30\s*-?\s*(?:minutes?|mins?|分钟|m\b)");
static RE_H60: LazyLock<Regex> = re!(r"(?i)(?:^|\D)60\s*-?\s*(?:minutes?|mins?|分钟|m\b)");
static RE_UP_PROB: LazyLock<Regex> = re!(r"⬆\x{FE0F}?(\d+)%");
static RE_DOWN_PROB: LazyLock<Regex> = re!(r"⬇\x{FE0F}?(\d+)%");
static RE_TREND: LazyLock<Regex> = re!(r"(?i)(?:trend|趋势)\s*[:：]\s*([^\s\-–—,，;；.。|]+)");
static RE_TARGET: LazyLock<Regex> = re!(
    r"(?i)(?:target(?:\s+price)?|目标价位?)\s*[:：]\s*\$?(\d[\d,]*(?:\.\d+)?)\s*[-–~～]\s*\$?(\d[\d,]*(?:\.\d+)?)"
);
static RE_REASON: LazyLock<Regex> = re!(r"(?i)(?:reason|rationale|理由)\s*[:：]\s*(.*)$");

const UP_GLYPH: char = '⬆';
const DOWN_GLYPH: char = '⬇';

/// Stateless parser over forecast text
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionTextParser;

impl PredictionTextParser {
    pub fn new() -> Self {
        Self
    }

    /// Lazily parse `text`, one prediction per qualifying line, in input order
    pub fn parse<'a>(&self, text: &'a str) -> ParsedPredictions<'a> {
        ParsedPredictions {
            text,
            lines: text.lines(),
        }
    }

    /// Parse a single line; `None` if it does not qualify
    pub fn parse_line(&self, line: &str) -> Option<HorizonPrediction> {
        let line = line.trim();
        if !line.contains(UP_GLYPH) && !line.contains(DOWN_GLYPH) {
            return None;
        }
        let (horizon, mut marker_end) = detect_horizon(line)?;

        if let Some(m) = RE_DOWN_PROB.find(line) {
            marker_end = marker_end.max(m.end());
        }

        let up_probability = RE_UP_PROB.captures(line).and_then(|caps| {
            let m = caps.get(0)?;
            marker_end = marker_end.max(m.end());
            let pct: u32 = caps[1].parse().ok()?;
            if pct > 100 {
                debug!("Discarding out-of-range probability {}% in: {}", pct, line);
                return None;
            }
            Some(pct as f64 / 100.0)
        });

        let trend = RE_TREND.captures(line).and_then(|caps| {
            marker_end = marker_end.max(caps.get(0)?.end());
            Trend::from_label(&caps[1])
        });

        let target_range = RE_TARGET.captures(line).and_then(|caps| {
            marker_end = marker_end.max(caps.get(0)?.end());
            let low = parse_number(&caps[1])?;
            let high = parse_number(&caps[2])?;
            Some(if low <= high {
                TargetRange { low, high }
            } else {
                TargetRange { low: high, high: low }
            })
        });

        let rationale = match RE_REASON.captures(line) {
            Some(caps) => clean_rationale(&caps[1]),
            None => clean_rationale(&line[marker_end..]),
        };

        Some(HorizonPrediction {
            horizon,
            up_probability,
            trend,
            target_range,
            rationale,
            line: line.to_string(),
        })
    }

    /// Collect all predictions, eagerly
    pub fn parse_all(&self, text: &str) -> Vec<HorizonPrediction> {
        self.parse(text).collect()
    }
}

/// Lazy, finite sequence of predictions over a borrowed text.
///
/// Cloning (or calling [`restart`](Self::restart)) yields an independent
/// iterator; the underlying text is never consumed.
#[derive(Debug, Clone)]
pub struct ParsedPredictions<'a> {
    text: &'a str,
    lines: Lines<'a>,
}

impl<'a> ParsedPredictions<'a> {
    /// A fresh iterator from the first line
    pub fn restart(&self) -> ParsedPredictions<'a> {
        PredictionTextParser::new().parse(self.text)
    }

    pub fn text(&self) -> &'a str {
        self.text
    }
}

impl<'a> Iterator for ParsedPredictions<'a> {
    type Item = HorizonPrediction;

    fn next(&mut self) -> Option<Self::Item> {
        let parser = PredictionTextParser::new();
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            match parser.parse_line(line) {
                Some(prediction) => return Some(prediction),
                None => debug!("Skipping non-qualifying line: {}", line.trim()),
            }
        }
        None
    }
}

impl std::iter::FusedIterator for ParsedPredictions<'_> {}

/// First horizon present in canonical order (10 < 30 < 60), with the end
/// offset of its token
fn detect_horizon(line: &str) -> Option<(Horizon, usize)> {
    Horizon::ALL.into_iter().find_map(|h| {
        let re: &Regex = match h {
            Horizon::TenMinutes => &RE_H10,
            Horizon::ThirtyMinutes => &RE_H30,
            Horizon::SixtyMinutes => &RE_H60,
        };
        re.find(line).map(|m| (h, m.end()))
    })
}

fn parse_number(s: &str) -> Option<f64> {
    s.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn clean_rationale(s: &str) -> Option<String> {
    let trimmed = s
        .trim()
        .trim_start_matches(|c: char| c.is_whitespace() || "-–—|,，;；:：".contains(c))
        .trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
