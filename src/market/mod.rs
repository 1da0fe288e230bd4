//! Market data: candle decoding, window statistics and the Binance source
//!
//! ```text
//! /api/v3/klines rows → Candle[] → MarketStatsComputer → MarketSummary
//! ```

mod binance;

pub use binance::{BinanceClient, Ticker24h};

use crate::error::{ForecastError, Result};
use crate::types::{Candle, MarketSummary};
use chrono::DateTime;
use serde_json::Value;

/// Computes a [`MarketSummary`] from a time-ordered candle window.
///
/// Stateless: every call derives the summary from the slice it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketStatsComputer;

impl MarketStatsComputer {
    pub fn new() -> Self {
        Self
    }

    /// Summarize `candles` for `symbol`.
    ///
    /// Fails with `InsufficientData` on an empty window and with
    /// `DegenerateInput` when a percentage would divide by zero or a
    /// candle carries a non-finite value.
    pub fn summarize(&self, symbol: &str, candles: &[Candle]) -> Result<MarketSummary> {
        let (first, last) = match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ForecastError::InsufficientData),
        };

        if let Some(bad) = candles.iter().find(|c| !Self::is_finite(c)) {
            return Err(ForecastError::DegenerateInput(format!(
                "non-finite value in candle at {}",
                bad.open_time
            )));
        }

        if first.open == 0.0 {
            return Err(ForecastError::DegenerateInput(
                "first open price is zero, price change undefined".to_string(),
            ));
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volatility_percent = Self::calculate_volatility_percent(&closes)?;

        let highest_price = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest_price = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let avg_volume = candles.iter().map(|c| c.volume).sum::<f64>() / candles.len() as f64;
        let price_change_percent = (last.close - first.open) / first.open * 100.0;

        Ok(MarketSummary {
            symbol: symbol.to_string(),
            latest_price: last.close,
            highest_price,
            lowest_price,
            price_change_percent,
            volatility_percent,
            avg_volume,
            start_time: first.open_time,
            end_time: last.open_time,
            sample_count: candles.len(),
        })
    }

    /// Population standard deviation of closes over their mean, in percent
    fn calculate_volatility_percent(closes: &[f64]) -> Result<f64> {
        let n = closes.len() as f64;
        let mean = closes.iter().sum::<f64>() / n;
        if mean == 0.0 {
            return Err(ForecastError::DegenerateInput(
                "mean close price is zero, volatility undefined".to_string(),
            ));
        }

        let variance = closes.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        Ok(variance.sqrt() / mean * 100.0)
    }

    fn is_finite(c: &Candle) -> bool {
        [c.open, c.high, c.low, c.close, c.volume].iter().all(|v| v.is_finite())
    }
}

/// Decode one kline row `[open_time_ms, open, high, low, close, volume, ...]`.
///
/// Numeric fields may arrive as JSON numbers or numeric strings; anything
/// after the sixth field is ignored.
pub fn decode_kline(row: &[Value]) -> Result<Candle> {
    if row.len() < 6 {
        return Err(ForecastError::MalformedKline(format!(
            "expected at least 6 fields, got {}",
            row.len()
        )));
    }

    let open_time_ms = row[0]
        .as_i64()
        .or_else(|| row[0].as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| ForecastError::MalformedKline(format!("bad open time: {}", row[0])))?;
    let open_time = DateTime::from_timestamp_millis(open_time_ms)
        .ok_or_else(|| ForecastError::MalformedKline(format!("open time out of range: {}", open_time_ms)))?;

    Ok(Candle {
        open_time,
        open: number_field(&row[1], "open")?,
        high: number_field(&row[2], "high")?,
        low: number_field(&row[3], "low")?,
        close: number_field(&row[4], "close")?,
        volume: number_field(&row[5], "volume")?,
    })
}

/// Decode a JSON array of kline rows, preserving order
pub fn decode_klines(value: &Value) -> Result<Vec<Candle>> {
    let rows = value
        .as_array()
        .ok_or_else(|| ForecastError::MalformedKline("expected an array of kline rows".to_string()))?;

    rows.iter()
        .map(|row| {
            row.as_array()
                .ok_or_else(|| ForecastError::MalformedKline(format!("row is not an array: {}", row)))
                .and_then(|fields| decode_kline(fields))
        })
        .collect()
}

fn number_field(value: &Value, name: &str) -> Result<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| ForecastError::MalformedKline(format!("bad {} field: {}", name, value)))
}
