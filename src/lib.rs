//! Crypto Trend Forecaster
//!
//! Summarizes recent candles, asks an LLM for short-horizon forecasts and
//! turns each forecast into a half-Kelly position recommendation.
//!
//! ## Architecture
//!
//! ```text
//! Binance klines → MarketStats → Prompt → Forecaster (LLM) → Parser → Kelly Sizer → Report
//!                                                                        ↑
//!                                                   Sizing policy (payout, floor, tiers)
//! ```

pub mod config;
pub mod error;
pub mod forecast;
pub mod market;
pub mod parser;
pub mod pipeline;
pub mod sizing;
pub mod types;

#[cfg(test)]
mod error_tests;
