//! Configuration management
//!
//! Settings come from an optional TOML file overlaid with environment
//! variables prefixed `FORECAST__` (e.g. `FORECAST__LLM__API_KEY`).

use crate::error::{ForecastError, Result};
use crate::types::Horizon;
use serde::Deserialize;
use std::path::Path;

/// Largest page `/api/v3/klines` serves per request
pub const MAX_KLINE_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub binance: BinanceConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceConfig {
    #[serde(default = "default_binance_url")]
    pub base_url: String,
    /// Kline interval, e.g. "1m"
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Number of candles per window
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_binance_timeout")]
    pub timeout_secs: u64,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: default_binance_url(),
            interval: default_interval(),
            limit: default_limit(),
            timeout_secs: default_binance_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// "openai", "deepseek", "grok", "ollama" or anything OpenAI-compatible
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    /// Extra attempts after the first failed call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            model: None,
            base_url: None,
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Kelly sizing policy
#[derive(Debug, Clone, Deserialize)]
pub struct SizingConfig {
    /// Profit per unit staked on a win; a loss costs the full stake
    #[serde(default = "default_payout_ratio")]
    pub payout_ratio: f64,
    /// Multiplier applied to full Kelly (0.5 = half Kelly)
    #[serde(default = "default_kelly_multiplier")]
    pub kelly_multiplier: f64,
    /// Fractions below this are reported as no trade
    #[serde(default = "default_min_fraction")]
    pub min_fraction: f64,
    /// Hard cap on any recommended fraction
    #[serde(default = "default_max_fraction")]
    pub max_fraction: f64,
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: f64,
    #[serde(default = "default_moderate_threshold")]
    pub moderate_threshold: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            payout_ratio: default_payout_ratio(),
            kelly_multiplier: default_kelly_multiplier(),
            min_fraction: default_min_fraction(),
            max_fraction: default_max_fraction(),
            strong_threshold: default_strong_threshold(),
            moderate_threshold: default_moderate_threshold(),
        }
    }
}

impl SizingConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ForecastError::Config(config::ConfigError::Message(msg.to_string())));

        if !(self.payout_ratio > 0.0) {
            return invalid("sizing.payout_ratio must be positive");
        }
        if !(self.kelly_multiplier > 0.0 && self.kelly_multiplier <= 1.0) {
            return invalid("sizing.kelly_multiplier must be in (0, 1]");
        }
        if self.min_fraction < 0.0 || self.max_fraction <= 0.0 {
            return invalid("sizing.min_fraction must be >= 0 and sizing.max_fraction > 0");
        }
        if self.min_fraction > self.moderate_threshold
            || self.moderate_threshold > self.strong_threshold
            || self.strong_threshold > self.max_fraction
        {
            return invalid("sizing thresholds must satisfy min <= moderate <= strong <= max");
        }
        Ok(())
    }
}

/// Language the forecaster is asked to reply in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyLanguage {
    #[default]
    English,
    Chinese,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Horizons every report must cover, in display order
    #[serde(default = "default_horizons")]
    pub horizons: Vec<Horizon>,
    #[serde(default)]
    pub language: ReplyLanguage,
}

impl PipelineConfig {
    /// Horizons must be non-empty and listed at most once
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ForecastError::Config(config::ConfigError::Message(msg)));

        if self.horizons.is_empty() {
            return invalid("pipeline.horizons must not be empty".to_string());
        }
        for (i, horizon) in self.horizons.iter().enumerate() {
            if self.horizons[..i].contains(horizon) {
                return invalid(format!("pipeline.horizons lists {} more than once", horizon));
            }
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizons: default_horizons(),
            language: ReplyLanguage::default(),
        }
    }
}

/// Explicit proxy settings handed to HTTP clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Proxy URL for HTTPS traffic, falling back to the HTTP proxy.
    ///
    /// Local proxies rarely speak TLS themselves, so an `https://` scheme is
    /// rewritten to `http://`.
    pub fn https_proxy(&self) -> Option<String> {
        self.https
            .as_deref()
            .or(self.http.as_deref())
            .filter(|url| !url.trim().is_empty())
            .map(normalize_proxy_url)
    }

    pub fn http_proxy(&self) -> Option<String> {
        self.http
            .as_deref()
            .or(self.https.as_deref())
            .filter(|url| !url.trim().is_empty())
            .map(normalize_proxy_url)
    }

    pub fn is_empty(&self) -> bool {
        self.http_proxy().is_none() && self.https_proxy().is_none()
    }

    /// Apply the proxy settings to a reqwest client builder
    pub fn apply(&self, mut builder: reqwest::ClientBuilder) -> Result<reqwest::ClientBuilder> {
        if let Some(url) = self.http_proxy() {
            builder = builder.proxy(reqwest::Proxy::http(&url)?);
        }
        if let Some(url) = self.https_proxy() {
            builder = builder.proxy(reqwest::Proxy::https(&url)?);
        }
        Ok(builder)
    }
}

fn normalize_proxy_url(url: &str) -> String {
    let url = url.trim();
    match url.strip_prefix("https://") {
        Some(rest) => format!("http://{}", rest),
        None => url.to_string(),
    }
}

fn default_binance_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_interval() -> String {
    "1m".to_string()
}

fn default_limit() -> u32 {
    MAX_KLINE_LIMIT
}

fn default_binance_timeout() -> u64 {
    30
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_payout_ratio() -> f64 {
    0.8
}

fn default_kelly_multiplier() -> f64 {
    0.5
}

fn default_min_fraction() -> f64 {
    0.01
}

fn default_max_fraction() -> f64 {
    0.5
}

fn default_strong_threshold() -> f64 {
    0.20
}

fn default_moderate_threshold() -> f64 {
    0.10
}

fn default_horizons() -> Vec<Horizon> {
    Horizon::ALL.to_vec()
}

impl Config {
    /// Load configuration from file (optional) and environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("FORECAST")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.sizing.validate()?;
        cfg.pipeline.validate()?;

        tracing::debug!(
            "Loaded config: provider={} interval={} limit={}",
            cfg.llm.provider,
            cfg.binance.interval,
            cfg.binance.limit
        );
        Ok(cfg)
    }
}
