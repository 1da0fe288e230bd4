//! OpenAI-compatible chat-completion forecaster

use super::{strip_markup, ForecastProvider};
use crate::config::{LlmConfig, ProxyConfig};
use crate::error::{ForecastError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Supported chat-completion backends
#[derive(Debug, Clone, PartialEq)]
pub enum LlmProvider {
    OpenAI { api_key: String, model: String, base_url: String },
    DeepSeek { api_key: String, model: String },
    Grok { api_key: String, model: String },
    Ollama { model: String, base_url: String },
    /// Any other OpenAI-compatible endpoint
    Compatible { api_key: Option<String>, model: String, base_url: String },
}

impl LlmProvider {
    pub fn from_config(config: &LlmConfig) -> Self {
        let model = |default: &str| config.model.clone().unwrap_or_else(|| default.to_string());
        let base_url = |default: &str| config.base_url.clone().unwrap_or_else(|| default.to_string());

        match config.provider.to_lowercase().as_str() {
            "openai" | "gpt" => LlmProvider::OpenAI {
                api_key: config.api_key.clone(),
                model: model("gpt-4o-mini"),
                base_url: base_url("https://api.openai.com"),
            },
            "deepseek" if config.base_url.is_none() => LlmProvider::DeepSeek {
                api_key: config.api_key.clone(),
                model: model("deepseek-chat"),
            },
            "grok" | "xai" if config.base_url.is_none() => LlmProvider::Grok {
                api_key: config.api_key.clone(),
                model: model("grok-4"),
            },
            "ollama" => LlmProvider::Ollama {
                model: model("qwen2.5:14b"),
                base_url: base_url("http://localhost:11434"),
            },
            _ => LlmProvider::Compatible {
                api_key: Some(config.api_key.clone()).filter(|k| !k.is_empty()),
                model: model("gpt-4o-mini"),
                base_url: base_url("https://api.openai.com"),
            },
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LlmProvider::OpenAI { model, .. }
            | LlmProvider::DeepSeek { model, .. }
            | LlmProvider::Grok { model, .. }
            | LlmProvider::Ollama { model, .. }
            | LlmProvider::Compatible { model, .. } => model,
        }
    }

    fn api_key(&self) -> Option<&str> {
        match self {
            LlmProvider::OpenAI { api_key, .. }
            | LlmProvider::DeepSeek { api_key, .. }
            | LlmProvider::Grok { api_key, .. } => Some(api_key.as_str()).filter(|k| !k.is_empty()),
            LlmProvider::Ollama { .. } => None,
            LlmProvider::Compatible { api_key, .. } => api_key.as_deref(),
        }
    }

    /// Chat-completions URL; a base already ending in `/v1` is not doubled
    pub fn endpoint(&self) -> String {
        let base = match self {
            LlmProvider::OpenAI { base_url, .. }
            | LlmProvider::Ollama { base_url, .. }
            | LlmProvider::Compatible { base_url, .. } => base_url.trim_end_matches('/'),
            LlmProvider::DeepSeek { .. } => "https://api.deepseek.com",
            LlmProvider::Grok { .. } => "https://api.x.ai",
        };

        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAI { .. } => "openai",
            LlmProvider::DeepSeek { .. } => "deepseek",
            LlmProvider::Grok { .. } => "grok",
            LlmProvider::Ollama { .. } => "ollama",
            LlmProvider::Compatible { .. } => "compatible",
        }
    }
}

/// Forecaster backed by a chat-completion API
pub struct LlmForecaster {
    http: Client,
    provider: LlmProvider,
    temperature: f64,
    max_retries: u32,
    retry_delay: Duration,
}

impl LlmForecaster {
    pub fn new(config: &LlmConfig, proxy: &ProxyConfig) -> Result<Self> {
        let builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        let http = proxy.apply(builder)?.build()?;

        Ok(Self {
            http,
            provider: LlmProvider::from_config(config),
            temperature: config.temperature,
            max_retries: config.max_retries,
            retry_delay: Duration::from_secs(1),
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = serde_json::json!({
            "model": self.provider.model(),
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.temperature,
            "stream": false
        });

        let mut req = self
            .http
            .post(self.provider.endpoint())
            .header("content-type", "application/json");

        if let Some(key) = self.provider.api_key() {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let resp = req.json(&request).send().await?;
        let status = resp.status();
        let body: serde_json::Value = if status.is_success() {
            resp.json().await?
        } else {
            let text = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
                .unwrap_or(text);
            return Err(ForecastError::Api(format!("HTTP {} - {}", status.as_u16(), detail)));
        };

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(strip_markup)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ForecastError::Api("Empty LLM response".into()))
    }
}

#[async_trait]
impl ForecastProvider for LlmForecaster {
    async fn forecast(&self, prompt: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.complete(prompt).await {
                Ok(text) => {
                    debug!("{} replied with {} bytes", self.provider.name(), text.len());
                    return Ok(text);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Forecast call failed ({}), retry {}/{}",
                        e, attempt, self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}
