//! Forecast boundary: prompt construction and the external forecaster
//!
//! The forecaster is an opaque collaborator that turns a prompt into free
//! text. Nothing here judges the quality of its predictions; the reply is
//! only cleaned of markup before it is handed to the parser.

mod llm;
mod prompt;

pub use llm::{LlmForecaster, LlmProvider};
pub use prompt::build_prompt;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

/// Anything that can answer a forecast prompt with free text
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn forecast(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Provider that always replies with the same text.
///
/// Useful for replaying a saved reply through the full service.
#[derive(Debug, Clone)]
pub struct StaticForecaster {
    reply: String,
}

impl StaticForecaster {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

#[async_trait]
impl ForecastProvider for StaticForecaster {
    async fn forecast(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Remove HTML/XML-style tags from a completion
pub fn strip_markup(text: &str) -> String {
    RE_TAG.replace_all(text, "").trim().to_string()
}
