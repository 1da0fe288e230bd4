//! Error types for the forecasting pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForecastError>;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// The candle window was empty
    #[error("insufficient data: candle window is empty")]
    InsufficientData,

    /// Statistics are undefined for the given window (zero division)
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// The forecast text contained no line with a horizon and a direction glyph
    #[error("unparseable forecast: no qualifying prediction lines")]
    UnparseableForecast,

    /// A kline row from the candle source could not be decoded
    #[error("malformed kline: {0}")]
    MalformedKline(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    /// Whether a network-boundary failure is worth another attempt.
    ///
    /// Only transport problems and server-side statuses qualify; anything
    /// derived from the input itself will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ForecastError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().map(|s| s.is_server_error() || s.as_u16() == 429).unwrap_or(false)
            }
            ForecastError::Api(msg) => {
                msg.starts_with("HTTP 5") || msg.starts_with("HTTP 429")
            }
            _ => false,
        }
    }

    /// Statistics failures have no report to attach a placeholder to.
    pub fn is_statistics_error(&self) -> bool {
        matches!(self, ForecastError::InsufficientData | ForecastError::DegenerateInput(_))
    }
}
