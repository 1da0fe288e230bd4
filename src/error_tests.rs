//! Tests for error types

#[cfg(test)]
mod tests {
    use super::super::error::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ForecastError::InsufficientData.to_string(),
            "insufficient data: candle window is empty"
        );
        assert_eq!(
            ForecastError::DegenerateInput("mean close is zero".to_string()).to_string(),
            "degenerate input: mean close is zero"
        );
        assert!(ForecastError::UnparseableForecast.to_string().contains("unparseable"));
    }

    #[test]
    fn test_retryable_api_errors() {
        assert!(ForecastError::Api("HTTP 503 - overloaded".to_string()).is_retryable());
        assert!(ForecastError::Api("HTTP 429 - rate limited".to_string()).is_retryable());
        assert!(!ForecastError::Api("HTTP 401 - invalid api key".to_string()).is_retryable());
        assert!(!ForecastError::Api("Empty LLM response".to_string()).is_retryable());
    }

    #[test]
    fn test_input_errors_not_retryable() {
        assert!(!ForecastError::InsufficientData.is_retryable());
        assert!(!ForecastError::UnparseableForecast.is_retryable());
        assert!(!ForecastError::MalformedKline("short row".to_string()).is_retryable());
    }

    #[test]
    fn test_statistics_errors() {
        assert!(ForecastError::InsufficientData.is_statistics_error());
        assert!(ForecastError::DegenerateInput(String::new()).is_statistics_error());
        assert!(!ForecastError::UnparseableForecast.is_statistics_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: ForecastError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, ForecastError::Json(_)));
    }
}
