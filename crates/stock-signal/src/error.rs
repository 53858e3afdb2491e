//! Error types for stock analysis operations

use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// The query did not resolve to any ticker with price data
    #[error("No ticker found for '{query}' (tried: {})", format_attempts(.attempted))]
    NotFound {
        query: String,
        attempted: Vec<String>,
    },

    /// The ticker is well-formed but the provider returned no history
    #[error("No price data available for {symbol}")]
    NoData { symbol: String },

    /// The quote or search call itself failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinance(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantage(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    Indicator(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed interactive command
    #[error("Command error: {0}")]
    Command(String),
}

impl StockError {
    /// Symbols tried during resolution, if this error carries any
    pub fn attempted(&self) -> &[String] {
        match self {
            StockError::NotFound { attempted, .. } => attempted,
            _ => &[],
        }
    }

    /// Whether the failure came from the remote side rather than the query
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            StockError::Upstream(_)
                | StockError::RateLimitExceeded { .. }
                | StockError::Network(_)
                | StockError::Json(_)
                | StockError::YahooFinance(_)
                | StockError::AlphaVantage(_)
        )
    }
}

fn format_attempts(attempted: &[String]) -> String {
    if attempted.is_empty() {
        "nothing".to_string()
    } else {
        attempted.join(", ")
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;
