//! Configuration for stock analysis operations

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Exchange suffixes tried, in order, for every resolver candidate.
/// The empty suffix means the bare symbol.
pub const DEFAULT_EXCHANGE_SUFFIXES: &[&str] = &["", ".TO", ".DE", ".PA", ".L", ".F", ".SW", ".MI"];

/// Watchlist used by the daily recommendations mode
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "JPM", "V", "JNJ",
];

/// Data provider for stock information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataProvider {
    /// Yahoo Finance (default, no API key required)
    #[default]
    Yahoo,
    /// Alpha Vantage (requires API key)
    AlphaVantage,
}

impl FromStr for DataProvider {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "yahoo" | "yf" => Ok(Self::Yahoo),
            "alphavantage" | "av" => Ok(Self::AlphaVantage),
            other => Err(StockError::Config(format!("Unknown data provider: {other}"))),
        }
    }
}

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Data provider to use
    pub provider: DataProvider,

    /// Alpha Vantage API key (optional)
    pub alpha_vantage_api_key: Option<String>,

    /// Exchange suffixes tried by the symbol resolver
    pub exchange_suffixes: Vec<String>,

    /// Maximum number of search hits turned into resolver candidates
    pub max_search_candidates: usize,

    /// Calendar days of history requested when probing a candidate
    pub probe_days: i64,

    /// Calendar days of history fetched for analysis
    pub lookback_days: i64,

    /// Tickers scored in daily recommendations mode
    pub watchlist: Vec<String>,

    /// Number of ranked tickers returned in daily recommendations mode
    pub top_n: usize,

    /// Pause between watchlist fetches
    pub batch_delay: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Alpha Vantage requests per minute
    pub rate_limit_per_minute: u32,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            provider: DataProvider::Yahoo,
            alpha_vantage_api_key: None,
            exchange_suffixes: DEFAULT_EXCHANGE_SUFFIXES.iter().map(ToString::to_string).collect(),
            max_search_candidates: 5,
            probe_days: 7,
            lookback_days: 365,
            watchlist: DEFAULT_WATCHLIST.iter().map(ToString::to_string).collect(),
            top_n: 5,
            batch_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            rate_limit_per_minute: 5, // free tier
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Build a validated configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env_api_key().with_env_provider()?.with_env_watchlist().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.provider == DataProvider::AlphaVantage && self.alpha_vantage_api_key.is_none() {
            return Err(StockError::Config(
                "Alpha Vantage API key required when using AlphaVantage provider".to_string(),
            ));
        }

        if self.max_search_candidates == 0 {
            return Err(StockError::Config(
                "max_search_candidates must be greater than 0".to_string(),
            ));
        }

        if self.probe_days <= 0 || self.lookback_days <= 0 {
            return Err(StockError::Config(
                "probe_days and lookback_days must be positive".to_string(),
            ));
        }

        if self.top_n == 0 {
            return Err(StockError::Config("top_n must be greater than 0".to_string()));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(StockError::Config(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    provider: Option<DataProvider>,
    alpha_vantage_api_key: Option<String>,
    exchange_suffixes: Option<Vec<String>>,
    max_search_candidates: Option<usize>,
    probe_days: Option<i64>,
    lookback_days: Option<i64>,
    watchlist: Option<Vec<String>>,
    top_n: Option<usize>,
    batch_delay: Option<Duration>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
}

impl StockConfigBuilder {
    /// Set the data provider
    pub fn provider(mut self, provider: DataProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Replace the exchange suffix list
    pub fn exchange_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exchange_suffixes = Some(suffixes.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_search_candidates(mut self, max: usize) -> Self {
        self.max_search_candidates = Some(max);
        self
    }

    pub fn probe_days(mut self, days: i64) -> Self {
        self.probe_days = Some(days);
        self
    }

    pub fn lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = Some(days);
        self
    }

    /// Replace the watchlist
    pub fn watchlist<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watchlist = Some(tickers.into_iter().map(Into::into).collect());
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Load Alpha Vantage API key from `ALPHA_VANTAGE_API_KEY`
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Load the provider from `STOCK_PROVIDER`
    pub fn with_env_provider(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var("STOCK_PROVIDER") {
            self.provider = Some(value.parse()?);
        }
        Ok(self)
    }

    /// Load a comma-separated watchlist from `STOCK_WATCHLIST`
    pub fn with_env_watchlist(mut self) -> Self {
        if let Ok(value) = std::env::var("STOCK_WATCHLIST") {
            let tickers = parse_watchlist(&value);
            if !tickers.is_empty() {
                self.watchlist = Some(tickers);
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            provider: self.provider.unwrap_or(defaults.provider),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            exchange_suffixes: self.exchange_suffixes.unwrap_or(defaults.exchange_suffixes),
            max_search_candidates: self
                .max_search_candidates
                .unwrap_or(defaults.max_search_candidates),
            probe_days: self.probe_days.unwrap_or(defaults.probe_days),
            lookback_days: self.lookback_days.unwrap_or(defaults.lookback_days),
            watchlist: self.watchlist.unwrap_or(defaults.watchlist),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            batch_delay: self.batch_delay.unwrap_or(defaults.batch_delay),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Split a comma-separated ticker list, uppercasing and dropping blanks
pub fn parse_watchlist(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.provider, DataProvider::Yahoo);
        assert_eq!(config.max_search_candidates, 5);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.exchange_suffixes[0], "");
        assert_eq!(config.exchange_suffixes.len(), 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .provider(DataProvider::Yahoo)
            .top_n(10)
            .watchlist(["AAPL", "SAP.DE"])
            .batch_delay(Duration::ZERO)
            .request_timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.top_n, 10);
        assert_eq!(config.watchlist, vec!["AAPL".to_string(), "SAP.DE".to_string()]);
        assert_eq!(config.batch_delay, Duration::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_validation_alpha_vantage_no_key() {
        let config = StockConfig {
            provider: DataProvider::AlphaVantage,
            alpha_vantage_api_key: None,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_alpha_vantage_with_key() {
        let config = StockConfig {
            provider: DataProvider::AlphaVantage,
            alpha_vantage_api_key: Some("test_key".to_string()),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_top_n() {
        let result = StockConfig::builder().top_n(0).build();
        assert!(matches!(result, Err(StockError::Config(_))));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("yahoo".parse::<DataProvider>().unwrap(), DataProvider::Yahoo);
        assert_eq!(
            "Alpha-Vantage".parse::<DataProvider>().unwrap(),
            DataProvider::AlphaVantage
        );
        assert_eq!("av".parse::<DataProvider>().unwrap(), DataProvider::AlphaVantage);
        assert!("bloomberg".parse::<DataProvider>().is_err());
    }

    #[test]
    fn test_parse_watchlist() {
        assert_eq!(
            parse_watchlist(" aapl, msft ,,sap.de "),
            vec!["AAPL".to_string(), "MSFT".to_string(), "SAP.DE".to_string()]
        );
        assert!(parse_watchlist(" , ").is_empty());
    }
}
