//! API clients for stock data providers

pub mod alpha_vantage;
pub mod provider;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use provider::{QuoteProvider, days_ago};
pub use yahoo::YahooFinanceClient;

#[cfg(test)]
pub use provider::MockQuoteProvider;

use crate::config::{DataProvider, StockConfig};
use crate::error::Result;
use std::sync::Arc;

/// Build the provider selected by the configuration
pub fn provider_from_config(config: &StockConfig) -> Result<Arc<dyn QuoteProvider>> {
    let provider: Arc<dyn QuoteProvider> = match config.provider {
        DataProvider::Yahoo => Arc::new(YahooFinanceClient::from_config(config)?),
        DataProvider::AlphaVantage => Arc::new(AlphaVantageClient::from_config(config)?),
    };
    tracing::debug!(provider = provider.name(), "Quote provider ready");
    Ok(provider)
}
