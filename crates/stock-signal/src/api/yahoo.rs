//! Yahoo Finance API client

use crate::api::provider::QuoteProvider;
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::model::{Bar, CompanyInfo, PriceSeries, SymbolMatch};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";

// Yahoo rejects requests without a browser-like user agent
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) stock-signal";

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    http: Client,
    search_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
    shortname: Option<String>,
    longname: Option<String>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a client from configuration, honouring the request timeout
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        Self::with_timeout(config.request_timeout)
    }

    fn with_timeout(timeout: Duration) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinance(e.to_string()))?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            connector,
            http,
            search_url: SEARCH_URL.to_string(),
        })
    }

    /// Point symbol search at a different endpoint (e.g. a local mock server)
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Get daily quotes for a symbol between two instants
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::YahooFinance(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinance(format!("Invalid end timestamp: {e}")))?;

        let response = self
            .connector
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| StockError::YahooFinance(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinance(e.to_string()))?;

        let bars = quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(Bar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    adj_close: q.adjclose,
                    volume: q.volume,
                })
            })
            .collect();

        Ok(PriceSeries::new(symbol, bars))
    }

    /// Free-text symbol search
    pub async fn search_symbol(&self, query: &str, limit: usize) -> Result<Vec<SymbolMatch>> {
        let count = limit.to_string();
        let response = self
            .http
            .get(&self.search_url)
            .query(&[("q", query), ("quotesCount", count.as_str()), ("newsCount", "0")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StockError::YahooFinance(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;

        Ok(body
            .quotes
            .into_iter()
            .filter_map(|q| {
                let symbol = q.symbol?.trim().to_string();
                if symbol.is_empty() {
                    return None;
                }
                Some(SymbolMatch {
                    symbol,
                    name: q.longname.or(q.shortname),
                })
            })
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn daily_history(&self, symbol: &str, start: NaiveDate) -> Result<PriceSeries> {
        let start = start.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        self.get_historical_quotes(symbol, start, Utc::now()).await
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SymbolMatch>> {
        self.search_symbol(query, limit).await
    }

    /// The chart API carries no fundamentals, so only the name is filled in,
    /// taken from the search hit that matches the symbol exactly.
    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo> {
        let name = self
            .search_symbol(symbol, 5)
            .await?
            .into_iter()
            .find(|m| m.symbol.eq_ignore_ascii_case(symbol))
            .and_then(|m| m.name);

        Ok(CompanyInfo {
            name,
            ..CompanyInfo::bare(symbol)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_parses_quotes() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/search").query_param("q", "siemens");
                then.status(200).json_body(json!({
                    "quotes": [
                        { "symbol": "SIE.DE", "shortname": "SIEMENS AG", "longname": "Siemens Aktiengesellschaft" },
                        { "symbol": "SIEGY", "shortname": "SIEMENS AG ADR" },
                        { "shortname": "no symbol" }
                    ]
                }));
            })
            .await;

        let client = YahooFinanceClient::new()
            .unwrap()
            .with_search_url(server.url("/search"));
        let matches = client.search("siemens", 5).await.unwrap();

        mock.assert_async().await;
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].symbol, "SIE.DE");
        assert_eq!(matches[0].name.as_deref(), Some("Siemens Aktiengesellschaft"));
        assert_eq!(matches[1].name.as_deref(), Some("SIEMENS AG ADR"));
    }

    #[tokio::test]
    async fn test_company_info_uses_exact_match() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({
                    "quotes": [
                        { "symbol": "AAPL.MX", "shortname": "APPLE INC (MX)" },
                        { "symbol": "AAPL", "shortname": "Apple Inc." }
                    ]
                }));
            })
            .await;

        let client = YahooFinanceClient::new()
            .unwrap()
            .with_search_url(server.url("/search"));
        let info = client.company_info("AAPL").await.unwrap();

        assert_eq!(info.symbol, "AAPL");
        assert_eq!(info.name.as_deref(), Some("Apple Inc."));
        assert_eq!(info.pe_ratio, None);
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(429);
            })
            .await;

        let client = YahooFinanceClient::new()
            .unwrap()
            .with_search_url(server.url("/search"));
        let result = client.search("apple", 5).await;
        assert!(matches!(result, Err(StockError::YahooFinance(_))));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_daily_history_live() {
        let client = YahooFinanceClient::new().unwrap();
        let series = client
            .daily_history("AAPL", crate::api::days_ago(30))
            .await
            .unwrap();
        assert!(!series.is_empty());
        assert_eq!(series.symbol(), "AAPL");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_invalid_symbol_live() {
        let client = YahooFinanceClient::new().unwrap();
        let result = client
            .daily_history("ZZZZINVALID", crate::api::days_ago(7))
            .await;
        assert!(result.map(|s| s.is_empty()).unwrap_or(true));
    }
}
