//! Alpha Vantage API client

use crate::api::provider::QuoteProvider;
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::model::{Bar, CompanyInfo, PriceSeries, SymbolMatch};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// `compact` output holds the latest 100 trading days, roughly 140 calendar days
const COMPACT_WINDOW_DAYS: i64 = 140;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

fn rate_limiter(per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (5 on the free tier)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            rate_limiter: rate_limiter(rate_limit),
        }
    }

    /// Create a client from configuration, honouring the request timeout
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        let api_key = config.alpha_vantage_api_key.clone().ok_or_else(|| {
            StockError::Config("Alpha Vantage API key is not configured".to_string())
        })?;
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
            rate_limiter: rate_limiter(config.rate_limit_per_minute),
        })
    }

    /// Create from environment variable ALPHA_VANTAGE_API_KEY with default rate limit
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY").map_err(|_| {
            StockError::Config("ALPHA_VANTAGE_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self::new(api_key, 5))
    }

    /// Point the client at a different endpoint (e.g. a local mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Issue one query and reject the API's in-band error payloads
    async fn query(&self, params: &[(&str, &str)]) -> Result<Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StockError::AlphaVantage(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;

        if let Some(error) = data.get("Error Message") {
            return Err(StockError::AlphaVantage(text(error)));
        }

        if data.get("Note").is_some() {
            return Err(StockError::RateLimitExceeded {
                provider: "Alpha Vantage".to_string(),
            });
        }

        if let Some(info) = data.get("Information") {
            return Err(StockError::Upstream(text(info)));
        }

        Ok(data)
    }

    /// Get adjusted daily time series data from `start` onwards
    pub async fn get_daily_adjusted(&self, symbol: &str, start: NaiveDate) -> Result<PriceSeries> {
        let window = (Utc::now().date_naive() - start).num_days();
        let output_size = if window > COMPACT_WINDOW_DAYS { "full" } else { "compact" };

        let data = self
            .query(&[
                ("function", "TIME_SERIES_DAILY_ADJUSTED"),
                ("symbol", symbol),
                ("outputsize", output_size),
            ])
            .await?;

        Ok(parse_daily_series(symbol, &data, start))
    }

    /// Search for symbols
    pub async fn search_symbol(&self, keywords: &str) -> Result<Vec<SymbolMatch>> {
        let data = self
            .query(&[("function", "SYMBOL_SEARCH"), ("keywords", keywords)])
            .await?;

        Ok(parse_best_matches(&data))
    }

    /// Get company overview (name, P/E, dividend yield)
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyInfo> {
        let data = self
            .query(&[("function", "OVERVIEW"), ("symbol", symbol)])
            .await?;

        // An unknown symbol comes back as an empty object
        if data.as_object().is_none_or(serde_json::Map::is_empty) {
            return Err(StockError::NotFound {
                query: symbol.to_string(),
                attempted: vec![symbol.to_string()],
            });
        }

        Ok(CompanyInfo {
            symbol: data["Symbol"].as_str().unwrap_or(symbol).to_string(),
            name: data["Name"].as_str().map(ToString::to_string),
            pe_ratio: number(&data, "PERatio"),
            dividend_yield: number(&data, "DividendYield"),
        })
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
    fn name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn daily_history(&self, symbol: &str, start: NaiveDate) -> Result<PriceSeries> {
        self.get_daily_adjusted(symbol, start).await
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SymbolMatch>> {
        let mut matches = self.search_symbol(query).await?;
        matches.truncate(limit);
        Ok(matches)
    }

    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo> {
        self.get_company_overview(symbol).await
    }
}

fn text(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), ToString::to_string)
}

/// Alpha Vantage encodes numbers as strings and uses "None" or "-" for gaps
fn number(values: &Value, key: &str) -> Option<f64> {
    values.get(key)?.as_str()?.trim().parse().ok()
}

fn parse_daily_series(symbol: &str, data: &Value, start: NaiveDate) -> PriceSeries {
    let Some(series) = data.get("Time Series (Daily)").and_then(Value::as_object) else {
        tracing::debug!(symbol, "No daily series in Alpha Vantage response");
        return PriceSeries::new(symbol, Vec::new());
    };

    let mut bars = Vec::with_capacity(series.len());
    for (timestamp, values) in series {
        let Ok(date) = NaiveDate::parse_from_str(timestamp, "%Y-%m-%d") else {
            tracing::debug!(symbol, %timestamp, "Skipping bar with unparseable date");
            continue;
        };
        if date < start {
            continue;
        }

        let bar = parse_bar(date, values);

        match bar {
            Some(bar) => bars.push(bar),
            None => tracing::debug!(symbol, %timestamp, "Skipping bar with missing prices"),
        }
    }

    PriceSeries::new(symbol, bars)
}

fn parse_bar(date: NaiveDate, values: &Value) -> Option<Bar> {
    let close = number(values, "4. close")?;
    Some(Bar {
        date,
        open: number(values, "1. open")?,
        high: number(values, "2. high")?,
        low: number(values, "3. low")?,
        close,
        adj_close: number(values, "5. adjusted close").unwrap_or(close),
        volume: number(values, "6. volume").map_or(0, |v| v as u64),
    })
}

fn parse_best_matches(data: &Value) -> Vec<SymbolMatch> {
    data.get("bestMatches")
        .and_then(Value::as_array)
        .map(|matches| {
            matches
                .iter()
                .filter_map(|m| {
                    let symbol = m["1. symbol"].as_str()?.trim();
                    if symbol.is_empty() {
                        return None;
                    }
                    Some(SymbolMatch {
                        symbol: symbol.to_string(),
                        name: m["2. name"].as_str().map(ToString::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
