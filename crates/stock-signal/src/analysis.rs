//! The fetch and compute pipeline: query -> ticker -> history -> indicators -> signal
//!
//! Everything here returns plain values; rendering is left to the caller.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{self, QuoteProvider, days_ago};
use crate::chart::ChartData;
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::indicators::{AnalyzedSeries, IndicatorRow};
use crate::model::CompanyInfo;
use crate::ranking::{self, BatchReport};
use crate::resolver::{SymbolResolver, TickerCandidate};
use crate::scoring::{self, ScoreInputs, Signal};

/// Result of analyzing a single query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub symbol: String,
    pub info: Option<CompanyInfo>,
    pub series: AnalyzedSeries,
    pub latest: IndicatorRow,
    /// `None` when the series is too short for every scoring indicator
    pub signal: Option<Signal>,
    pub attempts: Vec<TickerCandidate>,
}

impl Analysis {
    pub fn latest_price(&self) -> f64 {
        self.latest.close
    }

    pub fn chart(&self) -> ChartData {
        ChartData::from_series(&self.series)
    }
}

/// Fetch, compute and score, one request at a time
pub struct StockAnalyzer {
    provider: Arc<dyn QuoteProvider>,
    resolver: SymbolResolver,
    config: Arc<StockConfig>,
}

impl StockAnalyzer {
    pub fn new(provider: Arc<dyn QuoteProvider>, config: Arc<StockConfig>) -> Self {
        let resolver = SymbolResolver::new(Arc::clone(&provider), Arc::clone(&config));
        Self {
            provider,
            resolver,
            config,
        }
    }

    /// Build the analyzer with the provider the configuration selects
    pub fn from_config(config: StockConfig) -> Result<Self> {
        config.validate()?;
        let provider = api::provider_from_config(&config)?;
        Ok(Self::new(provider, Arc::new(config)))
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Resolve `query` and analyze the resulting ticker
    pub async fn analyze(&self, query: &str) -> Result<Analysis> {
        let resolution = self.resolver.resolve(query).await?;
        let symbol = resolution.symbol;

        let series = self.fetch_analyzed(&symbol).await?;
        let Some(latest) = series.latest() else {
            return Err(StockError::NoData { symbol });
        };
        let signal = ScoreInputs::from_row(&latest).map(|inputs| scoring::score(&inputs));
        if signal.is_none() {
            info!(symbol = %symbol, bars = series.len(), "Not enough history to score");
        }

        let info = match self.provider.company_info(&symbol).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Company info unavailable");
                None
            }
        };

        Ok(Analysis {
            symbol,
            info,
            series,
            latest,
            signal,
            attempts: resolution.attempts,
        })
    }

    /// Fetch the configured lookback window for `symbol` and compute indicators
    pub async fn fetch_analyzed(&self, symbol: &str) -> Result<AnalyzedSeries> {
        let start = days_ago(self.config.lookback_days);
        let series = self.provider.daily_history(symbol, start).await?;
        debug!(symbol, bars = series.len(), %start, "Fetched history");

        if series.is_empty() {
            return Err(StockError::NoData {
                symbol: symbol.to_string(),
            });
        }

        AnalyzedSeries::compute(series)
    }

    /// Score the configured watchlist and keep the best `top_n`
    /// (the configured default when `None`)
    pub async fn daily_recommendations(&self, top_n: Option<usize>) -> BatchReport {
        let top_n = top_n.unwrap_or(self.config.top_n);
        ranking::rank_watchlist(self, &self.config.watchlist, top_n).await
    }
}
