//! Map free-text queries (ticker, company name, ISIN) to a ticker with data

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{QuoteProvider, days_ago};
use crate::config::StockConfig;
use crate::error::{Result, StockError};

const MAX_TICKER_LEN: usize = 6;
const MAX_SUFFIX_LEN: usize = 3;
const ISIN_LEN: usize = 12;

/// One symbol/suffix combination the resolver probed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerCandidate {
    /// Full symbol that was queried, suffix included
    pub symbol: String,
    /// Exchange suffix appended to the base symbol (empty for none)
    pub suffix: String,
    pub valid: bool,
}

/// Successful resolution plus the combinations probed on the way
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub symbol: String,
    pub attempts: Vec<TickerCandidate>,
}

/// Resolves queries against a quote provider, first valid match wins
pub struct SymbolResolver {
    provider: Arc<dyn QuoteProvider>,
    config: Arc<StockConfig>,
}

impl SymbolResolver {
    pub fn new(provider: Arc<dyn QuoteProvider>, config: Arc<StockConfig>) -> Self {
        Self { provider, config }
    }

    /// Resolve `query` to a ticker that returns price data.
    ///
    /// Fails with [`StockError::NotFound`] listing every symbol tried.
    pub async fn resolve(&self, query: &str) -> Result<Resolution> {
        let query = query.trim();
        if query.is_empty() {
            return Err(StockError::NotFound {
                query: String::new(),
                attempted: Vec::new(),
            });
        }

        let candidates = self.candidates(query).await;
        debug!(query, ?candidates, "Resolver candidates");

        let mut attempts = Vec::new();
        for base in &candidates {
            for suffix in self.suffixes_for(base) {
                let symbol = format!("{base}{suffix}");
                let valid = self.probe(&symbol).await;
                attempts.push(TickerCandidate {
                    symbol: symbol.clone(),
                    suffix: suffix.to_string(),
                    valid,
                });

                if valid {
                    info!(query, symbol = %symbol, tries = attempts.len(), "Resolved ticker");
                    return Ok(Resolution { symbol, attempts });
                }
            }
        }

        Err(StockError::NotFound {
            query: query.to_string(),
            attempted: attempts.into_iter().map(|a| a.symbol).collect(),
        })
    }

    /// The query itself when it already looks like a ticker, otherwise the
    /// top search hits. Search failures yield no candidates.
    async fn candidates(&self, query: &str) -> Vec<String> {
        if looks_like_ticker(query) {
            return vec![query.to_string()];
        }

        let limit = self.config.max_search_candidates;
        debug!(query, isin = looks_like_isin(query), "Searching for symbol");
        let matches = match self.provider.search(query, limit).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(query, error = %e, "Symbol search failed");
                return Vec::new();
            }
        };

        let mut symbols: Vec<String> = Vec::with_capacity(limit);
        for m in matches {
            let symbol = m.symbol.trim().to_uppercase();
            if !symbol.is_empty() && !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
            if symbols.len() == limit {
                break;
            }
        }
        symbols
    }

    /// A symbol that already names its exchange is only tried as-is
    fn suffixes_for(&self, base: &str) -> Vec<&str> {
        if base.contains('.') {
            vec![""]
        } else {
            self.config.exchange_suffixes.iter().map(String::as_str).collect()
        }
    }

    async fn probe(&self, symbol: &str) -> bool {
        let start = days_ago(self.config.probe_days);
        match self.provider.daily_history(symbol, start).await {
            Ok(series) => {
                debug!(symbol, bars = series.len(), "Probed candidate");
                !series.is_empty()
            }
            Err(e) => {
                debug!(symbol, error = %e, "Probe failed");
                false
            }
        }
    }
}

/// Short uppercase symbol such as `AAPL`, `BRK-B` or `SAP.DE`.
///
/// The length limit applies to the base symbol; an exchange suffix of up to
/// three letters may follow a single `.`.
pub fn looks_like_ticker(query: &str) -> bool {
    let (base, suffix) = match query.split_once('.') {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (query, None),
    };

    let base_ok = (1..=MAX_TICKER_LEN).contains(&base.len())
        && base.chars().any(|c| c.is_ascii_uppercase())
        && base
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
    let suffix_ok = suffix.is_none_or(|s| {
        (1..=MAX_SUFFIX_LEN).contains(&s.len()) && s.chars().all(|c| c.is_ascii_uppercase())
    });

    base_ok && suffix_ok
}

/// 12-character alphanumeric code with a two-letter country prefix
pub fn looks_like_isin(query: &str) -> bool {
    query.len() == ISIN_LEN
        && query.chars().all(|c| c.is_ascii_alphanumeric())
        && query.chars().take(2).all(|c| c.is_ascii_alphabetic())
}
