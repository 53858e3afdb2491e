//! Watchlist mode: score a fixed list of tickers and rank them

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::StockAnalyzer;
use crate::error::{Result, StockError};
use crate::scoring::{self, Recommendation, ScoreInputs};

/// A scored watchlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTicker {
    pub symbol: String,
    pub score: f64,
    pub recommendation: Recommendation,
    pub close: f64,
    pub rsi: f64,
}

/// A watchlist ticker that could not be scored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTicker {
    pub symbol: String,
    pub reason: String,
}

/// Ranked survivors of a watchlist run plus what was skipped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub ranked: Vec<RankedTicker>,
    pub skipped: Vec<SkippedTicker>,
}

/// Sort by score, best first, and keep `top_n`.
///
/// The sort is stable, so equal scores keep their watchlist order.
pub fn rank(mut entries: Vec<RankedTicker>, top_n: usize) -> Vec<RankedTicker> {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(top_n);
    entries
}

/// Fetch and score every ticker in order, skipping failures
pub async fn rank_watchlist(
    analyzer: &StockAnalyzer,
    watchlist: &[String],
    top_n: usize,
) -> BatchReport {
    let delay = analyzer.config().batch_delay;
    let mut scored = Vec::with_capacity(watchlist.len());
    let mut skipped = Vec::new();

    for (i, symbol) in watchlist.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match score_ticker(analyzer, symbol).await {
            Ok(entry) => scored.push(entry),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Skipping watchlist ticker");
                skipped.push(SkippedTicker {
                    symbol: symbol.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let ranked = rank(scored, top_n);
    info!(
        ranked = ranked.len(),
        skipped = skipped.len(),
        "Watchlist ranking complete"
    );
    BatchReport { ranked, skipped }
}

async fn score_ticker(analyzer: &StockAnalyzer, symbol: &str) -> Result<RankedTicker> {
    let series = analyzer.fetch_analyzed(symbol).await?;
    let latest = series.latest().ok_or_else(|| StockError::NoData {
        symbol: symbol.to_string(),
    })?;
    let inputs = ScoreInputs::from_row(&latest).ok_or_else(|| {
        StockError::Indicator(format!(
            "{symbol}: {} bars is not enough history to score",
            series.len()
        ))
    })?;
    let signal = scoring::score(&inputs);

    Ok(RankedTicker {
        symbol: symbol.to_string(),
        score: signal.score,
        recommendation: signal.recommendation,
        close: latest.close,
        rsi: inputs.rsi,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::{test_config, trending};
    use crate::api::MockQuoteProvider;
    use crate::config::StockConfig;
    use crate::model::PriceSeries;
    use std::sync::Arc;
    use std::time::Duration;

    fn entry(symbol: &str, score: f64) -> RankedTicker {
        RankedTicker {
            symbol: symbol.to_string(),
            score,
            recommendation: Recommendation::from_score(score),
            close: 1.0,
            rsi: 50.0,
        }
    }

    fn symbols(entries: &[RankedTicker]) -> Vec<&str> {
        entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(
            vec![entry("A", -0.4), entry("B", 0.8), entry("C", 0.0)],
            10,
        );
        assert_eq!(symbols(&ranked), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_rank_is_stable() {
        let ranked = rank(
            vec![
                entry("A", 0.4),
                entry("B", 0.8),
                entry("C", 0.4),
                entry("D", 0.8),
                entry("E", 0.4),
            ],
            10,
        );
        assert_eq!(symbols(&ranked), vec!["B", "D", "A", "C", "E"]);
    }

    #[test]
    fn test_rank_truncates() {
        let entries = (0..12).map(|i| entry(&format!("T{i}"), 0.0)).collect();
        let ranked = rank(entries, 5);
        assert_eq!(symbols(&ranked), vec!["T0", "T1", "T2", "T3", "T4"]);
    }

    #[tokio::test]
    async fn test_watchlist_skips_failures() {
        let mut provider = MockQuoteProvider::new();
        provider.expect_daily_history().returning(|symbol, _| match symbol {
            "UP" => Ok(trending(symbol, 260, 0.5)),
            "DOWN" => Ok(trending(symbol, 260, -0.5)),
            "SHORT" => Ok(trending(symbol, 30, 0.5)),
            "EMPTY" => Ok(PriceSeries::new(symbol, vec![])),
            _ => Err(StockError::Upstream("connection reset".to_string())),
        });

        let config = Arc::new(
            StockConfig::builder()
                .batch_delay(Duration::ZERO)
                .watchlist(["UP", "BROKEN", "DOWN", "EMPTY", "SHORT"])
                .build()
                .unwrap(),
        );
        let analyzer = StockAnalyzer::new(Arc::new(provider), config);
        let report = analyzer.daily_recommendations(None).await;

        assert_eq!(symbols(&report.ranked), vec!["UP", "DOWN"]);
        assert!(report.ranked[0].score >= report.ranked[1].score);
        assert!(report.ranked[1].score <= 0.0);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(skipped, vec!["BROKEN", "EMPTY", "SHORT"]);
    }

    #[tokio::test]
    async fn test_watchlist_ties_keep_order() {
        let mut provider = MockQuoteProvider::new();
        provider
            .expect_daily_history()
            .returning(|symbol, _| Ok(trending(symbol, 260, 0.5)));

        let config = Arc::new(
            StockConfig::builder()
                .batch_delay(Duration::ZERO)
                .watchlist(["ZETA", "ALPHA", "MID"])
                .build()
                .unwrap(),
        );
        let analyzer = StockAnalyzer::new(Arc::new(provider), config);
        let report = analyzer.daily_recommendations(Some(2)).await;

        assert_eq!(symbols(&report.ranked), vec!["ZETA", "ALPHA"]);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_empty_watchlist() {
        let provider = MockQuoteProvider::new();
        let analyzer = StockAnalyzer::new(Arc::new(provider), test_config());
        let report = rank_watchlist(&analyzer, &[], 5).await;
        assert_eq!(report, BatchReport::default());
    }
}
