//! Daily stock signals
//!
//! This crate turns a free-text stock query into a simple technical
//! recommendation. It includes:
//!
//! - Data fetching from Yahoo Finance or Alpha Vantage behind [`QuoteProvider`]
//! - Ticker resolution for names, tickers and ISINs, with exchange-suffix fallback
//! - Technical indicators (SMA50/200, RSI14, MACD, Bollinger bands)
//! - A weighted score with a buy / neutral / caution label
//! - Watchlist ranking for daily recommendations
//! - Chart-ready series for any plotting frontend
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_signal::{StockAnalyzer, StockConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let analyzer = StockAnalyzer::from_config(StockConfig::from_env()?)?;
//!
//!     let analysis = analyzer.analyze("Apple").await?;
//!     if let Some(signal) = analysis.signal {
//!         println!("{}: {} ({:+.2})", analysis.symbol, signal.recommendation, signal.score);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod indicators;
pub mod model;
pub mod ranking;
pub mod resolver;
pub mod scoring;

// Re-export main types for convenience
pub use analysis::{Analysis, StockAnalyzer};
pub use api::{AlphaVantageClient, QuoteProvider, YahooFinanceClient};
pub use chart::{ChartData, ChartPoint};
pub use config::{DataProvider, StockConfig};
pub use error::{Result, StockError};
pub use indicators::{AnalyzedSeries, IndicatorRow, IndicatorSet};
pub use model::{Bar, CompanyInfo, PriceSeries, SymbolMatch};
pub use ranking::{BatchReport, RankedTicker, SkippedTicker};
pub use resolver::{Resolution, SymbolResolver, TickerCandidate};
pub use scoring::{Recommendation, ScoreInputs, Signal};
