//! The seam between the analysis pipeline and a remote quote service

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};

use crate::error::Result;
use crate::model::{CompanyInfo, PriceSeries, SymbolMatch};

/// A source of daily price history, symbol search and company metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    /// Daily bars for `symbol` from `start` up to today.
    ///
    /// An unknown symbol may surface either as an error or as an empty
    /// series depending on the provider.
    async fn daily_history(&self, symbol: &str, start: NaiveDate) -> Result<PriceSeries>;

    /// Ranked search hits for a free-text query, at most `limit` of them
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SymbolMatch>>;

    /// Descriptive fields for `symbol`
    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo>;
}

/// Start date `days` calendar days before today (UTC)
pub fn days_ago(days: i64) -> NaiveDate {
    Utc::now().date_naive() - Duration::days(days)
}
