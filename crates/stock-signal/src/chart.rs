//! Line chart data: closing prices with moving average and Bollinger overlays

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::AnalyzedSeries;

/// One date on the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

/// Chart-ready series for a single ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub symbol: String,
    pub title: String,
    pub points: Vec<ChartPoint>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ChartData {
    pub fn from_series(analyzed: &AnalyzedSeries) -> Self {
        let points: Vec<ChartPoint> = (0..analyzed.len())
            .filter_map(|i| analyzed.row(i))
            .map(|row| ChartPoint {
                date: row.date,
                close: row.close,
                sma50: row.sma50,
                sma200: row.sma200,
                bb_upper: row.bb_upper,
                bb_lower: row.bb_lower,
            })
            .collect();

        let closes = points.iter().map(|p| p.close);
        let min_price = closes.clone().reduce(f64::min);
        let max_price = closes.reduce(f64::max);

        Self {
            symbol: analyzed.symbol().to_string(),
            title: format!("Price history of {}", analyzed.symbol()),
            start_date: points.first().map(|p| p.date),
            end_date: points.last().map(|p| p.date),
            min_price,
            max_price,
            points,
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
