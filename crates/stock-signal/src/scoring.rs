//! Reduce the latest indicator values to a score and a recommendation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::indicators::IndicatorRow;

const TREND_WEIGHT: f64 = 0.4;
const MOMENTUM_WEIGHT: f64 = 0.2;
const MACD_WEIGHT: f64 = 0.2;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const BUY_THRESHOLD: f64 = 0.5;
pub const CAUTION_THRESHOLD: f64 = -0.5;

/// Latest values the score is computed from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub sma50: f64,
    pub sma200: f64,
    pub rsi: f64,
    pub macd: f64,
    pub signal: f64,
}

impl ScoreInputs {
    /// `None` unless all five indicators are defined on the row
    pub fn from_row(row: &IndicatorRow) -> Option<Self> {
        Some(Self {
            sma50: row.sma50?,
            sma200: row.sma200?,
            rsi: row.rsi14?,
            macd: row.macd?,
            signal: row.macd_signal?,
        })
    }
}

/// Three-way recommendation derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Buy,
    Neutral,
    Caution,
}

impl Recommendation {
    pub fn from_score(score: f64) -> Self {
        if score > BUY_THRESHOLD {
            Self::Buy
        } else if score < CAUTION_THRESHOLD {
            Self::Caution
        } else {
            Self::Neutral
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Buy => "buy signal",
            Self::Neutral => "neutral",
            Self::Caution => "caution",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score and its recommendation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub score: f64,
    pub recommendation: Recommendation,
}

/// Weighted vote of trend, momentum and MACD crossover.
///
/// Each term is strictly one of two values, so the rounded score is always
/// one of -0.8, -0.4, 0.0, 0.4 or 0.8.
pub fn score(inputs: &ScoreInputs) -> Signal {
    let vote = |condition: bool, weight: f64| if condition { weight } else { -weight };

    let raw = vote(inputs.sma50 > inputs.sma200, TREND_WEIGHT)
        + vote(inputs.rsi < RSI_OVERBOUGHT, MOMENTUM_WEIGHT)
        + vote(inputs.macd > inputs.signal, MACD_WEIGHT);
    let score = round2(raw);

    Signal {
        score,
        recommendation: Recommendation::from_score(score),
    }
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // normalise -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}
