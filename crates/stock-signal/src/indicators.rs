//! Rolling and exponential technical indicators over daily closes
//!
//! Every column has one entry per bar. Entries before enough history exists
//! are `None`, and the value at bar `i` only looks at bars `0..=i`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::{ExponentialMovingAverage, SimpleMovingAverage};

use crate::error::{Result, StockError};
use crate::model::PriceSeries;

pub const SMA_SHORT_PERIOD: usize = 50;
pub const SMA_LONG_PERIOD: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST_SPAN: usize = 12;
pub const MACD_SLOW_SPAN: usize = 26;
pub const MACD_SIGNAL_SPAN: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;

/// Simple moving average over the trailing `period` values
pub fn sma(values: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(period)
        .map_err(|e| StockError::Indicator(format!("SMA({period}): {e}")))?;
    // the running average covers fewer than `period` values until then
    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let avg = sma.next(v);
            (i + 1 >= period).then_some(avg)
        })
        .collect())
}

/// Sample standard deviation (n - 1 denominator) over the trailing `period` values
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period < 2 {
        return vec![None; values.len()];
    }
    rolling(values, period, |window| {
        let avg = mean(window);
        let var = window.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (period - 1) as f64;
        Some(var.sqrt())
    })
}

/// Exponential moving average seeded with the first value,
/// smoothing factor `2 / (span + 1)`
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(span)
        .map_err(|e| StockError::Indicator(format!("EMA({span}): {e}")))?;
    Ok(values.iter().map(|&v| ema.next(v)).collect())
}

/// Relative Strength Index from simple means of gains and losses over the
/// trailing `period` close-to-close changes.
///
/// A window with losses of zero reads 100 when it has gains and is undefined
/// when prices did not move at all.
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    for (i, window) in deltas.windows(period).enumerate() {
        let gain = window.iter().map(|d| d.max(0.0)).sum::<f64>() / period as f64;
        let loss = window.iter().map(|d| (-d).max(0.0)).sum::<f64>() / period as f64;
        // deltas[k] is the change into bar k + 1
        out[i + period] = rsi_from_averages(gain, loss);
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }
    Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
}

/// MACD line and its signal line
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// EMA(fast) - EMA(slow), with the signal line as EMA(signal_span) of that difference
pub fn macd(values: &[f64], fast: usize, slow: usize, signal_span: usize) -> Result<Macd> {
    let fast = ema(values, fast)?;
    let slow = ema(values, slow)?;
    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&macd, signal_span)?;
    Ok(Macd { macd, signal })
}

/// Bollinger envelope around a simple moving average
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

pub fn bollinger(values: &[f64], period: usize, width: f64) -> Result<BollingerBands> {
    let middle = sma(values, period)?;
    let std = rolling_std(values, period);
    let band = |sign: f64| -> Vec<Option<f64>> {
        middle
            .iter()
            .zip(&std)
            .map(|(m, s)| Some(m.as_ref()? + sign * width * s.as_ref()?))
            .collect()
    };

    Ok(BollingerBands {
        upper: band(1.0),
        lower: band(-1.0),
        middle,
    })
}

fn rolling<F>(values: &[f64], period: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }
    for (i, window) in values.windows(period).enumerate() {
        out[i + period - 1] = f(window);
    }
    out
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Derived indicator columns, aligned with the bars of a price series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma50: Vec<Option<f64>>,
    pub sma200: Vec<Option<f64>>,
    pub rsi14: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
}

impl IndicatorSet {
    /// Compute every column from the closes of `series`
    pub fn compute(series: &PriceSeries) -> Result<Self> {
        let closes = series.closes();
        let Macd { macd, signal } =
            macd(&closes, MACD_FAST_SPAN, MACD_SLOW_SPAN, MACD_SIGNAL_SPAN)?;
        let bands = bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_WIDTH)?;

        Ok(Self {
            sma50: sma(&closes, SMA_SHORT_PERIOD)?,
            sma200: sma(&closes, SMA_LONG_PERIOD)?,
            rsi14: rsi(&closes, RSI_PERIOD),
            macd: macd.into_iter().map(Some).collect(),
            macd_signal: signal.into_iter().map(Some).collect(),
            bb_upper: bands.upper,
            bb_middle: bands.middle,
            bb_lower: bands.lower,
        })
    }

    pub fn len(&self) -> usize {
        self.sma50.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sma50.is_empty()
    }
}

/// Bar values and indicators at a single date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

/// A price series together with its indicator columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedSeries {
    pub series: PriceSeries,
    pub indicators: IndicatorSet,
}

impl AnalyzedSeries {
    pub fn compute(series: PriceSeries) -> Result<Self> {
        let indicators = IndicatorSet::compute(&series)?;
        Ok(Self { series, indicators })
    }

    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        let bar = self.series.bars().get(index)?;
        let ind = &self.indicators;
        let at = |column: &[Option<f64>]| column.get(index).copied().flatten();
        Some(IndicatorRow {
            date: bar.date,
            close: bar.close,
            sma50: at(&ind.sma50),
            sma200: at(&ind.sma200),
            rsi14: at(&ind.rsi14),
            macd: at(&ind.macd),
            macd_signal: at(&ind.macd_signal),
            bb_upper: at(&ind.bb_upper),
            bb_lower: at(&ind.bb_lower),
        })
    }

    /// Row for the most recent date
    pub fn latest(&self) -> Option<IndicatorRow> {
        self.row(self.len().checked_sub(1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bar;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn series_from(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::flat(start + chrono::Duration::days(i as i64), c))
            .collect();
        PriceSeries::new("TEST", bars)
    }

    /// Deterministic wavy series with an upward drift
    fn wavy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + i as f64 * 0.1 + (i as f64 * 0.7).sin() * 3.0)
            .collect()
    }

    #[test]
    fn test_sma200_defined_from_index_199() {
        let closes = wavy(260);
        let sma200 = sma(&closes, 200).unwrap();

        assert!(sma200[..199].iter().all(Option::is_none));
        for i in 199..closes.len() {
            let expected = closes[i - 199..=i].iter().sum::<f64>() / 200.0;
            assert_close(sma200[i].unwrap(), expected);
        }
    }

    #[test]
    fn test_sma_shorter_than_period() {
        assert_eq!(sma(&[1.0, 2.0, 3.0], 5).unwrap(), vec![None, None, None]);
        assert!(sma(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_sma_rejects_zero_period() {
        assert!(matches!(sma(&[1.0], 0), Err(StockError::Indicator(_))));
    }

    #[test]
    fn test_rsi_first_defined_at_period() {
        let closes = wavy(40);
        let values = rsi(&closes, 14);
        assert!(values[..14].iter().all(Option::is_none));
        assert!(values[14..].iter().all(Option::is_some));
    }

    #[test]
    fn test_rsi_balanced_moves_is_fifty() {
        // seven rises of 1 and seven falls of 1
        let mut closes = vec![100.0];
        for i in 0..14 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let values = rsi(&closes, 14);
        assert_close(values[14].unwrap(), 50.0);
    }

    #[test]
    fn test_rsi_bounded() {
        let closes = wavy(300);
        for value in rsi(&closes, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value), "rsi out of range: {value}");
        }
    }

    #[test]
    fn test_rsi_zero_loss_policy() {
        let rising: Vec<f64> = (0..20).map(f64::from).collect();
        assert_eq!(rsi(&rising, 14)[19], Some(100.0));

        let flat = vec![10.0; 20];
        assert!(rsi(&flat, 14).iter().all(Option::is_none));

        let falling: Vec<f64> = (0..20).map(|i| 100.0 - f64::from(i)).collect();
        assert_eq!(rsi(&falling, 14)[19], Some(0.0));
    }

    #[test]
    fn test_ema_recursion() {
        let closes = [10.0, 11.0, 12.0, 11.5];
        let values = ema(&closes, 3).unwrap();
        let alpha = 2.0 / 4.0;
        let mut expected = closes[0];
        assert_close(values[0], expected);
        for i in 1..closes.len() {
            expected = alpha * closes[i] + (1.0 - alpha) * expected;
            assert_close(values[i], expected);
        }
    }

    #[test]
    fn test_ema_rejects_zero_span() {
        assert!(matches!(ema(&[1.0], 0), Err(StockError::Indicator(_))));
    }

    #[test]
    fn test_macd_constant_prices_is_zero() {
        let closes = vec![42.0; 50];
        let Macd { macd, signal } = macd(&closes, 12, 26, 9).unwrap();
        assert!(macd.iter().all(|v| v.abs() < 1e-12));
        assert!(signal.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..100).map(|i| 50.0 + f64::from(i)).collect();
        let Macd { macd, signal } = macd(&closes, 12, 26, 9).unwrap();
        assert!(macd[99] > 0.0);
        assert!(signal[99] > 0.0);
    }

    #[test]
    fn test_bollinger_uses_sample_std() {
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let bands = bollinger(&closes, 20, 2.0).unwrap();
        let std = 35.0_f64.sqrt();

        assert!(bands.middle[18].is_none());
        assert_close(bands.middle[19].unwrap(), 10.5);
        assert_close(bands.upper[19].unwrap(), 10.5 + 2.0 * std);
        assert_close(bands.lower[19].unwrap(), 10.5 - 2.0 * std);
    }

    #[test]
    fn test_no_look_ahead() {
        let closes = wavy(250);
        let full = IndicatorSet::compute(&series_from(&closes)).unwrap();
        let prefix = IndicatorSet::compute(&series_from(&closes[..220])).unwrap();

        for i in 0..220 {
            assert_eq!(full.sma50[i], prefix.sma50[i]);
            assert_eq!(full.sma200[i], prefix.sma200[i]);
            assert_eq!(full.rsi14[i], prefix.rsi14[i]);
            assert_eq!(full.macd_signal[i], prefix.macd_signal[i]);
            assert_eq!(full.bb_upper[i], prefix.bb_upper[i]);
        }
    }

    #[test]
    fn test_analyzed_series_latest_row() {
        let closes = wavy(210);
        let analyzed = AnalyzedSeries::compute(series_from(&closes)).unwrap();
        let latest = analyzed.latest().unwrap();

        assert_eq!(latest.close, closes[209]);
        assert!(latest.sma50.is_some());
        assert!(latest.sma200.is_some());
        assert!(latest.rsi14.is_some());
        assert!(latest.bb_lower.unwrap() < latest.bb_upper.unwrap());
    }

    #[test]
    fn test_short_series_leaves_long_columns_undefined() {
        let analyzed = AnalyzedSeries::compute(series_from(&wavy(60))).unwrap();
        let latest = analyzed.latest().unwrap();
        assert!(latest.sma50.is_some());
        assert!(latest.sma200.is_none());
    }

    #[test]
    fn test_columns_align_with_bars() {
        let series = series_from(&wavy(75));
        let set = IndicatorSet::compute(&series).unwrap();

        assert_eq!(set.len(), series.len());
        for column in [
            &set.sma50,
            &set.sma200,
            &set.rsi14,
            &set.macd,
            &set.macd_signal,
            &set.bb_upper,
            &set.bb_middle,
            &set.bb_lower,
        ] {
            assert_eq!(column.len(), series.len());
        }
    }

    #[test]
    fn test_empty_series() {
        let analyzed = AnalyzedSeries::compute(series_from(&[])).unwrap();
        assert!(analyzed.indicators.is_empty());
        assert!(analyzed.latest().is_none());
    }
}
