use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indicators::error::IndicatorError;
use crate::indicators::validation::validate_price_points;

/// One trading-period observation. Only `close` feeds the indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// A validated, timestamp-ascending sequence of [`PricePoint`]s.
///
/// Construction is the validation boundary: once a `PriceSeries` exists every
/// price is finite and non-negative and timestamps strictly increase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, IndicatorError> {
        validate_price_points(&points)?;
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// The first `len` points. A prefix of a valid series is itself valid.
    pub fn truncated(&self, len: usize) -> Self {
        Self {
            points: self.points[..len.min(self.points.len())].to_vec(),
        }
    }

    /// The last `len` points.
    pub fn tail(&self, len: usize) -> Self {
        let start = self.points.len().saturating_sub(len);
        Self {
            points: self.points[start..].to_vec(),
        }
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = IndicatorError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

/// Named numeric columns an [`IndicatorFrame`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorField {
    #[serde(rename = "sma_20")]
    Sma20,
    #[serde(rename = "ema_10")]
    Ema10,
    Rsi,
    BollingerUpper,
    BollingerLower,
    Macd,
    SignalLine,
}

impl IndicatorField {
    pub const ALL: [IndicatorField; 7] = [
        IndicatorField::Sma20,
        IndicatorField::Ema10,
        IndicatorField::Rsi,
        IndicatorField::BollingerUpper,
        IndicatorField::BollingerLower,
        IndicatorField::Macd,
        IndicatorField::SignalLine,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorField::Sma20 => "sma_20",
            IndicatorField::Ema10 => "ema_10",
            IndicatorField::Rsi => "rsi",
            IndicatorField::BollingerUpper => "bollinger_upper",
            IndicatorField::BollingerLower => "bollinger_lower",
            IndicatorField::Macd => "macd",
            IndicatorField::SignalLine => "signal_line",
        }
    }
}

impl fmt::Display for IndicatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A price series plus zero or more indicator columns, each index-aligned
/// with the series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    series: PriceSeries,
    columns: BTreeMap<IndicatorField, Vec<f64>>,
}

impl IndicatorFrame {
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series,
            columns: BTreeMap::new(),
        }
    }

    /// Attach a column, rejecting one whose length differs from the series.
    pub fn with_column(
        mut self,
        field: IndicatorField,
        values: Vec<f64>,
    ) -> Result<Self, IndicatorError> {
        if values.len() != self.series.len() {
            return Err(IndicatorError::MisalignedColumn {
                field: field.name(),
                expected: self.series.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(field, values);
        Ok(self)
    }

    /// Insert a column computed from this frame's own closes.
    pub(crate) fn insert_aligned(&mut self, field: IndicatorField, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.series.len(), "{} misaligned", field);
        self.columns.insert(field, values);
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn column(&self, field: IndicatorField) -> Option<&[f64]> {
        self.columns.get(&field).map(Vec::as_slice)
    }

    pub fn has_column(&self, field: IndicatorField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = IndicatorField> + '_ {
        self.columns.keys().copied()
    }

    /// Value of `field` at `index`; `None` when the column is absent, the
    /// index is out of range, or the value is undefined.
    pub fn value(&self, field: IndicatorField, index: usize) -> Option<f64> {
        self.column(field)
            .and_then(|values| values.get(index).copied())
            .filter(|v| !v.is_nan())
    }

    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        let point = self.series.points().get(index)?;
        Some(IndicatorRow {
            timestamp: point.timestamp,
            open: point.open,
            high: point.high,
            low: point.low,
            close: point.close,
            volume: point.volume,
            sma_20: self.value(IndicatorField::Sma20, index),
            ema_10: self.value(IndicatorField::Ema10, index),
            rsi: self.value(IndicatorField::Rsi, index),
            bollinger_upper: self.value(IndicatorField::BollingerUpper, index),
            bollinger_lower: self.value(IndicatorField::BollingerLower, index),
            macd: self.value(IndicatorField::Macd, index),
            signal_line: self.value(IndicatorField::SignalLine, index),
        })
    }

    pub fn rows(&self) -> Vec<IndicatorRow> {
        (0..self.len()).filter_map(|i| self.row(i)).collect()
    }
}

/// Row view of an [`IndicatorFrame`]; undefined values become `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_10: Option<f64>,
    pub rsi: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub macd: Option<f64>,
    pub signal_line: Option<f64>,
}
