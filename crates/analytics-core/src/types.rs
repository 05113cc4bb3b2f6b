use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw tabular row as delivered by the upstream provider.
/// All values arrive as strings; numeric coercion happens in preprocessing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: String,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Daily OHLCV bar with optional valuation multiples.
///
/// Close is the only mandatory numeric; everything else is missing (`None`)
/// when the provider omitted it or coercion failed. Stored values are always
/// finite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
    pub pe_ttm: Option<f64>,
    pub pb_mrq: Option<f64>,
    pub ps_ttm: Option<f64>,
    pub pcf_ttm: Option<f64>,
}

/// Preprocessed per-security price series: strictly increasing by date,
/// no duplicate dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub code: String,
    pub bars: Vec<DailyBar>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }
}

/// One fundamentals row (cash-flow statement, balance sheet, growth or
/// dividend data) keyed by the provider's column names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundamentalRecord {
    pub fields: HashMap<String, String>,
}

impl FundamentalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Point-in-time valuation multiples for one security, as of a reference date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSnapshot {
    pub code: String,
    pub name: Option<String>,
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub pe_ttm: Option<f64>,
    pub pb_mrq: Option<f64>,
    pub ps_ttm: Option<f64>,
}

/// Industry classification entry for one security.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryMember {
    pub code: String,
    pub name: Option<String>,
    pub industry: String,
}

/// One phase of a multi-phase growth projection: grow at `rate` for `years`,
/// then move to the next phase. The phase list is terminated by an implicit
/// perpetual phase at the final rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPhase {
    pub rate: f64,
    pub years: u32,
}

impl GrowthPhase {
    pub fn new(rate: f64, years: u32) -> Self {
        Self { rate, years }
    }
}
