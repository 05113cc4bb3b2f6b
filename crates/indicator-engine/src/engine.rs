use analytics_core::{AnalyticsError, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::backend::{Indicator, IndicatorBackend, IndicatorColumn, ManualBackend};
use crate::indicators;

/// Standard subset computed when the caller does not name indicators.
pub const DEFAULT_INDICATORS: &[&str] = &["MACD", "RSI", "BOLL", "WR", "STOCH"];

/// Common moving-average periods.
pub const DEFAULT_MA_PERIODS: &[usize] = &[5, 10, 20, 50, 120, 250];

/// Date-aligned indicator output plus any per-indicator warnings.
/// The report always carries the close column as a reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub code: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub columns: Vec<IndicatorColumn>,
    pub warnings: Vec<String>,
}

/// Latest-close deviation from one SMA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmaDeviation {
    pub period: usize,
    pub sma: f64,
    pub deviation_pct: f64,
}

/// SMA/EMA/WMA columns per requested period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverageReport {
    pub code: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub columns: Vec<IndicatorColumn>,
    pub deviations: Vec<SmaDeviation>,
}

/// Computes requested indicators over a preprocessed series.
///
/// Unknown names and indicators the series is too short for are skipped
/// with a recorded warning; callers always get the best-effort partial
/// report. The request only fails when nothing at all could be computed.
pub struct IndicatorEngine {
    backend: Box<dyn IndicatorBackend>,
    fallback: ManualBackend,
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self {
            backend: Box::new(ManualBackend),
            fallback: ManualBackend,
        }
    }

    /// Use a specialized backend; the manual formulas remain the fallback
    /// for indicators it declines.
    pub fn with_backend(backend: Box<dyn IndicatorBackend>) -> Self {
        Self {
            backend,
            fallback: ManualBackend,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Compute the requested indicator subset (`None` = the default set).
    pub fn compute(
        &self,
        series: &PriceSeries,
        requested: Option<&[String]>,
    ) -> Result<IndicatorReport, AnalyticsError> {
        let default_names: Vec<String> =
            DEFAULT_INDICATORS.iter().map(|s| s.to_string()).collect();
        let names = requested.unwrap_or(&default_names);

        let mut columns = Vec::new();
        let mut warnings = Vec::new();
        let mut known = 0usize;
        let mut computed = 0usize;

        for name in names {
            let indicator = match Indicator::parse(name) {
                Some(ind) => ind,
                None => {
                    tracing::warn!("Unsupported indicator '{}' requested for {}", name, series.code);
                    warnings.push(format!("unsupported indicator: {}", name));
                    continue;
                }
            };
            known += 1;

            let min = indicator.min_periods();
            if series.len() < min {
                tracing::warn!(
                    "{}: {} needs {} observations, have {}",
                    series.code,
                    indicator.name(),
                    min,
                    series.len()
                );
                warnings.push(format!(
                    "{} needs at least {} observations (have {})",
                    indicator.name(),
                    min,
                    series.len()
                ));
                continue;
            }

            let result = self
                .backend
                .compute(&series.bars, indicator)
                .or_else(|| self.fallback.compute(&series.bars, indicator));
            match result {
                Some(mut cols) => {
                    computed += 1;
                    columns.append(&mut cols);
                }
                None => {
                    warnings.push(format!("{} unavailable in any backend", indicator.name()));
                }
            }
        }

        if known > 0 && computed == 0 {
            return Err(AnalyticsError::InsufficientData(format!(
                "{} observations are too few for any requested indicator on {}",
                series.len(),
                series.code
            )));
        }

        Ok(IndicatorReport {
            code: series.code.clone(),
            dates: series.dates(),
            close: series.closes(),
            columns,
            warnings,
        })
    }

    /// SMA/EMA/WMA per period; periods longer than the series are skipped.
    pub fn moving_averages(
        &self,
        series: &PriceSeries,
        periods: Option<&[usize]>,
    ) -> Result<MovingAverageReport, AnalyticsError> {
        if series.is_empty() {
            return Err(AnalyticsError::EmptySeries(format!(
                "no bars for {}",
                series.code
            )));
        }
        let periods = periods.unwrap_or(DEFAULT_MA_PERIODS);
        let closes = series.closes();
        let latest_close = closes[closes.len() - 1];

        let mut columns = Vec::new();
        let mut deviations = Vec::new();

        for &period in periods {
            if series.len() < period {
                continue;
            }
            let sma_values = indicators::sma(&closes, period);
            if let Some(Some(latest_sma)) = sma_values.last() {
                if *latest_sma != 0.0 {
                    deviations.push(SmaDeviation {
                        period,
                        sma: *latest_sma,
                        deviation_pct: (latest_close / latest_sma - 1.0) * 100.0,
                    });
                }
            }
            columns.push(IndicatorColumn::new(format!("SMA_{}", period), sma_values));
            columns.push(IndicatorColumn::new(
                format!("EMA_{}", period),
                indicators::ema(&closes, period),
            ));
            columns.push(IndicatorColumn::new(
                format!("WMA_{}", period),
                indicators::wma(&closes, period),
            ));
        }

        Ok(MovingAverageReport {
            code: series.code.clone(),
            dates: series.dates(),
            close: closes,
            columns,
            deviations,
        })
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}
