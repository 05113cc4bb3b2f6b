use analytics_core::{AnalyticsError, DailyBar, PriceSeries};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Where one valuation multiple trades against its own history.
#[derive(Debug, Clone, Serialize)]
pub struct MultipleTrend {
    pub name: &'static str,
    pub current: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Current value relative to the historical mean, in percent.
    pub deviation_pct: f64,
    /// Fraction of history at or below the current value, in percent.
    pub percentile: f64,
    pub observations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValuationMultiplesReport {
    pub code: String,
    pub trends: Vec<MultipleTrend>,
}

const MULTIPLES: &[(&str, fn(&DailyBar) -> Option<f64>)] = &[
    ("P/E (TTM)", |b| b.pe_ttm),
    ("P/B (MRQ)", |b| b.pb_mrq),
    ("P/S (TTM)", |b| b.ps_ttm),
    ("P/CF (TTM)", |b| b.pcf_ttm),
];

/// Trend statistics for each valuation multiple the series carries.
/// Multiples absent from every bar are left out of the report.
pub fn trends(series: &PriceSeries) -> Result<ValuationMultiplesReport, AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::EmptySeries(series.code.clone()));
    }

    let mut report = Vec::new();
    for &(name, accessor) in MULTIPLES {
        let values: Vec<f64> = series.bars.iter().filter_map(accessor).collect();
        let current = match values.last() {
            Some(&v) => v,
            None => continue,
        };

        let mean = (&values).mean();
        let at_or_below = values.iter().filter(|&&v| v <= current).count();
        report.push(MultipleTrend {
            name,
            current,
            mean,
            min: (&values).min(),
            max: (&values).max(),
            deviation_pct: if mean == 0.0 {
                0.0
            } else {
                (current - mean) / mean * 100.0
            },
            percentile: at_or_below as f64 / values.len() as f64 * 100.0,
            observations: values.len(),
        });
    }

    Ok(ValuationMultiplesReport {
        code: series.code.clone(),
        trends: report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series_with_pe(pes: &[Option<f64>]) -> PriceSeries {
        let bars = pes
            .iter()
            .enumerate()
            .map(|(i, &pe)| DailyBar {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: None,
                high: None,
                low: None,
                close: 10.0,
                volume: None,
                pe_ttm: pe,
                pb_mrq: None,
                ps_ttm: None,
                pcf_ttm: None,
            })
            .collect();
        PriceSeries {
            code: "sh.600000".to_string(),
            bars,
        }
    }

    #[test]
    fn test_empty_series_rejected() {
        let err = trends(&series_with_pe(&[])).unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptySeries(_)));
    }

    #[test]
    fn test_absent_multiples_are_omitted() {
        let report = trends(&series_with_pe(&[None, None, None])).unwrap();
        assert!(report.trends.is_empty());
    }

    #[test]
    fn test_trend_statistics() {
        let report =
            trends(&series_with_pe(&[Some(10.0), Some(20.0), None, Some(15.0)])).unwrap();
        assert_eq!(report.trends.len(), 1);
        let pe = &report.trends[0];

        assert_eq!(pe.name, "P/E (TTM)");
        assert_eq!(pe.observations, 3);
        assert_eq!(pe.current, 15.0);
        assert!((pe.mean - 15.0).abs() < 1e-9);
        assert_eq!(pe.min, 10.0);
        assert_eq!(pe.max, 20.0);
        assert!(pe.deviation_pct.abs() < 1e-9);
        // 10 and 15 of the three values sit at or below 15
        assert!((pe.percentile - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_serializes_for_presentation() {
        let report = trends(&series_with_pe(&[Some(10.0), Some(20.0)])).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["code"], "sh.600000");
        assert_eq!(json["trends"][0]["name"], "P/E (TTM)");
        assert_eq!(json["trends"][0]["observations"], 2);
    }

    #[test]
    fn test_current_at_historical_high() {
        let report = trends(&series_with_pe(&[Some(8.0), Some(9.0), Some(12.0)])).unwrap();
        let pe = &report.trends[0];
        assert_eq!(pe.percentile, 100.0);
        assert!(pe.deviation_pct > 0.0);
    }
}
