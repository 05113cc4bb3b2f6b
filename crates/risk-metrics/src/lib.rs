use std::collections::HashMap;

use analytics_core::{AnalyticsError, PriceSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Fixed risk-free rate used by Sharpe ratio calculations.
pub const RISK_FREE_RATE: f64 = 0.03;

const TRADING_DAYS: f64 = 252.0;
const MIN_OBSERVATIONS: usize = 20;

/// Lookback window for risk calculations, expressed in calendar days
/// counted back from the latest shared observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookbackPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
}

impl LookbackPeriod {
    pub fn days(&self) -> i64 {
        match self {
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
            Self::OneYear => 365,
            Self::TwoYears => 730,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneMonth => "1m",
            Self::ThreeMonths => "3m",
            Self::SixMonths => "6m",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "1m" => Some(Self::OneMonth),
            "3m" => Some(Self::ThreeMonths),
            "6m" => Some(Self::SixMonths),
            "1y" => Some(Self::OneYear),
            "2y" => Some(Self::TwoYears),
            _ => None,
        }
    }
}

/// Risk profile of a stock measured against a benchmark index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub code: String,
    pub benchmark_code: String,
    pub period: String,
    pub observations: usize,
    pub beta: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    /// Worst peak-to-trough loss over the window, as a non-positive fraction.
    pub max_drawdown: f64,
    pub downside_risk: f64,
    pub correlation: f64,
    pub tracking_error: f64,
    pub information_ratio: f64,
    pub benchmark_annualized_return: f64,
    pub benchmark_volatility: f64,
    pub benchmark_sharpe: f64,
    pub excess_return: f64,
}

pub struct RiskMetricsCalculator;

impl RiskMetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Measure a stock's risk against a benchmark over the lookback window.
    ///
    /// The two series are inner-joined on date before anything else, so
    /// holidays or suspensions on either side simply shrink the sample.
    pub fn compute(
        &self,
        target: &PriceSeries,
        benchmark: &PriceSeries,
        period: LookbackPeriod,
    ) -> Result<RiskMetrics, AnalyticsError> {
        let (target_closes, benchmark_closes) = align(target, benchmark, period);

        if target_closes.len() < MIN_OBSERVATIONS {
            return Err(AnalyticsError::InsufficientData(format!(
                "{} vs {}: {} aligned observations over {}, need at least {}",
                target.code,
                benchmark.code,
                target_closes.len(),
                period.label(),
                MIN_OBSERVATIONS
            )));
        }

        let target_returns = daily_returns(&target_closes);
        let benchmark_returns = daily_returns(&benchmark_closes);

        let beta = covariance_beta(&target_returns, &benchmark_returns);
        let annualized_return = annualize_return(&target_returns);
        let annualized_volatility = (&target_returns).std_dev() * TRADING_DAYS.sqrt();
        let sharpe_ratio = sharpe(annualized_return, annualized_volatility);

        let benchmark_annualized_return = annualize_return(&benchmark_returns);
        let benchmark_volatility = (&benchmark_returns).std_dev() * TRADING_DAYS.sqrt();
        let benchmark_sharpe = sharpe(benchmark_annualized_return, benchmark_volatility);

        let excess: Vec<f64> = target_returns
            .iter()
            .zip(benchmark_returns.iter())
            .map(|(t, b)| t - b)
            .collect();

        let tracking_error = if excess.len() >= 2 {
            (&excess).std_dev() * TRADING_DAYS.sqrt()
        } else {
            0.0
        };
        let information_ratio = if tracking_error == 0.0 {
            0.0
        } else {
            (annualized_return - benchmark_annualized_return) / tracking_error
        };

        Ok(RiskMetrics {
            code: target.code.clone(),
            benchmark_code: benchmark.code.clone(),
            period: period.label().to_string(),
            observations: target_closes.len(),
            beta,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown: max_drawdown(&target_returns),
            downside_risk: downside_risk(&excess),
            correlation: correlation(&target_returns, &benchmark_returns),
            tracking_error,
            information_ratio,
            benchmark_annualized_return,
            benchmark_volatility,
            benchmark_sharpe,
            excess_return: annualized_return - benchmark_annualized_return,
        })
    }
}

impl Default for RiskMetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Inner-join the two series on date within the lookback window, most
/// recent shared date as the anchor.
fn align(
    target: &PriceSeries,
    benchmark: &PriceSeries,
    period: LookbackPeriod,
) -> (Vec<f64>, Vec<f64>) {
    let by_date: HashMap<NaiveDate, f64> =
        benchmark.bars.iter().map(|b| (b.date, b.close)).collect();

    let end = match target.bars.last() {
        Some(bar) => bar.date,
        None => return (Vec::new(), Vec::new()),
    };
    let cutoff = end - chrono::Duration::days(period.days());

    let mut target_closes = Vec::new();
    let mut benchmark_closes = Vec::new();
    for bar in &target.bars {
        if bar.date <= cutoff {
            continue;
        }
        if let Some(&bench_close) = by_date.get(&bar.date) {
            target_closes.push(bar.close);
            benchmark_closes.push(bench_close);
        }
    }
    (target_closes, benchmark_closes)
}

// Keeps one return per day so the target and benchmark vectors stay paired.
fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
        .collect()
}

/// Beta against the benchmark, 0 when the benchmark never moves.
fn covariance_beta(target: &[f64], benchmark: &[f64]) -> f64 {
    if target.len() < 2 {
        return 0.0;
    }
    let var = benchmark.variance();
    if var == 0.0 {
        return 0.0;
    }
    target.covariance(benchmark) / var
}

/// Geometric annualization: (1 + total)^(252/n) - 1 over n daily returns.
fn annualize_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let total: f64 = returns.iter().map(|r| 1.0 + r).product();
    total.powf(TRADING_DAYS / returns.len() as f64) - 1.0
}

fn sharpe(annualized_return: f64, volatility: f64) -> f64 {
    if volatility == 0.0 {
        return 0.0;
    }
    (annualized_return - RISK_FREE_RATE) / volatility
}

/// Worst cumulative decline from a running peak, as a non-positive fraction.
fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = 1.0;
    let mut worst = 0.0_f64;

    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = cumulative / peak - 1.0;
        if drawdown < worst {
            worst = drawdown;
        }
    }
    worst
}

/// Annualized std of the negative excess returns only.
fn downside_risk(excess: &[f64]) -> f64 {
    let negative: Vec<f64> = excess.iter().copied().filter(|r| *r < 0.0).collect();
    if negative.len() < 2 {
        return 0.0;
    }
    (&negative).std_dev() * TRADING_DAYS.sqrt()
}

fn correlation(target: &[f64], benchmark: &[f64]) -> f64 {
    if target.len() < 2 {
        return 0.0;
    }
    let denom = target.std_dev() * benchmark.std_dev();
    if denom == 0.0 {
        return 0.0;
    }
    target.covariance(benchmark) / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics_core::DailyBar;

    fn series(code: &str, closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: None,
                high: None,
                low: None,
                close,
                volume: None,
                pe_ttm: None,
                pb_mrq: None,
                ps_ttm: None,
                pcf_ttm: None,
            })
            .collect();
        PriceSeries {
            code: code.to_string(),
            bars,
        }
    }

    fn wavy(n: usize, base: f64) -> Vec<f64> {
        (0..n)
            .map(|i| base + (i as f64 * 0.7).sin() * 2.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn test_period_day_mapping() {
        assert_eq!(LookbackPeriod::OneMonth.days(), 30);
        assert_eq!(LookbackPeriod::ThreeMonths.days(), 90);
        assert_eq!(LookbackPeriod::SixMonths.days(), 180);
        assert_eq!(LookbackPeriod::OneYear.days(), 365);
        assert_eq!(LookbackPeriod::TwoYears.days(), 730);
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(LookbackPeriod::parse("1Y"), Some(LookbackPeriod::OneYear));
        assert_eq!(LookbackPeriod::parse("3m"), Some(LookbackPeriod::ThreeMonths));
        assert_eq!(LookbackPeriod::parse("10d"), None);
    }

    #[test]
    fn test_too_few_aligned_rows_fails() {
        let target = series("sh.600000", &wavy(10, 100.0));
        let benchmark = series("sh.000001", &wavy(10, 3000.0));
        let calc = RiskMetricsCalculator::new();

        let err = calc
            .compute(&target, &benchmark, LookbackPeriod::ThreeMonths)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
    }

    #[test]
    fn test_self_benchmark_has_unit_beta() {
        let target = series("sh.600000", &wavy(60, 100.0));
        let benchmark = series("sh.000001", &wavy(60, 100.0));
        let calc = RiskMetricsCalculator::new();

        let m = calc
            .compute(&target, &benchmark, LookbackPeriod::SixMonths)
            .unwrap();
        assert!((m.beta - 1.0).abs() < 1e-9);
        assert!((m.correlation - 1.0).abs() < 1e-9);
        assert_eq!(m.tracking_error, 0.0);
        assert_eq!(m.information_ratio, 0.0);
        assert_eq!(m.downside_risk, 0.0);
        assert!(m.excess_return.abs() < 1e-9);
    }

    #[test]
    fn test_max_drawdown_known_value() {
        // 100 -> 110 -> 99 then flat: trough is 10% under the peak
        let mut closes = vec![100.0, 110.0, 99.0];
        closes.extend(std::iter::repeat(99.0).take(25));
        let target = series("sh.600000", &closes);
        let benchmark = series("sh.000001", &wavy(28, 3000.0));
        let calc = RiskMetricsCalculator::new();

        let m = calc
            .compute(&target, &benchmark, LookbackPeriod::ThreeMonths)
            .unwrap();
        assert!((m.max_drawdown - (-0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_rise_has_zero_drawdown() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let target = series("sh.600000", &closes);
        let benchmark = series("sh.000001", &wavy(30, 3000.0));
        let calc = RiskMetricsCalculator::new();

        let m = calc
            .compute(&target, &benchmark, LookbackPeriod::ThreeMonths)
            .unwrap();
        assert_eq!(m.max_drawdown, 0.0);
        assert!(m.annualized_return > 0.0);
        assert!(m.annualized_volatility > 0.0);
    }

    #[test]
    fn test_misaligned_dates_are_dropped() {
        let target = series("sh.600000", &wavy(40, 100.0));
        // Benchmark misses the first 25 dates, leaving 15 shared rows
        let mut benchmark = series("sh.000001", &wavy(40, 3000.0));
        benchmark.bars.drain(..25);
        let calc = RiskMetricsCalculator::new();

        let err = calc
            .compute(&target, &benchmark, LookbackPeriod::SixMonths)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
    }

    #[test]
    fn test_flat_benchmark_zero_beta() {
        let target = series("sh.600000", &wavy(30, 100.0));
        let benchmark = series("sh.000001", &vec![3000.0; 30]);
        let calc = RiskMetricsCalculator::new();

        let m = calc
            .compute(&target, &benchmark, LookbackPeriod::ThreeMonths)
            .unwrap();
        assert_eq!(m.beta, 0.0);
        assert_eq!(m.benchmark_volatility, 0.0);
        assert_eq!(m.benchmark_sharpe, 0.0);
    }
}
