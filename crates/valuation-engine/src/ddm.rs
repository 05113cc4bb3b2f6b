use analytics_core::{schema, AnalyticsError, FinancialDataSource, GrowthPhase};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Clamp band for growth rates derived from dividend history. A single
/// special payout year can otherwise imply triple-digit growth.
pub const DDM_GROWTH_FLOOR: f64 = 0.01;
pub const DDM_GROWTH_CAP: f64 = 0.20;
/// Used when the history is too thin to derive a rate at all.
pub const DDM_DEFAULT_GROWTH: f64 = 0.05;

/// Explicit horizon of the two-stage model.
pub const TWO_STAGE_YEARS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedDividend {
    pub year: u32,
    pub dividend: f64,
    pub present_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdmValuation {
    /// Per-share intrinsic value.
    pub intrinsic_value: f64,
    pub explicit_value: f64,
    /// 0 when the final phase grows at or above the discount rate, where
    /// the perpetuity is undefined.
    pub terminal_value: f64,
    pub terminal_present_value: f64,
    pub projections: Vec<ProjectedDividend>,
}

pub struct DdmValuationEngine;

impl DdmValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Dividend discount model over explicit growth phases, with a Gordon
    /// terminal value at the final phase's rate when that rate stays under
    /// the discount rate.
    pub fn value(
        &self,
        current_dividend: f64,
        phases: &[GrowthPhase],
        discount_rate: f64,
    ) -> Result<DdmValuation, AnalyticsError> {
        if current_dividend <= 0.0 {
            return Err(AnalyticsError::InvalidDividend(format!(
                "current dividend {current_dividend} must be positive"
            )));
        }

        let mut dividend = current_dividend;
        let mut year = 0u32;
        let mut explicit_value = 0.0;
        let mut projections = Vec::new();

        for phase in phases {
            for _ in 0..phase.years {
                year += 1;
                dividend *= 1.0 + phase.rate;
                let present_value = dividend / (1.0 + discount_rate).powi(year as i32);
                explicit_value += present_value;
                projections.push(ProjectedDividend {
                    year,
                    dividend,
                    present_value,
                });
            }
        }

        let (terminal_value, terminal_present_value) = match phases.last() {
            Some(last) if last.rate < discount_rate => {
                let terminal =
                    dividend * (1.0 + last.rate) / (discount_rate - last.rate);
                (terminal, terminal / (1.0 + discount_rate).powi(year as i32))
            }
            _ => (0.0, 0.0),
        };

        Ok(DdmValuation {
            intrinsic_value: explicit_value + terminal_present_value,
            explicit_value,
            terminal_value,
            terminal_present_value,
            projections,
        })
    }

    /// Two-stage model: `growth_rate` for five years, then a perpetuity at
    /// `terminal_growth_rate`.
    pub fn two_stage(
        &self,
        current_dividend: f64,
        growth_rate: f64,
        terminal_growth_rate: f64,
        discount_rate: f64,
    ) -> Result<DdmValuation, AnalyticsError> {
        let phases = [
            GrowthPhase::new(growth_rate, TWO_STAGE_YEARS),
            GrowthPhase::new(terminal_growth_rate, 0),
        ];
        self.value(current_dividend, &phases, discount_rate)
    }
}

impl Default for DdmValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean year-over-year dividend growth, clamped to the policy band.
/// Falls back to the default rate when no ratio can be formed.
pub fn derive_growth_rate(annual_dividends: &[f64]) -> f64 {
    let ratios: Vec<f64> = annual_dividends
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    if ratios.is_empty() {
        return DDM_DEFAULT_GROWTH;
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    mean.clamp(DDM_GROWTH_FLOOR, DDM_GROWTH_CAP)
}

/// Total per-share dividend for each of the trailing years, oldest first.
/// A year may carry several payout rows, which are summed. Years the
/// provider cannot serve, and years with no positive total, are skipped.
pub async fn collect_annual_dividends(
    source: &dyn FinancialDataSource,
    code: &str,
    end_year: i32,
    years_back: u32,
) -> Vec<(i32, f64)> {
    let mut annual = Vec::new();
    for year in (end_year - years_back as i32)..=end_year {
        let records = match source.dividend_data(code, year).await {
            Ok(records) => records,
            Err(e) => {
                warn!(code, year, error = %e, "dividend fetch failed, skipping year");
                continue;
            }
        };

        // First alias that any row carries wins for the whole year, the
        // provider does not mix spellings within one year.
        let mut total = 0.0;
        for &alias in schema::DIVIDEND_PER_SHARE {
            let values: Vec<f64> = records
                .iter()
                .filter_map(|r| schema::first_numeric(r, &[alias]))
                .collect();
            if !values.is_empty() {
                total = values.iter().sum();
                break;
            }
        }
        if total > 0.0 {
            annual.push((year, total));
        }
    }
    annual
}
