use analytics_core::{schema, AnalyticsError, FinancialDataSource};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Forecast growth is capped here no matter what the history implies.
/// A few years of recovery cash flows can otherwise compound absurdly.
pub const FORECAST_GROWTH_CAP: f64 = 0.15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfAssumptions {
    pub discount_rate: f64,
    pub terminal_growth_rate: f64,
    pub forecast_years: u32,
}

impl Default for DcfAssumptions {
    fn default() -> Self {
        Self {
            discount_rate: 0.10,
            terminal_growth_rate: 0.025,
            forecast_years: 5,
        }
    }
}

/// One forecast year of the explicit period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedFlow {
    pub year: u32,
    pub cash_flow: f64,
    pub present_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfValuation {
    pub enterprise_value: f64,
    /// Present value of the explicit forecast period.
    pub explicit_value: f64,
    pub terminal_value: f64,
    pub terminal_present_value: f64,
    pub historical_growth: f64,
    pub forecast_growth: f64,
    pub projections: Vec<ProjectedFlow>,
    pub assumptions: DcfAssumptions,
}

pub struct DcfValuationEngine;

impl DcfValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Discounted cash flow over a chronological operating cash-flow
    /// history. Non-positive entries are dropped before deriving growth.
    pub fn value(
        &self,
        cash_flows: &[f64],
        assumptions: &DcfAssumptions,
    ) -> Result<DcfValuation, AnalyticsError> {
        let positive: Vec<f64> = cash_flows.iter().copied().filter(|v| *v > 0.0).collect();
        if positive.len() < 2 {
            return Err(AnalyticsError::InsufficientCashFlow(format!(
                "{} positive cash flows, need at least 2",
                positive.len()
            )));
        }

        let historical_growth = compound_annual_growth(&positive);
        let forecast_growth = historical_growth.min(FORECAST_GROWTH_CAP);

        let base = positive[positive.len() - 1];
        let mut projections = Vec::with_capacity(assumptions.forecast_years as usize);
        let mut explicit_value = 0.0;
        let mut cash_flow = base;
        for year in 1..=assumptions.forecast_years {
            cash_flow *= 1.0 + forecast_growth;
            let present_value = cash_flow / (1.0 + assumptions.discount_rate).powi(year as i32);
            explicit_value += present_value;
            projections.push(ProjectedFlow {
                year,
                cash_flow,
                present_value,
            });
        }

        let terminal_value = cash_flow * (1.0 + assumptions.terminal_growth_rate)
            / (assumptions.discount_rate - assumptions.terminal_growth_rate);
        let terminal_present_value = terminal_value
            / (1.0 + assumptions.discount_rate).powi(assumptions.forecast_years as i32);

        Ok(DcfValuation {
            enterprise_value: explicit_value + terminal_present_value,
            explicit_value,
            terminal_value,
            terminal_present_value,
            historical_growth,
            forecast_growth,
            projections,
            assumptions: assumptions.clone(),
        })
    }

    /// Enterprise value net of debt.
    pub fn equity_value(&self, enterprise_value: f64, total_debt: f64) -> f64 {
        enterprise_value - total_debt
    }

    pub fn per_share_value(&self, equity_value: f64, shares_outstanding: f64) -> Option<f64> {
        if shares_outstanding > 0.0 {
            Some(equity_value / shares_outstanding)
        } else {
            None
        }
    }
}

impl Default for DcfValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// CAGR from first to last value over n-1 periods.
fn compound_annual_growth(values: &[f64]) -> f64 {
    let first = values[0];
    let last = values[values.len() - 1];
    let periods = (values.len() - 1) as f64;
    (last / first).powf(1.0 / periods) - 1.0
}

/// Pull annual (Q4) operating cash flow for the trailing years. Years the
/// provider cannot serve are skipped so one bad year does not sink the
/// whole valuation.
pub async fn collect_operating_cash_flows(
    source: &dyn FinancialDataSource,
    code: &str,
    end_year: i32,
    years_back: u32,
) -> Vec<f64> {
    let mut flows = Vec::new();
    for year in (end_year - years_back as i32 + 1)..=end_year {
        let records = match source.cash_flow_data(code, year, 4).await {
            Ok(records) => records,
            Err(e) => {
                warn!(code, year, error = %e, "cash flow fetch failed, skipping year");
                continue;
            }
        };
        match records
            .iter()
            .find_map(|r| schema::first_numeric(r, schema::OPERATING_CASH_FLOW))
        {
            Some(value) => flows.push(value),
            None => {
                warn!(code, year, "no operating cash flow field, skipping year");
            }
        }
    }
    flows
}
