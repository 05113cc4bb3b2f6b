use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{AnalyticsError, FundamentalRecord, IndustryMember, RawRecord, ValuationSnapshot};

/// Seam to the upstream market-data provider.
///
/// Session handling, retries and rate limits live behind this trait; the
/// engines only assume each call either returns rows or fails independently
/// of any other call.
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
    /// Daily bars (with valuation multiples where available) for one
    /// security over an inclusive date range.
    async fn daily_bars(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRecord>, AnalyticsError>;

    /// Cash-flow statement rows for one reporting period.
    async fn cash_flow_data(
        &self,
        code: &str,
        year: i32,
        quarter: u32,
    ) -> Result<Vec<FundamentalRecord>, AnalyticsError>;

    /// Balance-sheet rows for one reporting period.
    async fn balance_data(
        &self,
        code: &str,
        year: i32,
        quarter: u32,
    ) -> Result<Vec<FundamentalRecord>, AnalyticsError>;

    /// Growth-capability rows for one reporting period.
    async fn growth_data(
        &self,
        code: &str,
        year: i32,
        quarter: u32,
    ) -> Result<Vec<FundamentalRecord>, AnalyticsError>;

    /// Dividend-history rows for one calendar year. A year may carry
    /// several payout rows.
    async fn dividend_data(
        &self,
        code: &str,
        year: i32,
    ) -> Result<Vec<FundamentalRecord>, AnalyticsError>;

    /// Industry classification. `code: None` returns the whole universe.
    async fn industry_members(
        &self,
        code: Option<&str>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<IndustryMember>, AnalyticsError>;

    /// Latest valuation multiples for one security as of `date`.
    async fn valuation_snapshot(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<ValuationSnapshot, AnalyticsError>;
}
