use async_trait::async_trait;
use chrono::NaiveDate;

use analytics_core::{
    AnalyticsError, FinancialDataSource, FundamentalRecord, IndustryMember, RawRecord,
    ValuationSnapshot,
};
use industry_comparison::collect_peer_rows;

struct FixtureSource;

fn member(code: &str, industry: &str) -> IndustryMember {
    IndustryMember {
        code: code.to_string(),
        name: Some(code.to_string()),
        industry: industry.to_string(),
    }
}

#[async_trait]
impl FinancialDataSource for FixtureSource {
    async fn daily_bars(
        &self,
        _code: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<RawRecord>, AnalyticsError> {
        Err(AnalyticsError::Source("not served".to_string()))
    }

    async fn cash_flow_data(
        &self,
        _code: &str,
        _year: i32,
        _quarter: u32,
    ) -> Result<Vec<FundamentalRecord>, AnalyticsError> {
        Err(AnalyticsError::Source("not served".to_string()))
    }

    async fn balance_data(
        &self,
        _code: &str,
        _year: i32,
        _quarter: u32,
    ) -> Result<Vec<FundamentalRecord>, AnalyticsError> {
        Err(AnalyticsError::Source("not served".to_string()))
    }

    async fn growth_data(
        &self,
        _code: &str,
        _year: i32,
        _quarter: u32,
    ) -> Result<Vec<FundamentalRecord>, AnalyticsError> {
        Err(AnalyticsError::Source("not served".to_string()))
    }

    async fn dividend_data(
        &self,
        _code: &str,
        _year: i32,
    ) -> Result<Vec<FundamentalRecord>, AnalyticsError> {
        Err(AnalyticsError::Source("not served".to_string()))
    }

    async fn industry_members(
        &self,
        code: Option<&str>,
        _date: Option<NaiveDate>,
    ) -> Result<Vec<IndustryMember>, AnalyticsError> {
        match code {
            Some("sh.600000") => Ok(vec![member("sh.600000", "银行")]),
            Some(_) => Ok(vec![]),
            None => Ok(vec![
                member("sh.600000", "银行"),
                member("sh.600015", "银行"),
                member("sh.600016", "银行"),
                member("sh.600519", "白酒"),
            ]),
        }
    }

    async fn valuation_snapshot(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<ValuationSnapshot, AnalyticsError> {
        if code == "sh.600015" {
            return Err(AnalyticsError::Source("suspended".to_string()));
        }
        Ok(ValuationSnapshot {
            code: code.to_string(),
            name: Some(code.to_string()),
            date,
            close: Some(10.0),
            pe_ttm: Some(6.0),
            pb_mrq: Some(0.6),
            ps_ttm: Some(1.8),
        })
    }
}

#[tokio::test]
async fn failed_peer_is_excluded_not_fatal() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
    let universe = collect_peer_rows(&FixtureSource, "sh.600000", date)
        .await
        .unwrap();

    assert_eq!(universe.industry, "银行");
    assert_eq!(universe.target.code, "sh.600000");
    // sh.600015 failed its snapshot, sh.600519 is another industry
    assert_eq!(universe.peers.len(), 1);
    assert_eq!(universe.peers[0].code, "sh.600016");
}

#[tokio::test]
async fn unknown_target_is_a_missing_field_error() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
    let err = collect_peer_rows(&FixtureSource, "sh.999999", date)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::MissingField(_)));
}
