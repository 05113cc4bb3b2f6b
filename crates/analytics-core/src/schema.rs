//! Provider schema aliases.
//!
//! The upstream data source spells the same fundamental concept several
//! ways depending on endpoint and API version. Each concept gets one
//! ordered alias list, tried in priority order, so the mapping lives in one
//! place instead of ad hoc lookups at every call site.

use crate::types::FundamentalRecord;

/// Operating cash flow on a cash-flow statement row.
pub const OPERATING_CASH_FLOW: &[&str] =
    &["netCashOperating", "NCFOperateA", "operatingCashFlow"];

/// Total liabilities on a balance-sheet row.
pub const TOTAL_LIABILITIES: &[&str] = &["totalLiability", "totalLiabilities", "totalDebt"];

/// Per-share dividend on a dividend-history row.
pub const DIVIDEND_PER_SHARE: &[&str] = &[
    "dividendPerShare",
    "dividend_per_share",
    "dividendsPerShare",
    "div_cash_paid",
];

/// Year-over-year profit growth on a growth-capability row (percentage).
pub const PROFIT_GROWTH: &[&str] = &["YOYNI", "YOYProfit", "YOYEPSBasic"];

/// Trailing P/E on a daily bar.
pub const PE_TTM: &[&str] = &["peTTM"];
/// Most-recent-quarter P/B on a daily bar.
pub const PB_MRQ: &[&str] = &["pbMRQ"];
/// Trailing P/S on a daily bar.
pub const PS_TTM: &[&str] = &["psTTM"];
/// Trailing P/CF on a daily bar.
pub const PCF_TTM: &[&str] = &["pcfNcfTTM"];

/// Coerce a provider string to a finite float; anything else is missing.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// First alias present on the record that coerces to a finite value.
pub fn first_numeric(record: &FundamentalRecord, aliases: &[&str]) -> Option<f64> {
    aliases
        .iter()
        .find_map(|key| record.fields.get(*key).and_then(|v| coerce_numeric(v)))
}

/// First alias that coerces to a non-zero value, with the matched field
/// name. Used for growth rates where a literal zero means "not reported".
pub fn first_nonzero(
    record: &FundamentalRecord,
    aliases: &[&'static str],
) -> Option<(&'static str, f64)> {
    for key in aliases {
        if let Some(v) = record.fields.get(*key).and_then(|v| coerce_numeric(v)) {
            if v != 0.0 {
                return Some((*key, v));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(coerce_numeric("12.5"), Some(12.5));
        assert_eq!(coerce_numeric("  -3 "), Some(-3.0));
        assert_eq!(coerce_numeric(""), None);
        assert_eq!(coerce_numeric("n/a"), None);
        assert_eq!(coerce_numeric("NaN"), None);
        assert_eq!(coerce_numeric("inf"), None);
    }

    #[test]
    fn test_alias_priority_order() {
        let record = FundamentalRecord::new()
            .with("operatingCashFlow", "100")
            .with("netCashOperating", "200");
        // netCashOperating comes first in the alias list
        assert_eq!(first_numeric(&record, OPERATING_CASH_FLOW), Some(200.0));
    }

    #[test]
    fn test_alias_falls_through_unparseable() {
        let record = FundamentalRecord::new()
            .with("totalLiability", "--")
            .with("totalLiabilities", "42.0");
        assert_eq!(first_numeric(&record, TOTAL_LIABILITIES), Some(42.0));
    }

    #[test]
    fn test_first_nonzero_skips_zero() {
        let record = FundamentalRecord::new()
            .with("YOYNI", "0")
            .with("YOYProfit", "18.5");
        assert_eq!(first_nonzero(&record, PROFIT_GROWTH), Some(("YOYProfit", 18.5)));
    }

    #[test]
    fn test_missing_across_all_aliases() {
        let record = FundamentalRecord::new().with("unrelated", "1.0");
        assert_eq!(first_numeric(&record, DIVIDEND_PER_SHARE), None);
        assert_eq!(first_nonzero(&record, PROFIT_GROWTH), None);
    }
}
