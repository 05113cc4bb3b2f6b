//! Raw-series preprocessing.
//!
//! Turns provider rows into a `PriceSeries`: numeric coercion (failures
//! become missing, never zero), chronological ordering, duplicate-date
//! collapse. Every downstream engine assumes it runs on preprocessed input.

use chrono::NaiveDate;

use crate::schema::{self, coerce_numeric};
use crate::{AnalyticsError, DailyBar, PriceSeries, RawRecord};

fn field(record: &RawRecord, key: &str) -> Option<f64> {
    record.fields.get(key).and_then(|v| coerce_numeric(v))
}

fn multiple(record: &RawRecord, aliases: &[&str]) -> Option<f64> {
    aliases.iter().find_map(|key| field(record, key))
}

/// Preprocess raw provider rows into a date-ordered `PriceSeries`.
///
/// Rows with an unparseable date or a missing/unparseable close are dropped.
/// When the provider re-sends a date, the later row wins. Fails with
/// `EmptySeries` when nothing survives.
pub fn preprocess(code: &str, rows: &[RawRecord]) -> Result<PriceSeries, AnalyticsError> {
    let mut bars: Vec<DailyBar> = Vec::with_capacity(rows.len());

    for row in rows {
        let date = match NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => continue,
        };
        let close = match field(row, "close") {
            Some(c) => c,
            None => continue,
        };

        bars.push(DailyBar {
            date,
            open: field(row, "open"),
            high: field(row, "high"),
            low: field(row, "low"),
            close,
            volume: field(row, "volume"),
            pe_ttm: multiple(row, schema::PE_TTM),
            pb_mrq: multiple(row, schema::PB_MRQ),
            ps_ttm: multiple(row, schema::PS_TTM),
            pcf_ttm: multiple(row, schema::PCF_TTM),
        });
    }

    if bars.is_empty() {
        return Err(AnalyticsError::EmptySeries(format!(
            "no usable rows for {} after coercion",
            code
        )));
    }

    // Stable sort keeps provider order within a date; the later row wins.
    bars.sort_by_key(|b| b.date);
    bars.reverse();
    bars.dedup_by_key(|b| b.date);
    bars.reverse();

    Ok(PriceSeries {
        code: code.to_string(),
        bars,
    })
}
