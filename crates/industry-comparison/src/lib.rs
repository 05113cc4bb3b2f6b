use analytics_core::{AnalyticsError, FinancialDataSource, ValuationSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::warn;

const MIN_PEERS: usize = 2;

/// One peer's valuation multiples as of the reference date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerValuationRow {
    pub code: String,
    pub name: String,
    pub pe_ttm: Option<f64>,
    pub pb_mrq: Option<f64>,
    pub ps_ttm: Option<f64>,
}

impl From<ValuationSnapshot> for PeerValuationRow {
    fn from(s: ValuationSnapshot) -> Self {
        let name = s.name.unwrap_or_else(|| s.code.clone());
        Self {
            code: s.code,
            name,
            pe_ttm: s.pe_ttm,
            pb_mrq: s.pb_mrq,
            ps_ttm: s.ps_ttm,
        }
    }
}

/// Target's standing against the peer mean, thresholds at 80/95/105/120
/// percent of the mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeLevel {
    MateriallyUndervalued,
    SlightlyUndervalued,
    Fair,
    SlightlyOvervalued,
    MateriallyOvervalued,
}

impl RelativeLevel {
    pub fn classify(target: f64, peer_mean: f64) -> Option<Self> {
        if peer_mean <= 0.0 {
            return None;
        }
        let ratio = target / peer_mean;
        Some(if ratio < 0.80 {
            Self::MateriallyUndervalued
        } else if ratio < 0.95 {
            Self::SlightlyUndervalued
        } else if ratio <= 1.05 {
            Self::Fair
        } else if ratio <= 1.20 {
            Self::SlightlyOvervalued
        } else {
            Self::MateriallyOvervalued
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MateriallyUndervalued => "materially undervalued",
            Self::SlightlyUndervalued => "slightly undervalued",
            Self::Fair => "fairly valued",
            Self::SlightlyOvervalued => "slightly overvalued",
            Self::MateriallyOvervalued => "materially overvalued",
        }
    }
}

/// Cross-sectional statistics for one multiple.
#[derive(Debug, Clone, Serialize)]
pub struct MultipleStats {
    pub name: &'static str,
    /// Peers carrying this multiple, not the full industry count.
    pub peer_count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub target_value: Option<f64>,
    /// Fraction of peers at or below the target, in percent.
    pub percentile: Option<f64>,
    pub deviation_pct: Option<f64>,
    pub relative_level: Option<RelativeLevel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndustryComparisonReport {
    pub industry: String,
    pub target_code: String,
    pub peer_count: usize,
    pub multiples: Vec<MultipleStats>,
}

const MULTIPLES: &[(&str, fn(&PeerValuationRow) -> Option<f64>)] = &[
    ("P/E (TTM)", |r| r.pe_ttm),
    ("P/B (MRQ)", |r| r.pb_mrq),
    ("P/S (TTM)", |r| r.ps_ttm),
];

pub struct IndustryComparisonEngine;

impl IndustryComparisonEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rank the target against peers sharing its industry. `peers` must
    /// not include the target itself.
    pub fn compare(
        &self,
        industry: &str,
        target: &PeerValuationRow,
        peers: &[PeerValuationRow],
    ) -> Result<IndustryComparisonReport, AnalyticsError> {
        if peers.len() < MIN_PEERS {
            return Err(AnalyticsError::InsufficientPeers(format!(
                "{} peers in industry {industry}, need at least {MIN_PEERS}",
                peers.len()
            )));
        }

        let mut multiples = Vec::new();
        for &(name, accessor) in MULTIPLES {
            let mut values: Vec<f64> = peers.iter().filter_map(accessor).collect();
            if values.len() < MIN_PEERS {
                continue;
            }
            values.sort_by(|a, b| a.total_cmp(b));

            let mean = (&values).mean();
            let target_value = accessor(target);
            let percentile = target_value.map(|t| {
                values.iter().filter(|&&v| v <= t).count() as f64 / values.len() as f64 * 100.0
            });
            let deviation_pct = target_value.and_then(|t| {
                if mean == 0.0 {
                    None
                } else {
                    Some((t - mean) / mean * 100.0)
                }
            });

            multiples.push(MultipleStats {
                name,
                peer_count: values.len(),
                mean,
                median: median_sorted(&values),
                min: values[0],
                max: values[values.len() - 1],
                std_dev: (&values).std_dev(),
                target_value,
                percentile,
                deviation_pct,
                relative_level: target_value.and_then(|t| RelativeLevel::classify(t, mean)),
            });
        }

        if multiples.is_empty() {
            return Err(AnalyticsError::InsufficientPeers(format!(
                "no multiple is carried by at least {MIN_PEERS} peers in industry {industry}"
            )));
        }

        Ok(IndustryComparisonReport {
            industry: industry.to_string(),
            target_code: target.code.clone(),
            peer_count: peers.len(),
            multiples,
        })
    }
}

impl Default for IndustryComparisonEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// The target's industry and every peer snapshot that could be fetched.
#[derive(Debug, Clone)]
pub struct PeerUniverse {
    pub industry: String,
    pub target: PeerValuationRow,
    pub peers: Vec<PeerValuationRow>,
}

/// Resolve the target's industry, then fetch a valuation snapshot per
/// peer. A peer whose fetch fails is dropped with a warning; a target
/// whose fetch fails is fatal, there is nothing to rank.
pub async fn collect_peer_rows(
    source: &dyn FinancialDataSource,
    target_code: &str,
    date: NaiveDate,
) -> Result<PeerUniverse, AnalyticsError> {
    let classification = source.industry_members(Some(target_code), Some(date)).await?;
    let target_member = classification
        .into_iter()
        .find(|m| m.code == target_code)
        .ok_or_else(|| {
            AnalyticsError::MissingField(format!("no industry classification for {target_code}"))
        })?;

    let universe = source.industry_members(None, Some(date)).await?;
    let target = PeerValuationRow::from(source.valuation_snapshot(target_code, date).await?);

    let mut peers = Vec::new();
    for member in universe {
        if member.industry != target_member.industry || member.code == target_code {
            continue;
        }
        match source.valuation_snapshot(&member.code, date).await {
            Ok(snapshot) => peers.push(PeerValuationRow::from(snapshot)),
            Err(e) => {
                warn!(code = %member.code, error = %e, "peer snapshot failed, excluding peer");
            }
        }
    }

    Ok(PeerUniverse {
        industry: target_member.industry,
        target,
        peers,
    })
}
