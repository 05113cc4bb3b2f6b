use analytics_core::{schema, FundamentalRecord};
use serde::{Deserialize, Serialize};

/// Classification bands for the PEG ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PegBand {
    /// Negative growth makes the ratio meaningless.
    NegativeGrowth,
    Undervalued,
    Fair,
    SlightlyOvervalued,
    Overvalued,
    SeverelyOvervalued,
}

impl PegBand {
    pub fn classify(peg: f64) -> Self {
        if peg < 0.0 {
            Self::NegativeGrowth
        } else if peg < 0.5 {
            Self::Undervalued
        } else if peg <= 1.0 {
            Self::Fair
        } else if peg <= 1.5 {
            Self::SlightlyOvervalued
        } else if peg <= 2.0 {
            Self::Overvalued
        } else {
            Self::SeverelyOvervalued
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NegativeGrowth => "negative growth",
            Self::Undervalued => "undervalued",
            Self::Fair => "fairly valued",
            Self::SlightlyOvervalued => "slightly overvalued",
            Self::Overvalued => "overvalued",
            Self::SeverelyOvervalued => "severely overvalued",
        }
    }
}

/// Outcome of a PEG calculation. Missing inputs are diagnostics the caller
/// can report, not hard errors.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PegAssessment {
    Computed {
        pe_ttm: f64,
        /// Profit growth in percent, as the provider reports it.
        growth_rate: f64,
        /// Which alias supplied the growth rate.
        growth_field: &'static str,
        peg: f64,
        band: PegBand,
    },
    MissingPe,
    MissingGrowth,
}

pub struct PegCalculator;

impl PegCalculator {
    pub fn new() -> Self {
        Self
    }

    /// PEG = trailing P/E over profit growth (in percent). The growth rate
    /// is the first non-zero value across the accepted provider fields, a
    /// literal zero means the provider had nothing to report.
    pub fn assess(&self, pe_ttm: Option<f64>, growth: &FundamentalRecord) -> PegAssessment {
        let pe = match pe_ttm {
            Some(pe) => pe,
            None => return PegAssessment::MissingPe,
        };
        let (growth_field, growth_rate) = match schema::first_nonzero(growth, schema::PROFIT_GROWTH)
        {
            Some(found) => found,
            None => return PegAssessment::MissingGrowth,
        };

        let peg = pe / growth_rate;
        PegAssessment::Computed {
            pe_ttm: pe,
            growth_rate,
            growth_field,
            peg,
            band: PegBand::classify(peg),
        }
    }
}

impl Default for PegCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        assert_eq!(PegBand::classify(-0.3), PegBand::NegativeGrowth);
        assert_eq!(PegBand::classify(0.0), PegBand::Undervalued);
        assert_eq!(PegBand::classify(0.49), PegBand::Undervalued);
        assert_eq!(PegBand::classify(0.5), PegBand::Fair);
        assert_eq!(PegBand::classify(1.0), PegBand::Fair);
        assert_eq!(PegBand::classify(1.01), PegBand::SlightlyOvervalued);
        assert_eq!(PegBand::classify(1.5), PegBand::SlightlyOvervalued);
        assert_eq!(PegBand::classify(2.0), PegBand::Overvalued);
        assert_eq!(PegBand::classify(2.5), PegBand::SeverelyOvervalued);
    }

    #[test]
    fn test_pe_fifteen_growth_twenty_is_fair() {
        let calc = PegCalculator::new();
        let growth = FundamentalRecord::new().with("YOYNI", "20.0");

        match calc.assess(Some(15.0), &growth) {
            PegAssessment::Computed {
                peg,
                band,
                growth_field,
                ..
            } => {
                assert!((peg - 0.75).abs() < 1e-9);
                assert_eq!(band, PegBand::Fair);
                assert_eq!(growth_field, "YOYNI");
            }
            other => panic!("expected computed assessment, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_growth_falls_through_to_next_alias() {
        let calc = PegCalculator::new();
        let growth = FundamentalRecord::new()
            .with("YOYNI", "0")
            .with("YOYProfit", "25.0");

        match calc.assess(Some(20.0), &growth) {
            PegAssessment::Computed {
                growth_field, peg, ..
            } => {
                assert_eq!(growth_field, "YOYProfit");
                assert!((peg - 0.8).abs() < 1e-9);
            }
            other => panic!("expected computed assessment, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_inputs_are_distinct() {
        let calc = PegCalculator::new();
        let growth = FundamentalRecord::new().with("YOYNI", "20.0");
        assert!(matches!(
            calc.assess(None, &growth),
            PegAssessment::MissingPe
        ));

        let empty = FundamentalRecord::new();
        assert!(matches!(
            calc.assess(Some(15.0), &empty),
            PegAssessment::MissingGrowth
        ));
    }

    #[test]
    fn test_negative_growth_band() {
        let calc = PegCalculator::new();
        let growth = FundamentalRecord::new().with("YOYNI", "-12.5");

        match calc.assess(Some(15.0), &growth) {
            PegAssessment::Computed { band, .. } => {
                assert_eq!(band, PegBand::NegativeGrowth);
            }
            other => panic!("expected computed assessment, got {other:?}"),
        }
    }
}
