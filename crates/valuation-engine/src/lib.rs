pub mod dcf;
pub mod ddm;
pub mod multiples;
pub mod peg;

pub use dcf::{DcfAssumptions, DcfValuation, DcfValuationEngine, ProjectedFlow};
pub use ddm::{DdmValuation, DdmValuationEngine};
pub use multiples::{MultipleTrend, ValuationMultiplesReport};
pub use peg::{PegAssessment, PegBand, PegCalculator};
