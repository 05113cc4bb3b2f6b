use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Empty series: {0}")]
    EmptySeries(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Insufficient cash flow history: {0}")]
    InsufficientCashFlow(String),

    #[error("Invalid dividend: {0}")]
    InvalidDividend(String),

    #[error("Insufficient peers: {0}")]
    InsufficientPeers(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Data source error: {0}")]
    Source(String),
}
