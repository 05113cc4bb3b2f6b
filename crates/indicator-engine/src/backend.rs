//! Indicator computation backends.
//!
//! The engine talks to indicators through one seam so a specialized
//! indicator library can slot in without changing the request contract.
//! `ManualBackend` is the built-in implementation; a backend may decline an
//! indicator (return `None`) and the engine falls back to the manual one.

use analytics_core::DailyBar;
use serde::{Deserialize, Serialize};

use crate::indicators;

/// Windows served for an "SMA" request; periods the series cannot fill
/// come back as all-missing columns.
pub const SMA_PERIODS: &[usize] = &[5, 10, 20, 50];

/// Supported indicator names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    Sma,
    Macd,
    Rsi,
    Bollinger,
    Kdj,
    Stochastic,
    WilliamsR,
    Cci,
    Atr,
}

impl Indicator {
    /// Parse a requested indicator name (case-insensitive, provider
    /// spellings included).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SMA" | "MA" => Some(Self::Sma),
            "MACD" => Some(Self::Macd),
            "RSI" => Some(Self::Rsi),
            "BOLL" | "BB" | "BBANDS" => Some(Self::Bollinger),
            "KDJ" => Some(Self::Kdj),
            "STOCH" => Some(Self::Stochastic),
            "WR" | "WILLR" => Some(Self::WilliamsR),
            "CCI" => Some(Self::Cci),
            "ATR" => Some(Self::Atr),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sma => "SMA",
            Self::Macd => "MACD",
            Self::Rsi => "RSI",
            Self::Bollinger => "BOLL",
            Self::Kdj => "KDJ",
            Self::Stochastic => "STOCH",
            Self::WilliamsR => "WR",
            Self::Cci => "CCI",
            Self::Atr => "ATR",
        }
    }

    /// Minimum observations before the indicator produces any value.
    /// Each formula keeps its own window requirement; these are not unified.
    pub fn min_periods(&self) -> usize {
        match self {
            Self::Sma => SMA_PERIODS[0],
            Self::Macd => 26,
            Self::Rsi => 15,
            Self::Bollinger => 20,
            Self::Kdj | Self::Stochastic | Self::WilliamsR => 14,
            Self::Cci => 20,
            Self::Atr => 15,
        }
    }
}

/// One named output column, date-aligned with the input series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl IndicatorColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Per-indicator computation contract. All implementations produce the same
/// output shape; numeric differences within floating-point tolerance are
/// acceptable.
pub trait IndicatorBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Columns for one indicator, or `None` when this backend does not
    /// support it.
    fn compute(&self, bars: &[DailyBar], indicator: Indicator) -> Option<Vec<IndicatorColumn>>;
}

/// Built-in backend computing every supported indicator with the manual
/// formulas. Always available.
pub struct ManualBackend;

impl IndicatorBackend for ManualBackend {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn compute(&self, bars: &[DailyBar], indicator: Indicator) -> Option<Vec<IndicatorColumn>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let columns = match indicator {
            Indicator::Sma => SMA_PERIODS
                .iter()
                .map(|&p| IndicatorColumn::new(format!("SMA_{}", p), indicators::sma(&closes, p)))
                .collect(),
            Indicator::Macd => {
                let m = indicators::macd(&closes, 12, 26, 9);
                vec![
                    IndicatorColumn::new("MACD", m.macd_line),
                    IndicatorColumn::new("MACD_Signal", m.signal_line),
                    IndicatorColumn::new("MACD_Histogram", m.histogram),
                ]
            }
            Indicator::Rsi => vec![IndicatorColumn::new("RSI", indicators::rsi(&closes, 14))],
            Indicator::Bollinger => {
                let bb = indicators::bollinger_bands(&closes, 20, 2.0);
                vec![
                    IndicatorColumn::new("BB_Upper", bb.upper),
                    IndicatorColumn::new("BB_Middle", bb.middle),
                    IndicatorColumn::new("BB_Lower", bb.lower),
                ]
            }
            Indicator::Kdj => {
                let k = indicators::kdj(bars, 14, 3);
                vec![
                    IndicatorColumn::new("KDJ_K", k.k),
                    IndicatorColumn::new("KDJ_D", k.d),
                    IndicatorColumn::new("KDJ_J", k.j),
                ]
            }
            Indicator::Stochastic => {
                let k = indicators::kdj(bars, 14, 3);
                vec![
                    IndicatorColumn::new("STOCH_K", k.k),
                    IndicatorColumn::new("STOCH_D", k.d),
                ]
            }
            Indicator::WilliamsR => {
                vec![IndicatorColumn::new("WR", indicators::williams_r(bars, 14))]
            }
            Indicator::Cci => vec![IndicatorColumn::new("CCI", indicators::cci(bars, 20))],
            Indicator::Atr => vec![IndicatorColumn::new("ATR", indicators::atr(bars, 14))],
        };
        Some(columns)
    }
}
