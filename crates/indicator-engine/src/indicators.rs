use analytics_core::DailyBar;

/// All indicator outputs are date-aligned with the input series: one slot
/// per bar, `None` until the indicator's window is filled.

fn undefined(len: usize) -> Vec<Option<f64>> {
    vec![None; len]
}

fn high(bar: &DailyBar) -> f64 {
    bar.high.unwrap_or(bar.close)
}

fn low(bar: &DailyBar) -> f64 {
    bar.low.unwrap_or(bar.close)
}

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = undefined(data.len());
    if period == 0 || data.len() < period {
        return out;
    }
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        out[i] = Some(sum / period as f64);
    }
    out
}

/// Exponential Moving Average, seeded by the first observation.
/// Defined from index 0; earlier samples receive declining weight.
pub fn ema(data: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || data.is_empty() {
        return undefined(data.len());
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(data.len());
    let mut prev = data[0];
    out.push(Some(prev));
    for &x in &data[1..] {
        prev = (x - prev) * alpha + prev;
        out.push(Some(prev));
    }
    out
}

/// Weighted Moving Average, linear weights 1..n with the most recent
/// value weighted n.
pub fn wma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = undefined(data.len());
    if period == 0 || data.len() < period {
        return out;
    }
    let weight_sum = (period * (period + 1)) as f64 / 2.0;
    for i in period - 1..data.len() {
        let window = &data[i + 1 - period..=i];
        let weighted: f64 = window
            .iter()
            .enumerate()
            .map(|(k, &x)| x * (k + 1) as f64)
            .sum();
        out[i] = Some(weighted / weight_sum);
    }
    out
}

/// Relative Strength Index over a trailing simple mean of gains/losses.
/// Saturates at 100 when the loss mean is zero.
pub fn rsi(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = undefined(data.len());
    if period == 0 || data.len() < period + 1 {
        return out;
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);
    for w in data.windows(2) {
        let change = w[1] - w[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    for i in period..data.len() {
        let window_gains: f64 = gains[i - period..i].iter().sum();
        let window_losses: f64 = losses[i - period..i].iter().sum();
        let avg_gain = window_gains / period as f64;
        let avg_loss = window_losses / period as f64;
        out[i] = Some(if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        });
    }
    out
}

/// MACD (Moving Average Convergence Divergence)
#[derive(Debug, Clone)]
pub struct MacdResult {
    pub macd_line: Vec<Option<f64>>,
    pub signal_line: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn macd(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdResult {
    if fast_period == 0 || slow_period == 0 || signal_period == 0 || slow_period < fast_period {
        return MacdResult {
            macd_line: undefined(data.len()),
            signal_line: undefined(data.len()),
            histogram: undefined(data.len()),
        };
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f.unwrap_or(0.0) - s.unwrap_or(0.0))
        .collect();

    let signal_line = ema(&macd_line, signal_period);
    let histogram: Vec<Option<f64>> = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(&line, sig)| sig.map(|s| line - s))
        .collect();

    MacdResult {
        macd_line: macd_line.into_iter().map(Some).collect(),
        signal_line,
        histogram,
    }
}

/// Bollinger Bands
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

pub fn bollinger_bands(data: &[f64], period: usize, std_mult: f64) -> BollingerBands {
    let middle = sma(data, period);
    let mut upper = undefined(data.len());
    let mut lower = undefined(data.len());
    if period < 2 || data.len() < period {
        return BollingerBands { upper, middle, lower };
    }

    for i in period - 1..data.len() {
        let window = &data[i + 1 - period..=i];
        let mean = middle[i].unwrap_or(0.0);
        // Sample std (n-1)
        let variance: f64 =
            window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        let std = variance.sqrt();
        upper[i] = Some(mean + std_mult * std);
        lower[i] = Some(mean - std_mult * std);
    }

    BollingerBands { upper, middle, lower }
}

/// Rolling mean over an already-aligned optional series; defined only
/// where the whole window is defined.
fn rolling_mean_opt(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = undefined(values.len());
    if period == 0 || values.len() < period {
        return out;
    }
    for i in period - 1..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().all(|v| v.is_some()) {
            let sum: f64 = window.iter().map(|v| v.unwrap_or(0.0)).sum();
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

/// Stochastic oscillator / KDJ
#[derive(Debug, Clone)]
pub struct KdjResult {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
    pub j: Vec<Option<f64>>,
}

pub fn kdj(bars: &[DailyBar], k_period: usize, d_period: usize) -> KdjResult {
    let mut k = undefined(bars.len());
    if k_period == 0 || bars.len() < k_period {
        return KdjResult {
            d: k.clone(),
            j: k.clone(),
            k,
        };
    }

    for i in k_period - 1..bars.len() {
        let window = &bars[i + 1 - k_period..=i];
        let highest = window.iter().map(high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(low).fold(f64::INFINITY, f64::min);
        k[i] = Some(if highest == lowest {
            50.0
        } else {
            100.0 * (bars[i].close - lowest) / (highest - lowest)
        });
    }

    let d = rolling_mean_opt(&k, d_period);
    let j: Vec<Option<f64>> = k
        .iter()
        .zip(d.iter())
        .map(|(kv, dv)| match (kv, dv) {
            (Some(kv), Some(dv)) => Some(3.0 * kv - 2.0 * dv),
            _ => None,
        })
        .collect();

    KdjResult { k, d, j }
}

/// Williams %R, the complement of the stochastic %K (range [-100, 0]).
pub fn williams_r(bars: &[DailyBar], period: usize) -> Vec<Option<f64>> {
    let mut out = undefined(bars.len());
    if period == 0 || bars.len() < period {
        return out;
    }
    for i in period - 1..bars.len() {
        let window = &bars[i + 1 - period..=i];
        let highest = window.iter().map(high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(low).fold(f64::INFINITY, f64::min);
        out[i] = Some(if highest == lowest {
            -50.0
        } else {
            -100.0 * (highest - bars[i].close) / (highest - lowest)
        });
    }
    out
}

/// Commodity Channel Index: typical-price deviation from its moving
/// average, scaled by 0.015 x mean absolute deviation.
pub fn cci(bars: &[DailyBar], period: usize) -> Vec<Option<f64>> {
    let mut out = undefined(bars.len());
    if period == 0 || bars.len() < period {
        return out;
    }
    let typical: Vec<f64> = bars
        .iter()
        .map(|b| (high(b) + low(b) + b.close) / 3.0)
        .collect();

    for i in period - 1..typical.len() {
        let window = &typical[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let mad = window.iter().map(|x| (x - mean).abs()).sum::<f64>() / period as f64;
        if mad > 0.0 {
            out[i] = Some((typical[i] - mean) / (0.015 * mad));
        }
    }
    out
}

/// Average True Range: rolling mean of the true range.
pub fn atr(bars: &[DailyBar], period: usize) -> Vec<Option<f64>> {
    let mut out = undefined(bars.len());
    if period == 0 || bars.len() < period + 1 {
        return out;
    }

    // True range defined from the second bar
    let mut true_ranges = Vec::with_capacity(bars.len() - 1);
    for w in bars.windows(2) {
        let high_low = high(&w[1]) - low(&w[1]);
        let high_close = (high(&w[1]) - w[0].close).abs();
        let low_close = (low(&w[1]) - w[0].close).abs();
        true_ranges.push(high_low.max(high_close).max(low_close));
    }

    for i in period..bars.len() {
        let window = &true_ranges[i - period..i];
        out[i] = Some(window.iter().sum::<f64>() / period as f64);
    }
    out
}
