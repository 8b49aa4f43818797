//! Rolling and exponential statistics over `f64` series.
//!
//! Every function returns a new vector with the same length as its input.
//! Windowed statistics are `NaN` until a full window is available, and a
//! `NaN` anywhere inside a window makes that window's value `NaN`.

/// Apply `stat` to every trailing window of `window` values.
///
/// Index `i` of the output holds `stat(values[i + 1 - window..=i])`; the
/// first `window - 1` indices (or all of them, when the input is shorter
/// than the window) are `NaN`. A zero window yields an all-`NaN` output.
fn rolling<F>(values: &[f64], window: usize, stat: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for (offset, slice) in values.windows(window).enumerate() {
        out[offset + window - 1] = stat(slice);
    }
    out
}

/// Mean taken as an offset from the first value, so a window of identical
/// values returns that value exactly.
fn mean(slice: &[f64]) -> f64 {
    let base = slice[0];
    base + slice.iter().map(|v| v - base).sum::<f64>() / slice.len() as f64
}

/// Simple moving average of the trailing `window` values ending at each index.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, mean)
}

/// Sample standard deviation (divisor `n - 1`) of the trailing `window` values.
///
/// A window of one has no sample deviation and is `NaN` everywhere.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return vec![f64::NAN; values.len()];
    }

    rolling(values, window, |slice| {
        let avg = mean(slice);
        let sum_sq: f64 = slice.iter().map(|v| (v - avg).powi(2)).sum();
        (sum_sq / (slice.len() - 1) as f64).sqrt()
    })
}

/// Smoothing factor for an exponential average with the given span.
pub fn ewm_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Exponential moving average without bias correction.
///
/// `ewm[0] = values[0]` and `ewm[i] = ewm[i-1] + alpha * (values[i] - ewm[i-1])`
/// with `alpha = 2 / (span + 1)`. Defined from index 0; an unchanged input
/// leaves the average bit-for-bit unchanged.
pub fn ewm(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = ewm_alpha(span);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &value in values {
        let next = match prev {
            Some(last) => last + alpha * (value - last),
            None => value,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// Element-wise difference `a[i] - b[i]`. Both inputs must share a length.
pub fn subtract(a: &[f64], b: &[f64]) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// First difference: `NaN` at index 0, then `values[i] - values[i - 1]`.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }

    out.push(f64::NAN);
    out.extend(values.windows(2).map(|pair| pair[1] - pair[0]));
    out
}
