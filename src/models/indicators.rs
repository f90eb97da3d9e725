//! Technical indicator calculations.
//!
//! All functions operate on `&[Option<f64>]` cells and return a vector of
//! the same length. `None` marks an undefined value: the warm-up rows at
//! the start of each indicator, and any row the input gaps make
//! uncomputable. The EMA-based indicators (MACD, RSI) reset their warm-up
//! when they hit a missing input and re-seed on the next full run of
//! defined values.

/// Calculate Simple Moving Average for a given period
///
/// # Arguments
/// * `values` - Cells of the source column (typically Close)
/// * `period` - Trailing window length (e.g. 10, 20, 50)
///
/// # Returns
/// * Vector of SMA values; the first `period - 1` entries and any window
///   covering a missing cell are `None`
pub fn sma(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];

    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().all(|cell| cell.is_some()) {
            let sum: f64 = window.iter().flatten().sum();
            out[i] = Some(sum / period as f64);
        }
    }

    out
}

/// Calculate Exponential Moving Average for a given period
///
/// Seeded with the SMA of the first `period` consecutive defined values,
/// then `ema = prev + k * (value - prev)` with `k = 2 / (period + 1)`.
/// A missing input resets the seed.
pub fn ema(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];

    if period == 0 {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut state: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seed_run = 0usize;

    for (i, cell) in values.iter().enumerate() {
        match (*cell, state) {
            (Some(value), Some(prev)) => {
                let next = prev + k * (value - prev);
                out[i] = Some(next);
                state = Some(next);
            }
            (Some(value), None) => {
                seed_sum += value;
                seed_run += 1;
                if seed_run == period {
                    let seeded = seed_sum / period as f64;
                    out[i] = Some(seeded);
                    state = Some(seeded);
                }
            }
            (None, _) => {
                state = None;
                seed_sum = 0.0;
                seed_run = 0;
            }
        }
    }

    out
}

/// Calculate MACD line, signal line and histogram
///
/// Line is `EMA(fast) - EMA(slow)` of the input, signal is `EMA(signal)`
/// of the line, histogram is line minus signal. With the standard 12/26/9
/// parameters and gap-free input, the line is defined from row 25 and the
/// signal and histogram from row 33.
pub fn macd(
    values: &[Option<f64>],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal = ema(&line, signal_period);

    let histogram: Vec<Option<f64>> = line
        .iter()
        .zip(signal.iter())
        .map(|(l, s)| match (l, s) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    (line, signal, histogram)
}

/// Calculate Relative Strength Index using Wilder's smoothing
///
/// Seed averages are the mean gain and loss over the first `period`
/// changes; afterwards `avg = (prev * (period - 1) + current) / period`.
/// Values are `100 * gain / (gain + loss)`, bounded to [0, 100], with a
/// neutral 50 when both averages are zero. The first `period` entries are
/// `None`.
pub fn rsi(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];

    if period == 0 {
        return out;
    }

    let p = period as f64;
    let mut state: Option<(f64, f64)> = None;
    let mut seed_gain = 0.0;
    let mut seed_loss = 0.0;
    let mut seed_run = 0usize;
    let mut prev: Option<f64> = None;

    for (i, cell) in values.iter().enumerate() {
        let value = match *cell {
            Some(value) => value,
            None => {
                state = None;
                seed_gain = 0.0;
                seed_loss = 0.0;
                seed_run = 0;
                prev = None;
                continue;
            }
        };

        if let Some(previous) = prev {
            let change = value - previous;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);

            if let Some((avg_gain, avg_loss)) = state {
                let avg_gain = (avg_gain * (p - 1.0) + gain) / p;
                let avg_loss = (avg_loss * (p - 1.0) + loss) / p;
                state = Some((avg_gain, avg_loss));
                out[i] = Some(rsi_value(avg_gain, avg_loss));
            } else {
                seed_gain += gain;
                seed_loss += loss;
                seed_run += 1;
                if seed_run == period {
                    let avg_gain = seed_gain / p;
                    let avg_loss = seed_loss / p;
                    state = Some((avg_gain, avg_loss));
                    out[i] = Some(rsi_value(avg_gain, avg_loss));
                }
            }
        }

        prev = Some(value);
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let total = avg_gain + avg_loss;
    if total == 0.0 {
        50.0
    } else {
        100.0 * avg_gain / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_sma_basic() {
        let closes = cells(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let ma3 = sma(&closes, 3);

        assert_eq!(ma3.len(), 5);
        assert_eq!(ma3[0], None); // Not enough data
        assert_eq!(ma3[1], None); // Not enough data
        assert_eq!(ma3[2], Some(11.0)); // (10+11+12)/3
        assert_eq!(ma3[3], Some(12.0)); // (11+12+13)/3
        assert_eq!(ma3[4], Some(13.0)); // (12+13+14)/3
    }

    #[test]
    fn test_sma_gap_recovers() {
        let closes = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let ma2 = sma(&closes, 2);

        assert_eq!(ma2[0], None);
        assert_eq!(ma2[1], None); // window covers the gap
        assert_eq!(ma2[2], None); // window covers the gap
        assert_eq!(ma2[3], Some(3.5));
        assert_eq!(ma2[4], Some(4.5));
    }

    #[test]
    fn test_sma_input_shorter_than_period() {
        let closes = cells(&[10.0, 11.0]);
        assert_eq!(sma(&closes, 3), vec![None, None]);
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let closes = cells(&[1.0, 2.0, 3.0, 5.0, 7.0]);
        let ema3 = ema(&closes, 3);

        assert_eq!(ema3[0], None);
        assert_eq!(ema3[1], None);
        approx(ema3[2].unwrap(), 2.0); // seed: (1+2+3)/3
        approx(ema3[3].unwrap(), 3.5); // 2 + 0.5*(5-2)
        approx(ema3[4].unwrap(), 5.25); // 3.5 + 0.5*(7-3.5)
    }

    #[test]
    fn test_ema_resets_after_gap() {
        let closes = vec![Some(1.0), Some(2.0), None, Some(4.0), Some(6.0), Some(8.0)];
        let ema2 = ema(&closes, 2);

        assert_eq!(ema2[0], None);
        assert!(ema2[1].is_some());
        assert_eq!(ema2[2], None);
        assert_eq!(ema2[3], None); // re-seeding
        approx(ema2[4].unwrap(), 5.0); // new seed: (4+6)/2
        assert!(ema2[5].is_some());
    }

    #[test]
    fn test_macd_warmup_lengths() {
        let closes: Vec<Option<f64>> = (0..40).map(|i| Some(100.0 + i as f64)).collect();
        let (line, signal, histogram) = macd(&closes, 12, 26, 9);

        assert_eq!(line.len(), 40);
        assert_eq!(signal.len(), 40);
        assert_eq!(histogram.len(), 40);

        assert_eq!(line[24], None);
        assert!(line[25].is_some());
        assert_eq!(signal[32], None);
        assert!(signal[33].is_some());
        assert_eq!(histogram[32], None);
        assert!(histogram[33].is_some());
    }

    #[test]
    fn test_macd_constant_series_is_zero() {
        let closes: Vec<Option<f64>> = (0..40).map(|_| Some(50.0)).collect();
        let (line, signal, histogram) = macd(&closes, 12, 26, 9);

        approx(line[30].unwrap(), 0.0);
        approx(signal[35].unwrap(), 0.0);
        approx(histogram[35].unwrap(), 0.0);
    }

    #[test]
    fn test_rsi_wilder_smoothing() {
        let closes = cells(&[1.0, 2.0, 3.0, 4.0, 3.0, 5.0]);
        let rsi3 = rsi(&closes, 3);

        assert_eq!(rsi3[0], None);
        assert_eq!(rsi3[1], None);
        assert_eq!(rsi3[2], None);
        approx(rsi3[3].unwrap(), 100.0); // three straight gains
        // avg_gain = (1*2 + 0)/3 = 2/3, avg_loss = (0*2 + 1)/3 = 1/3
        approx(rsi3[4].unwrap(), 100.0 * (2.0 / 3.0) / 1.0);
        // avg_gain = (2/3*2 + 2)/3 = 10/9, avg_loss = (1/3*2 + 0)/3 = 2/9
        approx(rsi3[5].unwrap(), 100.0 * (10.0 / 9.0) / (12.0 / 9.0));
    }

    #[test]
    fn test_rsi_bounds() {
        let rising: Vec<Option<f64>> = (0..30).map(|i| Some(i as f64)).collect();
        let flat: Vec<Option<f64>> = (0..30).map(|_| Some(10.0)).collect();
        let falling: Vec<Option<f64>> = (0..30).map(|i| Some(100.0 - i as f64)).collect();

        for value in rsi(&rising, 14).iter().flatten() {
            approx(*value, 100.0);
        }
        for value in rsi(&flat, 14).iter().flatten() {
            approx(*value, 50.0);
        }
        for value in rsi(&falling, 14).iter().flatten() {
            approx(*value, 0.0);
        }

        let mixed = cells(&[
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]);
        for value in rsi(&mixed, 14).iter().flatten() {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn test_rsi_first_defined_index() {
        let closes: Vec<Option<f64>> = (0..20).map(|i| Some(i as f64 * 1.5)).collect();
        let rsi14 = rsi(&closes, 14);

        assert!(rsi14[..14].iter().all(|cell| cell.is_none()));
        assert!(rsi14[14..].iter().all(|cell| cell.is_some()));
    }
}
