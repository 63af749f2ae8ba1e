//! Overlay indicators computed from a price series.
//!
//! Every function here is pure. Values that cannot be computed (warm-up
//! positions, zero cumulative volume) are `None`, never an error.

use tracing::debug;

use crate::models::{IndicatorSelection, IndicatorSpec, OverlayLine, OverlaySeries, PriceSeries};

/// Compute one indicator over the series' closes (and volumes for VWAP)
pub fn compute(series: &PriceSeries, spec: &IndicatorSpec) -> OverlaySeries {
    let closes = series.closes();

    let lines = match *spec {
        IndicatorSpec::Sma { window } => vec![OverlayLine {
            label: format!("SMA ({})", window),
            values: sma(&closes, window),
        }],
        IndicatorSpec::Ema { span } => vec![OverlayLine {
            label: format!("EMA ({})", span),
            values: ema(&closes, span),
        }],
        IndicatorSpec::Bollinger { window, k } => {
            let (upper, lower) = bollinger_bands(&closes, window, k);
            vec![
                OverlayLine {
                    label: format!("BB Upper ({}, {})", window, k),
                    values: upper,
                },
                OverlayLine {
                    label: format!("BB Lower ({}, {})", window, k),
                    values: lower,
                },
            ]
        }
        IndicatorSpec::Vwap => vec![OverlayLine {
            label: "VWAP".to_string(),
            values: vwap(&closes, &series.volumes()),
        }],
    };

    OverlaySeries { indicator: *spec, lines }
}

/// Compute every selected indicator, in selection order
pub fn compute_all(series: &PriceSeries, selection: &IndicatorSelection) -> Vec<OverlaySeries> {
    let overlays: Vec<OverlaySeries> = selection.iter().map(|spec| compute(series, spec)).collect();
    for line in overlays.iter().flat_map(|o| o.lines.iter()) {
        debug!("{}: {}/{} values defined", line.label, line.defined_count(), series.len());
    }
    overlays
}

/// Trailing arithmetic mean. The first `window - 1` values are undefined.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }

    for (i, win) in values.windows(window).enumerate() {
        out[i + window - 1] = Some(win.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Recursive exponential smoothing, `alpha = 2 / (span + 1)`, seeded with the
/// first value. A span longer than the input leaves everything undefined.
pub fn ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
    if span == 0 || span > values.len() {
        return vec![None; values.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(Some(prev));

    for &value in &values[1..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        out.push(Some(prev));
    }
    out
}

/// Rolling sample standard deviation (n - 1 denominator).
/// Undefined for the warm-up prefix and for windows shorter than 2.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window < 2 || window > values.len() {
        return out;
    }

    for (i, win) in values.windows(window).enumerate() {
        let mean = win.iter().sum::<f64>() / window as f64;
        let sum_sq: f64 = win.iter().map(|v| (v - mean).powi(2)).sum();
        out[i + window - 1] = Some((sum_sq / (window - 1) as f64).sqrt());
    }
    out
}

/// Upper and lower bands: SMA ± k·stddev over the same window
pub fn bollinger_bands(values: &[f64], window: usize, k: f64) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let middle = sma(values, window);
    let std = rolling_std(values, window);

    middle
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + k * s), Some(m - k * s)),
            _ => (None, None),
        })
        .unzip()
}

/// Cumulative volume-weighted average of the closes from the series start.
/// Undefined wherever the cumulative volume is zero.
pub fn vwap(closes: &[f64], volumes: &[f64]) -> Vec<Option<f64>> {
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    closes
        .iter()
        .zip(volumes)
        .map(|(&close, &volume)| {
            cum_pv += close * volume;
            cum_volume += volume;
            if cum_volume > 0.0 {
                Some(cum_pv / cum_volume)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price::fixtures::{constant_series, series_from};

    const EPS: f64 = 1e-9;

    fn closes() -> Vec<f64> {
        vec![10.0, 11.0, 12.5, 11.75, 13.0, 14.25, 13.5, 12.0, 15.0, 16.5]
    }

    #[test]
    fn test_sma_matches_trailing_mean() {
        let values = closes();
        let window = 4;
        let out = sma(&values, window);

        for (i, v) in out.iter().enumerate() {
            if i < window - 1 {
                assert!(v.is_none(), "index {} should be undefined", i);
            } else {
                let expected = values[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
                assert!((v.unwrap() - expected).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_window_longer_than_series_is_all_undefined() {
        let values = closes();
        assert!(sma(&values, 11).iter().all(|v| v.is_none()));
        assert!(ema(&values, 11).iter().all(|v| v.is_none()));
        let (upper, lower) = bollinger_bands(&values, 50, 2.0);
        assert!(upper.iter().chain(&lower).all(|v| v.is_none()));
        assert_eq!(sma(&values, 11).len(), values.len());
    }

    #[test]
    fn test_zero_window_is_all_undefined() {
        assert!(sma(&closes(), 0).iter().all(|v| v.is_none()));
        assert!(ema(&closes(), 0).iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_ema_recursion_seeded_with_first_close() {
        let values = vec![10.0, 20.0, 30.0];
        let out = ema(&values, 3);
        // alpha = 0.5
        assert_eq!(out, vec![Some(10.0), Some(15.0), Some(22.5)]);
    }

    #[test]
    fn test_bollinger_width_is_two_k_std() {
        let values = closes();
        let k = 2.5;
        let (upper, lower) = bollinger_bands(&values, 5, k);
        let std = rolling_std(&values, 5);

        for i in 0..values.len() {
            match (upper[i], lower[i], std[i]) {
                (Some(u), Some(l), Some(s)) => assert!((u - l - 2.0 * k * s).abs() < EPS),
                (None, None, None) => assert!(i < 4),
                other => panic!("misaligned bands at {}: {:?}", i, other),
            }
        }
    }

    #[test]
    fn test_rolling_std_is_sample_deviation() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // sample variance of this set is 32/7
        assert!((out[7].unwrap() - (32.0f64 / 7.0).sqrt()).abs() < EPS);
        assert!(rolling_std(&[1.0, 2.0], 1).iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_vwap_with_constant_volume_is_running_mean() {
        let values = closes();
        let out = vwap(&values, &vec![500.0; values.len()]);

        for i in 0..values.len() {
            let expected = values[..=i].iter().sum::<f64>() / (i + 1) as f64;
            assert!((out[i].unwrap() - expected).abs() < EPS);
        }
    }

    #[test]
    fn test_vwap_undefined_until_volume_trades() {
        let out = vwap(&[10.0, 11.0, 12.0, 14.0], &[0.0, 0.0, 100.0, 300.0]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(12.0));
        assert_eq!(out[3], Some((1200.0 + 4200.0) / 400.0));
    }

    #[test]
    fn test_constant_series_scenario() {
        let series = constant_series(25, 100.0, 1000.0);

        let sma20 = compute(&series, &IndicatorSpec::Sma { window: 20 });
        let values = &sma20.lines[0].values;
        assert_eq!(values.len(), 25);
        assert!(values[..19].iter().all(|v| v.is_none()));
        assert!(values[19..].iter().all(|v| *v == Some(100.0)));

        let vwap = compute(&series, &IndicatorSpec::Vwap);
        assert!(vwap.lines[0].values.iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn test_selection_order_does_not_change_values() {
        let series = series_from(&closes(), &[5.0, 7.0, 1.0, 0.0, 3.0, 9.0, 2.0, 4.0, 6.0, 8.0]);
        let sma = IndicatorSpec::Sma { window: 3 };
        let ema = IndicatorSpec::Ema { span: 3 };

        let forward: IndicatorSelection = [sma, ema].into_iter().collect();
        let backward: IndicatorSelection = [ema, sma].into_iter().collect();

        let a = compute_all(&series, &forward);
        let mut b = compute_all(&series, &backward);
        assert_eq!(a[0].indicator, sma);
        assert_eq!(b[0].indicator, ema);

        b.reverse();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bollinger_emits_two_labelled_lines() {
        let series = constant_series(25, 100.0, 1000.0);
        let bands = compute(&series, &IndicatorSpec::Bollinger { window: 20, k: 2.0 });

        assert_eq!(bands.lines.len(), 2);
        assert_eq!(bands.lines[0].label, "BB Upper (20, 2)");
        assert_eq!(bands.lines[1].label, "BB Lower (20, 2)");
        assert_eq!(bands.lines[0].values[24], Some(100.0));
        assert_eq!(bands.lines[1].defined_count(), 6);
    }

    #[test]
    fn test_duplicate_selection_yields_single_overlay() {
        let series = constant_series(5, 1.0, 1.0);
        let selection = IndicatorSelection::parse_list(&["vwap", "vwap"]).unwrap();
        assert_eq!(compute_all(&series, &selection).len(), 1);
    }
}
