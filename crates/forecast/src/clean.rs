//! Outlier and noise cleaning for daily revenue.
//!
//! Pipeline:
//! - flag outliers with the IQR rule and replace them with a centred rolling median,
//! - fill missing (non-finite) values from the rolling median, then the overall median,
//! - clamp at zero,
//! - smooth with a short exponential moving average.

use tracing::debug;

use revcast_core::{DailyRevenueSeries, DomainResult};

use crate::config::ForecastConfig;
use crate::stats::{median, quantile};

/// Series shorter than this are returned unchanged.
pub const MIN_CLEANING_POINTS: usize = 7;

/// Flag values outside `[Q1 - k·IQR, Q3 + k·IQR]`.
///
/// Fewer than four values: nothing is flagged. Non-finite values are never
/// flagged (they are handled as missing data).
pub fn detect_outliers_iqr(values: &[f64], multiplier: f64) -> Vec<bool> {
    if values.len() < 4 {
        return vec![false; values.len()];
    }
    let (Some(q1), Some(q3)) = (quantile(values, 0.25), quantile(values, 0.75)) else {
        return vec![false; values.len()];
    };
    let iqr = q3 - q1;
    let lower = q1 - multiplier * iqr;
    let upper = q3 + multiplier * iqr;
    values.iter().map(|v| *v < lower || *v > upper).collect()
}

/// Centred rolling median with `min_periods = 1`.
///
/// The window shrinks at the series boundaries and skips non-finite values;
/// a window with no finite value yields `NaN`.
pub fn rolling_median(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let before = (window - 1) / 2;
    let after = window - 1 - before;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(before);
            let hi = (i + after).min(values.len() - 1);
            median(&values[lo..=hi]).unwrap_or(f64::NAN)
        })
        .collect()
}

/// Exponential moving average without bias adjustment:
/// `s_0 = x_0`, `s_t = α·x_t + (1 − α)·s_{t−1}`, `α = 2 / (span + 1)`.
pub fn ewm_mean(values: &[f64], span: f64) -> Vec<f64> {
    let alpha = 2.0 / (span + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let s = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(s);
        prev = Some(s);
    }
    out
}

/// Clean raw daily amounts. Output has the same length as the input.
pub fn clean_values(values: &[f64], config: &ForecastConfig) -> Vec<f64> {
    if values.len() < MIN_CLEANING_POINTS {
        return values.to_vec();
    }

    let mut cleaned = values.to_vec();

    let outliers = detect_outliers_iqr(&cleaned, config.outlier_multiplier);
    let flagged = outliers.iter().filter(|o| **o).count();
    if flagged > 0 {
        let rolling = rolling_median(&cleaned, config.rolling_window);
        for (v, (is_outlier, m)) in cleaned.iter_mut().zip(outliers.iter().zip(&rolling)) {
            if *is_outlier {
                *v = *m;
            }
        }
        debug!(outliers = flagged, "replaced outliers with rolling median");
    }

    if cleaned.iter().any(|v| !v.is_finite()) {
        let rolling = rolling_median(&cleaned, config.rolling_window);
        for (v, m) in cleaned.iter_mut().zip(&rolling) {
            if !v.is_finite() {
                *v = *m;
            }
        }
    }

    if cleaned.iter().any(|v| !v.is_finite()) {
        let fallback = median(&cleaned).unwrap_or(0.0);
        for v in cleaned.iter_mut().filter(|v| !v.is_finite()) {
            *v = fallback;
        }
    }

    for v in cleaned.iter_mut() {
        *v = v.max(0.0);
    }

    ewm_mean(&cleaned, config.smoothing_span)
}

/// Clean a daily series, keeping its dates.
pub fn clean_sales_data(
    series: &DailyRevenueSeries,
    config: &ForecastConfig,
) -> DomainResult<DailyRevenueSeries> {
    series.with_values(clean_values(&series.values(), config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn iqr_flags_only_extreme_values() {
        let mut values = vec![100.0; 20];
        values[3] = 110.0;
        values[7] = 90.0;
        values[12] = 5_000.0;
        let flags = detect_outliers_iqr(&values, 2.5);
        assert!(flags[12]);
        assert_eq!(flags.iter().filter(|f| **f).count(), 3);

        let spread: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let mut with_spike = spread.clone();
        with_spike[10] = 1_000.0;
        let flags = detect_outliers_iqr(&with_spike, 2.5);
        assert_eq!(flags.iter().filter(|f| **f).count(), 1);
        assert!(flags[10]);
    }

    #[test]
    fn iqr_needs_four_points() {
        assert_eq!(detect_outliers_iqr(&[1.0, 1.0, 1_000.0], 1.5), vec![false; 3]);
    }

    #[test]
    fn rolling_median_shrinks_at_edges() {
        let values = [1.0, 9.0, 2.0, 8.0, 3.0, 7.0, 4.0, 6.0];
        let rm = rolling_median(&values, 7);
        // i = 0 covers [0, 3]: {1, 9, 2, 8} -> 5.0
        assert_eq!(rm[0], 5.0);
        // i = 3 covers [0, 6]: {1, 9, 2, 8, 3, 7, 4} -> 4.0
        assert_eq!(rm[3], 4.0);
        // i = 7 covers [4, 7]: {3, 7, 4, 6} -> 5.0
        assert_eq!(rm[7], 5.0);
        assert!(rolling_median(&[f64::NAN, f64::NAN], 3)[0].is_nan());
    }

    #[test]
    fn ewm_matches_recursive_definition() {
        let out = ewm_mean(&[10.0, 20.0, 0.0], 3.0);
        assert_eq!(out, vec![10.0, 15.0, 7.5]);
    }

    #[test]
    fn short_series_is_returned_unchanged() {
        let values = [5.0, -3.0, 1_000.0];
        assert_eq!(clean_values(&values, &ForecastConfig::default()), values.to_vec());
    }

    #[test]
    fn spike_is_replaced_before_smoothing() {
        let mut values = vec![100.0; 14];
        values[7] = 10_000.0;
        let cleaned = clean_values(&values, &ForecastConfig::default());
        assert_eq!(cleaned.len(), 14);
        assert!(cleaned.iter().all(|v| (*v - 100.0).abs() < 1e-9), "{cleaned:?}");
    }

    #[test]
    fn wider_outlier_fence_keeps_moderate_spikes() {
        let mut values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        values[10] = 1_000.0;

        let strict = clean_values(&values, &ForecastConfig::default());
        assert!(strict[10] < 150.0, "{strict:?}");

        let lenient = clean_values(&values, &ForecastConfig::default().with_outlier_multiplier(200.0));
        assert!(lenient[10] > 500.0, "{lenient:?}");
    }

    #[test]
    fn missing_values_are_filled_and_negatives_clamped() {
        let values = vec![50.0, f64::NAN, 60.0, -20.0, 55.0, 58.0, f64::NAN, 52.0];
        let cleaned = clean_values(&values, &ForecastConfig::default());
        assert!(cleaned.iter().all(|v| v.is_finite() && *v >= 0.0), "{cleaned:?}");

        let all_missing = vec![f64::NAN; 8];
        let cleaned = clean_values(&all_missing, &ForecastConfig::default());
        assert_eq!(cleaned, vec![0.0; 8]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: cleaned values are finite and never negative.
        #[test]
        fn cleaned_values_are_non_negative(values in prop::collection::vec(-500.0f64..5_000.0, 7..91)) {
            let cleaned = clean_values(&values, &ForecastConfig::default());
            prop_assert_eq!(cleaned.len(), values.len());
            prop_assert!(cleaned.iter().all(|v| v.is_finite() && *v >= 0.0));
        }

        /// Property: a second cleaning pass stays inside the range of the first
        /// pass, so it cannot introduce new excursions.
        #[test]
        fn second_pass_introduces_no_new_excursions(values in prop::collection::vec(0.0f64..5_000.0, 7..91)) {
            let config = ForecastConfig::default();
            let once = clean_values(&values, &config);
            let twice = clean_values(&once, &config);
            let lo = once.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = once.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let eps = 1e-9 * (1.0 + hi.abs());
            prop_assert!(twice.iter().all(|v| *v >= lo - eps && *v <= hi + eps));
        }
    }
}
