//! Small descriptive-statistics helpers shared by the pipeline stages.

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Sample standard deviation (n-1). Zero for fewer than two values.
pub fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs
        .iter()
        .map(|x| {
            let d = x - m;
            d * d
        })
        .sum::<f64>()
        / ((xs.len() - 1) as f64);
    var.sqrt()
}

/// Quantile with linear interpolation between order statistics
/// (position `q * (n - 1)`). Non-finite values are ignored.
pub fn quantile(xs: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = xs.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, q)
}

/// Same as [`quantile`] for data that is already sorted and finite.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median(xs: &[f64]) -> Option<f64> {
    quantile(xs, 0.5)
}

/// Mean absolute percentage error (in percent) over the points whose actual
/// value is non-zero. `None` when every actual is zero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, p)| ((a - p) / a).abs())
        .collect();
    if errors.is_empty() {
        return None;
    }
    Some(mean(&errors) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let xs = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&xs, 0.25), Some(1.75));
        assert_eq!(quantile(&xs, 0.75), Some(3.25));
        assert_eq!(median(&xs), Some(2.5));
        assert_eq!(quantile(&[f64::NAN], 0.5), None);
    }

    #[test]
    fn quantile_sorted_handles_empty_and_single_inputs() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[7.0], 0.975), Some(7.0));
        assert_eq!(quantile_sorted(&[1.0, 2.0, 3.0], 2.0), Some(3.0));
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0f64 / 7.0).sqrt();
        assert!((sample_std(&xs) - expected).abs() < 1e-12);
        assert_eq!(sample_std(&[3.0]), 0.0);
    }

    #[test]
    fn mape_skips_zero_actuals() {
        let actual = [0.0, 100.0, 200.0];
        let predicted = [50.0, 110.0, 180.0];
        let m = mape(&actual, &predicted).unwrap();
        assert!((m - 10.0).abs() < 1e-12);
        assert_eq!(mape(&[0.0, 0.0], &[1.0, 2.0]), None);
    }
}
