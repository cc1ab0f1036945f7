/// Indices of OLS residuals whose z-score exceeds 2.5 in absolute value.
pub fn anomaly_indices(residuals: &[f64]) -> Vec<usize> {
    let n = residuals.len() as f64;
    if n == 0.0 {
        return Vec::new();
    }
    let mean = residuals.iter().sum::<f64>() / n;
    let variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return Vec::new();
    }
    residuals
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            if ((r - mean) / std_dev).abs() > 2.5 {
                Some(i)
            } else {
                None
            }
        })
        .collect()
}

/// Autocorrelation of `series` at `lag`, using the standard biased estimator.
pub fn autocorrelation(series: &[f64], lag: usize) -> Option<f64> {
    let n = series.len();
    if lag == 0 || lag >= n {
        return None;
    }
    let mean = series.iter().sum::<f64>() / n as f64;
    let variance: f64 = series.iter().map(|v| (v - mean).powi(2)).sum();
    if variance == 0.0 {
        return None;
    }
    let covariance: f64 = (0..n - lag)
        .map(|i| (series[i] - mean) * (series[i + lag] - mean))
        .sum();
    Some(covariance / variance)
}

/// CAGR is only defined when the start and end values share sign and are both non-zero.
pub fn cagr(start: f64, end: f64, periods: f64) -> Option<f64> {
    if start == 0.0 || end == 0.0 || start.signum() != end.signum() || periods <= 0.0 {
        return None;
    }
    Some((end / start).abs().powf(1.0 / periods) - 1.0)
}

pub fn simple_moving_average(series: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; series.len()];
    }
    (0..series.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &series[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

pub fn exponential_moving_average(series: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || series.is_empty() {
        return vec![None; series.len()];
    }
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let mut prev: Option<f64> = None;
    for &value in series {
        let ema = match prev {
            None => value,
            Some(p) => alpha * value + (1.0 - alpha) * p,
        };
        out.push(Some(ema));
        prev = Some(ema);
    }
    out
}

/// Golden cross: short MA crosses above long MA, confirmed on the following point (the
/// cross must still hold one point later, filtering single-point noise crossings). Death
/// cross is the mirror condition.
pub fn detect_crosses(short_ma: &[Option<f64>], long_ma: &[Option<f64>]) -> (bool, bool) {
    let mut golden = false;
    let mut death = false;
    let n = short_ma.len().min(long_ma.len());
    for i in 1..n.saturating_sub(1) {
        let (Some(s_prev), Some(l_prev), Some(s_now), Some(l_now), Some(s_next), Some(l_next)) = (
            short_ma[i - 1],
            long_ma[i - 1],
            short_ma[i],
            long_ma[i],
            short_ma[i + 1],
            long_ma[i + 1],
        ) else {
            continue;
        };
        if s_prev <= l_prev && s_now > l_now && s_next > l_next {
            golden = true;
        }
        if s_prev >= l_prev && s_now < l_now && s_next < l_next {
            death = true;
        }
    }
    (golden, death)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_anomalies_far_from_mean() {
        let residuals = vec![0.1, -0.2, 0.05, 10.0, -0.1];
        let anomalies = anomaly_indices(&residuals);
        assert_eq!(anomalies, vec![3]);
    }

    #[test]
    fn cagr_undefined_on_sign_change() {
        assert_eq!(cagr(-10.0, 10.0, 5.0), None);
        assert_eq!(cagr(0.0, 10.0, 5.0), None);
        assert!((cagr(100.0, 200.0, 1.0).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn detects_golden_cross() {
        let short = vec![Some(1.0), Some(2.0), Some(5.0), Some(6.0), Some(7.0)];
        let long = vec![Some(3.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0)];
        let (golden, death) = detect_crosses(&short, &long);
        assert!(golden);
        assert!(!death);
    }
}
