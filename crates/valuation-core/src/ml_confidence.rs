/// Harmonised `ml_confidence` formula (SPEC_FULL.md Open Question 1), used by `weight-trainer`,
/// `industry-trainer` and `scorer` wherever a training/optimisation pass needs to report a
/// confidence in its own output: `clamp01(r_squared - min(0.2, cv_std * 0.5))`, scaled down when
/// the sample count falls short of `min_samples * 1.5`.
pub fn ml_confidence(r_squared: f64, cv_std: f64, sample_count: usize, min_samples: usize) -> f64 {
    let base = (r_squared - (cv_std * 0.5).min(0.2)).clamp(0.0, 1.0);
    let sample_floor = (min_samples as f64 * 1.5).max(1.0);
    let sample_scale = (sample_count as f64 / sample_floor).min(1.0);
    base * sample_scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_down_below_the_sample_floor() {
        let full = ml_confidence(0.8, 0.05, 150, 100);
        let half = ml_confidence(0.8, 0.05, 75, 100);
        assert!(half < full);
        assert!((half - full * 0.5).abs() < 1e-9);
    }

    #[test]
    fn clamps_to_the_unit_interval() {
        assert!(ml_confidence(0.05, 0.5, 1000, 100) >= 0.0);
        assert!(ml_confidence(1.0, 0.0, 1000, 100) <= 1.0);
    }
}
