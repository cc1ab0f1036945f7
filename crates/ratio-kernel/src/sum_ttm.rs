/// Sum a flow metric over up to four trailing quarters, or pass through a single annual
/// figure untouched. Mirrors the teacher's `fundamental-analysis::analyze_enhanced::sum_ttm`
/// closure, generalised to a free function so every ratio group can share it.
pub fn sum_ttm<T>(periods: &[T], accessor: impl Fn(&T) -> Option<f64>) -> Option<f64> {
    let values: Vec<f64> = periods.iter().filter_map(accessor).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum())
    }
}

/// Growth ratios are undefined when the base value is zero or changes sign relative to the
/// comparison value -- a percent change across a sign flip has no sensible interpretation.
pub fn yoy_growth(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    let (current, prior) = (current?, prior?);
    if prior == 0.0 || current.signum() != prior.signum() {
        return None;
    }
    Some((current - prior) / prior.abs() * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_present_values_only() {
        let values = [Some(1.0), None, Some(2.0)];
        assert_eq!(sum_ttm(&values, |v| *v), Some(3.0));
    }

    #[test]
    fn empty_input_is_none() {
        let values: [Option<f64>; 0] = [];
        assert_eq!(sum_ttm(&values, |v| *v), None);
    }

    #[test]
    fn growth_undefined_on_sign_change() {
        assert_eq!(yoy_growth(Some(10.0), Some(-5.0)), None);
        assert_eq!(yoy_growth(Some(10.0), Some(0.0)), None);
        assert!((yoy_growth(Some(11.0), Some(10.0)).unwrap() - 10.0).abs() < 1e-9);
    }
}
