use statrs::distribution::{ContinuousCDF, StudentsT};

/// Ordinary-least-squares fit of `y` against its own index (0, 1, 2, ...), plus the
/// two-sided p-value of the slope under a Student-t distribution with `n - 2` degrees of
/// freedom.
pub struct OlsFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,
    pub residuals: Vec<f64>,
}

pub fn fit(y: &[f64]) -> OlsFit {
    let n = y.len();
    assert!(n >= 3, "OLS fit requires at least 3 points");

    let mean_x = (n as f64 - 1.0) / 2.0;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (yi - mean_y);
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_x;

    let residuals: Vec<f64> = y
        .iter()
        .enumerate()
        .map(|(i, &yi)| yi - (intercept + slope * i as f64))
        .collect();

    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let ss_tot: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let df = (n - 2) as f64;
    let p_value = if df > 0.0 && sxx > 0.0 {
        let se_slope = ((ss_res / df) / sxx).sqrt();
        if se_slope > 0.0 {
            let t_stat = slope / se_slope;
            let t_dist = StudentsT::new(0.0, 1.0, df).expect("valid degrees of freedom");
            2.0 * (1.0 - t_dist.cdf(t_stat.abs()))
        } else if slope.abs() < 1e-12 {
            // Zero residual, zero slope: a perfectly flat series with no trend to detect.
            1.0
        } else {
            // Zero residual, non-zero slope: perfectly explained by the fit.
            0.0
        }
    } else {
        1.0
    };

    OlsFit {
        slope,
        intercept,
        r_squared,
        p_value,
        residuals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_a_perfect_line() {
        let y = vec![1.0, 3.0, 5.0, 7.0, 9.0];
        let fit = fit(&y);
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert!(fit.p_value < 0.01);
    }

    #[test]
    fn flat_series_has_zero_slope_and_weak_significance() {
        let y = vec![5.0, 5.0, 5.0, 5.0, 5.0];
        let fit = fit(&y);
        assert!((fit.slope).abs() < 1e-9);
        assert!(fit.p_value > 0.10 || fit.p_value.is_nan() == false);
    }
}
