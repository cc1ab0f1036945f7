pub mod ols;
pub mod stats;

use chrono::{DateTime, Utc};
use valuation_core::{EngineResult, TrendDirection, TrendMetrics, ValuationError};

/// Minimum number of points §4.B requires before a trend can be fit at all.
pub const MIN_POINTS: usize = 3;

/// One point of a named metric series, ordered oldest-first.
#[derive(Debug, Clone, Copy)]
pub struct SeriesPoint {
    pub as_of: DateTime<Utc>,
    pub value: f64,
}

/// How a series is sampled, used to pick the seasonality lag and the long/short MA windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesCadence {
    Quarterly,
    Monthly,
    Daily,
}

impl SeriesCadence {
    fn seasonal_lag(&self) -> Option<usize> {
        match self {
            SeriesCadence::Quarterly => Some(4),
            SeriesCadence::Monthly => Some(12),
            SeriesCadence::Daily => None,
        }
    }
}

/// `analyze(series) -> TrendMetrics` (§4.B). Requires `series.len() >= MIN_POINTS`; otherwise
/// returns `insufficient_data`.
pub fn analyze(
    company_id: &str,
    metric_name: &str,
    as_of_date: DateTime<Utc>,
    cadence: SeriesCadence,
    series: &[SeriesPoint],
) -> EngineResult<TrendMetrics> {
    if series.len() < MIN_POINTS {
        return Err(ValuationError::InsufficientData(format!(
            "trend analysis for {metric_name} needs at least {MIN_POINTS} points, got {}",
            series.len()
        )));
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let fit = ols::fit(&values);

    // Annualise the slope relative to the series' own scale, per the periods-per-year implied
    // by the cadence, so the "strong" threshold is comparable across quarterly/monthly/daily
    // series.
    let periods_per_year = match cadence {
        SeriesCadence::Quarterly => 4.0,
        SeriesCadence::Monthly => 12.0,
        SeriesCadence::Daily => 252.0,
    };
    let mean_value = values.iter().sum::<f64>() / values.len() as f64;
    let annualised_slope = fit.slope * periods_per_year;
    let relative_slope = if mean_value.abs() > 1e-9 {
        (annualised_slope / mean_value).abs()
    } else {
        0.0
    };

    let direction = classify_direction(relative_slope, fit.p_value, fit.slope, mean_value);
    let sig_flag = fit.p_value < 0.05;

    let anomaly_indices = stats::anomaly_indices(&fit.residuals);

    let cagr = stats::cagr(
        values[0],
        *values.last().expect("checked non-empty above"),
        (values.len() - 1) as f64 / periods_per_year,
    );

    let seasonal = cadence
        .seasonal_lag()
        .and_then(|lag| stats::autocorrelation(&values, lag))
        .map(|ac| ac > 0.5)
        .unwrap_or(false);

    let (golden_cross, death_cross) = if matches!(cadence, SeriesCadence::Daily) && values.len() >= 200 {
        let short = stats::simple_moving_average(&values, 50);
        let long = stats::simple_moving_average(&values, 200);
        stats::detect_crosses(&short, &long)
    } else if values.len() >= 5 {
        let short = stats::simple_moving_average(&values, 3);
        let long = stats::simple_moving_average(&values, 5);
        stats::detect_crosses(&short, &long)
    } else {
        (false, false)
    };

    Ok(TrendMetrics {
        company_id: company_id.to_string(),
        metric_name: metric_name.to_string(),
        as_of_date,
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
        p_value: fit.p_value,
        cagr,
        direction,
        sig_flag,
        anomaly_indices,
        seasonal,
        golden_cross,
        death_cross,
    })
}

/// Direction thresholds per §4.B: `strong` needs both a relative-slope magnitude above 15%
/// and p < 0.05; `stable` covers p >= 0.10 or a slope below a 2% series-relative floor.
fn classify_direction(relative_slope: f64, p_value: f64, raw_slope: f64, mean_value: f64) -> TrendDirection {
    let floor = mean_value.abs() * 0.02;
    if p_value >= 0.10 || raw_slope.abs() < floor {
        return TrendDirection::Stable;
    }

    let improving = raw_slope > 0.0;
    if relative_slope > 0.15 && p_value < 0.05 {
        if improving {
            TrendDirection::StrongImproving
        } else {
            TrendDirection::StrongDeclining
        }
    } else if improving {
        TrendDirection::Improving
    } else {
        TrendDirection::Declining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(i: i64, value: f64) -> SeriesPoint {
        SeriesPoint {
            as_of: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(i * 90),
            value,
        }
    }

    #[test]
    fn insufficient_data_below_three_points() {
        let series = vec![point(0, 1.0), point(1, 2.0)];
        let result = analyze("c1", "revenue", Utc::now(), SeriesCadence::Quarterly, &series);
        assert!(matches!(result, Err(ValuationError::InsufficientData(_))));
    }

    #[test]
    fn strong_improving_trend_is_classified() {
        let series: Vec<SeriesPoint> = (0..8)
            .map(|i| point(i, 100.0 * 1.10_f64.powi(i as i32)))
            .collect();
        let metrics = analyze("c1", "revenue", Utc::now(), SeriesCadence::Quarterly, &series).unwrap();
        assert_eq!(metrics.direction, TrendDirection::StrongImproving);
        assert!(metrics.cagr.unwrap() > 0.0);
    }

    #[test]
    fn flat_series_is_stable() {
        let series: Vec<SeriesPoint> = (0..6).map(|i| point(i, 50.0)).collect();
        let metrics = analyze("c1", "margin", Utc::now(), SeriesCadence::Quarterly, &series).unwrap();
        assert_eq!(metrics.direction, TrendDirection::Stable);
    }
}
