use valuation_core::{RatioSet, TrendDirection};

/// Industry benchmark values the valuation/profitability dimensions are scaled against.
/// Sourced from `IndustryMedian` rows by the caller (one lookup per metric name); `None`
/// fields fall back to a neutral score for that sub-metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndustryBenchmarks {
    pub pe_median: Option<f64>,
    pub pb_median: Option<f64>,
    pub peg_median: Option<f64>,
    pub ev_ebitda_median: Option<f64>,
    pub roe_p90: Option<f64>,
    pub roa_p90: Option<f64>,
    pub net_margin_p90: Option<f64>,
    pub operating_margin_p90: Option<f64>,
}

/// Growth rates feeding the growth dimension. CAGR when `TrendMetrics::cagr` is available for
/// the metric, else the caller may fall back to `RatioSet`'s YoY growth fields -- either is a
/// signed fractional growth rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrowthInputs {
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub book_value_growth: Option<f64>,
}

/// Market-side risk inputs the risk dimension blends in alongside the Altman Z-score. Neither
/// is derivable from financial statements, so both are supplied by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskInputs {
    pub altman_z: Option<f64>,
    pub beta: Option<f64>,
    pub annualized_volatility: Option<f64>,
}

/// Trend direction for the four health sub-ratios, used only for the boolean-style
/// "improving"/"not improving" adjustment layered on top of the level-based base score.
/// `None` entries are simply excluded from the adjustment rather than counted against it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthTrends {
    pub current_ratio: Option<TrendDirection>,
    pub quick_ratio: Option<TrendDirection>,
    pub debt_to_equity: Option<TrendDirection>,
    pub interest_coverage: Option<TrendDirection>,
}

fn is_improving(direction: TrendDirection, lower_is_better: bool) -> bool {
    match direction {
        TrendDirection::StrongImproving | TrendDirection::Improving => !lower_is_better,
        TrendDirection::StrongDeclining | TrendDirection::Declining => lower_is_better,
        TrendDirection::Stable => false,
    }
}

/// Weighted average over `(weight, Some(score))` pairs, skipping `None`s and renormalising the
/// remaining weights. Falls back to a neutral midpoint score when every component is missing --
/// better than silently producing 0, which would read as "worst possible" rather than "unknown".
fn weighted_average(components: &[(f64, Option<f64>)]) -> f64 {
    let present: Vec<(f64, f64)> =
        components.iter().filter_map(|(w, v)| v.map(|v| (*w, v))).collect();
    if present.is_empty() {
        return 50.0;
    }
    let total_weight: f64 = present.iter().map(|(w, _)| w).sum();
    if total_weight <= 0.0 {
        return 50.0;
    }
    present.iter().map(|(w, v)| w * v).sum::<f64>() / total_weight
}

/// Maps "how close is this multiple to its industry median" to a 0-100 closeness score:
/// exact match scores 100, decaying exponentially with relative deviation in either direction.
fn closeness_score(value: Option<f64>, median: Option<f64>) -> Option<f64> {
    let value = value?;
    let median = median?;
    if median.abs() < 1e-9 {
        return None;
    }
    let relative_deviation = ((value - median) / median).abs();
    Some((100.0 * (-relative_deviation).exp()).clamp(0.0, 100.0))
}

/// §4.J valuation dimension: P/E, P/B, PEG, EV/EBITDA each scored by closeness to their
/// industry median, averaged over whichever multiples are available.
pub fn valuation_score(ratios: &RatioSet, benchmarks: &IndustryBenchmarks) -> f64 {
    weighted_average(&[
        (1.0, closeness_score(ratios.pe_ratio, benchmarks.pe_median)),
        (1.0, closeness_score(ratios.pb_ratio, benchmarks.pb_median)),
        (1.0, closeness_score(ratios.peg_ratio, benchmarks.peg_median)),
        (1.0, closeness_score(ratios.ev_to_ebitda, benchmarks.ev_ebitda_median)),
    ])
    .clamp(0.0, 100.0)
}

/// Scales a "higher is better" ratio linearly against an industry 90th-percentile cap; values
/// at or above the cap score 100, negative values score 0.
fn capped_scale(value: Option<f64>, cap: Option<f64>, default_cap: f64) -> Option<f64> {
    let value = value?;
    let cap = cap.filter(|c| *c > 0.0).unwrap_or(default_cap);
    Some((value.max(0.0) / cap * 100.0).clamp(0.0, 100.0))
}

/// §4.J profitability dimension: ROE, ROA, net margin, operating margin, each capped at the
/// industry 90th percentile (or a conservative default when no benchmark is supplied).
pub fn profitability_score(ratios: &RatioSet, benchmarks: &IndustryBenchmarks) -> f64 {
    weighted_average(&[
        (1.0, capped_scale(ratios.roe, benchmarks.roe_p90, 0.30)),
        (1.0, capped_scale(ratios.roa, benchmarks.roa_p90, 0.15)),
        (1.0, capped_scale(ratios.net_margin, benchmarks.net_margin_p90, 0.25)),
        (1.0, capped_scale(ratios.operating_margin, benchmarks.operating_margin_p90, 0.30)),
    ])
    .clamp(0.0, 100.0)
}

/// Logistic map centred on zero growth (score 50); `k` controls how quickly extreme growth
/// saturates towards 0/100.
fn logistic_score(growth: Option<f64>) -> Option<f64> {
    const K: f64 = 8.0;
    let growth = growth?;
    Some(100.0 / (1.0 + (-K * growth).exp()))
}

/// §4.J growth dimension: revenue/earnings/book-value growth, signed and logistic-mapped so
/// strongly negative growth saturates near 0 and strongly positive growth saturates near 100.
pub fn growth_score(inputs: &GrowthInputs) -> f64 {
    weighted_average(&[
        (1.0, logistic_score(inputs.revenue_growth)),
        (1.0, logistic_score(inputs.earnings_growth)),
        (1.0, logistic_score(inputs.book_value_growth)),
    ])
    .clamp(0.0, 100.0)
}

/// §4.J health dimension: current ratio, quick ratio, D/E (inverted), interest coverage scored
/// at their conventional "healthy" levels, then nudged by the boolean-sum-then-scale trend
/// adjustment (the Piotroski-style idiom) when trend direction is available.
pub fn health_score(ratios: &RatioSet, trends: &HealthTrends) -> f64 {
    let base = weighted_average(&[
        (1.0, capped_scale(ratios.current_ratio, None, 2.0)),
        (1.0, capped_scale(ratios.quick_ratio, None, 1.0)),
        (1.0, ratios.debt_to_equity.map(|de| (1.0 - de.max(0.0) / 2.0).clamp(0.0, 1.0) * 100.0)),
        (1.0, capped_scale(ratios.interest_coverage, None, 8.0)),
    ]);

    let checks: Vec<bool> = [
        trends.current_ratio.map(|d| is_improving(d, false)),
        trends.quick_ratio.map(|d| is_improving(d, false)),
        trends.debt_to_equity.map(|d| is_improving(d, true)),
        trends.interest_coverage.map(|d| is_improving(d, false)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if checks.is_empty() {
        return base.clamp(0.0, 100.0);
    }
    let improving_fraction = checks.iter().filter(|c| **c).count() as f64 / checks.len() as f64;
    let adjustment = (improving_fraction - 0.5) * 20.0; // +/-10 points at the extremes
    (base + adjustment).clamp(0.0, 100.0)
}

/// Scales a "higher is better" quantity inverted, i.e. 0 scores 100 and `cap` or above scores 0.
fn inverted_scale(value: Option<f64>, cap: f64) -> Option<f64> {
    let value = value?;
    Some((1.0 - value.max(0.0) / cap).clamp(0.0, 1.0) * 100.0)
}

/// §4.J risk dimension: Altman Z-score mapped via `altman::z_to_score`, blended with beta and
/// annualised volatility (both inverted -- lower risk scores higher), weighted 0.6/0.2/0.2 and
/// renormalised over whichever inputs are present.
pub fn risk_score(inputs: &RiskInputs) -> f64 {
    weighted_average(&[
        (0.6, inputs.altman_z.map(crate::altman::z_to_score)),
        (0.2, inverted_scale(inputs.beta, 2.0)),
        (0.2, inverted_scale(inputs.annualized_volatility, 0.6)),
    ])
    .clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios() -> RatioSet {
        RatioSet {
            company_id: "c1".into(),
            tenant_id: "t1".into(),
            pe_ratio: Some(18.0),
            pb_ratio: Some(3.0),
            peg_ratio: Some(1.2),
            ev_to_ebitda: Some(12.0),
            roe: Some(0.18),
            roa: Some(0.08),
            net_margin: Some(0.15),
            operating_margin: Some(0.20),
            current_ratio: Some(2.0),
            quick_ratio: Some(1.0),
            debt_to_equity: Some(0.5),
            interest_coverage: Some(10.0),
            ..Default::default()
        }
    }

    #[test]
    fn valuation_matches_the_median_exactly_scores_near_one_hundred() {
        let benchmarks = IndustryBenchmarks {
            pe_median: Some(18.0),
            pb_median: Some(3.0),
            peg_median: Some(1.2),
            ev_ebitda_median: Some(12.0),
            ..Default::default()
        };
        let score = valuation_score(&ratios(), &benchmarks);
        assert!(score > 95.0);
    }

    #[test]
    fn valuation_with_no_benchmarks_is_neutral() {
        let score = valuation_score(&ratios(), &IndustryBenchmarks::default());
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn profitability_rewards_higher_margins_up_to_the_cap() {
        let benchmarks = IndustryBenchmarks {
            roe_p90: Some(0.20),
            roa_p90: Some(0.10),
            net_margin_p90: Some(0.20),
            operating_margin_p90: Some(0.25),
            ..Default::default()
        };
        let score = profitability_score(&ratios(), &benchmarks);
        assert!(score > 70.0 && score <= 100.0);
    }

    #[test]
    fn growth_score_is_fifty_at_zero_growth() {
        let inputs = GrowthInputs {
            revenue_growth: Some(0.0),
            earnings_growth: Some(0.0),
            book_value_growth: Some(0.0),
        };
        assert!((growth_score(&inputs) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn growth_score_rewards_positive_growth() {
        let inputs = GrowthInputs {
            revenue_growth: Some(0.15),
            earnings_growth: Some(0.20),
            book_value_growth: Some(0.10),
        };
        assert!(growth_score(&inputs) > 50.0);
    }

    #[test]
    fn health_base_score_is_in_range() {
        let score = health_score(&ratios(), &HealthTrends::default());
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn health_trend_adjustment_raises_score_when_all_improving() {
        let trends = HealthTrends {
            current_ratio: Some(TrendDirection::Improving),
            quick_ratio: Some(TrendDirection::Improving),
            debt_to_equity: Some(TrendDirection::Declining),
            interest_coverage: Some(TrendDirection::Improving),
        };
        let with_trend = health_score(&ratios(), &trends);
        let without_trend = health_score(&ratios(), &HealthTrends::default());
        assert!(with_trend >= without_trend);
    }

    #[test]
    fn risk_score_rewards_a_strong_altman_z() {
        let inputs = RiskInputs { altman_z: Some(3.5), beta: Some(1.0), annualized_volatility: Some(0.2) };
        assert!(risk_score(&inputs) > 50.0);
    }

    #[test]
    fn risk_score_with_only_altman_z_still_scores() {
        let inputs = RiskInputs { altman_z: Some(3.5), ..Default::default() };
        assert_eq!(risk_score(&inputs), 100.0);
    }
}
