//! Market-value (multiple) ratios, generalised from the teacher's `calculate_pe_ratio`/
//! `calculate_pb_ratio` pair.

pub fn pe_ratio(price: f64, eps: f64) -> Option<f64> {
    if eps > 0.0 {
        Some(price / eps)
    } else {
        None
    }
}

pub fn pb_ratio(price: f64, shares_outstanding: f64, shareholders_equity: f64) -> Option<f64> {
    if shares_outstanding > 0.0 && shareholders_equity > 0.0 {
        let book_value_per_share = shareholders_equity / shares_outstanding;
        if book_value_per_share > 0.0 {
            Some(price / book_value_per_share)
        } else {
            None
        }
    } else {
        None
    }
}

/// PEG = P/E divided by the growth rate expressed as a plain percentage number (e.g. 15 for
/// 15%). Undefined when growth is non-positive -- a negative-growth PEG has no useful sign.
pub fn peg_ratio(pe: Option<f64>, earnings_growth_pct: Option<f64>) -> Option<f64> {
    let pe = pe?;
    let growth = earnings_growth_pct?;
    if growth > 0.0 {
        Some(pe / growth)
    } else {
        None
    }
}

pub fn price_to_sales(price: f64, shares_outstanding: f64, revenue: f64) -> Option<f64> {
    if shares_outstanding > 0.0 && revenue > 0.0 {
        Some(price * shares_outstanding / revenue)
    } else {
        None
    }
}

pub fn price_to_cash_flow(
    price: f64,
    shares_outstanding: f64,
    cash_flow_operating: f64,
) -> Option<f64> {
    if shares_outstanding > 0.0 && cash_flow_operating > 0.0 {
        Some(price * shares_outstanding / cash_flow_operating)
    } else {
        None
    }
}

pub fn ev_to_ebitda(
    price: f64,
    shares_outstanding: f64,
    total_debt: f64,
    cash_and_equivalents: f64,
    ebitda: f64,
) -> Option<f64> {
    if ebitda > 0.0 {
        let market_cap = price * shares_outstanding;
        let enterprise_value = market_cap + total_debt - cash_and_equivalents;
        Some(enterprise_value / ebitda)
    } else {
        None
    }
}

pub fn dividend_yield(annual_dividends_per_share: f64, price: f64) -> Option<f64> {
    if price > 0.0 {
        Some(annual_dividends_per_share / price * 100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pe_ratio_guards_negative_eps() {
        assert_eq!(pe_ratio(100.0, -2.0), None);
        assert!((pe_ratio(100.0, 5.0).unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn peg_requires_positive_growth() {
        assert_eq!(peg_ratio(Some(20.0), Some(-5.0)), None);
        assert!((peg_ratio(Some(20.0), Some(10.0)).unwrap() - 2.0).abs() < 1e-9);
    }
}
