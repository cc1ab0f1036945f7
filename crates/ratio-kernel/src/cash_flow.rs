//! Cash-flow-derived ratios, including the teacher's quality-of-earnings (OCF vs NI) check.

pub fn free_cash_flow(cash_flow_operating: f64, capital_expenditures: f64) -> Option<f64> {
    Some(cash_flow_operating - capital_expenditures.abs())
}

pub fn per_share(amount: f64, shares_outstanding: f64) -> Option<f64> {
    if shares_outstanding > 0.0 {
        Some(amount / shares_outstanding)
    } else {
        None
    }
}

pub fn cash_flow_to_debt(cash_flow_operating: f64, total_debt: f64) -> Option<f64> {
    if total_debt > 0.0 {
        Some(cash_flow_operating / total_debt)
    } else {
        None
    }
}

/// > 1.0 indicates cash earnings exceed accounting earnings -- a generally favourable quality
/// signal, mirroring the teacher's OCF-vs-net-income quality-of-earnings check.
pub fn quality_of_earnings(cash_flow_operating: f64, net_income: f64) -> Option<f64> {
    if net_income > 0.0 {
        Some(cash_flow_operating / net_income)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fcf_subtracts_capex_magnitude() {
        assert!((free_cash_flow(500.0, -100.0).unwrap() - 400.0).abs() < 1e-9);
    }

    #[test]
    fn quality_of_earnings_guards_nonpositive_income() {
        assert_eq!(quality_of_earnings(500.0, 0.0), None);
    }
}
