//! Profitability ratios, generalised from the teacher's `calculate_roe`/`calculate_profit_margin`
//! pattern (percent-scaled, zero-denominator guarded).

pub fn gross_margin(gross_profit: f64, revenue: f64) -> Option<f64> {
    if revenue > 0.0 {
        Some(gross_profit / revenue * 100.0)
    } else {
        None
    }
}

pub fn operating_margin(operating_income: f64, revenue: f64) -> Option<f64> {
    if revenue > 0.0 {
        Some(operating_income / revenue * 100.0)
    } else {
        None
    }
}

pub fn net_margin(net_income: f64, revenue: f64) -> Option<f64> {
    if revenue > 0.0 {
        Some(net_income / revenue * 100.0)
    } else {
        None
    }
}

pub fn roe(net_income: f64, shareholders_equity: f64) -> Option<f64> {
    if shareholders_equity > 0.0 {
        Some(net_income / shareholders_equity * 100.0)
    } else {
        None
    }
}

pub fn roa(net_income: f64, total_assets: f64) -> Option<f64> {
    if total_assets > 0.0 {
        Some(net_income / total_assets * 100.0)
    } else {
        None
    }
}

/// Return on invested capital, using the teacher's flat effective-tax-rate NOPAT
/// approximation generalised to take the tenant's configured tax rate rather than a
/// hardcoded 21%.
pub fn roic(
    operating_income: f64,
    effective_tax_rate: f64,
    total_debt: f64,
    shareholders_equity: f64,
    cash_and_equivalents: f64,
) -> Option<f64> {
    let invested_capital = total_debt + shareholders_equity - cash_and_equivalents;
    if invested_capital > 0.0 {
        let nopat = operating_income * (1.0 - effective_tax_rate);
        Some(nopat / invested_capital * 100.0)
    } else {
        None
    }
}
