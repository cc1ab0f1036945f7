//! Liquidity ratios: ability to meet short-term obligations.

pub fn current_ratio(current_assets: f64, current_liabilities: f64) -> Option<f64> {
    if current_liabilities > 0.0 {
        Some(current_assets / current_liabilities)
    } else {
        None
    }
}

pub fn quick_ratio(
    current_assets: f64,
    inventory: f64,
    current_liabilities: f64,
) -> Option<f64> {
    if current_liabilities > 0.0 {
        Some((current_assets - inventory) / current_liabilities)
    } else {
        None
    }
}

pub fn cash_ratio(cash_and_equivalents: f64, current_liabilities: f64) -> Option<f64> {
    if current_liabilities > 0.0 {
        Some(cash_and_equivalents / current_liabilities)
    } else {
        None
    }
}

pub fn working_capital(current_assets: f64, current_liabilities: f64) -> Option<f64> {
    Some(current_assets - current_liabilities)
}
