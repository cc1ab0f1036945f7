//! Leverage / solvency ratios.

pub fn debt_to_equity(total_liabilities: f64, shareholders_equity: f64) -> Option<f64> {
    if shareholders_equity > 0.0 {
        Some(total_liabilities / shareholders_equity)
    } else {
        None
    }
}

pub fn debt_to_assets(total_debt: f64, total_assets: f64) -> Option<f64> {
    if total_assets > 0.0 {
        Some(total_debt / total_assets)
    } else {
        None
    }
}

pub fn interest_coverage(ebit: f64, interest_expense: f64) -> Option<f64> {
    if interest_expense > 0.0 {
        Some(ebit / interest_expense)
    } else {
        None
    }
}

/// Asset coverage: how many times total assets cover total liabilities.
pub fn asset_coverage(total_assets: f64, total_liabilities: f64) -> Option<f64> {
    if total_liabilities > 0.0 {
        Some(total_assets / total_liabilities)
    } else {
        None
    }
}
