use rust_decimal::prelude::ToPrimitive;
use valuation_core::{BalanceSheet, Company, IncomeStatement};

fn dec(value: Option<rust_decimal::Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

/// Altman Z-score, built from the same statement fields `ratio-kernel` already derives ratios
/// from, plus the market value of equity (`shares_outstanding * price`). `None` when total
/// assets or total liabilities are missing or non-positive -- mirrors `risk-manager`'s
/// `Decimal`-first guard-before-divide idiom rather than letting the formula produce `NaN`.
pub fn altman_z_score(
    company: &Company,
    balance: &BalanceSheet,
    income: &IncomeStatement,
    price: f64,
) -> Option<f64> {
    let total_assets = dec(balance.total_assets)?;
    let total_liabilities = dec(balance.total_liabilities)?;
    if total_assets <= 0.0 || total_liabilities <= 0.0 {
        return None;
    }

    let working_capital = dec(balance.current_assets)? - dec(balance.current_liabilities)?;
    let retained_earnings = dec(balance.retained_earnings)?;
    let ebit = dec(income.ebit)?;
    let sales = dec(income.revenue)?;
    let shares = company.shares_outstanding.to_f64()?;
    let market_value_equity = shares * price;

    Some(
        1.2 * (working_capital / total_assets)
            + 1.4 * (retained_earnings / total_assets)
            + 3.3 * (ebit / total_assets)
            + 0.6 * (market_value_equity / total_liabilities)
            + 1.0 * (sales / total_assets),
    )
}

/// §4.J risk-dimension mapping: Z >= 3 is distress-free (100), Z < 1.81 is the distress zone
/// (0), linear in the "grey zone" between.
pub fn z_to_score(z: f64) -> f64 {
    if z >= 3.0 {
        100.0
    } else if z < 1.81 {
        0.0
    } else {
        ((z - 1.81) / (3.0 - 1.81) * 100.0).clamp(0.0, 100.0)
    }
}
