//! Operating-efficiency (turnover) ratios.

pub fn asset_turnover(revenue: f64, total_assets: f64) -> Option<f64> {
    if total_assets > 0.0 {
        Some(revenue / total_assets)
    } else {
        None
    }
}

pub fn inventory_turnover(cost_of_revenue: f64, inventory: f64) -> Option<f64> {
    if inventory > 0.0 {
        Some(cost_of_revenue / inventory)
    } else {
        None
    }
}

pub fn receivables_turnover(revenue: f64, receivables: f64) -> Option<f64> {
    if receivables > 0.0 {
        Some(revenue / receivables)
    } else {
        None
    }
}
