use std::collections::HashMap;

use valuation_core::{ModelId, TwoWayCell, ValuationInput, ValuationModel};

use crate::reval::revalue;
use crate::variable::Variable;

/// §4.I `two_way`: Cartesian product of two parameters' ranges, `nx * ny` reruns.
#[allow(clippy::too_many_arguments)]
pub fn two_way(
    models: &[Box<dyn ValuationModel>],
    base_input: &ValuationInput,
    model_weights: &HashMap<ModelId, f64>,
    vx: Variable,
    range_x: (f64, f64),
    nx: usize,
    vy: Variable,
    range_y: (f64, f64),
    ny: usize,
) -> Vec<TwoWayCell> {
    if nx == 0 || ny == 0 {
        return Vec::new();
    }
    let xs = grid_points(range_x, nx);
    let ys = grid_points(range_y, ny);

    let mut cells = Vec::with_capacity(nx * ny);
    for &x in &xs {
        for &y in &ys {
            let mut input = base_input.clone();
            vx.write(&mut input.params, x);
            vy.write(&mut input.params, y);
            let fair_value = revalue(models, &input, model_weights).unwrap_or(0.0);
            cells.push(TwoWayCell { x, y, fair_value });
        }
    }
    cells
}

fn grid_points(range: (f64, f64), n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![range.0];
    }
    let (low, high) = range;
    let step = (high - low) / (n - 1) as f64;
    (0..n).map(|i| low + step * i as f64).collect()
}
