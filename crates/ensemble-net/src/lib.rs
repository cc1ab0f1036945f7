pub mod features;
pub mod net;

use std::collections::HashMap;

pub use features::assemble as assemble_features;
pub use net::{infer, BatchNorm, DenseLayer, EnsembleNetWeights};

use valuation_core::ModelId;

/// The glossary's "default weight table": `ModelId::default_weight()` for all eight models,
/// used whenever no trained `EnsembleNetWeights` (or `WeightVector`) is available yet.
pub fn default_weight_table() -> HashMap<ModelId, f64> {
    ModelId::ALL
        .iter()
        .map(|m| (*m, m.default_weight()))
        .collect()
}

/// Model weights from a trained net: runs inference and maps the eight softmax outputs back
/// onto `ModelId` in `ModelId::ALL` order.
pub fn weights_from_net(weights: &EnsembleNetWeights, features: &[f64]) -> HashMap<ModelId, f64> {
    let raw = infer(weights, features);
    ModelId::ALL
        .iter()
        .zip(raw.iter())
        .map(|(m, w)| (*m, *w))
        .collect()
}
