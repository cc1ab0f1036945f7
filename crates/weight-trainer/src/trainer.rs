use std::sync::Arc;

use chrono::Utc;
use valuation_core::{
    ml_confidence, EngineRegistry, EngineResult, ModelId, OwnerKind, ValuationError,
    WeightSource, WeightTrainingMetrics, WeightVector, WeightVectorStore,
};

use crate::abgate::ab_gate;
use crate::cv::five_fold_cv;
use crate::gradient::train_weights;
use crate::samples::{mape, r_squared, TrainingSample};
use crate::smoothing::smooth;

pub const MIN_SAMPLES_GLOBAL: usize = 100;
pub const MIN_SAMPLES_INDUSTRY: usize = 30;

fn owner_key(owner_kind: OwnerKind, owner_id: &str) -> String {
    match owner_kind {
        OwnerKind::Global => "global".into(),
        OwnerKind::Industry => format!("industry:{owner_id}"),
        OwnerKind::CompanyOverride => format!("company:{owner_id}"),
    }
}

/// Outcome of one `train_scope` run, including the A/B gate verdict for audit even when the
/// candidate is rejected (Testable Property 5, end-to-end scenario S5).
pub struct TrainRunResult {
    pub deployed: Option<WeightVector>,
    pub candidate: WeightVector,
}

/// Component G: daily per-scope training (§4.G). Runs gradient-descent training, 5-fold CV,
/// an 80/20 chronological backtest split, a paired-t-test A/B gate against the currently active
/// vector, and -- on a win -- exponential smoothing before persisting the new active vector.
/// `seed` makes CV folds (and therefore the whole run) deterministic for a fixed input state
/// (Testable Property 1).
pub async fn train_scope(
    registry: &Arc<EngineRegistry>,
    store: &dyn WeightVectorStore,
    tenant_id: &str,
    owner_kind: OwnerKind,
    owner_id: &str,
    samples: Vec<TrainingSample>,
    min_samples: usize,
    seed: u64,
) -> EngineResult<TrainRunResult> {
    if samples.len() < min_samples {
        return Err(ValuationError::InsufficientData(format!(
            "{} samples, need at least {min_samples}",
            samples.len()
        )));
    }

    let key = owner_key(owner_kind, owner_id);
    let _guard = registry.scope_locks.scoped_lock(&key).await;

    let cv = five_fold_cv(&samples, seed);
    if cv.exceeds_threshold() {
        return Err(ValuationError::TrainingUnstable {
            cv_std: cv.std_mape,
            threshold: 0.2 * cv.mean_mape,
        });
    }

    // Chronological 80/20 split: the window is presented oldest-first by the caller, so the
    // held-out slice is the most recent 20% rather than a random sample.
    let split_at = (samples.len() as f64 * 0.8).round() as usize;
    let (train_slice, held_out) = samples.split_at(split_at.clamp(1, samples.len() - 1));

    let candidate_weights = train_weights(train_slice);
    let train_mape = mape(train_slice, &candidate_weights);
    let backtest_mape = mape(held_out, &candidate_weights);
    let r2 = r_squared(train_slice, &candidate_weights);

    let active = store.active_for(tenant_id, owner_kind, owner_id).await?;
    let active_weights = active.as_ref().map(|v| v.model_weights).unwrap_or_else(|| {
        let table = ensemble_net::default_weight_table();
        let mut w = [0.0; 8];
        for m in ModelId::ALL {
            w[m.index()] = table.get(&m).copied().unwrap_or(0.0);
        }
        w
    });

    let gate = ab_gate(held_out, &candidate_weights, &active_weights);

    let metrics = WeightTrainingMetrics {
        train_mape,
        backtest_mape,
        cv_std: cv.std_mape,
        sample_count: samples.len(),
    };
    let confidence = ml_confidence(r2, cv.std_mape, samples.len(), min_samples);

    let candidate_row = WeightVector {
        id: format!("{key}-candidate-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0)),
        tenant_id: tenant_id.to_string(),
        owner_kind,
        owner_id: owner_id.to_string(),
        effective_from: Utc::now(),
        effective_to: None,
        model_weights: candidate_weights,
        source: WeightSource::Trained,
        metrics,
        ml_confidence: confidence,
        deployed: valuation_core::DeployState::Candidate,
        rejected_reason: if gate.candidate_wins {
            None
        } else {
            Some(format!(
                "rejected: insufficient improvement (candidate_mape={:.4}, active_mape={:.4}, p={:.4})",
                gate.candidate_mape, gate.active_mape, gate.p_value
            ))
        },
    };

    if !gate.candidate_wins {
        tracing::info!(scope = %key, p_value = gate.p_value, "candidate weight vector rejected by A/B gate");
        store.append(candidate_row.clone()).await?;
        return Ok(TrainRunResult { deployed: None, candidate: candidate_row });
    }

    let smoothed = smooth(&candidate_weights, &active_weights, 0.3);
    let now = Utc::now();
    let deployed_row = WeightVector {
        id: format!("{key}-active-{}", now.timestamp_nanos_opt().unwrap_or(0)),
        tenant_id: tenant_id.to_string(),
        owner_kind,
        owner_id: owner_id.to_string(),
        effective_from: now,
        effective_to: None,
        model_weights: smoothed,
        source: WeightSource::Smoothed,
        metrics: candidate_row.metrics,
        ml_confidence: confidence,
        deployed: valuation_core::DeployState::Active,
        rejected_reason: None,
    };

    store.append(candidate_row.clone()).await?;
    if let Some(prior) = &active {
        store.retire(&prior.id, now).await?;
    }
    store.append(deployed_row.clone()).await?;
    registry
        .active_weights
        .put(tenant_id, owner_kind_key(owner_kind), owner_id, deployed_row.clone());

    tracing::info!(scope = %key, backtest_mape, "deployed new active weight vector");
    Ok(TrainRunResult { deployed: Some(deployed_row), candidate: candidate_row })
}

fn owner_kind_key(owner_kind: OwnerKind) -> &'static str {
    match owner_kind {
        OwnerKind::Global => "global",
        OwnerKind::Industry => "industry",
        OwnerKind::CompanyOverride => "company_override",
    }
}
