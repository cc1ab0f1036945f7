use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use valuation_core::{
    field_digest, EngineRegistry, EngineResult, IndustryProfile, ModelId, OwnerKind,
    WeightVector, WeightVectorStore,
};
use weight_trainer::{train_scope, TrainingSample, MIN_SAMPLES_INDUSTRY};

use crate::meta;
use crate::transfer;

/// Outcome of refreshing one industry, whichever of the three §4.H paths produced it.
pub struct IndustryRefreshOutcome {
    pub industry: String,
    pub vector: Option<WeightVector>,
}

/// Deterministic numeric stand-in for "industry identity" fed to the meta-learner. Hashing
/// keeps this a pure function of the industry name rather than an arbitrary lookup table.
fn industry_descriptor(industry: &str) -> f64 {
    let digest = field_digest(&[industry]);
    let prefix = u32::from_str_radix(&digest[..8], 16).unwrap_or(0);
    prefix as f64 / u32::MAX as f64
}

fn centroid(samples: &[TrainingSample]) -> Vec<f64> {
    let dim = ensemble_net::features::FEATURE_DIM;
    let mut sum = vec![0.0; dim];
    let mut count = 0usize;
    for sample in samples {
        if sample.features.len() != dim {
            continue;
        }
        for (i, v) in sample.features.iter().enumerate() {
            sum[i] += v;
        }
        count += 1;
    }
    if count == 0 {
        return vec![0.0; dim];
    }
    sum.into_iter().map(|v| v / count as f64).collect()
}

/// Ranks the eight models by their own (unweighted) MAPE over `samples`, ascending, so the
/// profile's `best_models` reflects which estimators tracked this industry best.
fn best_models(samples: &[TrainingSample]) -> Vec<ModelId> {
    let mut ranked: Vec<(ModelId, f64)> = ModelId::ALL
        .iter()
        .map(|m| {
            let errors: Vec<f64> = samples
                .iter()
                .map(|s| {
                    let value = s.model_values[m.index()];
                    if s.actual_price.abs() < 1e-9 {
                        0.0
                    } else {
                        ((value - s.actual_price) / s.actual_price).abs()
                    }
                })
                .collect();
            let mape = if errors.is_empty() {
                f64::MAX
            } else {
                errors.iter().sum::<f64>() / errors.len() as f64
            };
            (*m, mape)
        })
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    ranked.into_iter().take(3).map(|(m, _)| m).collect()
}

fn build_profile(industry: &str, samples: &[TrainingSample]) -> IndustryProfile {
    IndustryProfile {
        industry: industry.to_string(),
        sample_count: samples.len(),
        centroid_feature_vector: centroid(samples),
        best_models: best_models(samples),
        last_trained: Utc::now(),
    }
}

/// One weekly pass of §4.H over every industry with a recorded sample set this cycle. Industries
/// reaching `MIN_SAMPLES_INDUSTRY` train directly through `weight_trainer::train_scope`;
/// everything else is filled in by cosine-similarity transfer (Open Question resolution: only
/// industries that did not independently reach `MIN_SAMPLES_INDUSTRY` are eligible for transfer
/// or meta, so a same-day industry-trained vector is never overridden), falling back to the
/// global meta-learner when no peer clears the similarity threshold.
pub async fn refresh_all(
    registry: &Arc<EngineRegistry>,
    weight_store: &dyn WeightVectorStore,
    profile_store: &dyn valuation_core::IndustryProfileStore,
    tenant_id: &str,
    samples_by_industry: &HashMap<String, Vec<TrainingSample>>,
    meta_weights: &ensemble_net::EnsembleNetWeights,
    seed: u64,
) -> EngineResult<Vec<IndustryRefreshOutcome>> {
    let mut directly_trained = HashSet::new();
    let mut outcomes = Vec::new();

    for (industry, samples) in samples_by_industry {
        let profile = build_profile(industry, samples);
        profile_store.upsert(tenant_id, profile).await?;

        if samples.len() >= MIN_SAMPLES_INDUSTRY {
            let result = train_scope(
                registry,
                weight_store,
                tenant_id,
                OwnerKind::Industry,
                industry,
                samples.clone(),
                MIN_SAMPLES_INDUSTRY,
                seed,
            )
            .await?;
            directly_trained.insert(industry.clone());
            outcomes.push(IndustryRefreshOutcome {
                industry: industry.clone(),
                vector: result.deployed.or(Some(result.candidate)),
            });
        }
    }

    let all_profiles = profile_store.all(tenant_id).await?;

    for (industry, _samples) in samples_by_industry {
        if directly_trained.contains(industry) {
            continue;
        }

        let centroid_vector = all_profiles
            .iter()
            .find(|p| &p.industry == industry)
            .map(|p| p.centroid_feature_vector.clone())
            .unwrap_or_default();

        if let Some((donor, similarity)) = transfer::most_similar(&centroid_vector, &all_profiles, industry) {
            if let Some(active) = weight_store.active_for(tenant_id, OwnerKind::Industry, &donor.industry).await? {
                let vector = transfer::apply(&active, tenant_id, industry, similarity);
                weight_store.append(vector.clone()).await?;
                registry.active_weights.put(tenant_id, "industry", industry, vector.clone());
                outcomes.push(IndustryRefreshOutcome { industry: industry.clone(), vector: Some(vector) });
                continue;
            }
        }

        let descriptor = industry_descriptor(industry);
        let weights_map = meta::infer_weights(meta_weights, &centroid_vector, descriptor);
        let vector = meta::to_weight_vector(tenant_id, industry, &weights_map);
        weight_store.append(vector.clone()).await?;
        registry.active_weights.put(tenant_id, "industry", industry, vector.clone());
        outcomes.push(IndustryRefreshOutcome { industry: industry.clone(), vector: Some(vector) });
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use valuation_core::{DeployState, WeightSource};

    #[derive(Default)]
    struct FakeWeightStore {
        rows: Mutex<Vec<WeightVector>>,
    }

    #[async_trait]
    impl WeightVectorStore for FakeWeightStore {
        async fn active_for(
            &self,
            _tenant_id: &str,
            owner_kind: OwnerKind,
            owner_id: &str,
        ) -> EngineResult<Option<WeightVector>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.owner_kind == owner_kind && r.owner_id == owner_id && r.deployed == DeployState::Active)
                .cloned())
        }

        async fn append(&self, vector: WeightVector) -> EngineResult<()> {
            self.rows.lock().unwrap().push(vector);
            Ok(())
        }

        async fn retire(&self, id: &str, effective_to: chrono::DateTime<Utc>) -> EngineResult<()> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
                row.deployed = DeployState::Retired;
                row.effective_to = Some(effective_to);
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeProfileStore {
        rows: Mutex<HashMap<String, IndustryProfile>>,
    }

    #[async_trait]
    impl valuation_core::IndustryProfileStore for FakeProfileStore {
        async fn get(&self, _tenant_id: &str, industry: &str) -> EngineResult<Option<IndustryProfile>> {
            Ok(self.rows.lock().unwrap().get(industry).cloned())
        }

        async fn all(&self, _tenant_id: &str) -> EngineResult<Vec<IndustryProfile>> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn upsert(&self, _tenant_id: &str, profile: IndustryProfile) -> EngineResult<()> {
            self.rows.lock().unwrap().insert(profile.industry.clone(), profile);
            Ok(())
        }
    }

    fn well_trained_samples(n: usize) -> Vec<TrainingSample> {
        (0..n)
            .map(|i| {
                let actual = 100.0 + i as f64 * 0.25;
                TrainingSample {
                    features: vec![0.4; ensemble_net::features::FEATURE_DIM],
                    model_values: [actual; 8],
                    actual_price: actual,
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn an_industry_with_enough_samples_trains_directly() {
        let registry = EngineRegistry::init();
        let weight_store = FakeWeightStore::default();
        let profile_store = FakeProfileStore::default();
        let mut samples_by_industry = HashMap::new();
        samples_by_industry.insert("software".to_string(), well_trained_samples(200));

        let outcomes = refresh_all(
            &registry,
            &weight_store,
            &profile_store,
            "t1",
            &samples_by_industry,
            &meta::untrained(),
            11,
        )
        .await
        .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].industry, "software");
    }

    #[tokio::test]
    async fn a_thin_industry_transfers_from_a_similar_trained_peer() {
        let registry = EngineRegistry::init();
        let weight_store = FakeWeightStore::default();
        let profile_store = FakeProfileStore::default();

        let mut samples_by_industry = HashMap::new();
        samples_by_industry.insert("software".to_string(), well_trained_samples(200));
        samples_by_industry.insert("it-services".to_string(), well_trained_samples(5));

        let outcomes = refresh_all(
            &registry,
            &weight_store,
            &profile_store,
            "t1",
            &samples_by_industry,
            &meta::untrained(),
            11,
        )
        .await
        .unwrap();

        let thin = outcomes.iter().find(|o| o.industry == "it-services").unwrap();
        let vector = thin.vector.as_ref().unwrap();
        assert_eq!(vector.source, WeightSource::Transferred);
    }

    #[tokio::test]
    async fn an_isolated_thin_industry_falls_back_to_the_meta_learner() {
        let registry = EngineRegistry::init();
        let weight_store = FakeWeightStore::default();
        let profile_store = FakeProfileStore::default();

        let mut samples_by_industry = HashMap::new();
        samples_by_industry.insert("niche-sector".to_string(), well_trained_samples(3));

        let outcomes = refresh_all(
            &registry,
            &weight_store,
            &profile_store,
            "t1",
            &samples_by_industry,
            &meta::untrained(),
            11,
        )
        .await
        .unwrap();

        let only = &outcomes[0];
        assert_eq!(only.vector.as_ref().unwrap().source, WeightSource::Meta);
    }
}
