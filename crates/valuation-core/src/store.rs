use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::EngineResult;
use crate::traits::{IndustryProfileStore, WeightVectorStore};
use crate::types::{DeployState, IndustryProfile, OwnerKind, WeightVector};

fn owner_key(tenant_id: &str, owner_kind: OwnerKind, owner_id: &str) -> String {
    let kind = match owner_kind {
        OwnerKind::Global => "global",
        OwnerKind::Industry => "industry",
        OwnerKind::CompanyOverride => "company_override",
    };
    format!("{tenant_id}:{kind}:{owner_id}")
}

/// `DashMap`-backed `WeightVectorStore`, append-only: `retire` flips a row's `deployed` state
/// in place rather than deleting it, so the audit trail `WeightTrainer`/`IndustryTrainer` build
/// stays intact. Suitable for tests and for a single-process deployment; a `sqlx`-backed
/// implementation can be layered in behind the same trait without touching any caller.
#[derive(Default)]
pub struct InMemoryWeightVectorStore {
    rows: DashMap<String, Vec<WeightVector>>,
}

impl InMemoryWeightVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WeightVectorStore for InMemoryWeightVectorStore {
    async fn active_for(
        &self,
        tenant_id: &str,
        owner_kind: OwnerKind,
        owner_id: &str,
    ) -> EngineResult<Option<WeightVector>> {
        let key = owner_key(tenant_id, owner_kind, owner_id);
        Ok(self
            .rows
            .get(&key)
            .and_then(|rows| rows.iter().find(|r| r.deployed == DeployState::Active).cloned()))
    }

    async fn append(&self, vector: WeightVector) -> EngineResult<()> {
        let key = owner_key(&vector.tenant_id, vector.owner_kind, &vector.owner_id);
        self.rows.entry(key).or_default().push(vector);
        Ok(())
    }

    async fn retire(&self, id: &str, effective_to: DateTime<Utc>) -> EngineResult<()> {
        for mut entry in self.rows.iter_mut() {
            if let Some(row) = entry.value_mut().iter_mut().find(|r| r.id == id) {
                row.deployed = DeployState::Retired;
                row.effective_to = Some(effective_to);
                break;
            }
        }
        Ok(())
    }
}

/// `DashMap`-backed `IndustryProfileStore`: one row per `(tenant, industry)`, replaced whole on
/// every `upsert` (copy-on-write, same convention as `ActiveWeightCache::put`).
#[derive(Default)]
pub struct InMemoryIndustryProfileStore {
    rows: DashMap<String, IndustryProfile>,
}

impl InMemoryIndustryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(tenant_id: &str, industry: &str) -> String {
        format!("{tenant_id}:{industry}")
    }
}

#[async_trait]
impl IndustryProfileStore for InMemoryIndustryProfileStore {
    async fn get(&self, tenant_id: &str, industry: &str) -> EngineResult<Option<IndustryProfile>> {
        Ok(self.rows.get(&Self::key(tenant_id, industry)).map(|entry| entry.value().clone()))
    }

    async fn all(&self, tenant_id: &str) -> EngineResult<Vec<IndustryProfile>> {
        let prefix = format!("{tenant_id}:");
        Ok(self
            .rows
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn upsert(&self, tenant_id: &str, profile: IndustryProfile) -> EngineResult<()> {
        self.rows.insert(Self::key(tenant_id, &profile.industry), profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{WeightSource, WeightTrainingMetrics};

    fn vector(id: &str, owner_kind: OwnerKind, owner_id: &str, deployed: DeployState) -> WeightVector {
        WeightVector {
            id: id.into(),
            tenant_id: "t1".into(),
            owner_kind,
            owner_id: owner_id.into(),
            effective_from: Utc::now(),
            effective_to: None,
            model_weights: [0.125; 8],
            source: WeightSource::Trained,
            metrics: WeightTrainingMetrics::default(),
            ml_confidence: 0.5,
            deployed,
            rejected_reason: None,
        }
    }

    #[tokio::test]
    async fn active_for_finds_only_the_active_row() {
        let store = InMemoryWeightVectorStore::new();
        store.append(vector("v1", OwnerKind::Global, "global", DeployState::Retired)).await.unwrap();
        store.append(vector("v2", OwnerKind::Global, "global", DeployState::Active)).await.unwrap();

        let active = store.active_for("t1", OwnerKind::Global, "global").await.unwrap().unwrap();
        assert_eq!(active.id, "v2");
    }

    #[tokio::test]
    async fn retire_flips_state_without_deleting() {
        let store = InMemoryWeightVectorStore::new();
        store.append(vector("v1", OwnerKind::Global, "global", DeployState::Active)).await.unwrap();
        store.retire("v1", Utc::now()).await.unwrap();

        assert!(store.active_for("t1", OwnerKind::Global, "global").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn industry_profile_upsert_replaces_the_whole_row() {
        let store = InMemoryIndustryProfileStore::new();
        let profile = IndustryProfile {
            industry: "software".into(),
            sample_count: 10,
            centroid_feature_vector: vec![0.1; 20],
            best_models: vec![],
            last_trained: Utc::now(),
        };
        store.upsert("t1", profile.clone()).await.unwrap();
        let fetched = store.get("t1", "software").await.unwrap().unwrap();
        assert_eq!(fetched.sample_count, 10);

        let all = store.all("t1").await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
