use std::collections::HashMap;

use valuation_core::{
    field_digest, ActiveWeightCache, ModelId, OwnerKind, WeightSource, WeightVector,
    WeightVectorStore,
};

/// Model weights resolved for one valuation request, plus provenance for the audit digest.
pub struct ResolvedWeights {
    pub weights: HashMap<ModelId, f64>,
    pub source: WeightSource,
    pub digest: String,
}

fn owner_kind_key(owner_kind: OwnerKind) -> &'static str {
    match owner_kind {
        OwnerKind::Global => "global",
        OwnerKind::Industry => "industry",
        OwnerKind::CompanyOverride => "company_override",
    }
}

async fn lookup(
    cache: &ActiveWeightCache,
    store: &dyn WeightVectorStore,
    tenant_id: &str,
    owner_kind: OwnerKind,
    owner_id: &str,
) -> Option<WeightVector> {
    let key = owner_kind_key(owner_kind);
    if let Some(vector) = cache.get(tenant_id, key, owner_id) {
        return Some(vector);
    }
    match store.active_for(tenant_id, owner_kind, owner_id).await {
        Ok(Some(vector)) => {
            cache.put(tenant_id, key, owner_id, vector.clone());
            Some(vector)
        }
        _ => None,
    }
}

/// Resolves model weights by precedence: company-override > industry-active > global-active >
/// default weight table (§4.F step 3).
pub async fn resolve(
    cache: &ActiveWeightCache,
    store: &dyn WeightVectorStore,
    tenant_id: &str,
    company_id: &str,
    industry: &str,
) -> ResolvedWeights {
    let candidates = [
        (OwnerKind::CompanyOverride, company_id),
        (OwnerKind::Industry, industry),
        (OwnerKind::Global, "global"),
    ];

    for (owner_kind, owner_id) in candidates {
        if let Some(vector) = lookup(cache, store, tenant_id, owner_kind, owner_id).await {
            let weights = ModelId::ALL.iter().map(|m| (*m, vector.weight_of(*m))).collect();
            let digest = field_digest(&[&vector.id, tenant_id, owner_id]);
            return ResolvedWeights { weights, source: vector.source, digest };
        }
    }

    ResolvedWeights {
        weights: ensemble_net::default_weight_table(),
        source: WeightSource::Default,
        digest: field_digest(&["default", tenant_id]),
    }
}
