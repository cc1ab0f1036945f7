//! Component H: per-industry weight training (§4.H). Runs `weight-trainer` restricted to one
//! industry's predictions wherever that industry independently clears `MIN_SAMPLES_INDUSTRY`;
//! for the rest, transfers the most cosine-similar trained industry's active vector verbatim
//! (`source=transferred`, confidence ×0.8), or -- when no peer clears the similarity threshold --
//! falls back to a single global meta-learner conditioned on an industry descriptor
//! (`source=meta`, confidence ×0.7). Industry profiles, similarity, and the meta-learner are all
//! refreshed on the same weekly cadence.

pub mod meta;
pub mod similarity;
pub mod transfer;
pub mod trainer;

pub use similarity::cosine_similarity;
pub use trainer::{refresh_all, IndustryRefreshOutcome};
