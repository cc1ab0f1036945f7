pub mod digest;
pub mod error;
pub mod ml_confidence;
pub mod registry;
pub mod rounding;
pub mod store;
pub mod traits;
pub mod types;

pub use digest::field_digest;
pub use error::*;
pub use ml_confidence::ml_confidence;
pub use registry::{ActiveWeightCache, CircuitBreaker, CircuitState, EngineRegistry, ScopeLocks, ScopedLockGuard};
pub use store::{InMemoryIndustryProfileStore, InMemoryWeightVectorStore};
pub use traits::*;
pub use types::*;
