use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::types::WeightVector;

/// A cached value plus the instant it was cached, mirroring the teacher's
/// `analysis-orchestrator` `CacheEntry<T>` pattern.
#[derive(Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub cached_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// Process-wide read-mostly mapping of active WeightVectors, keyed by
/// `"{tenant}:{owner_kind}:{owner_id}"`. Readers take a `.clone()`d snapshot from the
/// `DashMap` shard they land in and never observe a torn update: each write replaces the
/// whole entry in one `insert` call rather than mutating fields in place.
#[derive(Default)]
pub struct ActiveWeightCache {
    inner: DashMap<String, WeightVector>,
}

impl ActiveWeightCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(tenant_id: &str, owner_kind: &str, owner_id: &str) -> String {
        format!("{tenant_id}:{owner_kind}:{owner_id}")
    }

    pub fn get(&self, tenant_id: &str, owner_kind: &str, owner_id: &str) -> Option<WeightVector> {
        self.inner
            .get(&Self::key(tenant_id, owner_kind, owner_id))
            .map(|entry| entry.value().clone())
    }

    /// Atomically replace the active vector for an owner. Copy-on-write: the old value is
    /// simply dropped, never mutated in place.
    pub fn put(&self, tenant_id: &str, owner_kind: &str, owner_id: &str, vector: WeightVector) {
        self.inner
            .insert(Self::key(tenant_id, owner_kind, owner_id), vector);
    }
}

/// Per-scope lock table used to serialise WeightTrainer/IndustryTrainer deployment writes.
/// `scoped_lock` returns a guard that releases on `Drop`, covering panics and early returns
/// alike -- the Rust stand-in for "guaranteed release on all exit paths" called out in the
/// design notes, without relying on any particular scope-exit keyword.
#[derive(Default)]
pub struct ScopeLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

pub struct ScopedLockGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn scoped_lock(&self, key: &str) -> ScopedLockGuard {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        ScopedLockGuard { _guard: guard }
    }

    /// Non-blocking variant used by request-path code that must not wait on a training lock.
    pub fn try_scoped_lock(&self, key: &str) -> Option<ScopedLockGuard> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex
            .try_lock_owned()
            .ok()
            .map(|guard| ScopedLockGuard { _guard: guard })
    }
}

/// Bounded-retry circuit breaker for one upstream dependency: opens after
/// `max_consecutive_failures`, stays open for `cooling_period`, then half-opens on the next
/// call. Generalised from the teacher's cache/TTL bookkeeping to failure-state bookkeeping.
pub struct CircuitBreaker {
    max_consecutive_failures: u32,
    cooling_period: Duration,
    consecutive_failures: AtomicU32,
    opened_at: Mutex<Option<Instant>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitBreaker {
    pub fn new(max_consecutive_failures: u32, cooling_period: Duration) -> Self {
        Self {
            max_consecutive_failures,
            cooling_period,
            consecutive_failures: AtomicU32::new(0),
            opened_at: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> CircuitState {
        let opened_at = self.opened_at.lock().await;
        match *opened_at {
            None => CircuitState::Closed,
            Some(when) if when.elapsed() >= self.cooling_period => CircuitState::HalfOpen,
            Some(_) => CircuitState::Open,
        }
    }

    pub async fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        *self.opened_at.lock().await = None;
    }

    pub async fn record_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= self.max_consecutive_failures {
            let mut opened_at = self.opened_at.lock().await;
            if opened_at.is_none() {
                warn!(failures, "circuit breaker opened after consecutive failures");
                *opened_at = Some(Instant::now());
            }
        }
    }
}

/// Top-level process registry: active-weight cache, scope locks, and one circuit breaker
/// per upstream dependency name. Owns no business logic -- components borrow it.
pub struct EngineRegistry {
    pub active_weights: ActiveWeightCache,
    pub scope_locks: ScopeLocks,
    pub upstream_breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl EngineRegistry {
    pub fn init() -> Arc<Self> {
        debug!("initialising engine registry");
        Arc::new(Self {
            active_weights: ActiveWeightCache::new(),
            scope_locks: ScopeLocks::new(),
            upstream_breakers: DashMap::new(),
        })
    }

    pub fn breaker_for(&self, upstream: &str) -> Arc<CircuitBreaker> {
        self.upstream_breakers
            .entry(upstream.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(3, Duration::from_secs(60))))
            .clone()
    }

    /// No explicit teardown is required today (no background threads spawned here), but
    /// the design notes call for an explicit counterpart to `init()` rather than relying on
    /// implicit module-load/drop side effects.
    pub fn shutdown(self: Arc<Self>) {
        debug!("shutting down engine registry");
    }
}
