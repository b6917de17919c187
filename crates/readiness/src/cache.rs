//! Single-slot readiness cache with a fixed TTL.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::evaluator::ReadinessEvaluator;
use crate::types::ReadinessSnapshot;

/// One evaluated snapshot and when it was stored. Never mutated.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub snapshot: ReadinessSnapshot,
    pub created_at: Instant,
}

impl CachedEntry {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.created_at) < ttl
    }
}

/// Serves the last snapshot until it expires.
///
/// Refreshes are single-flight: the slot lock is held across evaluation, so
/// callers arriving during a refresh wait for it and are then served the
/// new entry from cache.
pub struct ReadinessCache {
    evaluator: Arc<ReadinessEvaluator>,
    ttl: Duration,
    slot: Mutex<Option<Arc<CachedEntry>>>,
}

impl ReadinessCache {
    pub fn new(evaluator: Arc<ReadinessEvaluator>) -> Self {
        let ttl = Duration::from_millis(evaluator.config().cache_ttl_ms);
        Self {
            evaluator,
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, force_refresh: bool) -> ReadinessSnapshot {
        let mut slot = self.slot.lock().await;

        if !force_refresh {
            if let Some(entry) = slot.as_ref() {
                if entry.is_fresh(self.ttl, Instant::now()) {
                    debug!("Readiness served from cache");
                    let mut snapshot = entry.snapshot.clone();
                    snapshot.cache.from_cache = true;
                    return snapshot;
                }
            }
        }

        debug!(
            "Readiness cache miss (force_refresh={}), evaluating",
            force_refresh
        );
        // Stamped before evaluating so the entry never outlives `cache.expires_at`.
        let created_at = Instant::now();
        let snapshot = self.evaluator.evaluate().await;
        *slot = Some(Arc::new(CachedEntry {
            snapshot: snapshot.clone(),
            created_at,
        }));
        snapshot
    }

    /// Current entry, if any, without evaluating.
    pub async fn peek(&self) -> Option<Arc<CachedEntry>> {
        self.slot.lock().await.clone()
    }

    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }
}
