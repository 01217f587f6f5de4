use crate::domain::event::PaymentEvent;
use crate::heatmap::density::{CellIntensity, DensityGrid, TrimReport};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregatorStats {
    pub accepted: u64,
    pub rejected: u64,
    pub cells: usize,
}

// Sole writer of a `DensityGrid`. Each event is applied under the write lock, so a
// snapshot sees either all of it or none of it.
#[derive(Clone)]
pub struct SpatialAggregator {
    inner: Arc<RwLock<DensityGrid>>,
    accepted: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
    max_skew: chrono::Duration,
}

impl SpatialAggregator {
    pub fn new(grid: DensityGrid) -> Self {
        Self {
            inner: Arc::new(RwLock::new(grid)),
            accepted: Arc::new(AtomicU64::new(0)),
            rejected: Arc::new(AtomicU64::new(0)),
            max_skew: chrono::Duration::minutes(5),
        }
    }

    pub fn with_max_skew(mut self, max_skew: chrono::Duration) -> Self {
        self.max_skew = max_skew;
        self
    }

    pub async fn ingest(&self, event: &PaymentEvent) -> bool {
        if let Err(reason) = event.check(chrono::Utc::now(), self.max_skew) {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                event_id = %event.event_id,
                reason = reason.as_str(),
                "dropping malformed payment event"
            );
            return false;
        }

        self.inner.write().await.ingest(event);
        self.accepted.fetch_add(1, Ordering::Relaxed);
        true
    }

    pub async fn snapshot(&self) -> Vec<CellIntensity> {
        self.inner.read().await.snapshot()
    }

    pub async fn trim(&self, now: chrono::DateTime<chrono::Utc>) -> TrimReport {
        self.inner.write().await.trim(now)
    }

    pub async fn stats(&self) -> AggregatorStats {
        let cells = self.inner.read().await.len();
        AggregatorStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            cells,
        }
    }
}
