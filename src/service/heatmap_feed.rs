use crate::heatmap::aggregator::SpatialAggregator;
use crate::heatmap::density::CellIntensity;
use crate::heatmap::diff::{diff, SnapshotDiff};
use crate::heatmap::projector::{project, HeatPoint, ProjectorConfig};
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapFrame {
    pub version: u64,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub points: Vec<HeatPoint>,
    #[serde(skip)]
    pub cells: Vec<CellIntensity>,
}

// Snapshot → diff → redraw. A new frame is published only when the grid actually changed,
// so subscribers redraw on data changes rather than on every poll.
#[derive(Clone)]
pub struct HeatmapFeed {
    aggregator: SpatialAggregator,
    projector: ProjectorConfig,
    tx: Arc<watch::Sender<Arc<HeatmapFrame>>>,
    refresh: Arc<Mutex<()>>,
}

impl HeatmapFeed {
    pub fn new(aggregator: SpatialAggregator, projector: ProjectorConfig) -> Self {
        let initial = HeatmapFrame {
            version: 0,
            generated_at: chrono::Utc::now(),
            points: project(&[], &projector),
            cells: Vec::new(),
        };
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self {
            aggregator,
            projector,
            tx: Arc::new(tx),
            refresh: Arc::new(Mutex::new(())),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<HeatmapFrame>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Arc<HeatmapFrame> {
        self.tx.borrow().clone()
    }

    pub async fn refresh(&self) -> Option<SnapshotDiff> {
        let _guard = self.refresh.lock().await;
        let cells = self.aggregator.snapshot().await;
        let previous = self.current();
        let changes = diff(&previous.cells, &cells);
        if changes.is_empty() {
            return None;
        }

        let frame = HeatmapFrame {
            version: previous.version + 1,
            generated_at: chrono::Utc::now(),
            points: project(&cells, &self.projector),
            cells,
        };
        tracing::debug!(
            version = frame.version,
            added = changes.added.len(),
            changed = changes.changed.len(),
            removed = changes.removed.len(),
            "heatmap frame published"
        );
        self.tx.send_replace(Arc::new(frame));
        Some(changes)
    }

    pub async fn run(self, ctx: CancellationToken, interval: Duration) -> Result<()> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = ticker.tick() => {
                    self.refresh().await;
                }
            }
        }
        tracing::info!("heatmap feed stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::PaymentEvent;
    use crate::domain::geofence::GeoPoint;
    use crate::heatmap::density::{DensityGrid, RetentionPolicy};
    use crate::heatmap::grid::CellSize;

    #[tokio::test]
    async fn publishes_only_on_change() {
        let agg = SpatialAggregator::new(DensityGrid::new(CellSize::Degrees(0.1), RetentionPolicy::default()));
        let feed = HeatmapFeed::new(agg.clone(), ProjectorConfig::default());
        let rx = feed.subscribe();

        assert_eq!(feed.current().points.len(), 1);
        assert!(feed.refresh().await.is_none());

        agg.ingest(&PaymentEvent::new(GeoPoint::new(28.6, 77.2), 10.0, chrono::Utc::now()))
            .await;
        let changes = feed.refresh().await.unwrap();
        assert_eq!(changes.added.len(), 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(feed.current().version, 1);
        assert_eq!(feed.current().points[0].weight, 1.0);

        assert!(feed.refresh().await.is_none());
        assert_eq!(feed.current().version, 1);
    }
}
