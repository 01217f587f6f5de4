use crate::heatmap::aggregator::SpatialAggregator;
use anyhow::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct RetentionTrimmer {
    pub aggregator: SpatialAggregator,
    pub interval: Duration,
}

impl RetentionTrimmer {
    pub async fn run(self, ctx: CancellationToken) -> Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = ticker.tick() => self.tick(chrono::Utc::now()).await,
            }
        }
        tracing::info!("retention trimmer stopped");
        Ok(())
    }

    pub async fn tick(&self, now: chrono::DateTime<chrono::Utc>) {
        let report = self.aggregator.trim(now).await;
        if report.buckets_removed > 0 {
            tracing::debug!(
                buckets_removed = report.buckets_removed,
                cells_removed = report.cells_removed,
                "trimmed expired density buckets"
            );
        }
    }
}
