use crate::heatmap::aggregator::SpatialAggregator;
use crate::source::EventSource;
use anyhow::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Pulls events from `source` into `aggregator` until cancelled or the source is exhausted.
/// Cancellation is only observed between events, so the grid always reflects whole events.
pub async fn run_ingest<S>(ctx: CancellationToken, mut source: S, aggregator: SpatialAggregator) -> Result<u64>
where
    S: EventSource,
{
    info!(source = source.name(), "event ingestion started");
    let mut applied: u64 = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                info!(source = source.name(), applied, "received shutdown signal, stopping ingestion");
                break;
            }
            next = source.next_event() => next,
        };

        match next {
            Ok(Some(event)) => {
                if aggregator.ingest(&event).await {
                    applied += 1;
                }
                if let Err(e) = source.commit().await {
                    error!(source = source.name(), error = %e, "failed to commit event");
                }
            }
            Ok(None) => {
                info!(source = source.name(), applied, "event source exhausted");
                break;
            }
            Err(e) => {
                error!(source = source.name(), error = %e, "event source error");
                tokio::select! {
                    _ = ctx.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_millis(500)) => {}
                }
            }
        }
    }

    Ok(applied)
}
