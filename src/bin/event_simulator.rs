use anyhow::Result;
use geoqr_engine::config::AppConfig;
use geoqr_engine::source::redis_stream::RedisStreamPublisher;
use geoqr_engine::source::synthetic::{SyntheticConfig, SyntheticSource};
use geoqr_engine::source::EventSource;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    geoqr_engine::telemetry::init();

    let cfg = AppConfig::from_env();
    let limit = std::env::var("SIMULATOR_LIMIT").ok().and_then(|s| s.parse::<u64>().ok());
    let publisher = RedisStreamPublisher {
        client: redis::Client::open(cfg.redis_url.clone())?,
        stream_key: cfg.stream_key.clone(),
    };
    let mut source = SyntheticSource::new(SyntheticConfig {
        seed: cfg.synthetic_seed,
        interval: Some(Duration::from_millis(cfg.synthetic_interval_ms)),
        limit,
        start: chrono::Utc::now(),
        ..SyntheticConfig::default()
    })?;

    let mut published: u64 = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = source.next_event() => {
                let Some(event) = next? else { break };
                match publisher.publish(&event).await {
                    Ok(id) => {
                        published += 1;
                        tracing::debug!(entry_id = %id, amount = event.amount, "published synthetic event");
                    }
                    Err(e) => tracing::warn!(error = %e, "xadd failed"),
                }
            }
        }
    }

    tracing::info!(published, "simulator stopped");
    Ok(())
}
