use geoqr_engine::config::{AppConfig, SourceKind};
use geoqr_engine::heatmap::aggregator::SpatialAggregator;
use geoqr_engine::heatmap::density::DensityGrid;
use geoqr_engine::service::credential_service::CredentialService;
use geoqr_engine::service::heatmap_feed::HeatmapFeed;
use geoqr_engine::service::ingest::run_ingest;
use geoqr_engine::service::retention::RetentionTrimmer;
use geoqr_engine::source::channel::channel;
use geoqr_engine::source::redis_stream::RedisStreamSource;
use geoqr_engine::source::synthetic::{SyntheticConfig, SyntheticSource};
use geoqr_engine::AppState;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    geoqr_engine::telemetry::init();

    let cfg = AppConfig::from_env();
    let ctx = CancellationToken::new();
    let mut tasks: JoinSet<anyhow::Result<()>> = JoinSet::new();

    let aggregator = SpatialAggregator::new(DensityGrid::new(cfg.cell_size(), cfg.retention()))
        .with_max_skew(cfg.max_clock_skew());
    let heatmap_feed = HeatmapFeed::new(aggregator.clone(), cfg.projector());

    let publisher = match cfg.event_source {
        SourceKind::Synthetic => {
            let source = SyntheticSource::new(SyntheticConfig {
                seed: cfg.synthetic_seed,
                interval: Some(Duration::from_millis(cfg.synthetic_interval_ms)),
                start: chrono::Utc::now(),
                ..SyntheticConfig::default()
            })?;
            let (ctx, agg) = (ctx.clone(), aggregator.clone());
            tasks.spawn(async move { run_ingest(ctx, source, agg).await.map(|_| ()) });
            None
        }
        SourceKind::Redis => {
            let client = redis::Client::open(cfg.redis_url.clone())?;
            let source =
                RedisStreamSource::connect(&client, &cfg.stream_key, &cfg.stream_group, &cfg.consumer_name).await?;
            let (ctx, agg) = (ctx.clone(), aggregator.clone());
            tasks.spawn(async move { run_ingest(ctx, source, agg).await.map(|_| ()) });
            None
        }
        SourceKind::Push => {
            let (publisher, source) = channel(1024);
            let (ctx, agg) = (ctx.clone(), aggregator.clone());
            tasks.spawn(async move { run_ingest(ctx, source, agg).await.map(|_| ()) });
            Some(publisher)
        }
    };

    let trimmer = RetentionTrimmer {
        aggregator: aggregator.clone(),
        interval: cfg.trim_interval(),
    };
    tasks.spawn(trimmer.run(ctx.clone()));
    tasks.spawn(heatmap_feed.clone().run(ctx.clone(), cfg.heatmap_refresh()));

    let state = AppState {
        credential_service: CredentialService {
            default_fence: cfg.default_fence(),
        },
        aggregator,
        heatmap_feed,
        publisher,
    };
    let app = geoqr_engine::http::routes::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);

    let shutdown = ctx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        })
        .await?;

    ctx.cancel();
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Err(e)) = joined {
            tracing::error!(error = %e, "background task failed");
        }
    }
    Ok(())
}
