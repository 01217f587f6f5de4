use chrono::TimeZone;
use geoqr_engine::domain::event::PaymentEvent;
use geoqr_engine::domain::geofence::GeoPoint;
use geoqr_engine::heatmap::aggregator::SpatialAggregator;
use geoqr_engine::heatmap::density::{DensityGrid, RetentionPolicy};
use geoqr_engine::heatmap::grid::CellSize;
use geoqr_engine::heatmap::projector::{project, ProjectorConfig};
use geoqr_engine::service::ingest::run_ingest;
use geoqr_engine::service::retention::RetentionTrimmer;
use geoqr_engine::source::synthetic::{SyntheticConfig, SyntheticSource};
use tokio_util::sync::CancellationToken;

fn aggregator(cell: f64) -> SpatialAggregator {
    SpatialAggregator::new(DensityGrid::new(CellSize::Degrees(cell), RetentionPolicy::default()))
}

#[tokio::test]
async fn delhi_events_merge_into_one_cell() {
    let agg = aggregator(0.5);
    let now = chrono::Utc::now();
    agg.ingest(&PaymentEvent::new(GeoPoint::new(28.6139, 77.2090), 100.0, now))
        .await;
    agg.ingest(&PaymentEvent::new(GeoPoint::new(28.6139, 77.2090), 50.0, now))
        .await;

    let snap = agg.snapshot().await;
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].intensity, 150.0);
    assert!((snap[0].lat - 28.6139).abs() <= 0.5);
    assert!((snap[0].lon - 77.2090).abs() <= 0.5);
}

#[tokio::test]
async fn snapshot_is_stable_without_new_input() {
    let agg = aggregator(0.05);
    let source = SyntheticSource::new(SyntheticConfig {
        limit: Some(200),
        ..SyntheticConfig::default()
    })
    .unwrap();
    run_ingest(CancellationToken::new(), source, agg.clone()).await.unwrap();

    let a = agg.snapshot().await;
    let b = agg.snapshot().await;
    assert!(!a.is_empty());
    assert_eq!(a, b);

    let pa = project(&a, &ProjectorConfig::default());
    let pb = project(&b, &ProjectorConfig::default());
    assert_eq!(pa, pb);
    assert!(pa.iter().all(|p| p.weight > 0.0 && p.weight <= 1.0));
    assert!(pa.iter().any(|p| p.weight == 1.0));
}

#[tokio::test]
async fn empty_grid_projects_fallback() {
    let agg = aggregator(0.1);
    let cfg = ProjectorConfig::default();
    let points = project(&agg.snapshot().await, &cfg);
    assert_eq!(points.len(), 1);
    assert!(points[0].weight <= cfg.fallback_weight);
}

#[tokio::test]
async fn trimmer_expires_old_activity() {
    let agg = SpatialAggregator::new(DensityGrid::new(
        CellSize::Degrees(0.1),
        RetentionPolicy {
            horizon: chrono::Duration::seconds(300),
            bucket_seconds: 60,
        },
    ));
    let old = chrono::Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
    agg.ingest(&PaymentEvent::new(GeoPoint::new(19.07, 72.87), 40.0, old)).await;
    agg.ingest(&PaymentEvent::new(GeoPoint::new(12.97, 77.59), 10.0, old + chrono::Duration::seconds(600)))
        .await;

    let trimmer = RetentionTrimmer {
        aggregator: agg.clone(),
        interval: std::time::Duration::from_secs(1),
    };
    trimmer.tick(old + chrono::Duration::seconds(700)).await;

    let snap = agg.snapshot().await;
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].intensity, 10.0);
}
