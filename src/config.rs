use crate::domain::geofence::{GeoPoint, GeofenceConstraint};
use crate::heatmap::density::RetentionPolicy;
use crate::heatmap::grid::CellSize;
use crate::heatmap::projector::ProjectorConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Synthetic,
    Redis,
    Push,
}

impl SourceKind {
    pub fn parse(v: &str) -> Option<Self> {
        match v.to_ascii_lowercase().as_str() {
            "synthetic" => Some(SourceKind::Synthetic),
            "redis" => Some(SourceKind::Redis),
            "push" => Some(SourceKind::Push),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub redis_url: String,
    pub stream_key: String,
    pub stream_group: String,
    pub consumer_name: String,
    pub event_source: SourceKind,
    pub cell_size_deg: f64,
    pub bucket_seconds: i64,
    pub retention_seconds: i64,
    pub trim_interval_ms: u64,
    pub heatmap_refresh_ms: u64,
    pub fallback_lat: f64,
    pub fallback_lon: f64,
    pub fallback_weight: f64,
    pub synthetic_seed: u64,
    pub synthetic_interval_ms: u64,
    pub default_fence_radius_m: f64,
    pub max_clock_skew_seconds: i64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string()),
            stream_key: std::env::var("EVENT_STREAM_KEY")
                .unwrap_or_else(|_| "payments:geo-events:v1".to_string()),
            stream_group: std::env::var("EVENT_STREAM_GROUP")
                .unwrap_or_else(|_| "heatmap-agg-v1".to_string()),
            consumer_name: std::env::var("EVENT_CONSUMER_NAME")
                .unwrap_or_else(|_| "heatmap-worker-1".to_string()),
            event_source: std::env::var("EVENT_SOURCE")
                .ok()
                .and_then(|s| SourceKind::parse(&s))
                .unwrap_or(SourceKind::Synthetic),
            cell_size_deg: env_or("CELL_SIZE_DEG", 0.05),
            bucket_seconds: env_or("BUCKET_SECONDS", 60),
            retention_seconds: env_or("RETENTION_SECONDS", 3600),
            trim_interval_ms: env_or("TRIM_INTERVAL_MS", 5000),
            heatmap_refresh_ms: env_or("HEATMAP_REFRESH_MS", 1000),
            fallback_lat: env_or("FALLBACK_LAT", 28.7041),
            fallback_lon: env_or("FALLBACK_LON", 77.1025),
            fallback_weight: env_or("FALLBACK_WEIGHT", 0.01),
            synthetic_seed: env_or("SYNTHETIC_SEED", 42),
            synthetic_interval_ms: env_or("SYNTHETIC_INTERVAL_MS", 2000),
            default_fence_radius_m: env_or("DEFAULT_FENCE_RADIUS_M", 100_000.0),
            max_clock_skew_seconds: env_or("MAX_CLOCK_SKEW_SECONDS", 300),
        }
    }

    pub fn cell_size(&self) -> CellSize {
        CellSize::Degrees(self.cell_size_deg)
    }

    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            horizon: chrono::Duration::seconds(self.retention_seconds.max(1)),
            bucket_seconds: self.bucket_seconds.max(1),
        }
    }

    pub fn projector(&self) -> ProjectorConfig {
        ProjectorConfig {
            fallback: GeoPoint::new(self.fallback_lat, self.fallback_lon),
            fallback_weight: self.fallback_weight,
        }
    }

    pub fn default_fence(&self) -> GeofenceConstraint {
        GeofenceConstraint {
            center: GeoPoint::new(self.fallback_lat, self.fallback_lon),
            radius_m: self.default_fence_radius_m,
        }
    }

    pub fn max_clock_skew(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.max_clock_skew_seconds.max(0))
    }

    pub fn trim_interval(&self) -> Duration {
        Duration::from_millis(self.trim_interval_ms.max(1))
    }

    pub fn heatmap_refresh(&self) -> Duration {
        Duration::from_millis(self.heatmap_refresh_ms.max(1))
    }
}
