use crate::domain::geofence::GeoPoint;
use crate::heatmap::density::CellIntensity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lon: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectorConfig {
    pub fallback: GeoPoint,
    pub fallback_weight: f64,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            fallback: GeoPoint::new(28.7041, 77.1025),
            fallback_weight: 0.01,
        }
    }
}

// weight = intensity / max, not (x - min) / (max - min): the smallest live cell stays visible.
// The maximum is taken from `cells` on every call.
pub fn project(cells: &[CellIntensity], cfg: &ProjectorConfig) -> Vec<HeatPoint> {
    let max = cells
        .iter()
        .map(|c| c.intensity)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    if cells.is_empty() || max <= 0.0 {
        return vec![HeatPoint {
            lat: cfg.fallback.lat,
            lon: cfg.fallback.lon,
            weight: cfg.fallback_weight.clamp(0.0, 1.0),
        }];
    }

    cells
        .iter()
        .map(|c| HeatPoint {
            lat: c.lat,
            lon: c.lon,
            weight: (c.intensity / max).clamp(0.0, 1.0),
        })
        .collect()
}
