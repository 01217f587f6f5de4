use crate::domain::geofence::GeoPoint;
use serde::{Deserialize, Serialize};

const METRES_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum CellSize {
    Degrees(f64),
    Meters(f64),
}

impl CellSize {
    pub fn degrees(&self) -> f64 {
        match self {
            CellSize::Degrees(d) => *d,
            CellSize::Meters(m) => *m / METRES_PER_DEGREE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub row: i64,
    pub col: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct Grid {
    step: f64,
}

impl Grid {
    pub fn new(size: CellSize) -> Self {
        let step = size.degrees();
        let step = if step.is_finite() && step > 0.0 { step } else { 0.01 };
        Self { step }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    // lat = 90 and lon = 180 fold into the last cell below the edge
    pub fn cell_of(&self, point: &GeoPoint) -> CellKey {
        let max_row = (90.0 / self.step).ceil() as i64 - 1;
        let max_col = (180.0 / self.step).ceil() as i64 - 1;
        CellKey {
            row: ((point.lat / self.step).floor() as i64).min(max_row),
            col: ((point.lon / self.step).floor() as i64).min(max_col),
        }
    }

    pub fn center_of(&self, key: CellKey) -> GeoPoint {
        GeoPoint {
            lat: ((key.row as f64 + 0.5) * self.step).clamp(-90.0, 90.0),
            lon: ((key.col as f64 + 0.5) * self.step).clamp(-180.0, 180.0),
        }
    }
}
