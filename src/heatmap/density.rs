use crate::domain::event::PaymentEvent;
use crate::heatmap::grid::{CellKey, CellSize, Grid};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub horizon: chrono::Duration,
    pub bucket_seconds: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            horizon: chrono::Duration::hours(1),
            bucket_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CellAccumulator {
    intensity: f64,
    events: u64,
    // bucket start (epoch seconds) -> (amount, events)
    buckets: BTreeMap<i64, (f64, u64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellIntensity {
    pub cell: CellKey,
    pub lat: f64,
    pub lon: f64,
    pub intensity: f64,
    pub events: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimReport {
    pub buckets_removed: usize,
    pub cells_removed: usize,
}

// Spatial histogram of payment amounts. Single-threaded; sharing goes through
// `SpatialAggregator`.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    grid: Grid,
    retention: RetentionPolicy,
    cells: BTreeMap<CellKey, CellAccumulator>,
}

pub fn bucket_epoch(ts: DateTime<Utc>, bucket_seconds: i64) -> i64 {
    let width = bucket_seconds.max(1);
    ts.timestamp().div_euclid(width) * width
}

impl DensityGrid {
    pub fn new(cell_size: CellSize, retention: RetentionPolicy) -> Self {
        Self {
            grid: Grid::new(cell_size),
            retention,
            cells: BTreeMap::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn ingest(&mut self, event: &PaymentEvent) {
        let key = self.grid.cell_of(&event.location);
        let bucket = bucket_epoch(event.observed_at, self.retention.bucket_seconds);
        let cell = self.cells.entry(key).or_default();
        cell.intensity += event.amount;
        cell.events += 1;
        let slot = cell.buckets.entry(bucket).or_insert((0.0, 0));
        slot.0 += event.amount;
        slot.1 += 1;
    }

    // Drops buckets whose whole time span lies before `now - horizon`, then any cell
    // left without buckets.
    pub fn trim(&mut self, now: DateTime<Utc>) -> TrimReport {
        let width = self.retention.bucket_seconds.max(1);
        let cutoff = (now - self.retention.horizon).timestamp();
        let mut report = TrimReport::default();

        for cell in self.cells.values_mut() {
            let before = cell.buckets.len();
            cell.buckets.retain(|start, _| start + width > cutoff);
            let removed = before - cell.buckets.len();
            if removed > 0 {
                report.buckets_removed += removed;
                cell.intensity = cell.buckets.values().map(|(amount, _)| amount).sum();
                cell.events = cell.buckets.values().map(|(_, n)| n).sum();
            }
        }

        let before = self.cells.len();
        self.cells.retain(|_, cell| !cell.buckets.is_empty());
        report.cells_removed = before - self.cells.len();
        report
    }

    pub fn snapshot(&self) -> Vec<CellIntensity> {
        self.cells
            .iter()
            .map(|(key, cell)| {
                let center = self.grid.center_of(*key);
                CellIntensity {
                    cell: *key,
                    lat: center.lat,
                    lon: center.lon,
                    intensity: cell.intensity,
                    events: cell.events,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geofence::GeoPoint;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn event(lat: f64, lon: f64, amount: f64, ts: DateTime<Utc>) -> PaymentEvent {
        PaymentEvent::new(GeoPoint::new(lat, lon), amount, ts)
    }

    #[test]
    fn merges_events_in_same_cell() {
        let mut grid = DensityGrid::new(CellSize::Degrees(0.5), RetentionPolicy::default());
        let ts = at(1_700_000_000);
        grid.ingest(&event(28.6139, 77.2090, 100.0, ts));
        grid.ingest(&event(28.6139, 77.2090, 50.0, ts));

        let snap = grid.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].intensity, 150.0);
        assert_eq!(snap[0].events, 2);
        assert!((snap[0].lat - 28.6139).abs() < 0.5);
        assert!((snap[0].lon - 77.2090).abs() < 0.5);
    }

    #[test]
    fn ingest_never_decreases_existing_cells() {
        let mut grid = DensityGrid::new(CellSize::Degrees(0.1), RetentionPolicy::default());
        let ts = at(1_700_000_000);
        grid.ingest(&event(10.0, 10.0, 5.0, ts));
        grid.ingest(&event(20.0, 20.0, 7.0, ts));
        let before = grid.snapshot();

        grid.ingest(&event(10.0, 10.0, 1.0, ts));
        grid.ingest(&event(-30.0, 40.0, 2.0, ts));
        let after = grid.snapshot();

        for cell in &before {
            let now = after.iter().find(|c| c.cell == cell.cell).unwrap();
            assert!(now.intensity >= cell.intensity);
        }
    }

    #[test]
    fn trim_drops_expired_buckets_and_cells() {
        let retention = RetentionPolicy {
            horizon: chrono::Duration::seconds(600),
            bucket_seconds: 60,
        };
        let mut grid = DensityGrid::new(CellSize::Degrees(0.1), retention);
        grid.ingest(&event(10.0, 10.0, 5.0, at(1_000)));
        grid.ingest(&event(10.0, 10.0, 3.0, at(1_500)));
        grid.ingest(&event(20.0, 20.0, 9.0, at(1_010)));

        let report = grid.trim(at(1_700));
        assert_eq!(report.buckets_removed, 2);
        assert_eq!(report.cells_removed, 1);

        let snap = grid.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].intensity, 3.0);
        assert_eq!(snap[0].events, 1);
    }

    #[test]
    fn trim_keeps_fresh_data() {
        let mut grid = DensityGrid::new(CellSize::Degrees(0.1), RetentionPolicy::default());
        grid.ingest(&event(10.0, 10.0, 5.0, at(10_000)));
        assert_eq!(grid.trim(at(10_030)), TrimReport::default());
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn bucket_epoch_floors_to_width() {
        assert_eq!(bucket_epoch(at(125), 60), 120);
        assert_eq!(bucket_epoch(at(-1), 60), -60);
    }
}
