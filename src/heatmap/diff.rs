use crate::heatmap::density::CellIntensity;
use crate::heatmap::grid::CellKey;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotDiff {
    pub added: Vec<CellKey>,
    pub changed: Vec<CellKey>,
    pub removed: Vec<CellKey>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

pub fn diff(previous: &[CellIntensity], next: &[CellIntensity]) -> SnapshotDiff {
    let before: BTreeMap<CellKey, f64> = previous.iter().map(|c| (c.cell, c.intensity)).collect();
    let after: BTreeMap<CellKey, f64> = next.iter().map(|c| (c.cell, c.intensity)).collect();

    let mut out = SnapshotDiff::default();
    for (key, intensity) in &after {
        match before.get(key) {
            None => out.added.push(*key),
            Some(old) if old != intensity => out.changed.push(*key),
            Some(_) => {}
        }
    }
    out.removed = before.keys().filter(|k| !after.contains_key(k)).copied().collect();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: i64, intensity: f64) -> CellIntensity {
        CellIntensity {
            cell: CellKey { row, col: 0 },
            lat: 0.0,
            lon: 0.0,
            intensity,
            events: 1,
        }
    }

    #[test]
    fn identical_snapshots_have_no_diff() {
        let a = vec![cell(1, 5.0), cell(2, 7.0)];
        assert!(diff(&a, &a.clone()).is_empty());
    }

    #[test]
    fn classifies_changes() {
        let prev = vec![cell(1, 5.0), cell(2, 7.0)];
        let next = vec![cell(2, 9.0), cell(3, 1.0)];
        let d = diff(&prev, &next);
        assert_eq!(d.added, vec![CellKey { row: 3, col: 0 }]);
        assert_eq!(d.changed, vec![CellKey { row: 2, col: 0 }]);
        assert_eq!(d.removed, vec![CellKey { row: 1, col: 0 }]);
    }
}
