use crate::error::GeofenceError;
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofenceConstraint {
    pub center: GeoPoint,
    pub radius_m: f64,
}

impl GeofenceConstraint {
    pub fn new(center: GeoPoint, radius_m: f64) -> Result<Self, GeofenceError> {
        let fence = Self { center, radius_m };
        fence.validate()?;
        Ok(fence)
    }

    pub fn validate(&self) -> Result<(), GeofenceError> {
        if !self.radius_m.is_finite() || self.radius_m <= 0.0 {
            return Err(GeofenceError::InvalidGeofence {
                reason: format!("radius must be positive, got {}", self.radius_m),
            });
        }
        if !self.center.lat.is_finite() || !(-90.0..=90.0).contains(&self.center.lat) {
            return Err(GeofenceError::InvalidGeofence {
                reason: format!("latitude {} outside [-90, 90]", self.center.lat),
            });
        }
        if !self.center.lon.is_finite() || !(-180.0..=180.0).contains(&self.center.lon) {
            return Err(GeofenceError::InvalidGeofence {
                reason: format!("longitude {} outside [-180, 180]", self.center.lon),
            });
        }
        Ok(())
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.center.distance_m(point) <= self.radius_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_fences() {
        let delhi = GeoPoint::new(28.7041, 77.1025);
        assert!(GeofenceConstraint::new(delhi, 0.0).is_err());
        assert!(GeofenceConstraint::new(delhi, -5.0).is_err());
        assert!(GeofenceConstraint::new(delhi, f64::NAN).is_err());
        assert!(GeofenceConstraint::new(GeoPoint::new(91.0, 0.0), 10.0).is_err());
        assert!(GeofenceConstraint::new(GeoPoint::new(0.0, -181.0), 10.0).is_err());
        assert!(GeofenceConstraint::new(GeoPoint::new(90.0, 180.0), 10.0).is_ok());
    }

    #[test]
    fn contains_uses_great_circle_distance() {
        let fence = GeofenceConstraint::new(GeoPoint::new(28.7041, 77.1025), 100_000.0).unwrap();
        // Connaught Place, roughly 11 km away
        assert!(fence.contains(&GeoPoint::new(28.6315, 77.2167)));
        // Mumbai
        assert!(!fence.contains(&GeoPoint::new(19.0760, 72.8777)));
    }
}
