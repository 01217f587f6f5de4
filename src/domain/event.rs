use crate::domain::geofence::GeoPoint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    #[serde(default = "Uuid::new_v4")]
    pub event_id: Uuid,
    pub location: GeoPoint,
    pub amount: f64,
    pub observed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    LocationOutOfRange,
    NonPositiveAmount,
    ObservedInFuture,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::LocationOutOfRange => "location_out_of_range",
            RejectReason::NonPositiveAmount => "non_positive_amount",
            RejectReason::ObservedInFuture => "observed_in_future",
        }
    }
}

impl PaymentEvent {
    pub fn new(location: GeoPoint, amount: f64, observed_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            location,
            amount,
            observed_at,
        }
    }

    // observations stamped more than `max_skew` after `now` never age out of retention
    pub fn check(
        &self,
        now: chrono::DateTime<chrono::Utc>,
        max_skew: chrono::Duration,
    ) -> Result<(), RejectReason> {
        if !self.location.is_valid() {
            return Err(RejectReason::LocationOutOfRange);
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(RejectReason::NonPositiveAmount);
        }
        if self.observed_at > now + max_skew {
            return Err(RejectReason::ObservedInFuture);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_events_stamped_past_the_skew() {
        let now = chrono::Utc::now();
        let skew = chrono::Duration::minutes(5);
        let at = |offset: chrono::Duration| PaymentEvent::new(GeoPoint::new(1.0, 1.0), 10.0, now + offset);

        assert_eq!(at(chrono::Duration::minutes(4)).check(now, skew), Ok(()));
        assert_eq!(at(chrono::Duration::hours(-48)).check(now, skew), Ok(()));
        assert_eq!(
            at(chrono::Duration::days(3650)).check(now, skew),
            Err(RejectReason::ObservedInFuture)
        );
    }
}
