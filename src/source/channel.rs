use crate::domain::event::PaymentEvent;
use crate::source::EventSource;
use anyhow::{anyhow, Result};
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<PaymentEvent>,
}

impl EventPublisher {
    pub async fn publish(&self, event: PaymentEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| anyhow!("event subscription closed"))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct ChannelSource {
    rx: mpsc::Receiver<PaymentEvent>,
}

pub fn channel(capacity: usize) -> (EventPublisher, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventPublisher { tx }, ChannelSource { rx })
}

#[async_trait::async_trait]
impl EventSource for ChannelSource {
    fn name(&self) -> &'static str {
        "push"
    }

    async fn next_event(&mut self) -> Result<Option<PaymentEvent>> {
        Ok(self.rx.recv().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geofence::GeoPoint;

    #[tokio::test]
    async fn delivers_in_publish_order_then_closes() {
        let (publisher, mut source) = channel(8);
        let now = chrono::Utc::now();
        for amount in [1.0, 2.0, 3.0] {
            publisher
                .publish(PaymentEvent::new(GeoPoint::new(0.0, 0.0), amount, now))
                .await
                .unwrap();
        }
        drop(publisher);

        let mut seen = Vec::new();
        while let Some(event) = source.next_event().await.unwrap() {
            seen.push(event.amount);
        }
        assert_eq!(seen, vec![1.0, 2.0, 3.0]);
    }
}
