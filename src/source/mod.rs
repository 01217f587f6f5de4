use crate::domain::event::PaymentEvent;
use anyhow::Result;

pub mod channel;
pub mod redis_stream;
pub mod synthetic;

/// Lazy, unbounded sequence of payment events. Events from one originator arrive in
/// observation order; nothing is promised across originators.
#[async_trait::async_trait]
pub trait EventSource: Send {
    fn name(&self) -> &'static str;

    async fn next_event(&mut self) -> Result<Option<PaymentEvent>>;

    async fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}
