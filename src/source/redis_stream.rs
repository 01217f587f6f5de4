use crate::domain::event::PaymentEvent;
use crate::source::EventSource;
use anyhow::Result;
use redis::aio::MultiplexedConnection;
use redis::streams::StreamReadReply;
use std::collections::VecDeque;

pub const EVENT_FIELD: &str = "event";

pub struct RedisStreamSource {
    conn: MultiplexedConnection,
    stream_key: String,
    group: String,
    consumer: String,
    block_ms: u64,
    batch: usize,
    replaying: bool,
    buffered: VecDeque<(String, PaymentEvent)>,
    in_flight: Option<String>,
}

impl RedisStreamSource {
    pub async fn connect(client: &redis::Client, stream_key: &str, group: &str, consumer: &str) -> Result<Self> {
        let mut conn = client.get_multiplexed_async_connection().await?;

        // BUSYGROUP on restart is expected
        let _: redis::RedisResult<String> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(stream_key)
            .arg(group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        Ok(Self {
            conn,
            stream_key: stream_key.to_string(),
            group: group.to_string(),
            consumer: consumer.to_string(),
            block_ms: 2000,
            batch: 200,
            replaying: true,
            buffered: VecDeque::new(),
            in_flight: None,
        })
    }

    async fn fill(&mut self) -> Result<()> {
        let start = if self.replaying { "0" } else { ">" };
        let mut cmd = redis::cmd("XREADGROUP");
        cmd.arg("GROUP")
            .arg(&self.group)
            .arg(&self.consumer)
            .arg("COUNT")
            .arg(self.batch);
        if !self.replaying {
            cmd.arg("BLOCK").arg(self.block_ms);
        }
        let reply: Option<StreamReadReply> = cmd
            .arg("STREAMS")
            .arg(&self.stream_key)
            .arg(start)
            .query_async(&mut self.conn)
            .await?;
        // nil on BLOCK timeout
        let Some(reply) = reply else {
            return Ok(());
        };

        let mut received = 0;
        for stream in reply.keys {
            for entry in stream.ids {
                received += 1;
                let raw = entry
                    .map
                    .get(EVENT_FIELD)
                    .and_then(|v| redis::from_redis_value::<String>(v).ok());
                match raw.as_deref().and_then(decode_event) {
                    Some(event) => self.buffered.push_back((entry.id, event)),
                    None => {
                        tracing::warn!(entry_id = %entry.id, "skipping undecodable stream entry");
                        self.ack(&entry.id).await?;
                    }
                }
            }
        }

        if self.replaying && received == 0 {
            tracing::info!(stream = %self.stream_key, "pending entries replayed");
            self.replaying = false;
        }
        Ok(())
    }

    async fn ack(&mut self, id: &str) -> Result<()> {
        let _: i64 = redis::cmd("XACK")
            .arg(&self.stream_key)
            .arg(&self.group)
            .arg(id)
            .query_async(&mut self.conn)
            .await?;
        Ok(())
    }
}

pub fn decode_event(raw_json: &str) -> Option<PaymentEvent> {
    serde_json::from_str::<PaymentEvent>(raw_json).ok()
}

#[async_trait::async_trait]
impl EventSource for RedisStreamSource {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn next_event(&mut self) -> Result<Option<PaymentEvent>> {
        loop {
            if let Some((id, event)) = self.buffered.pop_front() {
                self.in_flight = Some(id);
                return Ok(Some(event));
            }
            self.fill().await?;
        }
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(id) = self.in_flight.take() {
            self.ack(&id).await?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct RedisStreamPublisher {
    pub client: redis::Client,
    pub stream_key: String,
}

impl RedisStreamPublisher {
    pub async fn publish(&self, event: &PaymentEvent) -> Result<String> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(event)?;
        let id: String = redis::cmd("XADD")
            .arg(&self.stream_key)
            .arg("MAXLEN")
            .arg("~")
            .arg(1_000_000)
            .arg("*")
            .arg(EVENT_FIELD)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_stream_payload() {
        let raw = r#"{"event_id":"7f9c2ad4-6b1e-4a59-9d59-3c1f0b2d8e11","location":{"lat":28.6139,"lon":77.209},"amount":100.0,"observed_at":"2024-01-01T10:00:00Z"}"#;
        let event = decode_event(raw).unwrap();
        assert_eq!(event.amount, 100.0);
        assert_eq!(event.location.lat, 28.6139);
    }

    #[test]
    fn event_id_is_optional_on_the_wire() {
        let raw = r#"{"location":{"lat":1.0,"lon":2.0},"amount":5.0,"observed_at":"2024-01-01T10:00:00Z"}"#;
        assert!(decode_event(raw).is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_event("not json").is_none());
        assert!(decode_event(r#"{"amount":1}"#).is_none());
    }
}
