use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use redis::streams::{StreamReadOptions, StreamReadReply};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::application::ports::event_bus::{
    Delivery, DeliveryStream, EventPublisher, EventSubscriber,
};
use crate::domain::events::event::EventEnvelope;

const FIELD_EVENT: &str = "event";
const FIELD_KEY: &str = "key";

/// Event bus over Redis Streams: one stream per topic, one consumer group per subscriber.
#[derive(Clone)]
pub struct RedisStreamEventBus {
    client: Arc<redis::Client>,
    conn: ConnectionManager,
    stream_prefix: String,
    stream_max_len: Option<usize>,
    poll_interval: Duration,
    consumer: String,
}

impl RedisStreamEventBus {
    pub fn new(
        client: redis::Client,
        conn: ConnectionManager,
        stream_prefix: impl Into<String>,
        stream_max_len: Option<usize>,
        poll_interval: Duration,
    ) -> Self {
        let stream_max_len = stream_max_len.and_then(|len| if len == 0 { None } else { Some(len) });
        Self {
            client: Arc::new(client),
            conn,
            stream_prefix: stream_prefix.into(),
            stream_max_len,
            poll_interval,
            consumer: format!("consumer-{}", Uuid::new_v4()),
        }
    }

    fn stream_key(&self, topic: &str) -> String {
        format!("{}:{}", self.stream_prefix, topic)
    }

    async fn ensure_group(&self, key: &str, group: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let created: redis::RedisResult<()> = conn.xgroup_create_mkstream(key, group, "$").await;
        match created {
            Ok(()) => {
                tracing::info!(stream = %key, group, "redis_consumer_group_created");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(e).context("redis_xgroup_create"),
        }
    }

    fn spawn_group_reader(&self, key: String, group: String) -> DeliveryStream {
        let client = self.client.clone();
        let poll_interval = self.poll_interval;
        let consumer = self.consumer.clone();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                match client.get_multiplexed_async_connection().await {
                    Ok(mut conn) => loop {
                        let opts = StreamReadOptions::default()
                            .group(&group, &consumer)
                            .block(1000)
                            .count(128);
                        let keys = [key.as_str()];
                        let ids = [">"];
                        let reply: redis::RedisResult<StreamReadReply> =
                            conn.xread_options(&keys, &ids, &opts).await;
                        match reply {
                            Ok(data) => {
                                for stream_key in data.keys {
                                    for entry in stream_key.ids {
                                        let decoded = entry
                                            .get::<String>(FIELD_EVENT)
                                            .ok_or_else(|| anyhow::anyhow!("missing event field"))
                                            .and_then(|raw| {
                                                serde_json::from_str::<EventEnvelope>(&raw)
                                                    .map_err(anyhow::Error::from)
                                            });
                                        match decoded {
                                            Ok(envelope) => {
                                                let delivery = Delivery {
                                                    id: entry.id.clone(),
                                                    envelope,
                                                };
                                                if tx.send(Ok(delivery)).is_err() {
                                                    return;
                                                }
                                            }
                                            Err(e) => {
                                                tracing::warn!(stream = %key, id = %entry.id, error = ?e, "redis_stream_entry_undecodable");
                                                let _: redis::RedisResult<i64> =
                                                    conn.xack(&key, &group, &[&entry.id]).await;
                                            }
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::warn!(stream = %key, group = %group, error = ?e, "redis_stream_read_failed");
                                sleep(poll_interval).await;
                                break;
                            }
                        }
                    },
                    Err(e) => {
                        tracing::error!(stream = %key, error = ?e, "redis_stream_connect_failed");
                        sleep(poll_interval).await;
                    }
                }
            }
        });

        UnboundedReceiverStream::new(rx).boxed()
    }
}

#[async_trait]
impl EventPublisher for RedisStreamEventBus {
    async fn publish(&self, topic: &str, envelope: &EventEnvelope) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(envelope)?;
        let mut cmd = redis::cmd("XADD");
        cmd.arg(self.stream_key(topic));
        if let Some(max_len) = self.stream_max_len {
            cmd.arg("MAXLEN").arg("~").arg(max_len as i64);
        }
        let _id: String = cmd
            .arg("*")
            .arg(FIELD_KEY)
            .arg(envelope.key.as_deref().unwrap_or(""))
            .arg(FIELD_EVENT)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .context("redis_xadd_event")?;
        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for RedisStreamEventBus {
    async fn subscribe(&self, topic: &str, group: &str) -> anyhow::Result<DeliveryStream> {
        let key = self.stream_key(topic);
        self.ensure_group(&key, group).await?;
        Ok(self.spawn_group_reader(key, group.to_string()))
    }

    async fn ack(&self, topic: &str, group: &str, delivery_id: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .xack(self.stream_key(topic), group, &[delivery_id])
            .await
            .context("redis_xack_event")?;
        Ok(())
    }
}
