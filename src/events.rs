//! Fire-and-forget domain events over NATS.
//!
//! The bus is optional wiring: without a configured NATS URL every
//! publish is a no-op, and a broker hiccup is logged, never surfaced to
//! the request that triggered it.

use serde::Serialize;

pub const REVIEW_UPSERTED: &str = "storefront.review.upserted";
pub const ORDER_PLACED: &str = "storefront.order.placed";

#[derive(Clone, Default)]
pub struct EventBus {
    client: Option<async_nats::Client>,
}

impl EventBus {
    pub fn new(client: Option<async_nats::Client>) -> Self {
        Self { client }
    }

    pub async fn publish<T: Serialize>(&self, subject: &'static str, payload: &T) {
        let Some(client) = &self.client else { return };
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(subject, error = %err, "event serialization failed");
                return;
            }
        };
        if let Err(err) = client.publish(subject.to_string(), bytes.into()).await {
            tracing::warn!(subject, error = %err, "event publish failed");
        }
    }
}
