use crate::config::Mode;
use crate::request::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Observable outcomes of routed requests.
///
/// Published on the [`RouterEventBus`]; dashboards and tests subscribe to see
/// what the router did without wrapping every call site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RouterEvent {
    /// A transport produced a response (any status).
    RequestCompleted {
        /// Correlation ID for the call
        trace_id: String,
        /// Mode of the router that served the call
        mode: Mode,
        /// HTTP method of the request
        method: Method,
        /// Request path, query excluded
        path: String,
        /// Status of the returned response
        status: u16,
        /// Wall-clock duration including simulated latency
        elapsed_ms: u64,
        /// Unix timestamp in milliseconds
        timestamp: i64,
    },
    /// Mock mode had no handler for the request.
    RouteMissed {
        /// Correlation ID for the call
        trace_id: String,
        /// HTTP method of the request
        method: Method,
        /// Path no pattern matched
        path: String,
        /// Unix timestamp in milliseconds
        timestamp: i64,
    },
    /// The caller aborted the request before completion.
    RequestCancelled {
        /// Correlation ID for the call
        trace_id: String,
        /// HTTP method of the request
        method: Method,
        /// Request path, query excluded
        path: String,
        /// Unix timestamp in milliseconds
        timestamp: i64,
    },
    /// The live transport failed before a response arrived.
    TransportFailed {
        /// Correlation ID for the call
        trace_id: String,
        /// HTTP method of the request
        method: Method,
        /// Request path, query excluded
        path: String,
        /// Display form of the underlying error
        error: String,
        /// Unix timestamp in milliseconds
        timestamp: i64,
    },
}

/// Broadcast channel for [`RouterEvent`]s.
#[derive(Clone)]
pub struct RouterEventBus(pub broadcast::Sender<RouterEvent>);

impl RouterEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self(tx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.0.subscribe()
    }

    /// Sends to current subscribers. Having none is not an error.
    pub fn publish(&self, event: RouterEvent) {
        let _ = self.0.send(event);
    }
}

impl Default for RouterEventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_shape() {
        let event = RouterEvent::TransportFailed {
            trace_id: "t-1".to_string(),
            method: Method::Get,
            path: "/healthz".to_string(),
            error: "connection refused".to_string(),
            timestamp: 1,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "TransportFailed");
        assert_eq!(value["data"]["method"], "GET");
        assert_eq!(value["data"]["error"], json!("connection refused"));
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = RouterEventBus::default();
        bus.publish(RouterEvent::RouteMissed {
            trace_id: "lost".to_string(),
            method: Method::Post,
            path: "/nowhere".to_string(),
            timestamp: 0,
        });

        let mut rx = bus.subscribe();
        let event = RouterEvent::RequestCancelled {
            trace_id: "t-2".to_string(),
            method: Method::Delete,
            path: "/api/v1/trading/orders/1".to_string(),
            timestamp: 2,
        };
        bus.publish(event.clone());
        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
