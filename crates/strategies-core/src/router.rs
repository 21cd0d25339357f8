use crate::config::{Mode, RouterConfig};
use crate::error::{Result, RouterError};
use crate::events::{RouterEvent, RouterEventBus};
use crate::request::{Method, RouteRequest};
use crate::response::ApiResponse;
use crate::transport::{LiveTransport, MockTransport, Transport};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::Instant;
use uuid::Uuid;

/// Entry point for API calls.
///
/// The mode is chosen once, at construction, and cannot change afterwards.
/// Build a second router to talk in the other mode.
#[derive(Clone)]
pub struct Router {
    mode: Mode,
    transport: Arc<dyn Transport>,
    events: RouterEventBus,
}

impl Router {
    /// Builds the transport the configuration asks for.
    ///
    /// Mock handlers (including the demo login) exist only inside a
    /// [`MockTransport`], so a live router cannot reach them.
    pub fn new(config: &RouterConfig) -> Result<Self> {
        let transport: Arc<dyn Transport> = match config.mode() {
            Mode::Mock => Arc::new(MockTransport::new(config)),
            Mode::Live => {
                let base_url = config.api_base_url().cloned().ok_or_else(|| {
                    RouterError::Config("live mode requires an API base URL".to_string())
                })?;
                Arc::new(LiveTransport::new(base_url)?)
            }
        };
        tracing::info!(mode = %config.mode(), prefix = %config.api_prefix(), "Request router initialized");
        Ok(Self::with_transport(transport))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            mode: transport.mode(),
            transport,
            events: RouterEventBus::default(),
        }
    }

    pub fn with_event_bus(mut self, events: RouterEventBus) -> Self {
        self.events = events;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn events(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }

    /// Sends a request. Non-success statuses are responses, not errors.
    pub async fn send(&self, request: RouteRequest) -> Result<ApiResponse> {
        let trace_id = Uuid::new_v4().to_string();
        let method = request.method;
        let path = request.path.clone();
        let start = Instant::now();

        let result = self.transport.send(request).await;
        self.publish_outcome(trace_id, method, path, start, &result);
        result
    }

    /// Like [`Router::send`], but gives up with [`RouterError::Cancelled`] as
    /// soon as `abort` completes. The in-flight call is dropped; in mock mode
    /// its handler never runs.
    pub async fn send_with_abort<F>(&self, request: RouteRequest, abort: F) -> Result<ApiResponse>
    where
        F: Future<Output = ()>,
    {
        let method = request.method;
        let path = request.path.clone();

        tokio::select! {
            biased;
            _ = abort => {
                tracing::debug!(%method, %path, "Request aborted by caller");
                self.events.publish(RouterEvent::RequestCancelled {
                    trace_id: Uuid::new_v4().to_string(),
                    method,
                    path,
                    timestamp: chrono::Utc::now().timestamp_millis(),
                });
                Err(RouterError::Cancelled)
            }
            result = self.send(request) => result,
        }
    }

    /// Sends a request and decodes a successful body into `T`.
    ///
    /// Non-2xx responses become [`RouterError::Status`] carrying the body.
    pub async fn call_json<T: DeserializeOwned>(&self, request: RouteRequest) -> Result<T> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(RouterError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.json()?)
    }

    fn publish_outcome(
        &self,
        trace_id: String,
        method: Method,
        path: String,
        start: Instant,
        result: &Result<ApiResponse>,
    ) {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let event = match result {
            Ok(response) => RouterEvent::RequestCompleted {
                trace_id,
                mode: self.mode,
                method,
                path,
                status: response.status,
                elapsed_ms: start.elapsed().as_millis() as u64,
                timestamp,
            },
            Err(RouterError::RouteNotFound { .. }) => {
                tracing::warn!(%method, %path, "No mock route for request");
                RouterEvent::RouteMissed {
                    trace_id,
                    method,
                    path,
                    timestamp,
                }
            }
            Err(e) => {
                tracing::warn!(%method, %path, error = %e, "Request failed");
                RouterEvent::TransportFailed {
                    trace_id,
                    method,
                    path,
                    error: e.to_string(),
                    timestamp,
                }
            }
        };
        self.events.publish(event);
    }
}
