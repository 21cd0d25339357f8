use crate::response::ApiResponse;
use crate::routes::{HandlerContext, MockHandler};
use serde_json::json;

pub const API_NAME: &str = "Smart Strategies Builder API";
pub const API_VERSION: &str = "1.0.0";

pub struct RootHandler;

impl MockHandler for RootHandler {
    fn id(&self) -> &'static str {
        "root"
    }

    fn requires_auth(&self) -> bool {
        false
    }

    fn handle(&self, _ctx: &mut HandlerContext) -> ApiResponse {
        ApiResponse::ok(json!({
            "name": API_NAME,
            "version": API_VERSION,
            "status": "operational",
            "docs": "disabled",
        }))
    }
}

pub struct HealthHandler;

impl MockHandler for HealthHandler {
    fn id(&self) -> &'static str {
        "health.live"
    }

    fn requires_auth(&self) -> bool {
        false
    }

    fn handle(&self, _ctx: &mut HandlerContext) -> ApiResponse {
        ApiResponse::ok(json!({
            "status": "healthy",
            "environment": "demo",
            "version": API_VERSION,
        }))
    }
}

pub struct ReadinessHandler;

impl MockHandler for ReadinessHandler {
    fn id(&self) -> &'static str {
        "health.ready"
    }

    fn requires_auth(&self) -> bool {
        false
    }

    fn handle(&self, _ctx: &mut HandlerContext) -> ApiResponse {
        ApiResponse::ok(json!({ "status": "ready" }))
    }
}

/// Monitoring placeholder served next to the health probes.
pub struct MetricsHandler;

impl MockHandler for MetricsHandler {
    fn id(&self) -> &'static str {
        "health.metrics"
    }

    fn requires_auth(&self) -> bool {
        false
    }

    fn handle(&self, _ctx: &mut HandlerContext) -> ApiResponse {
        ApiResponse::ok(json!({ "message": "Metrics endpoint" }))
    }
}
