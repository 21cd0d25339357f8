use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use strategies_core::events::RouterEvent;
use strategies_core::{
    LatencyRange, MockTransport, RouteRequest, Router, RouterConfig, RouterError,
};
use tokio::time::Instant;

fn login_request() -> RouteRequest {
    RouteRequest::post(
        "/api/v1/auth/login",
        json!({ "email": "demo@example.com", "password": "demo" }),
    )
}

fn default_latency_router(seed: u64) -> (Router, Arc<MockTransport>) {
    let config = RouterConfig::mock().with_seed(seed);
    let transport = Arc::new(MockTransport::new(&config));
    (Router::with_transport(transport.clone()), transport)
}

#[tokio::test(start_paused = true)]
async fn test_mock_calls_take_simulated_round_trip() {
    let (router, _) = default_latency_router(21);
    let range = LatencyRange::default();

    let start = Instant::now();
    router.send(RouteRequest::get("/healthz")).await.unwrap();
    let elapsed = start.elapsed();
    assert!(range.contains(elapsed), "elapsed {:?} outside range", elapsed);

    router.send(login_request()).await.unwrap();
    for path in ["/api/v1/auth/me", "/api/v1/market-data/quote/AAPL"] {
        let start = Instant::now();
        let resp = router.send(RouteRequest::get(path)).await.unwrap();
        assert_eq!(resp.status, 200);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed <= Duration::from_millis(1000));
    }
}

#[tokio::test(start_paused = true)]
async fn test_unmatched_route_fails_without_delay() {
    let (router, _) = default_latency_router(22);

    let start = Instant::now();
    let result = router.send(RouteRequest::get("/api/v1/nope")).await;
    assert!(matches!(result, Err(RouterError::RouteNotFound { .. })));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_delay_independently() {
    let (router, _) = default_latency_router(23);

    let start = Instant::now();
    let (a, b, c) = tokio::join!(
        router.send(RouteRequest::get("/healthz")),
        router.send(RouteRequest::get("/readyz")),
        router.send(RouteRequest::get("/api/v1/billing/plans")),
    );
    assert_eq!(a.unwrap().status, 200);
    assert_eq!(b.unwrap().status, 200);
    assert_eq!(c.unwrap().status, 200);

    // Overlapping sleeps: total is the slowest call, not the sum.
    assert!(start.elapsed() <= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_custom_latency_range_is_honoured() {
    let latency = LatencyRange::new(50, 60).unwrap();
    let config = RouterConfig::mock().with_latency(latency);
    let router = Router::new(&config).unwrap();

    for _ in 0..5 {
        let start = Instant::now();
        router.send(RouteRequest::get("/healthz")).await.unwrap();
        assert!(latency.contains(start.elapsed()));
    }
}

#[tokio::test(start_paused = true)]
async fn test_aborted_login_leaves_no_session() {
    let (router, transport) = default_latency_router(24);
    let mut events = router.events();

    let result = router
        .send_with_abort(login_request(), tokio::time::sleep(Duration::from_millis(10)))
        .await;
    assert!(matches!(result, Err(RouterError::Cancelled)));
    assert!(transport.session().is_none());

    match events.recv().await.unwrap() {
        RouterEvent::RequestCancelled { path, .. } => assert_eq!(path, "/api/v1/auth/login"),
        other => panic!("unexpected event {:?}", other),
    }

    // Long after the abort, the dropped call still has not run.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(transport.session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_logout_keeps_session() {
    let (router, transport) = default_latency_router(25);
    router.send(login_request()).await.unwrap();
    let before = transport.session().expect("logged in");

    let timed_out = tokio::time::timeout(
        Duration::from_millis(100),
        router.send(RouteRequest::post("/api/v1/auth/logout", json!({}))),
    )
    .await;
    assert!(timed_out.is_err());

    let after = transport.session().expect("session survives a dropped logout");
    assert_eq!(after.access_token, before.access_token);
}

#[tokio::test(start_paused = true)]
async fn test_abort_that_never_fires_does_not_interfere() {
    let (router, transport) = default_latency_router(26);

    let resp = router
        .send_with_abort(login_request(), std::future::pending::<()>())
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert!(transport.session().is_some());
}
