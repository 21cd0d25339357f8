use serde_json::json;
use strategies_core::events::RouterEvent;
use strategies_core::{Mode, RouteRequest, Router, RouterConfig, RouterError};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn live_router(server: &MockServer) -> Router {
    let config = RouterConfig::live(&server.uri()).unwrap();
    Router::new(&config).unwrap()
}

#[tokio::test]
async fn test_forwards_method_path_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/market-data/bars/AAPL"))
        .and(query_param("timeframe", "1Hour"))
        .and(query_param("limit", "5"))
        .and(header("authorization", "Bearer real-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "AAPL",
            "timeframe": "1Hour",
            "bars": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let router = live_router(&server).await;
    assert_eq!(router.mode(), Mode::Live);

    let resp = router
        .send(
            RouteRequest::get("/api/v1/market-data/bars/AAPL?timeframe=1Hour&limit=5")
                .with_bearer("real-token"),
        )
        .await
        .unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["symbol"], "AAPL");
}

#[tokio::test]
async fn test_forwards_json_body() {
    let server = MockServer::start().await;
    let order = json!({ "symbol": "MSFT", "qty": 2, "side": "buy" });
    Mock::given(method("POST"))
        .and(path("/api/v1/trading/orders"))
        .and(header("content-type", "application/json"))
        .and(body_json(order.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let router = live_router(&server).await;
    let resp = router
        .send(RouteRequest::post("/api/v1/trading/orders", order))
        .await
        .unwrap();

    assert_eq!(resp.status, 201);
    assert_eq!(resp.body["id"], "abc");

    // Keys keep the order the caller wrote them in.
    let received = server.received_requests().await.unwrap();
    assert_eq!(
        received[0].body,
        br#"{"symbol":"MSFT","qty":2,"side":"buy"}"#.to_vec()
    );
}

#[tokio::test]
async fn test_raw_query_reaches_backend_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/x"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let router = live_router(&server).await;
    let queries = ["flag", "q=a%20b&r=%2F", "a=1;b=2"];
    for query in queries {
        router
            .send(RouteRequest::get(format!("/api/v1/x?{}", query)))
            .await
            .unwrap();
    }

    let received = server.received_requests().await.unwrap();
    let seen: Vec<Option<&str>> = received.iter().map(|r| r.url.query()).collect();
    assert_eq!(seen, queries.iter().map(|q| Some(*q)).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_backend_errors_are_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/trading/orders/42"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let router = live_router(&server).await;

    let me = router.send(RouteRequest::get("/api/v1/auth/me")).await.unwrap();
    assert_eq!(me.status, 401);
    assert_eq!(me.body["detail"], "Not authenticated");

    let cancelled = router
        .send(RouteRequest::delete("/api/v1/trading/orders/42"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, 204);
    assert!(cancelled.body.is_null());

    let typed = router
        .call_json::<serde_json::Value>(RouteRequest::get("/api/v1/auth/me"))
        .await;
    assert!(matches!(typed, Err(RouterError::Status { status: 401, .. })));
}

#[tokio::test]
async fn test_live_mode_never_reaches_demo_handlers() {
    let server = MockServer::start().await;
    let router = live_router(&server).await;

    // The demo login exists only in mock mode; here the backend answers.
    let resp = router
        .send(RouteRequest::post(
            "/api/v1/auth/login",
            json!({ "email": "demo@example.com", "password": "demo" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status, 404);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.path(), "/api/v1/auth/login");
}

#[tokio::test]
async fn test_live_events_and_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let router = live_router(&server).await;
    let mut events = router.events();

    let health = router.send(RouteRequest::get("/healthz")).await.unwrap();
    assert_eq!(health.body, json!("ok"));

    match events.recv().await.unwrap() {
        RouterEvent::RequestCompleted { mode, status, .. } => {
            assert_eq!(mode, Mode::Live);
            assert_eq!(status, 200);
        }
        other => panic!("unexpected event {:?}", other),
    }

    // Nothing listens on port 9 locally; the connection error surfaces as Http.
    let unreachable = Router::new(&RouterConfig::live("http://127.0.0.1:9").unwrap()).unwrap();
    let mut unreachable_events = unreachable.events();
    let result = unreachable.send(RouteRequest::get("/healthz")).await;
    assert!(matches!(result, Err(RouterError::Http(_))));
    assert!(matches!(
        unreachable_events.recv().await.unwrap(),
        RouterEvent::TransportFailed { .. }
    ));
}

#[test]
fn test_live_config_rejects_bad_urls() {
    assert!(matches!(
        RouterConfig::live("ftp://example.com"),
        Err(RouterError::Config(_))
    ));
    assert!(RouterConfig::live("not a url").is_err());
}
