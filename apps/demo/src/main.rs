use anyhow::Context;
use serde_json::json;
use strategies_core::{Mode, RouteRequest, Router, RouterConfig, RouterError};

/// Walks one user session through the client surface: sign in, look at the
/// market, trade, sign out. Runs against the demo handlers when `DEMO_MODE` is
/// set, otherwise against `API_BASE_URL`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = RouterConfig::from_env().context("loading router configuration")?;
    let router = Router::new(&config)?;
    let prefix = config.api_prefix().to_string();
    let api = |path: &str| format!("{}{}", prefix, path);

    tracing::info!(mode = %router.mode(), "Starting scripted session");
    if router.mode() == Mode::Live {
        tracing::warn!("Live mode: requests go to the real backend");
    }

    let email = std::env::var("DEMO_EMAIL").unwrap_or_else(|_| "demo@example.com".to_string());
    let password = std::env::var("DEMO_PASSWORD").unwrap_or_else(|_| "demo".to_string());

    let login = router
        .send(RouteRequest::post(
            api("/auth/login"),
            json!({ "email": email, "password": password }),
        ))
        .await?;
    show("login", login.status, &login.body)?;
    let token = login.body["access_token"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_default();

    let authed = |request: RouteRequest| {
        if token.is_empty() {
            request
        } else {
            request.with_bearer(&token)
        }
    };

    let steps = vec![
        ("me", authed(RouteRequest::get(api("/auth/me")))),
        ("quote", authed(RouteRequest::get(api("/market-data/quote/AAPL")))),
        (
            "bars",
            authed(RouteRequest::get(api(
                "/market-data/bars/AAPL?timeframe=1Day&limit=5",
            ))),
        ),
        (
            "signals",
            authed(RouteRequest::post(
                api("/signals/bulk"),
                json!({ "symbols": ["AAPL", "MSFT", "NVDA"] }),
            )),
        ),
        ("account", authed(RouteRequest::get(api("/trading/account")))),
        ("positions", authed(RouteRequest::get(api("/trading/positions")))),
        (
            "order",
            authed(RouteRequest::post(
                api("/trading/orders"),
                json!({ "symbol": "MSFT", "qty": 1, "side": "buy", "type": "market" }),
            )),
        ),
        ("subscription", authed(RouteRequest::get(api("/billing/subscription")))),
        ("logout", authed(RouteRequest::post(api("/auth/logout"), json!({})))),
    ];

    for (label, request) in steps {
        match router.send(request).await {
            Ok(response) => show(label, response.status, &response.body)?,
            Err(e @ RouterError::RouteNotFound { .. }) => {
                tracing::error!(step = label, error = %e, "Skipping step");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn show(label: &str, status: u16, body: &serde_json::Value) -> anyhow::Result<()> {
    println!("== {} ({})", label, status);
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}
