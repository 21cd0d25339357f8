//! Demo endpoints served in mock mode.

use crate::request::Method;
use crate::response::FieldError;
use crate::routes::RouteTable;

pub mod auth;
pub mod billing;
pub mod health;
pub mod market;
pub mod privacy;
pub mod signals;
pub mod trading;

pub use auth::*;
pub use billing::*;
pub use health::*;
pub use market::*;
pub use privacy::*;
pub use signals::*;
pub use trading::*;

/// Registers every demo endpoint. Health and metrics routes sit at the root;
/// the rest are mounted under `prefix`.
pub fn register_core_handlers(table: &mut RouteTable, prefix: &str) {
    let api = |path: &str| format!("{}{}", prefix, path);

    table.register(Method::Get, "/", RootHandler);
    table.register(Method::Get, "/healthz", HealthHandler);
    table.register(Method::Get, "/readyz", ReadinessHandler);
    table.register(Method::Get, "/metrics", MetricsHandler);

    table.register(Method::Post, &api("/auth/login"), LoginHandler);
    table.register(Method::Post, &api("/auth/register"), RegisterHandler);
    table.register(Method::Post, &api("/auth/refresh"), RefreshHandler);
    table.register(Method::Post, &api("/auth/logout"), LogoutHandler);
    table.register(Method::Get, &api("/auth/me"), CurrentUserHandler);
    table.register(Method::Get, &api("/auth/sessions"), ListSessionsHandler);
    table.register(
        Method::Delete,
        &api("/auth/sessions/{session_id}"),
        RevokeSessionHandler,
    );

    table.register(Method::Get, &api("/market-data/quote/{symbol}"), QuoteHandler);
    table.register(Method::Get, &api("/market-data/bars/{symbol}"), BarsHandler);

    table.register(Method::Get, &api("/signals/{symbol}"), SignalHandler);
    table.register(Method::Post, &api("/signals/bulk"), BulkSignalHandler);

    table.register(Method::Get, &api("/trading/account"), AccountHandler);
    table.register(Method::Get, &api("/trading/positions"), PositionsHandler);
    table.register(Method::Get, &api("/trading/orders"), ListOrdersHandler);
    table.register(Method::Post, &api("/trading/orders"), PlaceOrderHandler);
    table.register(
        Method::Delete,
        &api("/trading/orders/{order_id}"),
        CancelOrderHandler,
    );

    table.register(Method::Get, &api("/billing/plans"), PlansHandler);
    table.register(Method::Get, &api("/billing/subscription"), SubscriptionHandler);

    table.register(Method::Get, &api("/privacy/export"), ExportDataHandler);
}

/// Uppercased ticker, or a validation error for the given location.
pub(crate) fn normalize_symbol(raw: &str) -> Result<String, String> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() || symbol.len() > 10 {
        return Err("symbol must be 1-10 characters".to_string());
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(format!("invalid symbol '{}'", raw));
    }
    Ok(symbol)
}

pub(crate) fn symbol_param_error(msg: String) -> FieldError {
    FieldError::invalid_path("symbol", msg)
}
