use crate::handlers::market::{live_price, reference_price, watchlist};
use crate::handlers::normalize_symbol;
use crate::models::{
    Account, Holding, Order, OrderSide, OrderStatus, OrderType, Position, TimeInForce,
};
use crate::response::{ApiResponse, FieldError};
use crate::rng::{jitter, random_uuid, round2};
use crate::routes::{HandlerContext, MockHandler};
use crate::session::MockPortfolio;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::{IteratorRandom, SliceRandom};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Builds the brokerage account attached to a fresh demo session: some cash,
/// a few holdings and the filled orders that opened them.
pub fn seed_portfolio<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> MockPortfolio {
    let count = rng.gen_range(3..=5);
    let symbols = watchlist().choose_multiple(rng, count);

    let mut holdings = Vec::with_capacity(symbols.len());
    let mut orders = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let qty = f64::from(rng.gen_range(5u32..=120));
        let avg_entry_price = jitter(rng, reference_price(symbol), 0.08);
        orders.push(Order {
            id: random_uuid(rng),
            client_order_id: random_uuid(rng),
            symbol: symbol.to_string(),
            qty,
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Day,
            limit_price: None,
            filled_avg_price: Some(avg_entry_price),
            status: OrderStatus::Filled,
            submitted_at: now - Duration::days(rng.gen_range(2..=60)),
        });
        holdings.push(Holding {
            symbol: symbol.to_string(),
            qty,
            avg_entry_price,
        });
    }
    orders.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    MockPortfolio {
        account_id: random_uuid(rng),
        account_number: format!("PA{:08}", rng.gen_range(0..100_000_000u32)),
        cash: round2(rng.gen_range(10_000.0..=100_000.0)),
        holdings,
        orders,
    }
}

fn price_positions<R: Rng + ?Sized>(rng: &mut R, holdings: &[Holding]) -> Vec<Position> {
    holdings
        .iter()
        .map(|h| {
            let current_price = live_price(rng, &h.symbol);
            let market_value = round2(current_price * h.qty);
            let cost_basis = h.avg_entry_price * h.qty;
            let unrealized_pl = round2(market_value - cost_basis);
            Position {
                symbol: h.symbol.clone(),
                qty: h.qty,
                side: "long".to_string(),
                avg_entry_price: h.avg_entry_price,
                current_price,
                market_value,
                unrealized_pl,
                unrealized_plpc: (unrealized_pl / cost_basis * 10_000.0).round() / 10_000.0,
            }
        })
        .collect()
}

pub struct AccountHandler;

impl MockHandler for AccountHandler {
    fn id(&self) -> &'static str {
        "trading.account"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let Some(portfolio) = ctx.account.portfolio.as_ref() else {
            return ApiResponse::unauthorized();
        };

        let long_value: f64 = price_positions(ctx.rng, &portfolio.holdings)
            .iter()
            .map(|p| p.market_value)
            .sum();
        let equity = round2(portfolio.cash + long_value);

        ApiResponse::ok(json!(Account {
            id: portfolio.account_id,
            account_number: portfolio.account_number.clone(),
            status: "ACTIVE".to_string(),
            currency: "USD".to_string(),
            cash: portfolio.cash,
            buying_power: round2(portfolio.cash * 2.0),
            portfolio_value: equity,
            equity,
            pattern_day_trader: false,
        }))
    }
}

pub struct PositionsHandler;

impl MockHandler for PositionsHandler {
    fn id(&self) -> &'static str {
        "trading.positions"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        match ctx.account.portfolio.as_ref() {
            Some(portfolio) => ApiResponse::ok(json!(price_positions(ctx.rng, &portfolio.holdings))),
            None => ApiResponse::unauthorized(),
        }
    }
}

/// Orders placed in this session, most recent first. `?status=open|closed|all`.
pub struct ListOrdersHandler;

impl MockHandler for ListOrdersHandler {
    fn id(&self) -> &'static str {
        "trading.orders.list"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let Some(portfolio) = ctx.account.portfolio.as_ref() else {
            return ApiResponse::unauthorized();
        };

        let filter = ctx.request.query_param("status");
        let keep: fn(&Order) -> bool = match filter.as_deref().unwrap_or("all") {
            "all" => |_| true,
            "open" => |o| o.status.is_open(),
            "closed" => |o| !o.status.is_open(),
            _ => {
                return ApiResponse::validation(vec![FieldError::invalid_query(
                    "status",
                    "status must be one of open, closed, all",
                )]);
            }
        };

        let orders: Vec<&Order> = portfolio.orders.iter().filter(|o| keep(o)).collect();
        ApiResponse::ok(json!(orders))
    }
}

/// Reads an enum field, falling back to `default` when absent.
fn enum_field<T: DeserializeOwned>(
    body: &Value,
    field: &str,
    default: Option<T>,
    allowed: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    match body.get(field) {
        None | Some(Value::Null) => {
            if default.is_none() {
                errors.push(FieldError::missing(field));
            }
            default
        }
        Some(value) => match T::deserialize(value) {
            Ok(v) => Some(v),
            Err(_) => {
                errors.push(FieldError::invalid(
                    field,
                    format!("value is not a valid enumeration member; permitted: {}", allowed),
                ));
                None
            }
        },
    }
}

fn positive_number(body: &Value, field: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    match body.get(field) {
        None | Some(Value::Null) => {
            errors.push(FieldError::missing(field));
            None
        }
        Some(value) => match value.as_f64() {
            Some(n) if n > 0.0 && n.is_finite() => Some(n),
            Some(_) => {
                errors.push(FieldError::invalid(field, "ensure this value is greater than 0"));
                None
            }
            None => {
                errors.push(FieldError::invalid(field, "value is not a valid number"));
                None
            }
        },
    }
}

/// Validates and records an order. Market orders fill immediately at a
/// jittered price; limit orders stay open.
pub struct PlaceOrderHandler;

impl MockHandler for PlaceOrderHandler {
    fn id(&self) -> &'static str {
        "trading.orders.place"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let empty = Value::Object(Default::default());
        let body = ctx.request.body.as_ref().unwrap_or(&empty);
        let mut errors = Vec::new();

        let symbol = match body.get("symbol").and_then(Value::as_str) {
            None => {
                errors.push(FieldError::missing("symbol"));
                None
            }
            Some(raw) => normalize_symbol(raw)
                .map_err(|msg| errors.push(FieldError::invalid("symbol", msg)))
                .ok(),
        };
        let qty = positive_number(body, "qty", &mut errors);
        let side: Option<OrderSide> = enum_field(body, "side", None, "buy, sell", &mut errors);
        let order_type: Option<OrderType> = enum_field(
            body,
            "type",
            Some(OrderType::Market),
            "market, limit",
            &mut errors,
        );
        let time_in_force: Option<TimeInForce> = enum_field(
            body,
            "time_in_force",
            Some(TimeInForce::Day),
            "day, gtc, ioc, fok",
            &mut errors,
        );
        let limit_price = match order_type {
            Some(OrderType::Limit) => positive_number(body, "limit_price", &mut errors),
            _ => None,
        };

        let (Some(symbol), Some(qty), Some(side), Some(order_type), Some(time_in_force)) =
            (symbol, qty, side, order_type, time_in_force)
        else {
            return ApiResponse::validation(errors);
        };
        if !errors.is_empty() {
            return ApiResponse::validation(errors);
        }

        let (status, filled_avg_price) = match order_type {
            OrderType::Market => (OrderStatus::Filled, Some(live_price(ctx.rng, &symbol))),
            OrderType::Limit => (
                *[OrderStatus::New, OrderStatus::Accepted]
                    .choose(ctx.rng)
                    .unwrap_or(&OrderStatus::New),
                None,
            ),
        };

        let order = Order {
            id: random_uuid(ctx.rng),
            client_order_id: random_uuid(ctx.rng),
            symbol,
            qty,
            side,
            order_type,
            time_in_force,
            limit_price,
            filled_avg_price,
            status,
            submitted_at: ctx.now,
        };

        let Some(portfolio) = ctx.account.portfolio.as_mut() else {
            return ApiResponse::unauthorized();
        };
        portfolio.orders.insert(0, order.clone());
        tracing::info!(order_id = %order.id, symbol = %order.symbol, "Recorded demo order");

        ApiResponse::ok(json!(order))
    }
}

pub struct CancelOrderHandler;

impl MockHandler for CancelOrderHandler {
    fn id(&self) -> &'static str {
        "trading.orders.cancel"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let target = ctx.param("order_id").unwrap_or_default().to_string();
        let Some(portfolio) = ctx.account.portfolio.as_mut() else {
            return ApiResponse::unauthorized();
        };

        let Some(order) = portfolio
            .orders
            .iter_mut()
            .find(|o| o.id.to_string() == target)
        else {
            return ApiResponse::not_found("Order not found");
        };

        if !order.status.is_open() {
            return ApiResponse::detail(422, "Order is not cancelable");
        }
        order.status = OrderStatus::Canceled;
        ApiResponse::no_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_seed_portfolio_matches_orders() {
        let mut rng = StdRng::seed_from_u64(8);
        let portfolio = seed_portfolio(&mut rng, Utc::now());

        assert!((3..=5).contains(&portfolio.holdings.len()));
        assert_eq!(portfolio.orders.len(), portfolio.holdings.len());
        assert!(portfolio.orders.iter().all(|o| o.status == OrderStatus::Filled));
        for pair in portfolio.orders.windows(2) {
            assert!(pair[0].submitted_at >= pair[1].submitted_at);
        }
    }

    #[test]
    fn test_position_math() {
        let mut rng = StdRng::seed_from_u64(2);
        let holdings = vec![Holding {
            symbol: "AAPL".to_string(),
            qty: 10.0,
            avg_entry_price: 100.0,
        }];
        let positions = price_positions(&mut rng, &holdings);
        let p = &positions[0];
        assert_eq!(p.market_value, round2(p.current_price * 10.0));
        assert_eq!(p.unrealized_pl, round2(p.market_value - 1000.0));
    }
}
