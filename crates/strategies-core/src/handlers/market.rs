use crate::handlers::{normalize_symbol, symbol_param_error};
use crate::models::{Bar, Bars, Quote};
use crate::response::{ApiResponse, FieldError};
use crate::rng::{jitter, round2};
use crate::routes::{HandlerContext, MockHandler};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde_json::json;

/// Symbols with hand-picked reference prices. Everything else gets a price
/// derived from its ticker.
const REFERENCE_PRICES: &[(&str, f64)] = &[
    ("AAPL", 189.50),
    ("MSFT", 415.20),
    ("GOOGL", 171.30),
    ("AMZN", 182.75),
    ("TSLA", 242.10),
    ("NVDA", 121.40),
    ("META", 498.60),
    ("SPY", 541.80),
    ("QQQ", 468.90),
];

pub const DEFAULT_TIMEFRAME: &str = "1Day";
pub const DEFAULT_BAR_LIMIT: usize = 30;
pub const MAX_BAR_LIMIT: usize = 1000;

/// Deterministic anchor price for `symbol`.
pub fn reference_price(symbol: &str) -> f64 {
    REFERENCE_PRICES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, p)| *p)
        .unwrap_or_else(|| {
            let seed: u32 = symbol.bytes().map(u32::from).sum();
            20.0 + f64::from(seed % 480)
        })
}

/// Symbols the demo portfolio is drawn from.
pub fn watchlist() -> impl Iterator<Item = &'static str> {
    REFERENCE_PRICES.iter().map(|(s, _)| *s)
}

/// Current price: the reference price with up to 1% jitter.
pub fn live_price<R: Rng + ?Sized>(rng: &mut R, symbol: &str) -> f64 {
    jitter(rng, reference_price(symbol), 0.01)
}

pub fn generate_quote<R: Rng + ?Sized>(rng: &mut R, symbol: &str, now: DateTime<Utc>) -> Quote {
    let last = live_price(rng, symbol);
    let half_spread = rng.gen_range(0.01..=0.03);
    Quote {
        symbol: symbol.to_string(),
        bid: round2(last - half_spread),
        ask: round2(last + half_spread),
        last,
        volume: rng.gen_range(100_000..=50_000_000),
        timestamp: now,
    }
}

fn timeframe_step(timeframe: &str) -> Option<Duration> {
    match timeframe {
        "1Min" => Some(Duration::minutes(1)),
        "5Min" => Some(Duration::minutes(5)),
        "15Min" => Some(Duration::minutes(15)),
        "1Hour" => Some(Duration::hours(1)),
        "1Day" => Some(Duration::days(1)),
        _ => None,
    }
}

/// Random walk of `limit` bars ending at `now`, oldest first.
pub fn generate_bars<R: Rng + ?Sized>(
    rng: &mut R,
    symbol: &str,
    step: Duration,
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<Bar> {
    let mut close = reference_price(symbol);
    let mut bars = Vec::with_capacity(limit);

    for i in (0..limit).rev() {
        let open = close;
        close = jitter(rng, open, 0.02);
        let high = round2(open.max(close) * (1.0 + rng.gen_range(0.0..0.005))).max(open.max(close));
        let low = round2(open.min(close) * (1.0 - rng.gen_range(0.0..0.005))).min(open.min(close));
        bars.push(Bar {
            t: now - step * (i as i32),
            o: open,
            h: high,
            l: low,
            c: close,
            v: rng.gen_range(10_000..=5_000_000),
        });
    }
    bars
}

pub struct QuoteHandler;

impl MockHandler for QuoteHandler {
    fn id(&self) -> &'static str {
        "market.quote"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let symbol = match normalize_symbol(ctx.param("symbol").unwrap_or_default()) {
            Ok(s) => s,
            Err(msg) => return ApiResponse::validation(vec![symbol_param_error(msg)]),
        };
        let quote = generate_quote(ctx.rng, &symbol, ctx.now);
        ApiResponse::ok(json!(quote))
    }
}

pub struct BarsHandler;

impl MockHandler for BarsHandler {
    fn id(&self) -> &'static str {
        "market.bars"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let mut errors = Vec::new();

        let symbol = normalize_symbol(ctx.param("symbol").unwrap_or_default())
            .map_err(|msg| errors.push(symbol_param_error(msg)))
            .ok();

        let timeframe = ctx
            .request
            .query_param("timeframe")
            .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string());
        let step = timeframe_step(&timeframe);
        if step.is_none() {
            errors.push(FieldError::invalid_query(
                "timeframe",
                "timeframe must be one of 1Min, 5Min, 15Min, 1Hour, 1Day",
            ));
        }

        let limit = match ctx.request.query_param("limit") {
            None => Some(DEFAULT_BAR_LIMIT),
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_BAR_LIMIT).contains(n)),
        };
        if limit.is_none() {
            errors.push(FieldError::invalid_query(
                "limit",
                format!("limit must be an integer between 1 and {}", MAX_BAR_LIMIT),
            ));
        }

        let (Some(symbol), Some(step), Some(limit)) = (symbol, step, limit) else {
            return ApiResponse::validation(errors);
        };

        let bars = Bars {
            bars: generate_bars(ctx.rng, &symbol, step, limit, ctx.now),
            symbol,
            timeframe,
        };
        ApiResponse::ok(json!(bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_reference_price_is_stable() {
        assert_eq!(reference_price("AAPL"), 189.50);
        assert_eq!(reference_price("ZZZZ"), reference_price("ZZZZ"));
        assert!(reference_price("ZZZZ") >= 20.0);
    }

    #[test]
    fn test_quote_spread() {
        let mut rng = StdRng::seed_from_u64(5);
        let quote = generate_quote(&mut rng, "MSFT", Utc::now());
        assert!(quote.bid < quote.ask);
        assert!(quote.bid <= quote.last && quote.last <= quote.ask);
    }

    #[test]
    fn test_bars_are_ordered_and_consistent() {
        let mut rng = StdRng::seed_from_u64(11);
        let now = Utc::now();
        let bars = generate_bars(&mut rng, "SPY", Duration::hours(1), 24, now);

        assert_eq!(bars.len(), 24);
        assert_eq!(bars.last().map(|b| b.t), Some(now));
        for pair in bars.windows(2) {
            assert!(pair[0].t < pair[1].t);
        }
        for bar in &bars {
            assert!(bar.l <= bar.o.min(bar.c));
            assert!(bar.h >= bar.o.max(bar.c));
        }
    }
}
