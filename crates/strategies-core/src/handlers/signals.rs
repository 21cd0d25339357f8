use crate::handlers::market::live_price;
use crate::handlers::{normalize_symbol, symbol_param_error};
use crate::models::{BulkSignals, Signal, SignalAction};
use crate::response::{ApiResponse, FieldError};
use crate::rng::round2;
use crate::routes::{HandlerContext, MockHandler};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Value, json};

const BUY_REASONS: &[&str] = &[
    "Price crossed above the 20-day moving average",
    "RSI recovering from oversold territory",
    "Volume breakout above resistance",
];
const SELL_REASONS: &[&str] = &[
    "Price broke below the 50-day moving average",
    "RSI in overbought territory",
    "Bearish MACD crossover",
];
const HOLD_REASONS: &[&str] = &[
    "Trading inside a consolidation range",
    "Mixed momentum indicators",
    "Awaiting confirmation from volume",
];

pub fn generate_signal<R: Rng + ?Sized>(rng: &mut R, symbol: &str, now: DateTime<Utc>) -> Signal {
    let action = *SignalAction::ALL.choose(rng).unwrap_or(&SignalAction::Hold);
    let reasons = match action {
        SignalAction::Buy => BUY_REASONS,
        SignalAction::Sell => SELL_REASONS,
        SignalAction::Hold => HOLD_REASONS,
    };
    Signal {
        symbol: symbol.to_string(),
        action,
        confidence: round2(rng.gen_range(0.5..=0.95)),
        price: live_price(rng, symbol),
        reason: reasons.choose(rng).copied().unwrap_or_default().to_string(),
        generated_at: now,
    }
}

pub struct SignalHandler;

impl MockHandler for SignalHandler {
    fn id(&self) -> &'static str {
        "signals.single"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        match normalize_symbol(ctx.param("symbol").unwrap_or_default()) {
            Ok(symbol) => ApiResponse::ok(json!(generate_signal(ctx.rng, &symbol, ctx.now))),
            Err(msg) => ApiResponse::validation(vec![symbol_param_error(msg)]),
        }
    }
}

/// `POST /signals/bulk` with `{"symbols": [...]}`; one signal per symbol, in
/// request order, duplicates included.
pub struct BulkSignalHandler;

impl MockHandler for BulkSignalHandler {
    fn id(&self) -> &'static str {
        "signals.bulk"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let raw = match ctx.request.body.as_ref().and_then(|b| b.get("symbols")) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return ApiResponse::validation(vec![FieldError::invalid(
                    "symbols",
                    "value is not a valid list",
                )]);
            }
            None => return ApiResponse::validation(vec![FieldError::missing("symbols")]),
        };

        let mut symbols = Vec::with_capacity(raw.len());
        let mut errors = Vec::new();
        for (i, item) in raw.iter().enumerate() {
            match item.as_str().map(normalize_symbol) {
                Some(Ok(symbol)) => symbols.push(symbol),
                Some(Err(msg)) => errors.push(FieldError::new(
                    "body",
                    &format!("symbols.{}", i),
                    msg,
                    "value_error",
                )),
                None => errors.push(FieldError::new(
                    "body",
                    &format!("symbols.{}", i),
                    "str type expected",
                    "type_error.str",
                )),
            }
        }
        if !errors.is_empty() {
            return ApiResponse::validation(errors);
        }

        let signals = symbols
            .iter()
            .map(|symbol| generate_signal(ctx.rng, symbol, ctx.now))
            .collect();
        ApiResponse::ok(json!(BulkSignals { signals }))
    }
}
