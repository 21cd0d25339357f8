use crate::models::{Plan, PlanRef, Subscription};
use crate::response::ApiResponse;
use crate::routes::{HandlerContext, MockHandler};
use chrono::Duration;
use rand::Rng;
use serde_json::json;

struct PlanTier {
    id: &'static str,
    name: &'static str,
    price_monthly: f64,
    entitlements: &'static [&'static str],
}

const PLANS: &[PlanTier] = &[
    PlanTier {
        id: "free",
        name: "Free",
        price_monthly: 0.0,
        entitlements: &["strategies.max_3", "signals.single", "trading.paper"],
    },
    PlanTier {
        id: "pro",
        name: "Pro",
        price_monthly: 29.0,
        entitlements: &[
            "strategies.max_25",
            "signals.single",
            "signals.bulk",
            "trading.paper",
            "trading.live",
            "market_data.realtime",
        ],
    },
    PlanTier {
        id: "enterprise",
        name: "Enterprise",
        price_monthly: 99.0,
        entitlements: &[
            "strategies.unlimited",
            "signals.single",
            "signals.bulk",
            "trading.paper",
            "trading.live",
            "market_data.realtime",
            "support.priority",
        ],
    },
];

impl PlanTier {
    fn to_plan(&self) -> Plan {
        Plan {
            id: self.id.to_string(),
            name: self.name.to_string(),
            price_monthly: self.price_monthly,
            currency: "usd".to_string(),
            interval: "month".to_string(),
            entitlements: self.entitlements.iter().map(|e| e.to_string()).collect(),
        }
    }
}

fn find_plan(id: &str) -> &'static PlanTier {
    PLANS.iter().find(|p| p.id == id).unwrap_or(&PLANS[0])
}

pub fn plans() -> Vec<Plan> {
    PLANS.iter().map(PlanTier::to_plan).collect()
}

pub struct PlansHandler;

impl MockHandler for PlansHandler {
    fn id(&self) -> &'static str {
        "billing.plans"
    }

    fn requires_auth(&self) -> bool {
        false
    }

    fn handle(&self, _ctx: &mut HandlerContext) -> ApiResponse {
        ApiResponse::ok(json!(plans()))
    }
}

/// Subscription for the session's tier. Entitlements are listed, not enforced.
pub struct SubscriptionHandler;

impl MockHandler for SubscriptionHandler {
    fn id(&self) -> &'static str {
        "billing.subscription"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let Some(session) = ctx.session.current() else {
            return ApiResponse::unauthorized();
        };
        let plan = find_plan(&session.user.subscription_tier).to_plan();

        ApiResponse::ok(json!(Subscription {
            status: "active".to_string(),
            plan: PlanRef {
                id: plan.id,
                name: plan.name,
            },
            current_period_end: ctx.now + Duration::days(ctx.rng.gen_range(1..=30)),
            cancel_at_period_end: false,
            entitlements: plan.entitlements,
        }))
    }
}
