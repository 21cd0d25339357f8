use crate::handlers::trading::seed_portfolio;
use crate::models::{DeviceSession, MockUser};
use crate::response::{ApiResponse, FieldError};
use crate::rng::random_uuid;
use crate::routes::{HandlerContext, MockHandler};
use crate::session::MockSession;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Value, json};
use strategies_security::{session_id_for, validate_password_strength};

/// Lifetime advertised for demo access tokens. Nothing enforces it.
pub const ACCESS_TOKEN_TTL_SECS: u64 = 30 * 60;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Demo Browser)";

const OTHER_DEVICES: &[(&str, &str)] = &[
    (
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148",
        "203.0.113.24",
    ),
    (
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/124.0 Safari/537.36",
        "198.51.100.7",
    ),
    (
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 Version/17.4 Safari/605.1.15",
        "192.0.2.113",
    ),
];

fn display_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let words: Vec<String> = local
        .split(['.', '_', '-', '+'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        "Demo User".to_string()
    } else {
        words.join(" ")
    }
}

pub fn demo_user<R: Rng + ?Sized>(rng: &mut R, email: &str, now: DateTime<Utc>) -> MockUser {
    MockUser {
        id: random_uuid(rng),
        email: email.to_string(),
        full_name: display_name(email),
        role: "user".to_string(),
        is_verified: true,
        mfa_enabled: false,
        subscription_tier: "pro".to_string(),
        created_at: now - Duration::days(rng.gen_range(30..=365)),
    }
}

/// Two previously signed-in devices so the sessions page has something to revoke.
fn other_devices<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Vec<DeviceSession> {
    OTHER_DEVICES
        .choose_multiple(rng, 2)
        .map(|(agent, ip)| DeviceSession {
            id: session_id_for(&random_uuid(rng).to_string()),
            user_agent: agent.to_string(),
            ip_address: ip.to_string(),
            created_at: now - Duration::days(rng.gen_range(3..=30)),
            last_active_at: now - Duration::hours(rng.gen_range(1..=48)),
            is_current: false,
        })
        .collect()
}

fn token_body(session: &MockSession) -> Value {
    json!({
        "access_token": session.access_token,
        "refresh_token": session.refresh_token,
        "token_type": "bearer",
        "expires_in": ACCESS_TOKEN_TTL_SECS,
        "user": session.user,
    })
}

/// Accepts any non-empty credential pair and opens a demo session.
pub struct LoginHandler;

impl MockHandler for LoginHandler {
    fn id(&self) -> &'static str {
        "auth.login"
    }

    fn requires_auth(&self) -> bool {
        false
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let email = ctx.request.body_str("email");
        let password = ctx.request.body_str("password");

        let mut errors = Vec::new();
        if email.is_none() {
            errors.push(FieldError::missing("email"));
        }
        if password.is_none() {
            errors.push(FieldError::missing("password"));
        }
        let Some(email) = email.filter(|_| errors.is_empty()) else {
            return ApiResponse::validation(errors);
        };

        let user_agent = ctx
            .request
            .header("user-agent")
            .unwrap_or(DEFAULT_USER_AGENT);
        let user = demo_user(ctx.rng, email, ctx.now);
        let devices = other_devices(ctx.rng, ctx.now);
        let portfolio = seed_portfolio(ctx.rng, ctx.now);

        ctx.account.reset(devices, portfolio);
        let session = ctx
            .session
            .begin(MockSession::open(user, user_agent, ctx.now));
        tracing::info!(user_id = %session.user.id, "Opened demo session");

        ApiResponse::ok(token_body(session))
    }
}

pub struct RegisterHandler;

impl MockHandler for RegisterHandler {
    fn id(&self) -> &'static str {
        "auth.register"
    }

    fn requires_auth(&self) -> bool {
        false
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let mut errors = Vec::new();

        let email = ctx.request.body_str("email");
        match email {
            None => errors.push(FieldError::missing("email")),
            Some(e) if !e.contains('@') || e.starts_with('@') || e.ends_with('@') => {
                errors.push(FieldError::invalid("email", "value is not a valid email address"))
            }
            Some(_) => {}
        }

        match ctx.request.body_str("password") {
            None => errors.push(FieldError::missing("password")),
            Some(pw) => {
                if let Err(msg) = validate_password_strength(pw) {
                    errors.push(FieldError::invalid("password", msg));
                }
            }
        }

        let Some(email) = email.filter(|_| errors.is_empty()) else {
            return ApiResponse::validation(errors);
        };

        let full_name = ctx
            .request
            .body_str("full_name")
            .map(str::to_string)
            .unwrap_or_else(|| display_name(email));

        ApiResponse::created(json!({
            "id": random_uuid(ctx.rng),
            "email": email,
            "full_name": full_name,
            "is_verified": false,
            "message": "Registration successful. Please check your email to verify your account.",
        }))
    }
}

/// Exchanges the session's refresh token for a new token pair.
pub struct RefreshHandler;

impl MockHandler for RefreshHandler {
    fn id(&self) -> &'static str {
        "auth.refresh"
    }

    fn requires_auth(&self) -> bool {
        false
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let Some(presented) = ctx.request.body_str("refresh_token") else {
            return ApiResponse::validation(vec![FieldError::missing("refresh_token")]);
        };

        match ctx.session.current_mut() {
            Some(session) if session.refresh_token == presented => {
                session.rotate_tokens();
                ApiResponse::ok(token_body(session))
            }
            _ => ApiResponse::detail(401, "Invalid refresh token"),
        }
    }
}

pub struct LogoutHandler;

impl MockHandler for LogoutHandler {
    fn id(&self) -> &'static str {
        "auth.logout"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        if let Some(session) = ctx.session.end() {
            tracing::info!(user_id = %session.user.id, "Closed demo session");
        }
        ctx.account.clear();
        ApiResponse::ok(json!({ "message": "Successfully logged out" }))
    }
}

pub struct CurrentUserHandler;

impl MockHandler for CurrentUserHandler {
    fn id(&self) -> &'static str {
        "auth.me"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        match ctx.session.current() {
            Some(session) => ApiResponse::ok(json!(session.user)),
            None => ApiResponse::unauthorized(),
        }
    }
}

pub struct ListSessionsHandler;

impl MockHandler for ListSessionsHandler {
    fn id(&self) -> &'static str {
        "auth.sessions.list"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        match ctx.session.current() {
            Some(session) => ApiResponse::ok(json!(ctx.account.devices(session))),
            None => ApiResponse::unauthorized(),
        }
    }
}

/// Revokes a listed device. Revoking the current device ends the session.
pub struct RevokeSessionHandler;

impl MockHandler for RevokeSessionHandler {
    fn id(&self) -> &'static str {
        "auth.sessions.revoke"
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse {
        let target = ctx.param("session_id").unwrap_or_default().to_string();
        let Some(session) = ctx.session.current() else {
            return ApiResponse::unauthorized();
        };

        if session.device_id() == target {
            ctx.session.end();
            ctx.account.clear();
            return ApiResponse::ok(json!({ "message": "Session revoked" }));
        }

        if ctx.account.revoke_device(&target) {
            ApiResponse::ok(json!({ "message": "Session revoked" }))
        } else {
            ApiResponse::not_found("Session not found")
        }
    }
}
