use crate::request::RouteRequest;
use crate::response::ApiResponse;
use crate::session::{AccountState, SessionState};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;

pub mod table;

pub use table::{PathParams, RouteMatch, RoutePattern, RouteTable};

/// Context provided to a handler while it builds a mock response.
///
/// Handlers run synchronously after the simulated delay, holding exclusive
/// access to the session, the account data and the generator for the whole
/// call.
pub struct HandlerContext<'a> {
    pub request: &'a RouteRequest,
    /// Values captured by `{name}` segments of the matched pattern.
    pub params: &'a PathParams,
    /// Written only by the credential handlers.
    pub session: &'a mut SessionState,
    /// Devices and portfolio of the signed-in user.
    pub account: &'a mut AccountState,
    pub rng: &'a mut StdRng,
    /// Timestamp used for every time field in the response.
    pub now: DateTime<Utc>,
}

impl HandlerContext<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}

/// A mock endpoint.
///
/// Handlers are stateless; all state lives in the [`SessionState`] and
/// [`AccountState`] passed through the context. Output shape must not depend
/// on randomness, only the values may.
pub trait MockHandler: Send + Sync {
    /// Stable identifier used in logs (e.g. "auth.login").
    fn id(&self) -> &'static str;

    /// Whether the router should reject the call with 401 when no session
    /// authenticates it.
    fn requires_auth(&self) -> bool {
        true
    }

    fn handle(&self, ctx: &mut HandlerContext) -> ApiResponse;
}
