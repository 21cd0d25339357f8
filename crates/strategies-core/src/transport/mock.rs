use crate::config::{Mode, RouterConfig};
use crate::error::{Result, RouterError};
use crate::handlers::register_core_handlers;
use crate::latency::{self, LatencyRange};
use crate::request::RouteRequest;
use crate::response::ApiResponse;
use crate::rng::MockRng;
use crate::routes::{HandlerContext, RouteMatch, RouteTable};
use crate::session::{AccountState, MockSession, SessionState};
use crate::transport::Transport;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Transport that answers every request locally.
///
/// Nothing here touches the network. Each call resolves its handler, waits a
/// simulated round-trip, then runs the handler in one synchronous step.
pub struct MockTransport {
    table: RouteTable,
    latency: LatencyRange,
    rng: MockRng,
    session: Mutex<SessionState>,
    account: Mutex<AccountState>,
}

impl MockTransport {
    /// Transport with the full demo endpoint surface mounted under the
    /// configured prefix.
    pub fn new(config: &RouterConfig) -> Self {
        let mut table = RouteTable::default();
        register_core_handlers(&mut table, config.api_prefix());
        Self::with_table(
            table,
            config.latency(),
            MockRng::from_seed_opt(config.seed()),
        )
    }

    pub fn with_table(table: RouteTable, latency: LatencyRange, rng: MockRng) -> Self {
        Self {
            table,
            latency,
            rng,
            session: Mutex::new(SessionState::default()),
            account: Mutex::new(AccountState::default()),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn latency(&self) -> LatencyRange {
        self.latency
    }

    /// Snapshot of the active demo session.
    pub fn session(&self) -> Option<MockSession> {
        self.lock_session().current().cloned()
    }

    /// Snapshot of the signed-in user's devices and portfolio.
    pub fn account(&self) -> AccountState {
        self.lock_account().clone()
    }

    fn lock_session(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_account(&self) -> MutexGuard<'_, AccountState> {
        self.account.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs the matched handler against the shared state.
    ///
    /// State changes happen only here, after the delay and without any
    /// suspension point, so a cancelled call never touches the session. The
    /// session lock is always taken before the account lock.
    fn dispatch(&self, request: &RouteRequest, matched: &RouteMatch) -> ApiResponse {
        let mut session = self.lock_session();

        if matched.handler.requires_auth() && session.authenticate(request).is_none() {
            tracing::debug!(handler = matched.handler.id(), "Rejected unauthenticated mock call");
            return ApiResponse::unauthorized();
        }

        let mut account = self.lock_account();
        self.rng.with(|rng| {
            let mut ctx = HandlerContext {
                request,
                params: &matched.params,
                session: &mut *session,
                account: &mut *account,
                rng,
                now: Utc::now(),
            };
            matched.handler.handle(&mut ctx)
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn mode(&self) -> Mode {
        Mode::Mock
    }

    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: RouteRequest) -> Result<ApiResponse> {
        let Some(matched) = self.table.resolve(request.method, &request.path) else {
            return Err(RouterError::RouteNotFound {
                method: request.method,
                path: request.path,
            });
        };

        let delay = self.rng.with(|rng| self.latency.sample(rng));
        tracing::debug!(
            handler = matched.handler.id(),
            delay_ms = delay.as_millis() as u64,
            "Serving mock response"
        );
        latency::simulate(delay).await;

        let response = self.dispatch(&request, &matched);
        tracing::debug!(status = response.status, "Mock response ready");
        Ok(response)
    }
}
