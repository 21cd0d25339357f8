use crate::models::{DeviceSession, Holding, MockUser, Order};
use crate::request::RouteRequest;
use chrono::{DateTime, Utc};
use strategies_security::{generate_secure_token, session_id_for};
use uuid::Uuid;

const TOKEN_BYTES: usize = 32;

/// Brokerage state attached to a demo identity.
#[derive(Debug, Clone, PartialEq)]
pub struct MockPortfolio {
    pub account_id: Uuid,
    pub account_number: String,
    pub cash: f64,
    pub holdings: Vec<Holding>,
    /// Most recent first.
    pub orders: Vec<Order>,
}

/// In-memory stand-in for an authenticated identity.
///
/// Tokens are opaque and never validated beyond string equality. Nothing here
/// outlives the process.
#[derive(Debug, Clone, PartialEq)]
pub struct MockSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: MockUser,
    /// The device that signed in.
    pub device: DeviceSession,
}

impl MockSession {
    /// Mints a fresh token pair for `user`. The device id is derived from the
    /// initial access token.
    pub fn open(user: MockUser, user_agent: &str, now: DateTime<Utc>) -> Self {
        let access_token = generate_secure_token(TOKEN_BYTES);
        let refresh_token = generate_secure_token(TOKEN_BYTES);

        let device = DeviceSession {
            id: session_id_for(&access_token),
            user_agent: user_agent.to_string(),
            ip_address: "127.0.0.1".to_string(),
            created_at: now,
            last_active_at: now,
            is_current: true,
        };

        Self {
            access_token,
            refresh_token,
            user,
            device,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device.id
    }

    /// Replaces both tokens, keeping the device intact.
    pub fn rotate_tokens(&mut self) {
        self.access_token = generate_secure_token(TOKEN_BYTES);
        self.refresh_token = generate_secure_token(TOKEN_BYTES);
    }
}

/// Holder of the (at most one) active demo session.
///
/// Only the credential handlers write here: login, refresh, logout and
/// revoking the current device.
#[derive(Debug, Default)]
pub struct SessionState {
    current: Option<MockSession>,
}

impl SessionState {
    /// Installs `session`, replacing any previous one.
    pub fn begin(&mut self, session: MockSession) -> &MockSession {
        self.current.insert(session)
    }

    pub fn end(&mut self) -> Option<MockSession> {
        self.current.take()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&MockSession> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut MockSession> {
        self.current.as_mut()
    }

    /// The session a request may act as.
    ///
    /// A request without a bearer token rides on the active session; a request
    /// carrying a token must present the active access token.
    pub fn authenticate(&self, request: &RouteRequest) -> Option<&MockSession> {
        let session = self.current.as_ref()?;
        match request.bearer_token() {
            Some(token) if token != session.access_token => None,
            _ => Some(session),
        }
    }
}

/// Data the demo backend keeps for the signed-in user, next to the session:
/// the other devices on the account and the brokerage portfolio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountState {
    pub other_devices: Vec<DeviceSession>,
    pub portfolio: Option<MockPortfolio>,
}

impl AccountState {
    pub fn reset(&mut self, other_devices: Vec<DeviceSession>, portfolio: MockPortfolio) {
        self.other_devices = other_devices;
        self.portfolio = Some(portfolio);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Every signed-in device, the session's own first.
    pub fn devices(&self, session: &MockSession) -> Vec<DeviceSession> {
        std::iter::once(session.device.clone())
            .chain(self.other_devices.iter().cloned())
            .collect()
    }

    /// Forgets another device. Returns whether it was known.
    pub fn revoke_device(&mut self, id: &str) -> bool {
        let before = self.other_devices.len();
        self.other_devices.retain(|d| d.id != id);
        self.other_devices.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> MockSession {
        let now = Utc::now();
        let user = MockUser {
            id: Uuid::nil(),
            email: "demo@example.com".to_string(),
            full_name: "Demo".to_string(),
            role: "user".to_string(),
            is_verified: true,
            mfa_enabled: false,
            subscription_tier: "pro".to_string(),
            created_at: now,
        };
        MockSession::open(user, "test-agent", now)
    }

    fn device(id: &str) -> DeviceSession {
        DeviceSession {
            id: id.to_string(),
            user_agent: "other".to_string(),
            ip_address: "192.0.2.1".to_string(),
            created_at: Utc::now(),
            last_active_at: Utc::now(),
            is_current: false,
        }
    }

    #[test]
    fn test_authenticate_rules() {
        let mut state = SessionState::default();
        let anonymous = RouteRequest::get("/api/v1/auth/me");
        assert!(state.authenticate(&anonymous).is_none());

        let token = state.begin(session()).access_token.clone();
        assert!(state.authenticate(&anonymous).is_some());
        assert!(state.authenticate(&anonymous.clone().with_bearer(&token)).is_some());
        assert!(state.authenticate(&anonymous.clone().with_bearer("stale")).is_none());

        state.end();
        assert!(state.authenticate(&anonymous.with_bearer(&token)).is_none());
    }

    #[test]
    fn test_rotate_keeps_device() {
        let mut s = session();
        let device = s.device_id().to_string();
        let old = s.access_token.clone();
        s.rotate_tokens();
        assert_ne!(s.access_token, old);
        assert_eq!(s.device_id(), device);
    }

    #[test]
    fn test_account_devices_and_revoke() {
        let s = session();
        let mut account = AccountState {
            other_devices: vec![device("a"), device("b")],
            portfolio: None,
        };

        let listed = account.devices(&s);
        assert_eq!(listed.len(), 3);
        assert!(listed[0].is_current);
        assert_eq!(listed[0].id, s.device_id());

        assert!(account.revoke_device("a"));
        assert!(!account.revoke_device("a"));
        assert_eq!(account.devices(&s).len(), 2);

        account.clear();
        assert!(account.portfolio.is_none());
        assert!(account.other_devices.is_empty());
    }
}
