// Session - the signed-in admin's bearer token, threaded explicitly into
// every request builder, plus the gate pages wait on before their first fetch

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Ready(Session),
    TimedOut,
}

/// Write side, owned by whatever performs sign-in.
#[derive(Debug)]
pub struct AuthHandle {
    tx: watch::Sender<Option<Session>>,
}

impl AuthHandle {
    pub fn sign_in(&self, session: Session) {
        debug!("Session established");
        self.tx.send_replace(Some(session));
    }

    pub fn sign_out(&self) {
        debug!("Session cleared");
        self.tx.send_replace(None);
    }
}

/// Read side, cloned into every list page.
#[derive(Debug, Clone)]
pub struct AuthGate {
    rx: watch::Receiver<Option<Session>>,
    timeout: Duration,
}

impl AuthGate {
    pub fn current(&self) -> Option<Session> {
        self.rx.borrow().clone()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve with the session as soon as one exists, or report a timeout.
    pub async fn wait(&self) -> AuthStatus {
        let mut rx = self.rx.clone();
        let status = match tokio::time::timeout(self.timeout, rx.wait_for(Option::is_some)).await {
            Ok(Ok(session)) => session.clone().map_or(AuthStatus::TimedOut, AuthStatus::Ready),
            Ok(Err(_)) => {
                warn!("Auth channel closed before a session was established");
                AuthStatus::TimedOut
            }
            Err(_) => {
                warn!("Authentication not ready after {:?}", self.timeout);
                AuthStatus::TimedOut
            }
        };
        status
    }
}

pub fn auth_channel(timeout: Duration) -> (AuthHandle, AuthGate) {
    let (tx, rx) = watch::channel(None);
    (AuthHandle { tx }, AuthGate { rx, timeout })
}
