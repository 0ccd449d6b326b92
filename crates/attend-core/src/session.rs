//! Client session lifecycle

use attend_util::{SessionId, SessionToken};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Attendance calls may be issued
    Active,
    /// The service rejected the token; no further calls until a new session
    Revoked,
    /// Logged out or shut down; pending results are discarded
    Ended,
}

/// One login-to-logout span.
///
/// The token is handed to the engine only while the session is active, so a
/// revoked or ended session can never issue another attendance call.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    token: Option<SessionToken>,
    started_at: DateTime<Local>,
    state: watch::Sender<SessionState>,
}

impl Session {
    /// Start a session. Without a token every pass reports that login is required.
    pub fn new(token: Option<SessionToken>) -> Self {
        let (state, _) = watch::channel(SessionState::Active);
        let session = Self {
            id: SessionId::new(),
            token,
            started_at: attend_util::now(),
            state,
        };
        info!(
            session_id = %session.id,
            has_token = session.token.is_some(),
            "Session started"
        );
        session
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// The credential, if the session may still call the service
    pub fn token(&self) -> Option<&SessionToken> {
        match self.state() {
            SessionState::Active => self.token.as_ref(),
            SessionState::Revoked | SessionState::Ended => None,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Results of in-flight work may still be applied
    pub fn is_live(&self) -> bool {
        self.state() != SessionState::Ended
    }

    /// Mark the token as rejected. Returns false if the session was not active.
    pub fn revoke(&self) -> bool {
        let changed = self.state.send_if_modified(|state| {
            if *state == SessionState::Active {
                *state = SessionState::Revoked;
                true
            } else {
                false
            }
        });
        if changed {
            info!(session_id = %self.id, "Session revoked");
        }
        changed
    }

    /// End the session. Idempotent.
    pub fn end(&self) {
        let changed = self.state.send_if_modified(|state| {
            if *state == SessionState::Ended {
                false
            } else {
                *state = SessionState::Ended;
                true
            }
        });
        if changed {
            info!(session_id = %self.id, "Session ended");
        }
    }

    /// Watch for lifecycle changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SessionToken {
        SessionToken::new("abc").unwrap()
    }

    #[test]
    fn active_session_exposes_token() {
        let session = Session::new(Some(token()));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.token(), Some(&token()));
        assert!(session.is_live());
    }

    #[test]
    fn no_token_session() {
        let session = Session::new(None);
        assert!(session.token().is_none());
        assert!(!session.has_token());
        assert!(session.is_live());
    }

    #[test]
    fn revoke_hides_token_but_stays_live() {
        let session = Session::new(Some(token()));
        assert!(session.revoke());
        assert!(!session.revoke());
        assert!(session.token().is_none());
        assert!(session.is_live());
    }

    #[test]
    fn end_is_final() {
        let session = Session::new(Some(token()));
        session.end();
        session.end();
        assert!(!session.is_live());
        assert!(session.token().is_none());
        assert!(!session.revoke());
        assert_eq!(session.state(), SessionState::Ended);
    }

    #[tokio::test]
    async fn subscribers_see_end() {
        let session = Session::new(Some(token()));
        let mut rx = session.subscribe();
        session.end();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), SessionState::Ended);
    }
}
