//! Session definitions
//!
//! `Session` is the registry's view of a connected client: its id,
//! username, and the channel feeding its writer task. `SessionState`
//! tracks the connection handler's side of the lifecycle.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::error::SendError;
use crate::types::SessionId;

/// Registered client session
///
/// Cloning is cheap and yields another handle to the same outbound
/// channel. Once every handle is dropped the writer task flushes what is
/// queued and closes the transport; `close()` closes it right away.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique identifier for this session
    pub id: SessionId,
    /// Username from the handshake, set once
    pub username: String,
    /// Server → client line channel
    pub sender: mpsc::Sender<String>,
    /// Cancelled to abandon the transport without flushing
    closer: CancellationToken,
}

impl Session {
    /// Create a new session with the given id, username and sender channel
    pub fn new(id: SessionId, username: String, sender: mpsc::Sender<String>) -> Self {
        Self {
            id,
            username,
            sender,
            closer: CancellationToken::new(),
        }
    }

    /// Queue one line for this session without waiting
    ///
    /// A peer that stopped reading fills its buffer and gets `Full`
    /// instead of stalling the caller.
    pub fn send(&self, line: String) -> Result<(), SendError> {
        self.sender.try_send(line).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Token the writer task watches for a forced close
    pub fn close_token(&self) -> CancellationToken {
        self.closer.clone()
    }

    /// Close the transport now, dropping anything still queued
    pub fn close(&self) {
        self.closer.cancel();
    }
}

/// Connection lifecycle
///
/// Ordered so that a state can only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    /// Transport accepted, waiting for the username line
    Connecting,
    /// Registered and routing lines
    Active,
    /// Read failed, logout processed or server shutting down
    Disconnecting,
    /// Terminal
    Closed,
}

impl SessionState {
    /// Move to `next` if it lies ahead of the current state
    ///
    /// Returns false (and stays put) for backwards or repeated moves.
    pub fn advance(&mut self, next: SessionState) -> bool {
        if next > *self {
            *self = next;
            true
        } else {
            false
        }
    }

    /// Whether lines from this session are still routed
    pub fn is_alive(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_send() {
        let (tx, mut rx) = mpsc::channel(4);
        let session = Session::new(SessionId(1), "alice".to_string(), tx);

        session.send("hello".to_string()).unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[test]
    fn test_session_send_closed() {
        let (tx, rx) = mpsc::channel(4);
        let session = Session::new(SessionId(1), "alice".to_string(), tx);
        drop(rx);

        let result = session.send("hello".to_string());
        assert_eq!(result, Err(SendError::ChannelClosed));
    }

    #[test]
    fn test_session_send_full_does_not_wait() {
        let (tx, _rx) = mpsc::channel(1);
        let session = Session::new(SessionId(1), "lazy".to_string(), tx);

        session.send("first".to_string()).unwrap();
        assert_eq!(session.send("second".to_string()), Err(SendError::Full));
    }

    #[test]
    fn test_session_close_is_shared_by_clones() {
        let (tx, _rx) = mpsc::channel(1);
        let session = Session::new(SessionId(1), "alice".to_string(), tx);
        let token = session.close_token();
        let copy = session.clone();

        assert!(!token.is_cancelled());
        copy.close();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_state_moves_forward_only() {
        let mut state = SessionState::Connecting;
        assert!(!state.is_alive());

        assert!(state.advance(SessionState::Active));
        assert!(state.is_alive());

        assert!(state.advance(SessionState::Disconnecting));
        assert!(!state.is_alive());

        // Never reverts
        assert!(!state.advance(SessionState::Active));
        assert_eq!(state, SessionState::Disconnecting);

        assert!(state.advance(SessionState::Closed));
        assert!(!state.advance(SessionState::Closed));
    }

    #[test]
    fn test_state_can_skip_active() {
        // Handshake failure goes straight to teardown
        let mut state = SessionState::Connecting;
        assert!(state.advance(SessionState::Closed));
        assert!(!state.is_alive());
    }
}
