//! Delivery to one or all sessions
//!
//! `Delivery` owns the registry and the chat log. Every operation that
//! reads membership and then writes to members runs through `&mut self`,
//! and the only owner is the `ChatServer` actor, so membership cannot
//! change in the middle of a fan-out and a session is removed (and
//! announced) at most once.
//!
//! Sends never wait: a session whose buffer is full or whose transport is
//! gone is evicted, so one stalled peer cannot hold up the others.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::error::SendError;
use crate::log::ChatLog;
use crate::message::{self, NOTICE_PREFIX};
use crate::registry::SessionRegistry;
use crate::session::Session;
use crate::types::SessionId;

/// Registry plus the send operations that act on it
#[derive(Debug)]
pub struct Delivery {
    registry: SessionRegistry,
    log: ChatLog,
}

impl Delivery {
    /// Create with an empty registry
    pub fn new(log: ChatLog) -> Self {
        Self {
            registry: SessionRegistry::new(),
            log,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Admit a session and announce it to everyone, the newcomer included
    pub fn admit(&mut self, session: Session) {
        let notice = message::joined(&session.username);
        info!("Session {} joined as '{}'", session.id, session.username);
        self.registry.add(session);
        self.broadcast(notice);
    }

    /// Queue one line for one session
    ///
    /// The caller decides what a failure means for that session.
    pub fn send_to(&self, session: &Session, line: String) -> Result<(), SendError> {
        session.send(line)
    }

    /// Send a notice to a single session
    ///
    /// Failures are only logged; the session's own teardown path will
    /// remove it.
    pub fn send_self(&self, session: &Session, text: &str) {
        let line = format!("{}{}", NOTICE_PREFIX, text);
        if let Err(e) = self.send_to(session, line) {
            warn!("Error sending message to self ({}): {}", session.id, e);
            self.log_status("Error sending message to self.");
        }
    }

    /// Deliver a line to every registered session and log it
    ///
    /// Sessions whose send fails are evicted after the line has gone to
    /// everyone else. Their departure notices are broadcast the same way,
    /// so a cascade of dead peers settles without recursion.
    pub fn broadcast(&mut self, line: String) {
        let mut pending = VecDeque::from([line]);

        while let Some(line) = pending.pop_front() {
            info!("{}", line);
            self.log.append(&line);

            let mut failed = Vec::new();
            for session in self.registry.snapshot() {
                if let Err(e) = self.send_to(&session, line.clone()) {
                    debug!("Broadcast to {} failed: {}", session.id, e);
                    failed.push(session.id);
                }
            }

            for id in failed {
                if let Some(notice) = self.evict(id) {
                    pending.push_back(notice);
                }
            }
        }
    }

    /// Remove a session after a failed send and close its transport now
    ///
    /// Returns the departure notice to broadcast, or None if the session
    /// was already gone.
    fn evict(&mut self, id: SessionId) -> Option<String> {
        let session = self.registry.remove(id)?;
        info!("Session {} ('{}') dropped after send failure", id, session.username);
        session.close();
        Some(message::disconnected(&session.username))
    }

    /// Evict a session that failed a direct send and announce it
    pub fn drop_unreachable(&mut self, id: SessionId) -> bool {
        match self.evict(id) {
            Some(notice) => {
                self.broadcast(notice);
                true
            }
            None => false,
        }
    }

    /// Remove a session, close its transport and announce the departure
    ///
    /// Lines already queued for the session are still flushed. Returns
    /// false if the session was already gone, in which case nothing is
    /// broadcast.
    pub fn logout(&mut self, id: SessionId) -> bool {
        let Some(session) = self.registry.remove(id) else {
            debug!("Logout of {} ignored (not registered)", id);
            return false;
        };

        info!("Session {} ('{}') logged out", id, session.username);
        let notice = message::disconnected(&session.username);
        // Dropping the last sender ends the writer task
        drop(session);
        self.broadcast(notice);
        true
    }

    /// Force-close every session without departure notices
    ///
    /// Returns how many sessions were closed.
    pub fn kill_all(&mut self) -> usize {
        let sessions = self.registry.drain();
        let count = sessions.len();
        for session in sessions {
            debug!("Force-closing session {} ('{}')", session.id, session.username);
            session.close();
        }
        count
    }

    /// Append a server status line to the log
    pub fn log_status(&self, line: &str) {
        info!("{}", line);
        self.log.append(line);
    }

    pub fn flush_log(&self) {
        self.log.flush();
    }
}
