//! SessionRegistry definition
//!
//! Ordered collection of the currently active sessions. Owned by the
//! `ChatServer` actor, so every mutation and snapshot happens inside a
//! single command's processing.

use crate::session::Session;
use crate::types::SessionId;

/// Active sessions in join order
///
/// Usernames are not required to be unique; lookups by name return
/// the earliest registered match.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session
    pub fn add(&mut self, session: Session) {
        self.sessions.push(session);
    }

    /// Remove the session with the given id
    ///
    /// Returns the removed entry, or None if it was already gone.
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        Some(self.sessions.remove(index))
    }

    /// Get a session by id
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// First session with exactly this username (case-sensitive)
    pub fn find_by_username(&self, name: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.username == name)
    }

    /// Point-in-time copy of all session handles
    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.clone()
    }

    /// Usernames in registry order
    pub fn list_usernames(&self) -> Vec<String> {
        self.sessions.iter().map(|s| s.username.clone()).collect()
    }

    /// Remove and return every session
    pub fn drain(&mut self) -> Vec<Session> {
        std::mem::take(&mut self.sessions)
    }

    /// Number of registered sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn session(id: u64, name: &str) -> Session {
        let (tx, _rx) = mpsc::channel(1);
        Session::new(SessionId(id), name.to_string(), tx)
    }

    #[test]
    fn test_registry_add_and_list() {
        let mut registry = SessionRegistry::new();
        assert!(registry.is_empty());

        registry.add(session(1, "alice"));
        registry.add(session(2, "bob"));
        registry.add(session(3, "carol"));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.list_usernames(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_registry_remove_is_idempotent() {
        let mut registry = SessionRegistry::new();
        registry.add(session(1, "alice"));
        registry.add(session(2, "bob"));

        let removed = registry.remove(SessionId(1)).unwrap();
        assert_eq!(removed.username, "alice");
        assert!(registry.get(SessionId(1)).is_none());

        // Second removal is a no-op
        assert!(registry.remove(SessionId(1)).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_find_by_username() {
        let mut registry = SessionRegistry::new();
        registry.add(session(1, "alice"));
        registry.add(session(2, "bob"));
        registry.add(session(3, "alice"));

        // First match in join order
        assert_eq!(registry.find_by_username("alice").unwrap().id, SessionId(1));
        assert_eq!(registry.find_by_username("bob").unwrap().id, SessionId(2));

        // Case-sensitive
        assert!(registry.find_by_username("Alice").is_none());
        assert!(registry.find_by_username("dave").is_none());
    }

    #[test]
    fn test_registry_snapshot_is_a_copy() {
        let mut registry = SessionRegistry::new();
        registry.add(session(1, "alice"));
        registry.add(session(2, "bob"));

        let snapshot = registry.snapshot();
        registry.remove(SessionId(1));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_drain() {
        let mut registry = SessionRegistry::new();
        registry.add(session(1, "alice"));
        registry.add(session(2, "bob"));

        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert!(registry.is_empty());
    }
}
