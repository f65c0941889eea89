//! Chat message and notice texts
//!
//! Everything the server sends is a single display line. Chat lines are
//! rendered once, when the message is created.

use std::fmt;

use chrono::Local;

/// Prefix marking lines addressed only to their recipient
pub const NOTICE_PREFIX: &str = " * ";

/// A chat message from one user
///
/// Immutable; consumed by delivery right after creation. Displays as
/// `HH:MM - sender: text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    sender: String,
    text: String,
    timestamp: String,
}

impl ChatMessage {
    /// Create a message stamped with the current local time (`HH:MM`)
    pub fn new(sender: &str, text: &str) -> Self {
        let timestamp = Local::now().format("%H:%M").to_string();
        Self::with_timestamp(sender, text, timestamp)
    }

    /// Create a message with an explicit timestamp string
    pub fn with_timestamp(sender: &str, text: &str, timestamp: String) -> Self {
        Self {
            sender: sender.to_string(),
            text: text.to_string(),
            timestamp,
        }
    }

    /// The rendered display line
    pub fn into_line(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}: {}", self.timestamp, self.sender, self.text)
    }
}

/// Broadcast when a session is admitted
pub fn joined(username: &str) -> String {
    format!("{} has joined the chat room.", username)
}

/// Broadcast when a session leaves
pub fn disconnected(username: &str) -> String {
    format!("{} has disconnected.", username)
}

pub fn user_not_found(username: &str) -> String {
    format!("User {} not found.", username)
}

pub fn message_sent(username: &str) -> String {
    format!("Message sent to {}.", username)
}

pub fn unable_to_send(username: &str) -> String {
    format!("Unable to send message to {}.", username)
}

/// Reply to the online query: usernames joined by ", "
pub fn online_list(usernames: &[String]) -> String {
    usernames.join(", ")
}
