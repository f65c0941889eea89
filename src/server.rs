//! ChatServer Actor implementation
//!
//! The central actor that owns the session registry and the chat log.
//! Connection handlers talk to it over an mpsc channel; one command is
//! processed completely (including every resulting delivery) before the
//! next one is received.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::delivery::Delivery;
use crate::log::ChatLog;
use crate::message::{self, ChatMessage};
use crate::router::{classify, Command};
use crate::session::Session;
use crate::types::SessionId;

/// Commands sent from handlers (and the listener) to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Handshake completed: register and announce
    Connect {
        session: Session,
    },
    /// Transport closed or failed
    Disconnect {
        session_id: SessionId,
    },
    /// One message body from a session
    Chat {
        session_id: SessionId,
        body: String,
    },
    /// Close every session and stop; replies with how many were closed
    Shutdown {
        done: oneshot::Sender<usize>,
    },
}

/// The main ChatServer actor
pub struct ChatServer {
    /// Registry and send operations
    delivery: Delivery,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver and log
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, log: ChatLog) -> Self {
        Self {
            delivery: Delivery::new(log),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Processes commands until `Shutdown` arrives or all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            if !self.handle_command(cmd) {
                break;
            }
        }

        info!("ChatServer stopped");
    }

    /// Process a single command
    ///
    /// Returns false once the actor should stop. Nothing in here waits on a
    /// client, so a stalled peer never holds up the command loop.
    fn handle_command(&mut self, cmd: ServerCommand) -> bool {
        match cmd {
            ServerCommand::Connect { session } => {
                self.handle_connect(session);
            }
            ServerCommand::Disconnect { session_id } => {
                self.handle_disconnect(session_id);
            }
            ServerCommand::Chat { session_id, body } => {
                self.handle_chat(session_id, body);
            }
            ServerCommand::Shutdown { done } => {
                let _ = done.send(self.handle_shutdown());
                return false;
            }
        }
        true
    }

    /// Handle a completed handshake
    fn handle_connect(&mut self, session: Session) {
        self.delivery.admit(session);
        debug!("Total sessions: {}", self.delivery.registry().len());
    }

    /// Handle transport teardown
    ///
    /// A no-op if the session already left through logout or a failed send.
    fn handle_disconnect(&mut self, session_id: SessionId) {
        if self.delivery.logout(session_id) {
            debug!("Total sessions: {}", self.delivery.registry().len());
        }
    }

    /// Route one message body
    fn handle_chat(&mut self, session_id: SessionId, body: String) {
        let Some(sender) = self.delivery.registry().get(session_id).cloned() else {
            debug!("Dropping line from unregistered session {}", session_id);
            return;
        };

        match classify(&body) {
            Command::Logout => {
                self.delivery.logout(session_id);
            }
            Command::OnlineQuery => {
                let names = self.delivery.registry().list_usernames();
                let reply = message::online_list(&names);
                if let Err(e) = self.delivery.send_to(&sender, reply) {
                    warn!("Error sending online list to {}: {}", session_id, e);
                    self.delivery.log_status("Error reading online list.");
                }
            }
            Command::PrivateMessage { target } => {
                let line = ChatMessage::new(&sender.username, &body).into_line();
                self.handle_private(&sender, target, line);
            }
            Command::Broadcast => {
                let line = ChatMessage::new(&sender.username, &body).into_line();
                self.delivery.broadcast(line);
            }
        }
    }

    /// Deliver a private line to the first session called `target`
    fn handle_private(&mut self, sender: &Session, target: &str, line: String) {
        let Some(recipient) = self.delivery.registry().find_by_username(target).cloned() else {
            self.delivery
                .send_self(sender, &message::user_not_found(target));
            return;
        };

        match self.delivery.send_to(&recipient, line) {
            Ok(()) => {
                debug!("Private message {} -> {}", sender.id, recipient.id);
                self.delivery
                    .send_self(sender, &message::message_sent(target));
            }
            Err(e) => {
                warn!("Private message to {} failed: {}", recipient.id, e);
                self.delivery.drop_unreachable(recipient.id);
                self.delivery
                    .send_self(sender, &message::unable_to_send(target));
            }
        }
    }

    /// Force-close every session and flush the log
    fn handle_shutdown(&mut self) -> usize {
        let closed = self.delivery.kill_all();
        self.delivery.log_status("Server shutting down.");
        self.delivery.flush_log();
        info!("Closed {} session(s) on shutdown", closed);
        closed
    }
}
