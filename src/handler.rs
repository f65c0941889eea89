//! Connection handler
//!
//! Handles one client connection: username handshake, the receive loop
//! feeding the ChatServer, and a writer task draining the session's
//! outbound channel into the socket.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::server::ServerCommand;
use crate::session::{Session, SessionState};
use crate::types::SessionId;

/// Outbound lines buffered per session; a peer this far behind is dropped
pub const OUTBOUND_BUFFER_SIZE: usize = 1024;

/// Server-side view of one connection
#[derive(Debug)]
pub struct ClientSession {
    pub id: SessionId,
    pub peer: Option<SocketAddr>,
    pub username: Option<String>,
    pub state: SessionState,
}

impl ClientSession {
    pub fn new(id: SessionId, peer: Option<SocketAddr>) -> Self {
        Self {
            id,
            peer,
            username: None,
            state: SessionState::Connecting,
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state.advance(next) {
            debug!("Session {} ({}) -> {:?}", self.id, self.describe(), next);
        }
    }

    /// Username and peer address for log lines
    fn describe(&self) -> String {
        let peer = self
            .peer
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        match &self.username {
            Some(username) => format!("'{}' from {}", username, peer),
            None => format!("unnamed from {}", peer),
        }
    }
}

/// Handle a new connection
///
/// Reads the username line, registers with the ChatServer, then routes
/// every following line until the transport ends or the server closes
/// this session. `shutdown` only matters while waiting for the username;
/// registered sessions are closed by the ChatServer.
pub async fn handle_connection<S>(
    stream: S,
    peer: Option<SocketAddr>,
    session_id: SessionId,
    cmd_tx: mpsc::Sender<ServerCommand>,
    shutdown: CancellationToken,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let mut session = ClientSession::new(session_id, peer);
    debug!("Session {} accepted ({})", session_id, session.describe());

    let framed = Framed::new(stream, LinesCodec::new());
    let (mut line_sender, mut line_receiver) = framed.split();

    // Handshake: the first line is the username, verbatim
    let first_line = tokio::select! {
        _ = shutdown.cancelled() => {
            session.transition(SessionState::Closed);
            return Err(AppError::ShuttingDown);
        }
        first_line = line_receiver.next() => first_line,
    };
    let username = match first_line {
        Some(Ok(username)) => username,
        Some(Err(e)) => {
            session.transition(SessionState::Closed);
            return Err(e.into());
        }
        None => {
            session.transition(SessionState::Closed);
            return Err(AppError::HandshakeClosed);
        }
    };
    session.username = Some(username.clone());

    // Channel for server -> client lines
    let (line_tx, mut line_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER_SIZE);
    let registered = Session::new(session_id, username, line_tx);
    let closed = registered.close_token();

    if cmd_tx
        .send(ServerCommand::Connect {
            session: registered,
        })
        .await
        .is_err()
    {
        session.transition(SessionState::Closed);
        return Err(AppError::ChannelSend);
    }
    session.transition(SessionState::Active);
    info!("Session {} active ({})", session_id, session.describe());

    // Spawn read task (lines -> ServerCommand)
    let cmd_tx_read = cmd_tx.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(line) = line_receiver.next().await {
            match line {
                Ok(body) => {
                    let cmd = ServerCommand::Chat { session_id, body };
                    if cmd_tx_read.send(cmd).await.is_err() {
                        debug!("Server closed, ending read task for {}", session_id);
                        break;
                    }
                }
                Err(e) => {
                    warn!("Read error for {}: {}", session_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", session_id);
    });

    // Spawn write task (session channel -> socket)
    let mut write_task = tokio::spawn(async move {
        tokio::select! {
            _ = closed.cancelled() => {
                // Abandon whatever is still queued; the peer is not reading
                debug!("Session {} closed by server", session_id);
            }
            _ = async {
                while let Some(line) = line_rx.recv().await {
                    if let Err(e) = line_sender.send(line).await {
                        debug!("Write failed for {}: {}", session_id, e);
                        break;
                    }
                }
                // Every sender is gone or the socket broke; close our side
                let _ = line_sender.close().await;
            } => {}
        }
        debug!("Write task ended for {}", session_id);
    });

    // Whichever side finishes first ends the session
    let write_finished = tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", session_id);
            false
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", session_id);
            read_task.abort();
            true
        }
    };
    session.transition(SessionState::Disconnecting);

    // No-op on the server side if the session was already removed
    let _ = cmd_tx
        .send(ServerCommand::Disconnect { session_id })
        .await;

    // Once the server drops or closes the session the writer ends
    if !write_finished {
        let _ = write_task.await;
    }
    session.transition(SessionState::Closed);
    info!("Session {} closed ({})", session_id, session.describe());

    Ok(())
}
