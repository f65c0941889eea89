//! Listener: bind, accept loop and shutdown
//!
//! Owns the listening socket, the session id allocator, the command
//! channel into the ChatServer actor and every connection handler task.

use std::future::Future;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::log::ChatLog;
use crate::server::{ChatServer, ServerCommand};
use crate::types::{SessionId, SessionIds};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

/// A bound chat server, ready to accept
pub struct Listener {
    listener: TcpListener,
    session_ids: SessionIds,
    cmd_tx: mpsc::Sender<ServerCommand>,
    log: ChatLog,
}

impl Listener {
    /// Open the log, bind the address and start the ChatServer actor
    ///
    /// Only a failure here is fatal; nothing is left running on error.
    pub async fn bind(config: &ServerConfig) -> Result<Self, AppError> {
        let log = ChatLog::open(&config.log_path)?;
        log.append("Setting up server...");

        let listener = match TcpListener::bind(&config.addr).await {
            Ok(listener) => listener,
            Err(source) => {
                log.append("Error setting up server.");
                error!("Cannot bind {}: {}", config.addr, source);
                return Err(AppError::Bind {
                    addr: config.addr.clone(),
                    source,
                });
            }
        };

        log.append("Open for user connections.");
        info!("Chat relay listening on {}", listener.local_addr()?);

        let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        tokio::spawn(ChatServer::new(cmd_rx, log.clone()).run());

        Ok(Self {
            listener,
            session_ids: SessionIds::new(),
            cmd_tx,
            log,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// Then stops accepting, has the ChatServer close every session and
    /// flush the log, and waits for every handler task to finish,
    /// including those still waiting for a username. Returns how many
    /// registered sessions were closed.
    pub async fn run_until<F>(self, shutdown: F) -> Result<usize, AppError>
    where
        F: Future<Output = ()> + Send,
    {
        let Listener {
            listener,
            session_ids,
            cmd_tx,
            log,
        } = self;
        tokio::pin!(shutdown);

        let handshakes = CancellationToken::new();
        let mut handlers = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => {
                    handle_accept_result(accepted, &session_ids, &cmd_tx, &handshakes, &log, &mut handlers);
                }
                Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
            }
        }

        info!("Shutting down, no longer accepting connections");
        drop(listener);
        handshakes.cancel();

        let (done, closed) = oneshot::channel();
        cmd_tx
            .send(ServerCommand::Shutdown { done })
            .await
            .map_err(|_| AppError::ChannelSend)?;
        let closed = closed.await.map_err(|_| AppError::ChannelSend)?;

        debug!("Waiting for {} handler task(s)", handlers.len());
        while handlers.join_next().await.is_some() {}

        info!("Shutdown complete, {} session(s) closed", closed);
        Ok(closed)
    }

    /// Accept connections until Ctrl-C
    pub async fn run_until_ctrl_c(self) -> Result<usize, AppError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to install Ctrl-C handler: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}

fn handle_accept_result(
    result: std::io::Result<(TcpStream, SocketAddr)>,
    session_ids: &SessionIds,
    cmd_tx: &mpsc::Sender<ServerCommand>,
    handshakes: &CancellationToken,
    log: &ChatLog,
    handlers: &mut JoinSet<()>,
) {
    match result {
        Ok((stream, peer)) => {
            let session_id = session_ids.next_id();
            info!("New connection from {} as session {}", peer, session_id);

            handlers.spawn(serve_connection(
                stream,
                Some(peer),
                session_id,
                cmd_tx.clone(),
                handshakes.clone(),
                log.clone(),
            ));
        }
        Err(e) => {
            error!("Failed to accept connection: {}", e);
        }
    }
}

/// Run one connection handler, logging a failed handshake
///
/// Being cut off by shutdown is not a connection error.
async fn serve_connection<S>(
    stream: S,
    peer: Option<SocketAddr>,
    session_id: SessionId,
    cmd_tx: mpsc::Sender<ServerCommand>,
    handshakes: CancellationToken,
    log: ChatLog,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    match handle_connection(stream, peer, session_id, cmd_tx, handshakes).await {
        Ok(()) => {}
        Err(AppError::ShuttingDown) => {
            debug!("Session {} dropped during shutdown", session_id);
        }
        Err(e) => {
            warn!("Session {} ended with error: {}", session_id, e);
            log.append("Error connecting client.");
        }
    }
}
