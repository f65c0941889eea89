//! Error types for the chat relay
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Application-level errors
///
/// Everything except `Bind` is scoped to a single connection and ends
/// only that session.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cannot bind the listening endpoint (fatal to startup)
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Line framing error on a client transport
    #[error("Line codec error: {0}")]
    Lines(#[from] LinesCodecError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection closed before the username line arrived
    #[error("Connection closed before handshake")]
    HandshakeClosed,

    /// Channel send error (the ChatServer actor has stopped)
    #[error("Channel send error")]
    ChannelSend,

    /// Server shut down before the handshake finished
    #[error("Server shutting down")]
    ShuttingDown,
}

/// Message send errors
///
/// Delivery never waits on a session: a closed channel means its writer
/// task gave up on the transport, a full one means the peer stopped
/// reading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The outbound buffer is full
    #[error("Outbound buffer full")]
    Full,
}
