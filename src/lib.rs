//! Line-based TCP Chat Relay Library
//!
//! A small chat server: clients connect over TCP, send a username line,
//! then every following line is either a command or chat.
//!
//! # Features
//! - Public broadcast to every connected user (sender included)
//! - Private messages with `@username text`
//! - `/online` lists connected users in join order
//! - `/logout` leaves the chat
//! - Join and departure notices
//! - Append-only chat log of status lines and public chat
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` owns the session registry and performs all delivery
//! - Each connection has a `handler` task communicating with the server
//! - No locks around the registry - membership changes and fan-out are
//!   serialized by the actor's command loop
//!
//! # Example
//! ```ignore
//! use chat_relay::{Listener, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let listener = Listener::bind(&config).await.unwrap();
//!     listener.run_until_ctrl_c().await.unwrap();
//! }
//! ```

pub mod config;
pub mod console;
pub mod delivery;
pub mod error;
pub mod handler;
pub mod listener;
pub mod log;
pub mod message;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use config::{ClientConfig, ServerConfig};
pub use delivery::Delivery;
pub use error::{AppError, SendError};
pub use handler::{handle_connection, ClientSession};
pub use listener::Listener;
pub use log::ChatLog;
pub use message::ChatMessage;
pub use registry::SessionRegistry;
pub use router::{classify, Command};
pub use server::{ChatServer, ServerCommand};
pub use session::{Session, SessionState};
pub use types::{SessionId, SessionIds};
