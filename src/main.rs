//! Chat relay server - Entry Point
//!
//! Binds the listener, starts the ChatServer actor and accepts
//! connections until Ctrl-C.

use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_relay::{Listener, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    // Bind address and log path from command line, or defaults
    let config = ServerConfig::from_args(env::args().skip(1));

    let listener = Listener::bind(&config).await?;
    let closed = listener.run_until_ctrl_c().await?;

    info!("Chat relay stopped ({} session(s) closed)", closed);
    Ok(())
}
