//! Console chat client - Entry Point

use std::env;

use tracing_subscriber::EnvFilter;

use chat_relay::{console, ClientConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Quiet by default so log lines don't interleave with the chat
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_args(env::args().skip(1));
    console::run(&config).await?;
    Ok(())
}
