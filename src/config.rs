//! Command-line configuration
//!
//! Positional arguments with fixed defaults:
//! - server: `chat_relay [ADDR] [LOG_PATH]`
//! - client: `chat_client [ADDR]`

use std::path::PathBuf;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";

/// Default chat log file
pub const DEFAULT_LOG_PATH: &str = "log.txt";

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind
    pub addr: String,
    /// Chat log file, opened in append mode
    pub log_path: PathBuf,
}

impl ServerConfig {
    /// Build from arguments, program name already skipped
    pub fn from_args<I>(mut args: I) -> Self
    where
        I: Iterator<Item = String>,
    {
        let addr = args.next().unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let log_path = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));
        Self { addr, log_path }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_args(std::iter::empty())
    }
}

/// Console client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server address to connect to
    pub addr: String,
}

impl ClientConfig {
    /// Build from arguments, program name already skipped
    pub fn from_args<I>(mut args: I) -> Self
    where
        I: Iterator<Item = String>,
    {
        Self {
            addr: args.next().unwrap_or_else(|| DEFAULT_ADDR.to_string()),
        }
    }
}
