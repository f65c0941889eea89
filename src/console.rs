//! Interactive console client
//!
//! Connects to the relay, sends the username, then forwards stdin lines
//! verbatim while printing whatever the server pushes.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::AppError;

/// Typed locally to leave the chat
pub const LOGOUT: &str = "/logout";

/// Printed once connected
pub fn intro_message() -> String {
    let mut intro = String::new();
    intro.push_str("Welcome to the server.\n\n");
    intro.push_str("Send a message prepended by @username to send a private message.\n");
    intro.push_str("Type /logout to disconnect from the server.\n");
    intro.push_str("Type /online to see currently online users.\n");
    intro
}

/// Run the console client against stdin/stdout
pub async fn run(config: &ClientConfig) -> Result<(), AppError> {
    let mut input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    output.write_all(b" * What's your name? ").await?;
    output.flush().await?;
    let mut username = String::new();
    if input.read_line(&mut username).await? == 0 {
        return Ok(());
    }
    let username = username.trim_end_matches(['\r', '\n']).to_string();

    let stream = TcpStream::connect(&config.addr).await?;
    debug!("Connected to {}", config.addr);

    chat(stream, &username, input, output).await
}

/// Drive one chat connection
///
/// Generic over the transport and console so it can run against
/// in-memory streams.
pub async fn chat<S, R, W>(stream: S, username: &str, input: R, output: W) -> Result<(), AppError>
where
    S: tokio::io::AsyncRead + AsyncWrite + Send + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let framed = Framed::new(stream, LinesCodec::new());
    let (mut line_sender, mut line_receiver) = framed.split();

    line_sender.send(username.to_string()).await?;

    // Print server lines until the server closes the connection
    let mut printer = tokio::spawn(async move {
        let mut output = output;
        let _ = output.write_all(format!(" * {}\n", intro_message()).as_bytes()).await;
        let _ = output.flush().await;
        while let Some(Ok(line)) = line_receiver.next().await {
            if output.write_all(format!("{}\n > ", line).as_bytes()).await.is_err() {
                break;
            }
            let _ = output.flush().await;
        }
    });

    let mut lines = input.lines();
    loop {
        tokio::select! {
            _ = &mut printer => {
                debug!("Server closed the connection");
                return Ok(());
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                line_sender.send(line.clone()).await?;
                if line == LOGOUT {
                    break;
                }
            }
        }
    }

    let _ = line_sender.close().await;
    let _ = printer.await;
    Ok(())
}
