//! Inter-process communication between tempo and tempoctl
//!
//! We use Unix domain sockets for local IPC. Each connection carries a
//! single exchange: one JSON-encoded [`Command`] line from the client,
//! answered by one JSON-encoded [`Response`] line from the server.

use std::path::PathBuf;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tempo_core::SessionSnapshot;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Commands that tempoctl can send to tempo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Skip,
    Reset,
    Status,
}

impl Command {
    /// Whether the command changes the session clock.
    pub fn mutates(self) -> bool {
        !matches!(self, Command::Status)
    }
}

/// Responses from tempo back to tempoctl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// The command was applied; carries the clock state afterwards.
    Ok(SessionSnapshot),
    Error(String),
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection closed before a message arrived")]
    Closed,

    #[error("Connection refused - is tempo running? (socket: {0})")]
    ConnectionRefused(PathBuf),
}

/// Environment variable that overrides the socket location.
pub const SOCKET_ENV: &str = "TEMPO_SOCKET";

const SOCKET_NAME: &str = "tempo.sock";

/// Where the control socket lives.
///
/// `$TEMPO_SOCKET` wins, then `$XDG_RUNTIME_DIR/tempo.sock`, then the
/// system temp directory.
pub fn socket_path() -> PathBuf {
    if let Some(path) = std::env::var_os(SOCKET_ENV) {
        return PathBuf::from(path);
    }
    match std::env::var_os("XDG_RUNTIME_DIR") {
        Some(dir) => PathBuf::from(dir).join(SOCKET_NAME),
        None => std::env::temp_dir().join(SOCKET_NAME),
    }
}

/// Write `message` as a single JSON line and flush.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one JSON line. Fails with [`IpcError::Closed`] on EOF.
pub async fn read_message<R, T>(reader: &mut R) -> Result<T, IpcError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(IpcError::Closed);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}
