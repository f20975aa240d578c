//! Unix domain socket server for IPC
//!
//! The server never touches the session clock. Commands that change it are
//! queued for the UI loop, which applies them and replies on a oneshot
//! channel; `Status` is answered from the latest snapshot the loop
//! published.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tempo_core::SessionSnapshot;
use tempo_ipc::{read_message, write_message, Command, IpcError, Response};
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

/// A command waiting for the UI loop.
#[derive(Debug)]
pub struct ControlRequest {
    pub command: Command,
    pub reply: oneshot::Sender<Response>,
}

impl ControlRequest {
    pub fn respond(self, snapshot: SessionSnapshot) {
        if self.reply.send(Response::Ok(snapshot)).is_err() {
            debug!(command = ?self.command, "client went away before the reply");
        }
    }
}

#[derive(Clone)]
pub struct ControlHandle {
    requests: mpsc::Sender<ControlRequest>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl ControlHandle {
    pub fn new(
        requests: mpsc::Sender<ControlRequest>,
        snapshots: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self {
            requests,
            snapshots,
        }
    }

    pub async fn execute(&self, command: Command) -> Response {
        if !command.mutates() {
            return Response::Ok(self.snapshots.borrow().clone());
        }

        let (reply, answer) = oneshot::channel();
        if self
            .requests
            .send(ControlRequest { command, reply })
            .await
            .is_err()
        {
            return shutting_down();
        }
        answer.await.unwrap_or_else(|_| shutting_down())
    }
}

fn shutting_down() -> Response {
    Response::Error("tempo is shutting down".to_string())
}

/// Removes the socket file when dropped.
#[derive(Debug)]
pub struct SocketFile(PathBuf);

impl Drop for SocketFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// Bind the control socket, clearing a stale socket file left by a crash.
///
/// Must be called from within a tokio runtime.
pub fn bind(path: &Path) -> Result<(UnixListener, SocketFile)> {
    if path.exists() {
        if std::os::unix::net::UnixStream::connect(path).is_ok() {
            bail!("Another tempo is already listening on {:?}", path);
        }
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove stale socket {:?}", path))?;
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let listener = UnixListener::bind(path)
        .with_context(|| format!("Failed to bind control socket {:?}", path))?;
    info!("IPC server listening on {}", path.display());
    Ok((listener, SocketFile(path.to_path_buf())))
}

pub async fn serve(listener: UnixListener, handle: ControlHandle) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let handle = handle.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, handle).await {
                        warn!("Error handling client: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(stream: UnixStream, handle: ControlHandle) -> Result<(), IpcError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let command: Command = match read_message(&mut reader).await {
        Ok(command) => command,
        Err(IpcError::Serialization(e)) => {
            let response = Response::Error(format!("Invalid command: {e}"));
            write_message(&mut writer, &response).await?;
            return Err(IpcError::Serialization(e));
        }
        Err(e) => return Err(e),
    };
    debug!(?command, "control command received");

    let response = handle.execute(command).await;
    write_message(&mut writer, &response).await
}
