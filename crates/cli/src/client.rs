// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-socket client for the bt daemon.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bt_wire::{ErrorKind, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (no socket at {})", .0.display())]
    DaemonNotRunning(PathBuf),

    #[error("could not resolve daemon state directory: {0}")]
    StateDir(String),

    #[error("connection to daemon failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },

    #[error("unexpected response from daemon: {0}")]
    UnexpectedResponse(String),
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Client for the daemon serving this user's state directory.
    pub fn from_env() -> Result<Self, ClientError> {
        let state_dir =
            bt_daemon::env::state_dir().map_err(|e| ClientError::StateDir(e.to_string()))?;
        Ok(Self::new(state_dir.join("daemon.sock"), bt_daemon::env::ipc_timeout()))
    }

    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { socket_path: socket_path.into(), timeout }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send one request and wait for its response.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused
                ) =>
            {
                return Err(ClientError::DaemonNotRunning(self.socket_path.clone()));
            }
            Err(e) => return Err(ClientError::Io(e)),
        };
        let (mut reader, mut writer) = stream.into_split();
        bt_wire::write_request(&mut writer, request, self.timeout).await?;
        Ok(bt_wire::read_response(&mut reader, self.timeout).await?)
    }

    /// Turn an error or unexpected response into a `ClientError`.
    pub(crate) fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message, kind } => Err(ClientError::Rejected { kind, message }),
            other => Err(ClientError::UnexpectedResponse(format!("{other:?}"))),
        }
    }
}

#[path = "client_queries.rs"]
mod queries;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
