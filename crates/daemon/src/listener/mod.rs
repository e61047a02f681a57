// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and handling
//! each one on its own task. Job runs started by a request outlive the
//! connection that submitted them.

mod jobs;
mod query;
mod workspaces;

use std::sync::Arc;
use std::time::Instant;

use bt_wire::{ProtocolError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::env::{ipc_timeout, PROTOCOL_VERSION};
use crate::lifecycle::DaemonDispatcher;

/// Shared daemon context for all request handlers.
pub struct ListenCtx {
    pub dispatcher: Arc<DaemonDispatcher>,
    /// Default size of history queries
    pub history_limit: usize,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Listener task for accepting socket connections.
pub struct Listener {
    unix: UnixListener,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Listener {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, ctx }
    }

    /// Run the listener loop until the task is dropped, spawning a task per connection.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(e) = handle_connection(reader, writer, &ctx).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!("Unix accept error: {}", e),
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected")
        }
        ConnectionError::Protocol(ProtocolError::Timeout) => {
            warn!("Connection timeout")
        }
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection: one request, one response.
///
/// Read-only requests race against client disconnect so an abandoned query
/// stops early. Mutating requests always run to completion so a CLI timeout
/// cannot leave a half-applied change.
async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let request = bt_wire::read_request(&mut reader, ipc_timeout()).await?;

    // Log queries at debug level (frequent polling), other requests at info
    let response = if let Request::Query { .. } = request {
        debug!(request = ?request, "received query");
        tokio::select! {
            response = handle_request(request, ctx) => response,
            _ = detect_client_disconnect(&mut reader) => {
                debug!("Client disconnected, dropping query");
                return Ok(());
            }
        }
    } else {
        info!(request = ?request, "received request");
        handle_request(request, ctx).await
    };

    debug!("Sending response: {:?}", response);
    bt_wire::write_response(&mut writer, &response, ipc_timeout()).await?;
    Ok(())
}

/// Resolves when the client closes its end (read returns EOF).
async fn detect_client_disconnect<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

/// Handle a single request and return a response.
pub(crate) async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "client version mismatch");
            }
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::Submit { project, task_stream, description } => {
            jobs::handle_submit(ctx, project, task_stream, description).await
        }

        Request::JobCancel { id } => jobs::handle_cancel(ctx, &id),

        Request::WorkspaceRemove { project, task_stream } => {
            workspaces::handle_remove(ctx, &project, &task_stream).await
        }

        Request::WorkspaceRelease { project, task_stream } => {
            workspaces::handle_release(ctx, &project, &task_stream).await
        }

        Request::Query { query } => query::handle_query(ctx, query).await,

        Request::Status => query::handle_status(ctx).await,

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

#[cfg(test)]
mod test_fixtures;

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
