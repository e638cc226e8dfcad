//! Unix domain socket server for remote control
//!
//! Provides request-response communication and push notifications of game
//! events to subscribed clients. Player actions are forwarded to the
//! session loop; the server never touches game state itself.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::events::GameEvent;
use crate::session::{Command, SessionStatus};

use super::protocol::{DaemonStatus, Notification, Request, Response, MAX_MESSAGE_LEN};

/// Everything a client handler needs
#[derive(Clone)]
struct ClientContext {
    command_tx: mpsc::Sender<Command>,
    status_rx: watch::Receiver<SessionStatus>,
    event_tx: broadcast::Sender<GameEvent>,
    start_time: Instant,
}

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: UnixListener,
    context: ClientContext,
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Bind the control socket
    pub fn new(
        socket_path: &Path,
        command_tx: mpsc::Sender<Command>,
        status_rx: watch::Receiver<SessionStatus>,
        event_tx: broadcast::Sender<GameEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "control socket listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            context: ClientContext {
                command_tx,
                status_rx,
                event_tx,
                start_time: Instant::now(),
            },
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let context = self.context.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, context) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(stream: UnixStream, context: ClientContext) -> Result<()> {
        let (mut reader, writer) = stream.into_split();
        let (out_tx, out_rx) = mpsc::channel::<Vec<u8>>(64);
        let writer_task = tokio::spawn(Self::write_frames(writer, out_rx));
        let mut forwarder: Option<JoinHandle<()>> = None;

        loop {
            let body = match Self::read_frame(&mut reader).await? {
                Some(body) => body,
                None => break,
            };

            let (response, subscribe) = match serde_json::from_slice::<Request>(&body) {
                Ok(request) => {
                    debug!(?request, "received request");
                    let subscribe = matches!(request, Request::Subscribe);
                    (Self::process_request(request, &context).await, subscribe)
                }
                Err(e) => {
                    warn!(?e, "malformed request");
                    (
                        Response::Error {
                            code: "bad_request".to_string(),
                            message: e.to_string(),
                        },
                        false,
                    )
                }
            };

            if out_tx.send(encode(&response)?).await.is_err() {
                break;
            }

            if subscribe && forwarder.is_none() {
                debug!("client subscribed to notifications");
                forwarder = Some(tokio::spawn(Self::forward_events(
                    context.event_tx.subscribe(),
                    out_tx.clone(),
                )));
            }
        }

        if let Some(forwarder) = forwarder {
            forwarder.abort();
        }
        drop(out_tx);
        let _ = writer_task.await;

        Ok(())
    }

    /// Read one length-prefixed frame; `None` on disconnect or oversize
    async fn read_frame(reader: &mut OwnedReadHalf) -> Result<Option<Vec<u8>>> {
        let mut len_buf = [0u8; 4];
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("client disconnected");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_LEN {
            warn!(len, "message too large, disconnecting");
            return Ok(None);
        }

        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).await?;
        Ok(Some(body))
    }

    /// Drain encoded frames onto the socket
    async fn write_frames(mut writer: OwnedWriteHalf, mut out_rx: mpsc::Receiver<Vec<u8>>) {
        while let Some(frame) = out_rx.recv().await {
            if let Err(e) = writer.write_all(&frame).await {
                debug!(?e, "client write failed");
                break;
            }
        }
    }

    /// Push game events to a subscribed client
    async fn forward_events(mut event_rx: broadcast::Receiver<GameEvent>, out_tx: mpsc::Sender<Vec<u8>>) {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    let frame = match encode(&Notification::Event { event }) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(?e, "failed to encode notification");
                            continue;
                        }
                    };
                    if out_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Process a request and return a response
    async fn process_request(request: Request, context: &ClientContext) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::Subscribe => Response::Subscribed,

            Request::GetStatus => {
                let session = context.status_rx.borrow().clone();
                Response::Status(DaemonStatus {
                    uptime_secs: context.start_time.elapsed().as_secs(),
                    session,
                })
            }

            other => {
                let Some(action) = other.into_action() else {
                    return unavailable();
                };

                let (command, reply) = Command::new(action);
                if context.command_tx.send(command).await.is_err() {
                    return unavailable();
                }

                match reply.await {
                    Ok(Ok(status)) => Response::Accepted { status },
                    Ok(Err(e)) => Response::Error {
                        code: e.code().to_string(),
                        message: e.to_string(),
                    },
                    Err(_) => unavailable(),
                }
            }
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("control socket shutdown complete");
    }
}

fn unavailable() -> Response {
    Response::Error {
        code: "unavailable".to_string(),
        message: "session is not running".to_string(),
    }
}

/// Encode a length-prefixed JSON message
fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(msg)?;
    let mut frame = Vec::with_capacity(body.len() + 4);
    frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}
