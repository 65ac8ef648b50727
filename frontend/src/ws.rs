//! WebSocket client for the backend push channel.
//!
//! Supports both WASM (using gloo-net) and native (using tokio-tungstenite) platforms.
//! The client owns one connection task; [`LiveSyncClient::stop`] (or dropping
//! the client) aborts it.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use fazantix_types::ServerMessage;
use futures_util::future::{AbortHandle, Abortable};
use futures_util::stream::{Stream, StreamExt};

use crate::state::{AppMessage, ConnectionState};
use crate::sync::{ReconnectMachine, SyncCommand, SyncError};

/// Callback asking the UI to redraw after a message was queued.
pub type Repaint = Arc<dyn Fn() + Send + Sync>;

#[cfg(not(target_arch = "wasm32"))]
pub type FrameStream = futures_util::stream::BoxStream<'static, Result<String, SyncError>>;
#[cfg(target_arch = "wasm32")]
pub type FrameStream = futures_util::stream::LocalBoxStream<'static, Result<String, SyncError>>;

#[cfg(not(target_arch = "wasm32"))]
pub type ConnectFuture = futures_util::future::BoxFuture<'static, Result<FrameStream, SyncError>>;
#[cfg(target_arch = "wasm32")]
pub type ConnectFuture =
    futures_util::future::LocalBoxFuture<'static, Result<FrameStream, SyncError>>;

#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSendSync for T {}

/// Opens a fresh connection and yields its text frames.
pub trait Connector: MaybeSendSync {
    fn connect(&self, url: &str) -> ConnectFuture;
}

/// Derive the push channel URL from the server root by upgrading the scheme.
pub fn websocket_url(server_url: &str) -> String {
    let root = server_url.trim_end_matches('/');
    let upgraded = if let Some(rest) = root.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = root.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if root.starts_with("ws://") || root.starts_with("wss://") {
        root.to_string()
    } else {
        format!("ws://{}", root)
    };
    format!("{}/api/ws", upgraded)
}

/// Resolve once the first frame arrives, keeping it at the head of the stream.
///
/// Browser sockets are returned before the handshake completes, so the link
/// only counts as open after the server has sent something.
pub async fn await_first_frame<S>(
    mut frames: S,
) -> Result<impl Stream<Item = Result<String, SyncError>>, SyncError>
where
    S: Stream<Item = Result<String, SyncError>> + Unpin,
{
    match frames.next().await {
        Some(Ok(first)) => {
            tracing::info!("Received first frame from backend - connection confirmed");
            Ok(futures_util::stream::iter([Ok(first)]).chain(frames))
        }
        Some(Err(e)) => Err(SyncError::Connect(e.to_string())),
        None => Err(SyncError::Connect(
            "closed before the first frame".to_string(),
        )),
    }
}

/// Live sync client owning the connection to `/api/ws`.
pub struct LiveSyncClient {
    url: String,
    reconnect_delay: Duration,
    connector: Arc<dyn Connector>,
    abort: Option<AbortHandle>,
}

impl LiveSyncClient {
    /// Create a client using the platform WebSocket implementation.
    pub fn new(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self::with_connector(url, reconnect_delay, Arc::new(PlatformConnector))
    }

    pub fn with_connector(
        url: impl Into<String>,
        reconnect_delay: Duration,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            url: url.into(),
            reconnect_delay,
            connector,
            abort: None,
        }
    }

    /// Whether a connection task is running.
    pub fn is_running(&self) -> bool {
        self.abort.as_ref().is_some_and(|handle| !handle.is_aborted())
    }

    /// Spawn the connection loop. Reconnects forever until stopped.
    ///
    /// Decoded messages and state changes are sent to `tx`; `repaint` is
    /// called after each one.
    pub fn start(&mut self, tx: Sender<AppMessage>, repaint: Repaint) {
        if self.is_running() {
            tracing::debug!("Live sync client already running");
            return;
        }
        tracing::info!("Connecting to WebSocket: {}", self.url);

        let (handle, registration) = AbortHandle::new_pair();
        let task = connection_loop(
            self.url.clone(),
            self.reconnect_delay,
            self.connector.clone(),
            tx,
            repaint,
        );
        let task = Abortable::new(task, registration);
        crate::app::spawn_task(async move {
            if task.await.is_err() {
                tracing::debug!("Live sync connection loop aborted");
            }
        });
        self.abort = Some(handle);
    }

    /// Stop the connection loop and any pending reconnect.
    pub fn stop(&mut self) {
        if let Some(handle) = self.abort.take() {
            tracing::info!("Disconnecting from WebSocket");
            handle.abort();
        }
    }
}

impl Drop for LiveSyncClient {
    fn drop(&mut self) {
        self.stop();
    }
}

fn notify(tx: &Sender<AppMessage>, repaint: &Repaint, message: AppMessage) {
    let _ = tx.send(message);
    repaint();
}

/// Decode a text frame and forward it. Malformed frames are logged and dropped.
fn forward_frame(text: &str, tx: &Sender<AppMessage>, repaint: &Repaint) {
    tracing::trace!("Received WebSocket message: {}", text);
    match ServerMessage::decode(text) {
        Ok(message) => {
            tracing::trace!("Parsed WebSocket message: {}", message.description());
            notify(tx, repaint, AppMessage::Server(message));
        }
        Err(err) => {
            tracing::error!("Failed to parse WebSocket message: {}", err);
        }
    }
}

async fn connection_loop(
    url: String,
    delay: Duration,
    connector: Arc<dyn Connector>,
    tx: Sender<AppMessage>,
    repaint: Repaint,
) {
    let mut machine = ReconnectMachine::new(delay);
    let mut command = machine.start();

    loop {
        match command {
            SyncCommand::Connect { attempt } => {
                notify(
                    &tx,
                    &repaint,
                    AppMessage::ConnectionStateChanged(ConnectionState::Connecting { attempt }),
                );
                tracing::info!("WebSocket connection attempt {} to: {}", attempt, url);

                match connector.connect(&url).await {
                    Ok(mut frames) => {
                        tracing::info!("Connected to websocket");
                        machine.on_open();
                        notify(
                            &tx,
                            &repaint,
                            AppMessage::ConnectionStateChanged(ConnectionState::Open),
                        );

                        while let Some(frame) = frames.next().await {
                            match frame {
                                Ok(text) => forward_frame(&text, &tx, &repaint),
                                Err(SyncError::Closed) => {
                                    tracing::info!("WebSocket closed by server");
                                    break;
                                }
                                Err(e) => {
                                    tracing::error!("WebSocket error: {}", e);
                                    break;
                                }
                            }
                        }
                        tracing::error!("Websocket disconnected");
                    }
                    Err(e) => {
                        tracing::error!("Failed to connect WebSocket: {}", e);
                    }
                }
                command = machine.on_closed();
            }
            SyncCommand::ScheduleReconnect(wait) => {
                notify(
                    &tx,
                    &repaint,
                    AppMessage::ConnectionStateChanged(ConnectionState::Closed { retry_in: wait }),
                );
                tracing::info!("Waiting {}ms before reconnection attempt...", wait.as_millis());
                sleep(wait).await;
                command = machine.on_timer_elapsed();
            }
            SyncCommand::Idle => return,
        }
    }
}

// ============================================================================
// WASM Implementation (using gloo-net)
// ============================================================================

#[cfg(target_arch = "wasm32")]
async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

/// Browser WebSocket.
#[cfg(target_arch = "wasm32")]
pub struct PlatformConnector;

#[cfg(target_arch = "wasm32")]
impl Connector for PlatformConnector {
    fn connect(&self, url: &str) -> ConnectFuture {
        use gloo_net::websocket::{futures::WebSocket, Message};

        let url = url.to_string();
        Box::pin(async move {
            let ws = WebSocket::open(&url).map_err(|e| SyncError::Connect(format!("{:?}", e)))?;
            let frames = ws
                .filter_map(|msg| async move {
                    match msg {
                        Ok(Message::Text(text)) => Some(Ok(text)),
                        Ok(Message::Bytes(_)) => {
                            tracing::trace!("Received binary message (ignored)");
                            None
                        }
                        Err(e) => Some(Err(SyncError::Transport(format!("{:?}", e)))),
                    }
                })
                .boxed_local();
            tracing::info!("WebSocket handshake initiated, waiting for the first frame...");
            let frames = await_first_frame(frames).await?;
            Ok(frames.boxed_local())
        })
    }
}

// ============================================================================
// Native Implementation (using tokio-tungstenite)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// tokio-tungstenite WebSocket.
#[cfg(not(target_arch = "wasm32"))]
pub struct PlatformConnector;

#[cfg(not(target_arch = "wasm32"))]
impl Connector for PlatformConnector {
    fn connect(&self, url: &str) -> ConnectFuture {
        use tokio_tungstenite::{connect_async, tungstenite::Message};

        let url = url.to_string();
        Box::pin(async move {
            let (ws_stream, _) = connect_async(url.as_str())
                .await
                .map_err(|e| SyncError::Connect(e.to_string()))?;
            let frames = ws_stream.filter_map(|msg| async move {
                match msg {
                    Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                    Ok(Message::Close(_)) => Some(Err(SyncError::Closed)),
                    Ok(Message::Binary(_)) => {
                        tracing::trace!("Received binary message (ignored)");
                        None
                    }
                    // Pongs are answered by tokio-tungstenite
                    Ok(_) => None,
                    Err(e) => Some(Err(SyncError::Transport(e.to_string()))),
                }
            });
            Ok(frames.boxed())
        })
    }
}
