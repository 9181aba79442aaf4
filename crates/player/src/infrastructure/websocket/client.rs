//! WebSocket transport channel using tokio-tungstenite
//!
//! One background task per `connect()` owns the socket, the retry loop and
//! the heartbeat timer. The session only ever sees [`ChannelEvent`]s.

use std::future;
use std::sync::atomic::AtomicU8;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use pixeltales_domain::SceneSnapshot;
use pixeltales_shared::{encode_client_message, parse_server_message, ClientMessage, ServerMessage};

use crate::infrastructure::error::TransportError;
use crate::infrastructure::messaging::{
    set_connection_state, ConnectionState, ConnectionStateObserver, ConnectionStatus,
};
use crate::infrastructure::websocket::core::{RetryDecision, RetryPolicy, RetryState};
use crate::infrastructure::websocket::shared::TransportConfig;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Bound on the close handshake when the client disconnects
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// `disconnect()` was called
    ClientRequested,
    /// The server sent a close frame
    ServerClosed,
    /// The socket failed or ended without a close frame
    ConnectionLost(String),
    /// Reconnection gave up; terminal until `connect()` is called again
    RetriesExhausted { attempts: u32 },
}

/// Everything the channel reports to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    StateChanged(ConnectionStatus),
    Connected,
    Disconnected {
        reason: DisconnectReason,
    },
    ConnectError {
        error: String,
        attempt: u32,
        max_attempts: u32,
    },
    SnapshotPushed(Box<SceneSnapshot>),
}

/// Held while checking cancellation and publishing state or events, so a
/// worker report can never land after `disconnect()` has published its own.
#[derive(Clone, Default)]
struct ReportGate(Arc<Mutex<()>>);

impl ReportGate {
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reconnecting WebSocket channel to the scene server.
pub struct TransportChannel {
    config: TransportConfig,
    events: mpsc::UnboundedSender<ChannelEvent>,
    state: Arc<AtomicU8>,
    cancel: CancellationToken,
    gate: ReportGate,
    task: Option<JoinHandle<()>>,
}

impl TransportChannel {
    pub fn new(config: TransportConfig, events: mpsc::UnboundedSender<ChannelEvent>) -> Self {
        Self {
            config,
            events,
            state: Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8())),
            cancel: CancellationToken::new(),
            gate: ReportGate::default(),
            task: None,
        }
    }

    pub fn url(&self) -> &str {
        self.config.url.as_str()
    }

    pub fn state(&self) -> ConnectionState {
        self.status_observer().state()
    }

    pub fn status_observer(&self) -> ConnectionStateObserver {
        ConnectionStateObserver::new(Arc::clone(&self.state))
    }

    /// Start connecting in the background.
    ///
    /// No-op while connected or while attempts are in flight. After the
    /// channel has failed terminally this starts a fresh retry sequence.
    /// Must be called from within a tokio runtime.
    pub fn connect(&mut self) {
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            tracing::debug!(state = %self.state(), "connect() ignored; channel already active");
            return;
        }

        self.cancel = CancellationToken::new();
        let worker = ConnectionWorker {
            config: self.config.clone(),
            events: self.events.clone(),
            state: Arc::clone(&self.state),
            cancel: self.cancel.clone(),
            gate: self.gate.clone(),
        };
        self.task = Some(tokio::spawn(worker.run()));
    }

    /// Tear down the connection and cancel any pending reconnection.
    ///
    /// The retry counter lives in the cancelled task, so the next
    /// `connect()` starts from zero.
    pub fn disconnect(&mut self) {
        let gate = self.gate.clone();
        let _reporting = gate.lock();
        self.cancel.cancel();
        // The worker still sends a close frame once it sees the cancellation
        let was_active = self
            .task
            .take()
            .is_some_and(|task| !task.is_finished());

        let previous = set_connection_state(&self.state, ConnectionState::Disconnected);
        if !was_active && previous == ConnectionState::Disconnected {
            return;
        }

        tracing::info!(url = %self.config.url, "Disconnected on request");
        self.emit(ChannelEvent::StateChanged(ConnectionStatus::new(
            ConnectionState::Disconnected,
            0,
            self.config.max_reconnect_attempts,
        )));
        self.emit(ChannelEvent::Disconnected {
            reason: DisconnectReason::ClientRequested,
        });
    }

    fn emit(&self, event: ChannelEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Channel event receiver dropped");
        }
    }
}

impl Drop for TransportChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

enum Attempt {
    Open(Box<Socket>),
    Failed(TransportError),
    Cancelled,
}

enum SessionEnd {
    ServerClosed,
    Lost(TransportError),
    Cancelled,
}

/// State owned by the background connection task.
struct ConnectionWorker {
    config: TransportConfig,
    events: mpsc::UnboundedSender<ChannelEvent>,
    state: Arc<AtomicU8>,
    cancel: CancellationToken,
    gate: ReportGate,
}

impl ConnectionWorker {
    async fn run(self) {
        let mut retry = RetryState::new(RetryPolicy::from(&self.config));
        self.set_state(ConnectionState::Connecting, &retry);

        loop {
            let decision = match self.attempt().await {
                Attempt::Cancelled => return,
                Attempt::Failed(error) => {
                    let decision = retry.on_connect_error();
                    tracing::warn!(
                        url = %self.config.url,
                        attempt = retry.failures(),
                        max_attempts = retry.max_attempts(),
                        error = %error,
                        "Connect attempt failed"
                    );
                    self.emit(ChannelEvent::ConnectError {
                        error: error.to_string(),
                        attempt: retry.failures(),
                        max_attempts: retry.max_attempts(),
                    });
                    decision
                }
                Attempt::Open(socket) => {
                    retry.on_connected();
                    tracing::info!(url = %self.config.url, "Connected to scene server");
                    self.set_state(ConnectionState::Connected, &retry);
                    self.emit(ChannelEvent::Connected);

                    match self.pump(*socket, &mut retry).await {
                        SessionEnd::Cancelled => return,
                        SessionEnd::ServerClosed => {
                            tracing::info!("Server closed connection");
                            self.emit(ChannelEvent::Disconnected {
                                reason: DisconnectReason::ServerClosed,
                            });
                            retry.on_server_close()
                        }
                        SessionEnd::Lost(error) => {
                            tracing::warn!(error = %error, "Connection lost");
                            self.emit(ChannelEvent::Disconnected {
                                reason: DisconnectReason::ConnectionLost(error.to_string()),
                            });
                            retry.on_connection_lost()
                        }
                    }
                }
            };

            match decision {
                RetryDecision::GiveUp => {
                    tracing::error!(
                        attempts = retry.failures(),
                        "Max reconnection attempts reached, giving up"
                    );
                    self.set_state(ConnectionState::Failed, &retry);
                    self.emit(ChannelEvent::Disconnected {
                        reason: DisconnectReason::RetriesExhausted {
                            attempts: retry.failures(),
                        },
                    });
                    return;
                }
                RetryDecision::RetryNow => {
                    tracing::info!("Reconnecting immediately after server reset");
                    self.set_state(ConnectionState::Reconnecting, &retry);
                }
                RetryDecision::RetryAfter(delay) => {
                    tracing::info!(
                        attempt = retry.failures() + 1,
                        max_attempts = retry.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Scheduling reconnection"
                    );
                    self.set_state(ConnectionState::Reconnecting, &retry);
                    tokio::select! {
                        _ = self.cancel.cancelled() => return,
                        _ = time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    async fn attempt(&self) -> Attempt {
        let timeout = self.config.connect_timeout;
        let connect = time::timeout(timeout, connect_async(self.config.url.as_str()));

        tokio::select! {
            _ = self.cancel.cancelled() => Attempt::Cancelled,
            result = connect => match result {
                Ok(Ok((socket, _response))) => Attempt::Open(Box::new(socket)),
                Ok(Err(e)) => Attempt::Failed(TransportError::Connect(e)),
                Err(_elapsed) => Attempt::Failed(TransportError::Timeout(timeout)),
            },
        }
    }

    async fn pump(&self, socket: Socket, retry: &mut RetryState) -> SessionEnd {
        let (mut write, mut read) = socket.split();
        let mut heartbeat = self.config.heartbeat_interval.map(|period| {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = time::timeout(CLOSE_GRACE, write.send(Message::Close(None))).await;
                    return SessionEnd::Cancelled;
                }
                _ = next_heartbeat(&mut heartbeat) => {
                    match encode_client_message(&ClientMessage::Heartbeat) {
                        Ok(json) => {
                            if let Err(e) = write.send(Message::Text(json)).await {
                                return SessionEnd::Lost(TransportError::Socket(e));
                            }
                            tracing::trace!("Heartbeat sent");
                        }
                        Err(e) => tracing::error!(error = %e, "Failed to encode heartbeat"),
                    }
                }
                frame = read.next() => match frame {
                    None => return SessionEnd::Lost(TransportError::StreamEnded),
                    Some(Err(e)) => return SessionEnd::Lost(TransportError::Socket(e)),
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(?frame, "Close frame received");
                        return SessionEnd::ServerClosed;
                    }
                    Some(Ok(Message::Text(text))) => self.handle_text(&text, retry),
                    Some(Ok(_)) => {}
                },
            }
        }
    }

    fn handle_text(&self, text: &str, retry: &mut RetryState) {
        match parse_server_message(text) {
            Ok(ServerMessage::SceneState { state }) => {
                retry.on_snapshot();
                tracing::debug!(
                    scene_id = state.scene_id,
                    messages = state.messages.len(),
                    "Scene snapshot received"
                );
                self.emit(ChannelEvent::SnapshotPushed(state));
            }
            Ok(ServerMessage::Pong) => tracing::trace!("Pong received"),
            Ok(ServerMessage::Unknown) => tracing::debug!("Ignoring unknown server message"),
            Err(e) => {
                let error = TransportError::from(e);
                tracing::warn!(error = %error, "Skipping undecodable server frame");
            }
        }
    }

    fn set_state(&self, state: ConnectionState, retry: &RetryState) {
        let _reporting = self.gate.lock();
        if self.cancel.is_cancelled() {
            return;
        }
        set_connection_state(&self.state, state);
        self.send(ChannelEvent::StateChanged(ConnectionStatus::new(
            state,
            retry.failures(),
            retry.max_attempts(),
        )));
    }

    fn emit(&self, event: ChannelEvent) {
        let _reporting = self.gate.lock();
        // A cancelled worker must not report anything after disconnect()
        if self.cancel.is_cancelled() {
            return;
        }
        self.send(event);
    }

    fn send(&self, event: ChannelEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Channel event receiver dropped");
        }
    }
}

async fn next_heartbeat(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn channel() -> (TransportChannel, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let url = Url::parse("ws://127.0.0.1:9/ws").unwrap();
        (TransportChannel::new(TransportConfig::new(url), tx), rx)
    }

    #[test]
    fn new_channel_is_disconnected() {
        let (channel, _rx) = channel();
        assert_eq!(channel.state(), ConnectionState::Disconnected);
        assert!(!channel.status_observer().is_connected());
        assert_eq!(channel.url(), "ws://127.0.0.1:9/ws");
    }

    #[test]
    fn disconnecting_an_idle_channel_is_silent() {
        let (mut channel, mut rx) = channel();
        channel.disconnect();
        assert!(rx.try_recv().is_err());
    }
}
