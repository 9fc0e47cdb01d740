//! WebSocket transport to the relay hub.
//!
//! A background thread owns the socket and auto-reconnects on loss; the
//! session polls events and pushes outgoing frames through channels. All
//! sends are fire-and-forget: nothing is retried, acknowledged, or queued
//! across a disconnect.

use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::{connect, Message};
use url::Url;

/// Pause between reconnection attempts.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Connection state, surfaced to the participant as connectivity only;
/// there is no error channel beyond "not connected".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Events from the socket thread.
#[derive(Debug, Clone)]
pub enum NetEvent {
    Connected,
    Disconnected,
    /// A raw frame from the hub (one wire event).
    Message(String),
}

/// Commands sent to the socket thread.
enum WsCommand {
    Send(String),
    Close,
}

/// Auto-reconnecting WebSocket client for the relay hub.
///
/// Uses a background thread for non-blocking operation.
pub struct RelayConnection {
    state: ConnectionState,
    /// Channel to send commands to the socket thread.
    cmd_tx: Option<Sender<WsCommand>>,
    /// Channel to receive events from the socket thread.
    event_rx: Option<Receiver<NetEvent>>,
    /// Handle to the socket thread.
    _thread: Option<JoinHandle<()>>,
}

impl RelayConnection {
    /// Create a new disconnected client.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            cmd_tx: None,
            event_rx: None,
            _thread: None,
        }
    }

    /// Start dialing the relay hub. The background thread keeps redialing
    /// after every connection loss until [`disconnect`](Self::disconnect).
    pub fn connect(&mut self, url: &str) -> Result<(), String> {
        if self.cmd_tx.is_some() {
            return Err("Already connected".to_string());
        }

        let parsed = Url::parse(url).map_err(|e| format!("Invalid URL: {}", e))?;
        if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
            return Err(format!("Invalid WebSocket URL scheme: {}", parsed.scheme()));
        }

        self.state = ConnectionState::Connecting;

        let (cmd_tx, cmd_rx) = channel::<WsCommand>();
        let (event_tx, event_rx) = channel::<NetEvent>();
        let url = url.to_string();

        let handle = thread::spawn(move || run_socket(url, cmd_rx, event_tx));

        self.cmd_tx = Some(cmd_tx);
        self.event_rx = Some(event_rx);
        self._thread = Some(handle);

        Ok(())
    }

    /// Stop the socket thread for good.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(WsCommand::Close);
        }
        self.event_rx = None;
        self._thread = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Hand a frame to the socket thread. Fire-and-forget: a frame sent
    /// while the link is down is silently dropped by the thread.
    pub fn send(&self, msg: &str) -> Result<(), String> {
        if let Some(ref tx) = self.cmd_tx {
            tx.send(WsCommand::Send(msg.to_string()))
                .map_err(|e| format!("Send failed: {}", e))
        } else {
            Err("Not connected".to_string())
        }
    }

    /// Poll for pending events (non-blocking).
    pub fn poll_events(&mut self) -> Vec<NetEvent> {
        let mut events = Vec::new();
        if let Some(ref rx) = self.event_rx {
            while let Ok(event) = rx.try_recv() {
                match &event {
                    NetEvent::Connected => self.state = ConnectionState::Connected,
                    NetEvent::Disconnected => self.state = ConnectionState::Connecting,
                    NetEvent::Message(_) => {}
                }
                events.push(event);
            }
        }
        events
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl Default for RelayConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RelayConnection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// The socket thread: dial, pump, and redial until closed.
fn run_socket(url: String, cmd_rx: Receiver<WsCommand>, event_tx: Sender<NetEvent>) {
    'outer: loop {
        // Commands arriving while the link is down: sends are dropped
        // (no queue, no replay), close ends the thread.
        loop {
            match cmd_rx.try_recv() {
                Ok(WsCommand::Send(msg)) => {
                    log::debug!("dropping frame sent while disconnected ({} bytes)", msg.len());
                }
                Ok(WsCommand::Close) | Err(TryRecvError::Disconnected) => break 'outer,
                Err(TryRecvError::Empty) => break,
            }
        }

        match connect(&url) {
            Ok((mut socket, response)) => {
                log::info!("connected to relay hub, status: {}", response.status());
                if event_tx.send(NetEvent::Connected).is_err() {
                    break 'outer;
                }

                // Short read timeout so the loop can interleave commands.
                if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
                    let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                    let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
                }

                loop {
                    match cmd_rx.try_recv() {
                        Ok(WsCommand::Send(msg)) => {
                            if let Err(e) = socket.send(Message::Text(msg)) {
                                log::warn!("relay send error: {}", e);
                                break;
                            }
                        }
                        Ok(WsCommand::Close) => {
                            let _ = socket.close(None);
                            break 'outer;
                        }
                        Err(TryRecvError::Disconnected) => {
                            let _ = socket.close(None);
                            break 'outer;
                        }
                        Err(TryRecvError::Empty) => {}
                    }

                    match socket.read() {
                        Ok(Message::Text(text)) => {
                            if event_tx.send(NetEvent::Message(text)).is_err() {
                                break 'outer;
                            }
                        }
                        Ok(Message::Ping(data)) => {
                            let _ = socket.send(Message::Pong(data));
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(tungstenite::Error::Io(ref e))
                            if e.kind() == std::io::ErrorKind::WouldBlock
                                || e.kind() == std::io::ErrorKind::TimedOut =>
                        {
                            continue;
                        }
                        Err(e) => {
                            log::warn!("relay read error: {}", e);
                            break;
                        }
                    }
                }

                if event_tx.send(NetEvent::Disconnected).is_err() {
                    break 'outer;
                }
                log::info!("relay connection lost, retrying in {:?}", RECONNECT_DELAY);
            }
            Err(e) => {
                log::warn!("relay connection failed: {}", e);
            }
        }

        thread::sleep(RECONNECT_DELAY);
    }

    let _ = event_tx.send(NetEvent::Disconnected);
}
