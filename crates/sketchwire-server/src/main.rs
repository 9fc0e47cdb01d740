//! SketchWire WebSocket Relay Hub
//!
//! A stateless broadcaster connecting all drawing participants on one
//! shared surface. Frames are rebroadcast unchanged: `commit-stroke`,
//! `in-progress-segment`, `undo` and `redo` go to every connection except
//! the sender; `clear` goes to every connection including the sender. The
//! hub holds no drawing state and validates no payloads. Delivery rides a
//! broadcast channel that lets laggards drop frames, so a slow participant
//! never stalls anyone else.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;
const DEFAULT_ADDR: &str = "0.0.0.0:3001";

/// Where a frame fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FanOut {
    /// Every connection except the sender.
    Others,
    /// Every connection, the sender included.
    Everyone,
}

/// The one piece of the payload the hub looks at: the event tag. Anything
/// it does not recognize (unparseable text included) is forwarded like
/// any other non-clear event.
#[derive(Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum EventKind {
    Clear,
    #[serde(other)]
    Other,
}

fn fan_out(text: &str) -> FanOut {
    match serde_json::from_str::<EventKind>(text) {
        Ok(EventKind::Clear) => FanOut::Everyone,
        _ => FanOut::Others,
    }
}

/// A frame in flight between connection tasks.
#[derive(Debug, Clone)]
struct Frame {
    from: Uuid,
    fan_out: FanOut,
    text: String,
}

/// Shared hub state: the broadcast channel and a registry of live
/// connections. The registry feeds logging; it is never drawing state.
struct AppState {
    tx: broadcast::Sender<Frame>,
    peers: DashMap<Uuid, ()>,
}

impl AppState {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            peers: DashMap::new(),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchwire_server=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = std::env::var("SKETCHWIRE_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .expect("SKETCHWIRE_ADDR must be a socket address");
    info!("SketchWire relay hub listening on {}", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Index page
async fn index() -> &'static str {
    "SketchWire Relay Hub - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one participant connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let peer_id = Uuid::new_v4();
    state.peers.insert(peer_id, ());
    info!("participant {} connected ({} online)", peer_id, state.peers.len());

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.tx.subscribe();

    loop {
        tokio::select! {
            // Frames from this participant: tag-sniff for fan-out and
            // rebroadcast the text unchanged.
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let frame = Frame {
                            from: peer_id,
                            fan_out: fan_out(&text),
                            text: text.to_string(),
                        };
                        // No receivers is fine; nobody else is connected.
                        let _ = state.tx.send(frame);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Ignore binary/ping/pong
                    Some(Err(e)) => {
                        warn!("websocket error for {}: {}", peer_id, e);
                        break;
                    }
                }
            }

            // Frames from the rest of the hub.
            frame = rx.recv() => {
                match frame {
                    Ok(frame) => {
                        let deliver = frame.fan_out == FanOut::Everyone || frame.from != peer_id;
                        if deliver
                            && sender.send(Message::Text(frame.text.into())).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Best-effort delivery: a slow participant misses
                        // frames rather than blocking the senders.
                        warn!("participant {} lagged, skipped {} frames", peer_id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // Silently drop from the broadcast set; no state to clean up.
    state.peers.remove(&peer_id);
    info!("participant {} disconnected ({} online)", peer_id, state.peers.len());
}
