//! Websocket endpoint for Minecraft plugins, plus a health probe.

use crate::Gateway;
use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Build the router: the websocket endpoint at the configured path and
/// `GET /health`.
pub fn router(gateway: Arc<Gateway>) -> Router {
    let ws_path = gateway.settings().ws_path().clone();
    Router::new()
        .route(&ws_path, get(upgrade))
        .route("/health", get(health))
        .with_state(gateway)
}

/// Serve `router(gateway)` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, gateway: Arc<Gateway>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, path = %gateway.settings().ws_path(), "Minecraft websocket listening");
    }
    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health(State(gateway): State<Arc<Gateway>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "connections": gateway.connection_count(),
            "ready": gateway.is_ready(),
        })),
    )
}

async fn upgrade(ws: WebSocketUpgrade, State(gateway): State<Arc<Gateway>>) -> Response {
    ws.on_upgrade(move |socket| run_socket(gateway, socket))
}

async fn run_socket(gateway: Arc<Gateway>, socket: WebSocket) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = gateway.open_session(tx);
    let (mut sink, mut stream) = socket.split();

    let heartbeat = (*gateway.settings().heartbeat()).max(Duration::from_millis(100));
    let mut ticker = tokio::time::interval_at(Instant::now() + heartbeat, heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_heard = Instant::now();
    let mut ping_sent: Option<Instant> = None;

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        last_heard = Instant::now();
                        gateway.handle_text(&mut session, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => last_heard = Instant::now(),
                    Some(Err(e)) => {
                        warn!(connection_id = session.id(), error = %e, "Socket read failed");
                        break;
                    }
                }
            }
            Some(frame) = rx.recv() => {
                if let Err(e) = sink.send(Message::Text(frame.to_json())).await {
                    warn!(connection_id = session.id(), error = %e, "Socket write failed");
                    break;
                }
            }
            _ = ticker.tick() => {
                if ping_sent.is_some_and(|sent| last_heard < sent) {
                    warn!(connection_id = session.id(), "Heartbeat timed out");
                    break;
                }
                if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                    warn!(connection_id = session.id(), error = %e, "Heartbeat write failed");
                    break;
                }
                ping_sent = Some(Instant::now());
            }
        }
    }

    gateway.close_session(&mut session).await;
    let _ = sink.close().await;
    debug!(connection_id = session.id(), "Socket task finished");
}
