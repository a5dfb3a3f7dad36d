//! Per-connection handler: register, then pump events both ways.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

use duet_common::ConnectionId;
use duet_match::{ClientEvent, MatchOutcome, Matchmaker};

/// Handle a single WebSocket connection until it closes.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    matchmaker: Matchmaker,
) {
    let (mut sink, mut stream) = ws.split();

    let id = ConnectionId::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    matchmaker.register(id.clone(), tx).await;
    info!(peer = %addr, conn = %id, "Client connected");

    loop {
        tokio::select! {
            // Outbound: whatever the matchmaker queued for this client.
            Some(event) = rx.recv() => {
                let json = match event.encode() {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(conn = %id, error = %e, "Failed to encode event");
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }

            frame = stream.next() => {
                match frame {
                    // Pings are answered by tungstenite itself.
                    Some(Ok(Message::Text(text))) => dispatch(&matchmaker, &id, &text).await,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(conn = %id, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    matchmaker.disconnect(&id).await;
    info!(peer = %addr, conn = %id, "Client disconnected");
}

/// Decode one text frame and hand it to the matchmaker.
async fn dispatch(matchmaker: &Matchmaker, id: &ConnectionId, text: &str) {
    let event = match ClientEvent::decode(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(conn = %id, error = %e, "Ignoring malformed frame");
            return;
        }
    };

    // Queueing or claiming a partner happens before the next frame is read,
    // so a following cancelMatch or leaveSession always sees its effect.
    // Only room provisioning, which can take seconds, runs on its own task.
    if let ClientEvent::RequestMatch = event {
        match matchmaker.begin_match(id).await {
            Ok(None) => {}
            Ok(Some(pending)) => {
                let matchmaker = matchmaker.clone();
                let id = id.clone();
                tokio::spawn(async move {
                    if let MatchOutcome::Failed = matchmaker.complete_match(pending).await {
                        debug!(conn = %id, "Match attempt failed");
                    }
                });
            }
            Err(e) => debug!(conn = %id, error = %e, "requestMatch rejected"),
        }
        return;
    }

    if let Err(e) = matchmaker.handle(id, event).await {
        debug!(conn = %id, error = %e, "Event rejected");
    }
}
