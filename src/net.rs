use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::accept_async;
use tungstenite::Message;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::physics::PhysicsWorld;
use crate::policy::{InputSnapshot, ManualPolicy, SteeringPolicy};
use crate::state::{ServerMessage, SharedGameState};
use crate::vehicle::RALLY_CAR;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Ping,
    Input(InputSnapshot),
}

/// Lock order everywhere: physics, then state.
pub async fn start_websocket_server(
    listener: TcpListener,
    state: Arc<Mutex<SharedGameState>>,
    physics: Arc<Mutex<PhysicsWorld>>,
) {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "websocket listening");
    }

    loop {
        let (raw, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(%err, "accept failed");
                continue;
            }
        };

        tokio::spawn(handle_connection(
            raw,
            addr,
            Arc::clone(&state),
            Arc::clone(&physics),
        ));
    }
}

async fn handle_connection(
    raw: TcpStream,
    addr: SocketAddr,
    state: Arc<Mutex<SharedGameState>>,
    physics: Arc<Mutex<PhysicsWorld>>,
) {
    let ws = match accept_async(raw).await {
        Ok(ws) => ws,
        Err(err) => {
            warn!(%addr, %err, "websocket handshake failed");
            return;
        }
    };
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // -------------------------------
    // 2) Spawn slot + manual vehicle
    // -------------------------------
    let player_id = Uuid::new_v4().to_string();
    {
        let mut phys = physics.lock().await;
        let mut game = state.lock().await;

        let Some(slot) = game.add_player(&player_id) else {
            warn!(%addr, "level has no spawn points, dropping client");
            return;
        };

        let policy = SteeringPolicy::Manual(ManualPolicy::new(RALLY_CAR.limits()));
        if let Err(err) = phys.spawn_vehicle(&player_id, RALLY_CAR, slot.point, policy) {
            warn!(%addr, %err, "failed to spawn player vehicle");
            game.remove_player(&player_id);
            return;
        }

        game.register_client(tx.clone());
        info!(player = %player_id, %addr, spawn = slot.index, "player connected");
    }

    if let Some(welcome) = (ServerMessage::Welcome { player_id: player_id.clone() }).to_json() {
        let _ = tx.send(welcome);
    }

    // -------------------------------
    // 3) Main receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(err) => {
                debug!(player = %player_id, %err, "read failed");
                break;
            }
        };

        if msg.is_close() {
            break;
        }
        let Ok(text) = msg.to_text() else {
            continue;
        };

        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Ping) => {
                if let Some(pong) = ServerMessage::Pong.to_json() {
                    let _ = tx.send(pong);
                }
            }
            Ok(ClientMessage::Input(input)) => {
                physics.lock().await.set_input(&player_id, input);
            }
            Err(err) => {
                debug!(player = %player_id, %err, "skipping malformed message");
            }
        }
    }

    // -------------------------------
    // 4) Cleanup
    // -------------------------------
    let mut phys = physics.lock().await;
    let mut game = state.lock().await;
    phys.remove_vehicle(&player_id);
    game.remove_player(&player_id);
    info!(player = %player_id, "player disconnected");
}
