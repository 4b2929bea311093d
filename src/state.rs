use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::spawn::{SpawnManager, SpawnSlot};
use crate::vehicle::VehicleSnapshot;

/// Everything the server pushes to clients.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome { player_id: String },
    Pong,
    Snapshot { tick: u64, vehicles: Vec<VehicleSnapshot> },
}

impl ServerMessage {
    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(json) => Some(json),
            Err(err) => {
                warn!(%err, "failed to encode server message");
                None
            }
        }
    }
}

pub struct SharedGameState {
    pub tick: u64,
    pub clients: Vec<UnboundedSender<String>>,
    pub players: HashMap<String, SpawnSlot>, // player id -> spawn slot
    pub spawns: SpawnManager,
}

impl SharedGameState {
    pub fn new(spawns: SpawnManager) -> Self {
        Self {
            tick: 0,
            clients: Vec::new(),
            players: HashMap::new(),
            spawns,
        }
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) {
        self.clients.push(tx);
    }

    /// Reserve a spawn slot for a new player.
    pub fn add_player(&mut self, id: &str) -> Option<SpawnSlot> {
        let slot = self.spawns.allocate()?;
        self.players.insert(id.to_owned(), slot);
        Some(slot)
    }

    pub fn remove_player(&mut self, id: &str) -> Option<SpawnSlot> {
        let slot = self.players.remove(id)?;
        self.spawns.release(slot.index);
        Some(slot)
    }

    /// Send a snapshot of all vehicles to all clients. Clients whose socket
    /// task has gone away are dropped.
    pub fn broadcast_snapshot(&mut self, vehicles: Vec<VehicleSnapshot>) {
        let message = ServerMessage::Snapshot { tick: self.tick, vehicles };
        let Some(json) = message.to_json() else {
            return;
        };

        self.clients.retain(|tx| tx.send(json.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::SpawnPoint;
    use tokio::sync::mpsc;

    fn state() -> SharedGameState {
        let points = vec![
            SpawnPoint { position: [0.0, 0.0], angle: 0.0 },
            SpawnPoint { position: [3.0, 0.0], angle: 0.0 },
        ];
        SharedGameState::new(SpawnManager::new(points))
    }

    #[test]
    fn server_messages_are_tagged() {
        let welcome = ServerMessage::Welcome { player_id: "p1".into() }.to_json().unwrap();
        assert_eq!(welcome, r#"{"type":"welcome","player_id":"p1"}"#);
        assert_eq!(ServerMessage::Pong.to_json().unwrap(), r#"{"type":"pong"}"#);
    }

    #[test]
    fn broadcast_reaches_live_clients_and_drops_dead_ones() {
        let mut game = state();
        let (live_tx, mut live_rx) = mpsc::unbounded_channel();
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        game.register_client(live_tx);
        game.register_client(dead_tx);
        drop(dead_rx);

        game.tick = 7;
        game.broadcast_snapshot(Vec::new());

        assert_eq!(game.clients.len(), 1);
        let json = live_rx.try_recv().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "snapshot");
        assert_eq!(value["tick"], 7);
        assert!(value["vehicles"].as_array().unwrap().is_empty());
    }

    #[test]
    fn players_hold_and_release_spawn_slots() {
        let mut game = state();
        assert_eq!(game.add_player("a").unwrap().index, 0);
        assert_eq!(game.add_player("b").unwrap().index, 1);

        assert_eq!(game.remove_player("a").unwrap().index, 0);
        assert!(game.remove_player("a").is_none());
        assert_eq!(game.add_player("c").unwrap().index, 0);
    }
}
