//! Ephemeral battle sessions.
//!
//! Live battles exist only here, keyed by battle id with a secondary
//! player-id index (one active battle per player). Each battle sits behind
//! its own `Mutex`, so engine calls on the same battle serialize while
//! different battles proceed in parallel. Finished battles roll into a
//! bounded per-player history.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::game::battle::{Battle, BattleResult};

pub const BATTLE_HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("player already has an active battle")]
    AlreadyInBattle,
}

/// A finished battle, as kept in per-player history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleRecord {
    pub battle_id: String,
    pub stage_id: String,
    pub result: BattleResult,
    pub stars: u8,
    pub turns: u32,
    pub ended_at: String,
}

#[derive(Default)]
pub struct SessionStore {
    battles: RwLock<HashMap<String, Arc<Mutex<Battle>>>>,
    by_player: RwLock<HashMap<String, String>>,
    history: RwLock<HashMap<String, VecDeque<BattleRecord>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly started battle. Fails when the player already has
    /// one in flight.
    pub async fn insert(&self, battle: Battle) -> Result<Arc<Mutex<Battle>>, StoreError> {
        let mut by_player = self.by_player.write().await;
        if by_player.contains_key(&battle.player_id) {
            return Err(StoreError::AlreadyInBattle);
        }
        let battle_id = battle.id.clone();
        by_player.insert(battle.player_id.clone(), battle_id.clone());
        let handle = Arc::new(Mutex::new(battle));
        self.battles.write().await.insert(battle_id, handle.clone());
        Ok(handle)
    }

    pub async fn get(&self, battle_id: &str) -> Option<Arc<Mutex<Battle>>> {
        self.battles.read().await.get(battle_id).cloned()
    }

    pub async fn active_battle_id(&self, player_id: &str) -> Option<String> {
        self.by_player.read().await.get(player_id).cloned()
    }

    /// Drop a battle and its player index entry. Returns the handle so a
    /// caller holding it can still finish reading.
    pub async fn remove(&self, battle_id: &str) -> Option<Arc<Mutex<Battle>>> {
        let handle = self.battles.write().await.remove(battle_id)?;
        let player_id = handle.lock().await.player_id.clone();
        let mut by_player = self.by_player.write().await;
        if by_player.get(&player_id).map(|id| id == battle_id).unwrap_or(false) {
            by_player.remove(&player_id);
        }
        Some(handle)
    }

    /// Append to the player's history, newest first, capped.
    pub async fn push_history(&self, player_id: &str, record: BattleRecord) {
        let mut history = self.history.write().await;
        let entries = history.entry(player_id.to_string()).or_default();
        entries.push_front(record);
        entries.truncate(BATTLE_HISTORY_CAP);
    }

    /// Reverse-chronological history snapshot.
    pub async fn history(&self, player_id: &str) -> Vec<BattleRecord> {
        self.history
            .read()
            .await
            .get(player_id)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }
}
