//! Battle state: participants, speed-ordered scheduling, and the action log.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::combatant::Combatant;

/// Entries older than this are rolled off the front of the action log.
pub const ACTION_LOG_CAP: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleState {
    Preparing,
    InProgress,
    Victory,
    Defeat,
    Retreat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    Victory,
    Defeat,
    Retreat,
}

/// One logged engine event. The log is bounded and rolling; ordering matches
/// the order the engine accepted actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    Attack {
        attacker_id: String,
        target_id: String,
        damage: u32,
        is_crit: bool,
        element_multiplier: f64,
        target_died: bool,
    },
    Skill {
        caster_id: String,
        skill_id: String,
        mana_cost: u32,
        target_ids: Vec<String>,
    },
    Heal {
        caster_id: String,
        target_id: String,
        amount: u32,
    },
    EffectApplied {
        target_id: String,
        effect_id: String,
    },
    DotTick {
        target_id: String,
        damage: u32,
    },
    HotTick {
        target_id: String,
        heal: u32,
    },
    PhaseTransition {
        boss_id: String,
        phase: u32,
    },
    TurnAdvanced {
        new_turn: u32,
        current_actor_id: Option<String>,
    },
    BattleEnded {
        result: BattleResult,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub turn: u32,
    pub event: BattleEvent,
}

/// A live battle. Owned by the session store; every mutation goes through the
/// engine in [`crate::game::engine`].
#[derive(Debug, Clone)]
pub struct Battle {
    pub id: String,
    pub player_id: String,
    pub stage_id: String,
    pub heroes: Vec<Combatant>,
    pub enemies: Vec<Combatant>,
    pub state: BattleState,
    pub turn_number: u32,
    pub mana_per_turn: u32,
    pub weather: Option<String>,
    /// Combatant ids in action order for the current round.
    order: Vec<String>,
    current_index: usize,
    pub action_log: Vec<ActionLogEntry>,
    /// Seed the battle RNG was created from; kept for reproducibility.
    pub seed: u64,
    pub(crate) rng: ChaCha8Rng,
}

impl Battle {
    pub fn new(
        id: &str,
        player_id: &str,
        stage_id: &str,
        heroes: Vec<Combatant>,
        enemies: Vec<Combatant>,
        seed: u64,
    ) -> Self {
        let mut battle = Battle {
            id: id.to_string(),
            player_id: player_id.to_string(),
            stage_id: stage_id.to_string(),
            heroes,
            enemies,
            state: BattleState::InProgress,
            turn_number: 1,
            mana_per_turn: 20,
            weather: None,
            order: Vec::new(),
            current_index: 0,
            action_log: Vec::new(),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        battle.calculate_turn_order();
        battle
    }

    /// Sort living combatants by descending speed. The sort is stable, so
    /// equal-speed characters keep team order (heroes before enemies).
    pub fn calculate_turn_order(&mut self) -> Vec<String> {
        let mut living: Vec<(String, u32)> = self
            .heroes
            .iter()
            .chain(self.enemies.iter())
            .filter(|c| c.is_alive())
            .map(|c| (c.id.clone(), c.effective_spd()))
            .collect();
        living.sort_by(|a, b| b.1.cmp(&a.1));
        self.order = living.into_iter().map(|(id, _)| id).collect();
        if self.current_index >= self.order.len() {
            self.current_index = 0;
        }
        self.order.clone()
    }

    pub fn turn_order(&self) -> &[String] {
        &self.order
    }

    pub fn current_actor_id(&self) -> Option<&str> {
        self.order.get(self.current_index).map(|s| s.as_str())
    }

    pub fn current_actor(&self) -> Option<&Combatant> {
        let id = self.current_actor_id()?;
        self.combatant(id)
    }

    pub fn is_player_turn(&self) -> bool {
        self.current_actor().map(|c| c.is_hero()).unwrap_or(false)
    }

    /// Advance the scheduler by one slot. Wrapping starts a new round:
    /// the turn number increments and the order is recomputed over the
    /// living participants.
    pub fn advance(&mut self) -> bool {
        self.current_index += 1;
        if self.current_index >= self.order.len() {
            self.current_index = 0;
            self.turn_number += 1;
            self.calculate_turn_order();
            return true;
        }
        false
    }

    /// Drop a dead combatant from the scheduling order immediately.
    pub fn remove_from_order(&mut self, id: &str) {
        if let Some(pos) = self.order.iter().position(|o| o == id) {
            self.order.remove(pos);
            if pos < self.current_index {
                self.current_index -= 1;
            }
        }
        if self.current_index >= self.order.len() {
            self.current_index = 0;
        }
    }

    pub fn combatant(&self, id: &str) -> Option<&Combatant> {
        self.heroes.iter().chain(self.enemies.iter()).find(|c| c.id == id)
    }

    pub fn combatant_mut(&mut self, id: &str) -> Option<&mut Combatant> {
        self.heroes
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .find(|c| c.id == id)
    }

    pub fn is_hero_id(&self, id: &str) -> bool {
        self.heroes.iter().any(|h| h.id == id)
    }

    pub fn living_heroes(&self) -> impl Iterator<Item = &Combatant> {
        self.heroes.iter().filter(|h| h.is_alive())
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &Combatant> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    pub fn is_ended(&self) -> bool {
        matches!(
            self.state,
            BattleState::Victory | BattleState::Defeat | BattleState::Retreat
        )
    }

    pub fn log(&mut self, event: BattleEvent) {
        self.action_log.push(ActionLogEntry { turn: self.turn_number, event });
        if self.action_log.len() > ACTION_LOG_CAP {
            let excess = self.action_log.len() - ACTION_LOG_CAP;
            self.action_log.drain(..excess);
        }
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}
