//! Battle orchestration: building combatants from owned heroes and stage
//! data, driving the engine, auto-playing enemy turns, and settling rewards.
//!
//! Every mutation of one battle happens under that battle's session mutex,
//! so engine calls never interleave. The engine itself stays synchronous;
//! persistence happens before the battle starts and after it ends.

use rand::Rng;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::catalog::{self, stages::EnemySpec, StageDef};
use crate::db::heroes as heroes_db;
use crate::error::{AppError, AppResult, Resource};
use crate::game::battle::{Battle, BattleResult, BattleState};
use crate::game::combatant::{BossData, BossPhase, Combatant, CombatantKind, DropEntry, EnemyData};
use crate::game::element::Element;
use crate::game::engine::{self, AiAction};
use crate::game::grid::GridPosition;
use crate::game::skill::BattleSkill;
use crate::session::{BattleRecord, SessionStore, StoreError};
use crate::services::{equipment as equipment_service, heroes as heroes_service, players, story};

// ============================================================================
// DTOS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CombatantSummary {
    pub id: String,
    pub name: String,
    pub element: Element,
    pub x: u8,
    pub y: u8,
    pub current_hp: u32,
    pub max_hp: u32,
    pub current_mana: u32,
    pub is_alive: bool,
    pub can_act: bool,
    pub effects: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattleSnapshot {
    pub battle_id: String,
    pub stage_id: String,
    pub state: BattleState,
    pub turn_number: u32,
    pub current_actor_id: Option<String>,
    pub is_player_turn: bool,
    pub weather: Option<String>,
    pub turn_order: Vec<String>,
    pub player_team: Vec<CombatantSummary>,
    pub enemy_team: Vec<CombatantSummary>,
}

#[derive(Debug, Clone)]
pub enum PlayerAction {
    Attack { attacker_id: String, target_id: String },
    Skill { caster_id: String, skill_id: String, target_ids: Vec<String> },
    Heal { caster_id: String, target_ids: Vec<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillTargetReport {
    pub target_id: String,
    pub damage: u32,
    pub heal: u32,
    pub is_crit: bool,
    pub effect_applied: Option<String>,
    pub target_died: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionReport {
    Attack {
        damage: u32,
        is_crit: bool,
        element_multiplier: f64,
        target_hp: u32,
        target_died: bool,
    },
    Skill {
        skill_id: String,
        mana_spent: u32,
        remaining_mana: u32,
        targets: Vec<SkillTargetReport>,
    },
    Heal {
        mana_spent: u32,
        remaining_mana: u32,
        targets: Vec<SkillTargetReport>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub report: ActionReport,
    pub result: Option<BattleResult>,
    pub snapshot: BattleSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewardsView {
    pub exp: u64,
    pub gold: u64,
    pub drops: Vec<String>,
    pub stars: u8,
    pub first_clear: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeResponse {
    pub battle_id: String,
    pub result: BattleResult,
    pub rewards: Option<RewardsView>,
}

/// Default heal action parameters when the client heals without a skill.
const HEAL_MANA_COST: u32 = 50;
const HEAL_MULTIPLIER: f64 = 0.3;

// ============================================================================
// COMBATANT CONSTRUCTION
// ============================================================================

fn resolve_skills(ids: &[String]) -> Vec<BattleSkill> {
    ids.iter()
        .filter_map(|id| catalog::get_skill_spec(id))
        .map(|spec| BattleSkill::new(spec, 1))
        .collect()
}

/// Battle-ready combatant from an owned hero: stored grown base stats,
/// awakening fold, equipped gear, learned skills.
async fn hero_combatant(
    pool: &SqlitePool,
    player_id: &str,
    hero_id: &str,
    position: GridPosition,
) -> AppResult<Combatant> {
    let row = heroes_db::get_hero_for_player(pool, hero_id, player_id)
        .await?
        .ok_or_else(|| AppError::NotFound(Resource::Hero, hero_id.to_string()))?;
    let view = heroes_service::get(pool, hero_id, player_id).await?;

    let mut combatant = Combatant::new(
        &row.id,
        &view.name,
        view.element,
        position,
        view.stats,
        CombatantKind::Hero { template_id: row.template_id.clone(), hero_id: row.id.clone() },
    );
    let skill_ids: Vec<String> = heroes_db::get_hero_skills(pool, hero_id)
        .await?
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    combatant.skills = resolve_skills(&skill_ids);
    Ok(combatant)
}

fn enemy_combatant(spec: &EnemySpec, index: usize) -> Combatant {
    let position = GridPosition::new((index % 3) as u8, (index / 3).min(2) as u8)
        .unwrap_or_else(|| GridPosition { x: 1, y: 1 });
    let enemy_data = EnemyData {
        template_id: spec.template_id.to_string(),
        behavior: spec.behavior,
        difficulty: spec.difficulty,
        exp_reward: spec.exp_reward,
        gold_reward: spec.gold_reward,
        drop_table: spec
            .drops
            .iter()
            .map(|(item, probability, quantity)| DropEntry {
                item_id: item.to_string(),
                probability: *probability,
                quantity: *quantity,
            })
            .collect(),
    };
    let kind = match &spec.boss {
        Some(boss_spec) => {
            let phases = boss_spec
                .phases
                .iter()
                .map(|p| BossPhase {
                    phase_number: p.phase_number,
                    hp_threshold: p.hp_threshold,
                    name: p.name.to_string(),
                    stat_modifiers: p.stat_modifiers.to_vec(),
                    new_skills: p.new_skills.iter().map(|s| s.to_string()).collect(),
                })
                .collect();
            let mut boss = BossData::new(boss_spec.title, phases, boss_spec.mythical_tier);
            // Phase skills wait in reserve until their phase arrives
            let reserve: Vec<String> = boss_spec
                .phases
                .iter()
                .filter(|p| p.phase_number > 1)
                .flat_map(|p| p.new_skills.iter().map(|s| s.to_string()))
                .collect();
            boss.reserve_skills = resolve_skills(&reserve);
            CombatantKind::Boss { enemy: enemy_data, boss }
        }
        None => CombatantKind::Enemy(enemy_data),
    };

    let mut combatant = Combatant::new(
        &format!("enemy_{}_{}", index + 1, spec.template_id),
        spec.name,
        spec.element,
        position,
        spec.stats,
        kind,
    );
    combatant.skills =
        resolve_skills(&spec.skills.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    combatant
}

fn summarize(combatant: &Combatant) -> CombatantSummary {
    CombatantSummary {
        id: combatant.id.clone(),
        name: combatant.name.clone(),
        element: combatant.element,
        x: combatant.position.x,
        y: combatant.position.y,
        current_hp: combatant.current_hp,
        max_hp: combatant.stats.hp,
        current_mana: combatant.current_mana,
        is_alive: combatant.is_alive(),
        can_act: combatant.can_act(),
        effects: combatant.effects.iter().map(|e| e.id.clone()).collect(),
    }
}

fn snapshot(battle: &Battle) -> BattleSnapshot {
    BattleSnapshot {
        battle_id: battle.id.clone(),
        stage_id: battle.stage_id.clone(),
        state: battle.state,
        turn_number: battle.turn_number,
        current_actor_id: battle.current_actor_id().map(str::to_string),
        is_player_turn: battle.is_player_turn(),
        weather: battle.weather.clone(),
        turn_order: battle.turn_order().to_vec(),
        player_team: battle.heroes.iter().map(summarize).collect(),
        enemy_team: battle.enemies.iter().map(summarize).collect(),
    }
}

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Start a stage battle with a team. Gating and the stamina debit go through
/// the story service; the built battle lands in the session store.
pub async fn start_battle(
    pool: &SqlitePool,
    store: &SessionStore,
    player_id: &str,
    stage_id: &str,
    team_id: &str,
    seed: Option<u64>,
) -> AppResult<BattleSnapshot> {
    let team = crate::services::teams::get(pool, team_id, player_id).await?;
    if team.members.is_empty() {
        return Err(AppError::Team("team has no members".into()));
    }
    if store.active_battle_id(player_id).await.is_some() {
        return Err(AppError::InvalidAction("player already has an active battle".into()));
    }
    let (_, stage): (_, &'static StageDef) = catalog::get_stage(stage_id)
        .ok_or_else(|| AppError::NotFound(Resource::Stage, stage_id.to_string()))?;

    story::start_stage(pool, player_id, stage_id, team_id).await?;

    let mut heroes = Vec::new();
    for member in &team.members {
        let position = GridPosition::new(member.x, member.y)
            .ok_or_else(|| AppError::Internal("persisted position out of bounds".into()))?;
        heroes.push(hero_combatant(pool, player_id, &member.hero_id, position).await?);
    }
    let enemies: Vec<Combatant> = stage
        .enemies
        .iter()
        .enumerate()
        .map(|(i, spec)| enemy_combatant(spec, i))
        .collect();

    let battle_id = Uuid::new_v4().to_string();
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    let battle = engine::start_battle(&battle_id, player_id, stage_id, heroes, enemies, seed);
    let handle = store.insert(battle).await.map_err(|e: StoreError| match e {
        StoreError::AlreadyInBattle => {
            AppError::InvalidAction("player already has an active battle".into())
        }
    })?;
    let battle = handle.lock().await;
    Ok(snapshot(&battle))
}

pub async fn get_state(
    store: &SessionStore,
    player_id: &str,
    battle_id: &str,
) -> AppResult<BattleSnapshot> {
    let handle = store
        .get(battle_id)
        .await
        .ok_or_else(|| AppError::NotFound(Resource::Battle, battle_id.to_string()))?;
    let battle = handle.lock().await;
    if battle.player_id != player_id {
        return Err(AppError::AccessDenied);
    }
    Ok(snapshot(&battle))
}

/// After a player action, advance through enemy turns (playing their AI)
/// until it is a hero's turn again, the battle ends, or an actor is merely
/// stunned (skipped).
fn run_until_player_turn(battle: &mut Battle) {
    for _ in 0..64 {
        if engine::check_end(battle).is_some() || battle.is_ended() {
            break;
        }
        engine::advance_turn(battle);
        let Some(actor_id) = battle.current_actor_id().map(str::to_string) else {
            break;
        };
        let actor_is_hero = battle.is_hero_id(&actor_id);
        let actor_can_act = battle.combatant(&actor_id).map(|c| c.can_act()).unwrap_or(false);
        if actor_is_hero {
            if actor_can_act {
                break;
            }
            // Stunned hero loses the turn
            continue;
        }
        if !actor_can_act {
            continue;
        }
        let action = match engine::ai_choose_action(battle, &actor_id) {
            Ok(action) => action,
            Err(_) => continue,
        };
        match action {
            AiAction::Attack { target_id } => {
                let _ = engine::execute_attack(battle, &actor_id, &target_id, 1.0);
            }
            AiAction::Skill { skill_id, target_ids } => {
                let (mana_cost, multiplier) = battle
                    .combatant(&actor_id)
                    .and_then(|c| c.skill(&skill_id))
                    .map(|s| (s.spec.mana_cost, s.effective_multiplier()))
                    .unwrap_or((0, 1.0));
                let _ = engine::execute_skill(
                    battle,
                    &actor_id,
                    &skill_id,
                    &target_ids,
                    mana_cost,
                    multiplier,
                );
            }
            AiAction::Pass => {}
        }
    }
    if let Some(result) = engine::check_end(battle) {
        if !battle.is_ended() {
            engine::end_battle(battle, result);
        }
    }
}

/// Execute one player-side action and auto-play the enemies that follow.
pub async fn execute_action(
    store: &SessionStore,
    player_id: &str,
    battle_id: &str,
    action: PlayerAction,
) -> AppResult<ActionResponse> {
    let handle = store
        .get(battle_id)
        .await
        .ok_or_else(|| AppError::NotFound(Resource::Battle, battle_id.to_string()))?;
    let mut battle = handle.lock().await;
    if battle.player_id != player_id {
        return Err(AppError::AccessDenied);
    }
    if battle.is_ended() {
        return Err(AppError::InvalidAction("battle has already ended".into()));
    }
    if !battle.is_player_turn() {
        return Err(AppError::NotPlayerTurn);
    }

    let actor_id = match &action {
        PlayerAction::Attack { attacker_id, .. } => attacker_id.clone(),
        PlayerAction::Skill { caster_id, .. } => caster_id.clone(),
        PlayerAction::Heal { caster_id, .. } => caster_id.clone(),
    };
    if battle.current_actor_id() != Some(actor_id.as_str()) {
        return Err(AppError::NotPlayerTurn);
    }
    if !battle.is_hero_id(&actor_id) {
        return Err(AppError::AccessDenied);
    }

    let report = match action {
        PlayerAction::Attack { attacker_id, target_id } => {
            let outcome = engine::execute_attack(&mut battle, &attacker_id, &target_id, 1.0)?;
            ActionReport::Attack {
                damage: outcome.damage,
                is_crit: outcome.is_crit,
                element_multiplier: outcome.element_multiplier,
                target_hp: outcome.target_hp,
                target_died: outcome.target_died,
            }
        }
        PlayerAction::Skill { caster_id, skill_id, target_ids } => {
            let (mana_cost, multiplier) = battle
                .combatant(&caster_id)
                .and_then(|c| c.skill(&skill_id))
                .map(|s| (s.spec.mana_cost, s.effective_multiplier()))
                .ok_or_else(|| AppError::InvalidAction(format!("skill not found: {skill_id}")))?;
            let outcome = engine::execute_skill(
                &mut battle,
                &caster_id,
                &skill_id,
                &target_ids,
                mana_cost,
                multiplier,
            )?;
            ActionReport::Skill {
                skill_id: outcome.skill_id,
                mana_spent: outcome.mana_spent,
                remaining_mana: outcome.remaining_mana,
                targets: outcome
                    .targets
                    .into_iter()
                    .map(|t| SkillTargetReport {
                        target_id: t.target_id,
                        damage: t.damage,
                        heal: t.heal,
                        is_crit: t.is_crit,
                        effect_applied: t.effect_applied,
                        target_died: t.target_died,
                    })
                    .collect(),
            }
        }
        PlayerAction::Heal { caster_id, target_ids } => {
            let outcome = engine::execute_heal(
                &mut battle,
                &caster_id,
                &target_ids,
                HEAL_MANA_COST,
                HEAL_MULTIPLIER,
            )?;
            ActionReport::Heal {
                mana_spent: outcome.mana_spent,
                remaining_mana: outcome.remaining_mana,
                targets: outcome
                    .targets
                    .into_iter()
                    .map(|t| SkillTargetReport {
                        target_id: t.target_id,
                        damage: 0,
                        heal: t.actual_heal,
                        is_crit: false,
                        effect_applied: None,
                        target_died: false,
                    })
                    .collect(),
            }
        }
    };

    run_until_player_turn(&mut battle);

    Ok(ActionResponse {
        report,
        result: match battle.state {
            BattleState::Victory => Some(BattleResult::Victory),
            BattleState::Defeat => Some(BattleResult::Defeat),
            BattleState::Retreat => Some(BattleResult::Retreat),
            _ => None,
        },
        snapshot: snapshot(&battle),
    })
}

/// Split the battle exp evenly across the team and run each hero's level
/// curve.
async fn distribute_hero_exp(pool: &SqlitePool, battle: &Battle, total_exp: u64) -> AppResult<()> {
    if battle.heroes.is_empty() || total_exp == 0 {
        return Ok(());
    }
    let share = total_exp / battle.heroes.len() as u64;
    if share == 0 {
        return Ok(());
    }
    for combatant in &battle.heroes {
        let CombatantKind::Hero { hero_id, .. } = &combatant.kind else {
            continue;
        };
        let Some(row) = heroes_db::get_hero_for_player(pool, hero_id, &battle.player_id).await?
        else {
            continue;
        };
        let template = catalog::get_hero_template(&row.template_id);
        let mut hero = crate::game::hero::Hero {
            id: row.id.clone(),
            player_id: row.player_id.clone(),
            template_id: row.template_id.clone(),
            name: String::new(),
            element: Element::parse(&row.element).unwrap_or(Element::Kim),
            rarity: row.rarity as u32,
            level: row.level as u32,
            exp: row.exp as u64,
            stars: row.stars as u32,
            ascension_level: row.ascension_level as u32,
            awakening_level: row.awakening_level as u32,
            base_stats: row.base_stats(),
            growth_rates: template
                .map(|t| t.growth)
                .unwrap_or_else(crate::game::hero::GrowthRates::flat),
            weapon_id: None,
            armor_id: None,
            accessory_id: None,
            relic_id: None,
            mount_id: None,
            is_locked: false,
            is_favorite: false,
        };
        let old_stats = hero.base_stats;
        let result = hero.gain_exp(share);
        let new_stats = if result.leveled_up {
            crate::game::hero::apply_growth(
                &old_stats,
                &hero.growth_rates,
                result.new_level - result.old_level,
            )
        } else {
            old_stats
        };
        heroes_db::update_progress(pool, &row.id, hero.level, hero.exp, &new_stats).await?;
    }
    Ok(())
}

/// Close out a battle: derive rewards on victory, credit them, record story
/// progress, and roll the session into history. A battle that has not
/// reached a terminal state counts as a retreat.
pub async fn finalize(
    pool: &SqlitePool,
    store: &SessionStore,
    player_id: &str,
    battle_id: &str,
) -> AppResult<FinalizeResponse> {
    let handle = store
        .get(battle_id)
        .await
        .ok_or_else(|| AppError::NotFound(Resource::Battle, battle_id.to_string()))?;
    {
        let battle = handle.lock().await;
        if battle.player_id != player_id {
            return Err(AppError::AccessDenied);
        }
    }
    let handle = store
        .remove(battle_id)
        .await
        .ok_or_else(|| AppError::NotFound(Resource::Battle, battle_id.to_string()))?;
    let mut battle = handle.lock().await;

    let result = match battle.state {
        BattleState::Victory => BattleResult::Victory,
        BattleState::Defeat => BattleResult::Defeat,
        BattleState::Retreat => BattleResult::Retreat,
        _ => match engine::check_end(&battle) {
            Some(result) => result,
            None => BattleResult::Retreat,
        },
    };
    if !battle.is_ended() {
        engine::end_battle(&mut battle, result);
    }

    let rewards = if result == BattleResult::Victory {
        let rewards = engine::calculate_rewards(&mut battle);

        players::add_resources(pool, player_id, rewards.gold as i64, 0, 0).await?;
        distribute_hero_exp(pool, &battle, rewards.exp).await?;

        let mut drop_ids = Vec::new();
        for drop in &rewards.drops {
            // Equipment drops materialize as owned pieces; other items are
            // reported to the client only
            if catalog::get_equipment_template(&drop.item_id).is_some() {
                for _ in 0..drop.quantity {
                    equipment_service::grant_from_template(pool, player_id, &drop.item_id).await?;
                }
            }
            drop_ids.push(drop.item_id.clone());
        }

        let clear =
            story::complete_stage(pool, player_id, &battle.stage_id, rewards.stars).await?;

        Some(RewardsView {
            exp: rewards.exp,
            gold: rewards.gold,
            drops: drop_ids,
            stars: rewards.stars,
            first_clear: clear.first_clear,
        })
    } else {
        None
    };

    store
        .push_history(
            player_id,
            BattleRecord {
                battle_id: battle.id.clone(),
                stage_id: battle.stage_id.clone(),
                result,
                stars: rewards.as_ref().map(|r| r.stars).unwrap_or(0),
                turns: battle.turn_number,
                ended_at: chrono::Utc::now().to_rfc3339(),
            },
        )
        .await;

    Ok(FinalizeResponse { battle_id: battle_id.to_string(), result, rewards })
}

pub async fn history(store: &SessionStore, player_id: &str) -> Vec<BattleRecord> {
    store.history(player_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::players::create_player;
    use crate::db::pool::test_pool;
    use crate::services::heroes::create_hero_from_template;
    use crate::services::teams::{self, MemberInput};

    async fn seed_player_with_team(pool: &SqlitePool) -> String {
        create_player(pool, "p1", "user1", "u1@example.com", "hash", "Người Chơi")
            .await
            .unwrap();
        let mut tx = pool.begin().await.unwrap();
        let h1 = create_hero_from_template(&mut tx, "p1", "quan_vu").await.unwrap();
        let h2 = create_hero_from_template(&mut tx, "p1", "trieu_van").await.unwrap();
        tx.commit().await.unwrap();
        // Make them strong enough to one-round the first stage
        let stats = crate::game::stats::HexagonStats::new(5000, 800, 200, 150, 10, 20);
        heroes_db::update_progress(pool, &h1, 10, 0, &stats).await.unwrap();
        heroes_db::update_progress(pool, &h2, 10, 0, &stats).await.unwrap();

        let team_list = teams::list(pool, "p1").await.unwrap();
        let team_id = team_list[0].id.clone();
        teams::add_member(pool, &team_id, "p1", &MemberInput { hero_id: h1, x: 0, y: 0 })
            .await
            .unwrap();
        teams::add_member(pool, &team_id, "p1", &MemberInput { hero_id: h2, x: 1, y: 0 })
            .await
            .unwrap();
        team_id
    }

    async fn drive_to_victory(
        pool: &SqlitePool,
        store: &SessionStore,
        battle_id: &str,
    ) -> FinalizeResponse {
        // Keep attacking the first living enemy with the current actor
        for _ in 0..200 {
            let state = get_state(store, "p1", battle_id).await.unwrap();
            if state.state != BattleState::InProgress {
                break;
            }
            let actor = state.current_actor_id.clone().expect("battle in progress has an actor");
            let target = state
                .enemy_team
                .iter()
                .find(|e| e.is_alive)
                .map(|e| e.id.clone())
                .expect("in-progress battle has a living enemy");
            execute_action(
                store,
                "p1",
                battle_id,
                PlayerAction::Attack { attacker_id: actor, target_id: target },
            )
            .await
            .unwrap();
        }
        finalize(pool, store, "p1", battle_id).await.unwrap()
    }

    #[tokio::test]
    async fn start_battle_builds_teams_and_debits_stamina() {
        let (pool, _dir) = test_pool().await;
        let store = SessionStore::new();
        let team_id = seed_player_with_team(&pool).await;

        let snapshot =
            start_battle(&pool, &store, "p1", "stage_1_1", &team_id, Some(7)).await.unwrap();
        assert_eq!(snapshot.state, BattleState::InProgress);
        assert_eq!(snapshot.player_team.len(), 2);
        assert_eq!(snapshot.enemy_team.len(), 2);
        assert!(snapshot.is_player_turn, "fast heroes act first");

        let resources = players::get_resources(&pool, "p1").await.unwrap();
        assert_eq!(resources.stamina, 90);

        // A second battle for the same player is refused
        let err =
            start_battle(&pool, &store, "p1", "stage_1_1", &team_id, Some(7)).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_ACTION");
    }

    #[tokio::test]
    async fn empty_team_cannot_fight() {
        let (pool, _dir) = test_pool().await;
        let store = SessionStore::new();
        create_player(&pool, "p1", "user1", "u1@example.com", "hash", "Người Chơi")
            .await
            .unwrap();
        let team_list = teams::list(&pool, "p1").await.unwrap();
        let err = start_battle(&pool, &store, "p1", "stage_1_1", &team_list[0].id, Some(7))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "TEAM_ERROR");
    }

    #[tokio::test]
    async fn full_battle_flow_victory_rewards_and_story() {
        let (pool, _dir) = test_pool().await;
        let store = SessionStore::new();
        let team_id = seed_player_with_team(&pool).await;
        let gold_before = players::get_resources(&pool, "p1").await.unwrap().gold;

        let snapshot =
            start_battle(&pool, &store, "p1", "stage_1_1", &team_id, Some(7)).await.unwrap();
        let response = drive_to_victory(&pool, &store, &snapshot.battle_id).await;

        assert_eq!(response.result, BattleResult::Victory);
        let rewards = response.rewards.expect("victory carries rewards");
        // Two enemies at 50 exp / 100 gold each
        assert_eq!(rewards.exp, 100);
        assert_eq!(rewards.gold, 200);
        assert_eq!(rewards.stars, 3);
        assert!(rewards.first_clear);

        // Gold: battle gold + first-clear 500
        let gold_after = players::get_resources(&pool, "p1").await.unwrap().gold;
        assert_eq!(gold_after, gold_before + 200 + 500);

        // Story progressed and the session is gone
        let detail = story::chapter_detail(&pool, "p1", "chapter_1").await.unwrap();
        assert!(detail.stages[0].cleared);
        assert_eq!(detail.stages[0].stars, 3);
        assert!(store.get(&snapshot.battle_id).await.is_none());
        assert!(store.active_battle_id("p1").await.is_none());

        // History recorded newest first
        let records = history(&store, "p1").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result, BattleResult::Victory);
    }

    #[tokio::test]
    async fn acting_out_of_turn_is_rejected() {
        let (pool, _dir) = test_pool().await;
        let store = SessionStore::new();
        let team_id = seed_player_with_team(&pool).await;

        let snapshot =
            start_battle(&pool, &store, "p1", "stage_1_1", &team_id, Some(7)).await.unwrap();
        let not_current = snapshot
            .player_team
            .iter()
            .find(|h| Some(h.id.as_str()) != snapshot.current_actor_id.as_deref())
            .expect("two heroes on the team");
        let target = snapshot.enemy_team[0].id.clone();

        let err = execute_action(
            &store,
            "p1",
            &snapshot.battle_id,
            PlayerAction::Attack { attacker_id: not_current.id.clone(), target_id: target },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "NOT_PLAYER_TURN");
    }

    #[tokio::test]
    async fn foreign_battles_are_denied() {
        let (pool, _dir) = test_pool().await;
        let store = SessionStore::new();
        let team_id = seed_player_with_team(&pool).await;
        create_player(&pool, "p2", "user2", "u2@example.com", "hash", "Khác").await.unwrap();

        let snapshot =
            start_battle(&pool, &store, "p1", "stage_1_1", &team_id, Some(7)).await.unwrap();
        let err = get_state(&store, "p2", &snapshot.battle_id).await.unwrap_err();
        assert_eq!(err.code(), "ACCESS_DENIED");
    }

    #[tokio::test]
    async fn finalize_without_victory_is_a_retreat() {
        let (pool, _dir) = test_pool().await;
        let store = SessionStore::new();
        let team_id = seed_player_with_team(&pool).await;

        let snapshot =
            start_battle(&pool, &store, "p1", "stage_1_1", &team_id, Some(7)).await.unwrap();
        let response = finalize(&pool, &store, "p1", &snapshot.battle_id).await.unwrap();
        assert_eq!(response.result, BattleResult::Retreat);
        assert!(response.rewards.is_none());

        // Retreat still frees the player slot
        assert!(store.active_battle_id("p1").await.is_none());
        // And no story progress was recorded
        let detail = story::chapter_detail(&pool, "p1", "chapter_1").await.unwrap();
        assert!(!detail.stages[0].cleared);
    }

    #[tokio::test]
    async fn same_seed_gives_identical_battles() {
        let (pool, _dir) = test_pool().await;
        let team_id = seed_player_with_team(&pool).await;

        let store_a = SessionStore::new();
        let store_b = SessionStore::new();
        let snap_a =
            start_battle(&pool, &store_a, "p1", "stage_1_1", &team_id, Some(777)).await.unwrap();
        // Refund stamina so the second start is not blocked by resources
        crate::db::players::add_resources(&pool, "p1", 0, 0, 100).await.unwrap();
        let snap_b =
            start_battle(&pool, &store_b, "p1", "stage_1_1", &team_id, Some(777)).await.unwrap();

        let actor_a = snap_a.current_actor_id.clone().unwrap();
        let target_a = snap_a.enemy_team[0].id.clone();
        let response_a = execute_action(
            &store_a,
            "p1",
            &snap_a.battle_id,
            PlayerAction::Attack { attacker_id: actor_a.clone(), target_id: target_a.clone() },
        )
        .await
        .unwrap();
        let response_b = execute_action(
            &store_b,
            "p1",
            &snap_b.battle_id,
            PlayerAction::Attack { attacker_id: actor_a, target_id: target_a },
        )
        .await
        .unwrap();

        let hp_a: Vec<u32> = response_a.snapshot.enemy_team.iter().map(|e| e.current_hp).collect();
        let hp_b: Vec<u32> = response_b.snapshot.enemy_team.iter().map(|e| e.current_hp).collect();
        assert_eq!(hp_a, hp_b);
    }
}
