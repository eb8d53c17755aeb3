//! The battle engine: damage resolution, skill execution, turn processing,
//! enemy AI, termination, and reward derivation.
//!
//! Every operation is synchronous and all-or-nothing: validation happens
//! before the first mutation, so a rejected action leaves the battle
//! untouched. All randomness comes from the battle's own seeded RNG, which
//! makes a battle fully reproducible from its seed and action sequence.

use rand::Rng;

use super::battle::{Battle, BattleEvent, BattleResult, BattleState};
use super::combatant::{Combatant, DropEntry, InsufficientMana};
use super::skill::{PassiveTrigger, SkillKind, SkillVariant, TargetType};
use super::stats::Stat;
use super::status::{StatusEffect, StatusEffectKind};

pub const MIN_DAMAGE: u32 = 1;
pub const DEF_REDUCTION_FACTOR: f64 = 0.5;
/// Enemies never spend below this much mana on a skill.
pub const AI_SKILL_MANA_FLOOR: u32 = 50;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("battle has already ended")]
    BattleEnded,
    #[error("character not found: {0}")]
    CharacterNotFound(String),
    #[error("character is dead: {0}")]
    CharacterDead(String),
    #[error("character cannot act: {0}")]
    CannotAct(String),
    #[error("target is already dead: {0}")]
    TargetDead(String),
    #[error(transparent)]
    InsufficientMana(#[from] InsufficientMana),
    #[error("skill not found: {0}")]
    SkillNotFound(String),
    #[error("skill is on cooldown: {0}")]
    SkillOnCooldown(String),
    #[error("invalid targets: {0}")]
    InvalidTargets(String),
}

#[derive(Debug, Clone)]
pub struct AttackOutcome {
    pub damage: u32,
    pub is_crit: bool,
    pub element_multiplier: f64,
    pub absorbed: u32,
    pub target_hp: u32,
    pub target_died: bool,
}

#[derive(Debug, Clone)]
pub struct SkillTargetOutcome {
    pub target_id: String,
    pub damage: u32,
    pub heal: u32,
    pub is_crit: bool,
    pub effect_applied: Option<String>,
    pub target_died: bool,
}

#[derive(Debug, Clone)]
pub struct SkillOutcome {
    pub skill_id: String,
    pub mana_spent: u32,
    pub remaining_mana: u32,
    pub targets: Vec<SkillTargetOutcome>,
}

#[derive(Debug, Clone)]
pub struct HealTargetOutcome {
    pub target_id: String,
    pub actual_heal: u32,
    pub new_hp: u32,
}

#[derive(Debug, Clone)]
pub struct HealOutcome {
    pub mana_spent: u32,
    pub remaining_mana: u32,
    pub targets: Vec<HealTargetOutcome>,
}

#[derive(Debug, Clone)]
pub struct TurnAdvance {
    pub old_turn: u32,
    pub new_turn: u32,
    pub current_actor_id: Option<String>,
    pub is_player_turn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiAction {
    Attack { target_id: String },
    Skill { skill_id: String, target_ids: Vec<String> },
    Pass,
}

#[derive(Debug, Clone)]
pub struct RewardDrop {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct BattleRewards {
    pub exp: u64,
    pub gold: u64,
    pub drops: Vec<RewardDrop>,
    pub stars: u8,
}

// ============================================================================
// DAMAGE / HEAL FORMULAS
// ============================================================================

/// damage = max(1, floor((ATK * skill_mult - DEF * 0.5) * element * crit))
pub fn calculate_damage(
    atk: u32,
    def: u32,
    skill_multiplier: f64,
    element_multiplier: f64,
    crit_multiplier: f64,
) -> u32 {
    let raw = (atk as f64 * skill_multiplier - def as f64 * DEF_REDUCTION_FACTOR)
        * element_multiplier
        * crit_multiplier;
    let floored = raw.floor();
    if floored < MIN_DAMAGE as f64 {
        MIN_DAMAGE
    } else {
        floored as u32
    }
}

/// Percent heal off the target's max HP.
pub fn calculate_heal(target_max_hp: u32, heal_multiplier: f64) -> u32 {
    (target_max_hp as f64 * heal_multiplier) as u32
}

/// ATK-scaling heal, used by heal-type skills.
pub fn calculate_heal_from_atk(caster_atk: u32, heal_multiplier: f64) -> u32 {
    (caster_atk as f64 * heal_multiplier) as u32
}

fn roll_crit(battle: &mut Battle, crit_stat: u32) -> bool {
    let chance = (crit_stat as f64 / 100.0).min(1.0);
    battle.rng().gen::<f64>() < chance
}

// ============================================================================
// BATTLE LIFECYCLE
// ============================================================================

/// Build a battle, arm always-on passives, and run the first turn-start step.
pub fn start_battle(
    battle_id: &str,
    player_id: &str,
    stage_id: &str,
    heroes: Vec<Combatant>,
    enemies: Vec<Combatant>,
    seed: u64,
) -> Battle {
    let mut battle = Battle::new(battle_id, player_id, stage_id, heroes, enemies, seed);
    apply_always_passives(&mut battle);
    process_turn_start(&mut battle);
    battle
}

/// Passives with an `always` trigger become permanent self-buffs at battle
/// start; they never tick down.
fn apply_always_passives(battle: &mut Battle) {
    for combatant in battle.heroes.iter_mut().chain(battle.enemies.iter_mut()) {
        let passives: Vec<StatusEffect> = combatant
            .skills
            .iter()
            .filter(|s| {
                matches!(
                    s.spec.variant,
                    SkillVariant::Passive { trigger: PassiveTrigger::Always }
                ) && !s.spec.buff.is_empty()
            })
            .map(|s| {
                let mut effect =
                    StatusEffect::new(&s.spec.id, &s.spec.name, StatusEffectKind::Buff, u32::MAX);
                effect.stat_modifiers = s.spec.buff.clone();
                effect
            })
            .collect();
        for effect in passives {
            combatant.apply_effect(effect);
        }
    }
}

/// Turn-start step, in order: boss phase transitions, DOT/HOT ticks across
/// the whole field, the current actor's cooldown ticks, then the mana grant
/// to the current actor.
pub fn process_turn_start(battle: &mut Battle) {
    // Phase transitions first so phase stat modifiers shape this turn
    let boss_ids: Vec<String> = battle
        .enemies
        .iter()
        .filter(|e| e.boss_data().is_some() && e.is_alive())
        .map(|e| e.id.clone())
        .collect();
    for id in boss_ids {
        let transition = battle
            .combatant_mut(&id)
            .and_then(|boss| boss.check_phase_transition());
        if let Some((phase, _)) = transition {
            battle.log(BattleEvent::PhaseTransition { boss_id: id, phase });
        }
    }

    // DOT/HOT across the field, then expire effects
    let field: Vec<String> = battle
        .heroes
        .iter()
        .chain(battle.enemies.iter())
        .filter(|c| c.is_alive())
        .map(|c| c.id.clone())
        .collect();
    for id in field {
        let mut dot = 0u32;
        let mut hot = 0u32;
        if let Some(c) = battle.combatant(&id) {
            for effect in &c.effects {
                dot += effect.tick_damage();
                hot += effect.tick_heal();
            }
        }
        let mut died = false;
        if dot > 0 {
            if let Some(c) = battle.combatant_mut(&id) {
                died = c.take_damage(dot).died;
            }
            battle.log(BattleEvent::DotTick { target_id: id.clone(), damage: dot });
        }
        if hot > 0 && !died {
            if let Some(c) = battle.combatant_mut(&id) {
                c.heal(hot);
            }
            battle.log(BattleEvent::HotTick { target_id: id.clone(), heal: hot });
        }
        if let Some(c) = battle.combatant_mut(&id) {
            for effect in c.effects.iter_mut() {
                effect.reduce_duration();
            }
            c.effects.retain(|e| !e.is_expired());
        }
        if died {
            battle.remove_from_order(&id);
        }
    }

    // Current actor: cooldown ticks, then the mana grant
    let mana = battle.mana_per_turn;
    if let Some(actor_id) = battle.current_actor_id().map(str::to_string) {
        if let Some(actor) = battle.combatant_mut(&actor_id) {
            for skill in actor.skills.iter_mut() {
                skill.reduce_cooldown();
            }
            actor.gain_mana(mana);
        }
    }
}

/// Advance the scheduler one slot and run the turn-start step for the new
/// actor.
pub fn advance_turn(battle: &mut Battle) -> TurnAdvance {
    let old_turn = battle.turn_number;
    battle.advance();
    process_turn_start(battle);
    let advance = TurnAdvance {
        old_turn,
        new_turn: battle.turn_number,
        current_actor_id: battle.current_actor_id().map(str::to_string),
        is_player_turn: battle.is_player_turn(),
    };
    battle.log(BattleEvent::TurnAdvanced {
        new_turn: advance.new_turn,
        current_actor_id: advance.current_actor_id.clone(),
    });
    advance
}

// ============================================================================
// ACTIONS
// ============================================================================

/// A basic attack (or a raw multiplied strike on behalf of a skill).
pub fn execute_attack(
    battle: &mut Battle,
    attacker_id: &str,
    target_id: &str,
    skill_multiplier: f64,
) -> Result<AttackOutcome, EngineError> {
    if battle.is_ended() {
        return Err(EngineError::BattleEnded);
    }
    let attacker = battle
        .combatant(attacker_id)
        .ok_or_else(|| EngineError::CharacterNotFound(attacker_id.to_string()))?;
    if !attacker.is_alive() {
        return Err(EngineError::CharacterDead(attacker_id.to_string()));
    }
    if !attacker.can_act() {
        return Err(EngineError::CannotAct(attacker_id.to_string()));
    }
    let target = battle
        .combatant(target_id)
        .ok_or_else(|| EngineError::CharacterNotFound(target_id.to_string()))?;
    if !target.is_alive() {
        return Err(EngineError::TargetDead(target_id.to_string()));
    }

    let atk = attacker.effective_atk();
    let crit_stat = attacker.effective_stat(Stat::Crit);
    let element_multiplier = attacker.element.multiplier(target.element);
    let def = target.effective_def();

    let is_crit = roll_crit(battle, crit_stat);
    let crit_multiplier = if is_crit { 1.0 + crit_stat as f64 / 100.0 } else { 1.0 };
    let damage = calculate_damage(atk, def, skill_multiplier, element_multiplier, crit_multiplier);

    let target = battle.combatant_mut(target_id).expect("target checked above");
    let outcome = target.take_damage(damage);
    let target_hp = target.current_hp;
    if outcome.died {
        battle.remove_from_order(target_id);
    }
    if let Some((phase, _)) = battle
        .combatant_mut(target_id)
        .and_then(|t| t.check_phase_transition())
    {
        battle.log(BattleEvent::PhaseTransition { boss_id: target_id.to_string(), phase });
    }

    battle.log(BattleEvent::Attack {
        attacker_id: attacker_id.to_string(),
        target_id: target_id.to_string(),
        damage,
        is_crit,
        element_multiplier,
        target_died: outcome.died,
    });

    Ok(AttackOutcome {
        damage,
        is_crit,
        element_multiplier,
        absorbed: outcome.absorbed,
        target_hp,
        target_died: outcome.died,
    })
}

fn validate_targets(
    battle: &Battle,
    caster_id: &str,
    target: TargetType,
    target_ids: &[String],
    aoe_range: u8,
) -> Result<(), EngineError> {
    if target_ids.is_empty() {
        return Err(EngineError::InvalidTargets("no targets given".into()));
    }
    for id in target_ids {
        let t = battle
            .combatant(id)
            .ok_or_else(|| EngineError::CharacterNotFound(id.clone()))?;
        if !t.is_alive() {
            return Err(EngineError::TargetDead(id.clone()));
        }
    }
    let caster_is_hero = battle.is_hero_id(caster_id);
    let same_side = |id: &str| battle.is_hero_id(id) == caster_is_hero;
    match target {
        TargetType::SelfOnly => {
            if target_ids.len() != 1 || target_ids[0] != caster_id {
                return Err(EngineError::InvalidTargets("self-targeted skill".into()));
            }
        }
        TargetType::SingleAlly => {
            if target_ids.len() != 1 || !same_side(&target_ids[0]) {
                return Err(EngineError::InvalidTargets("expects exactly one ally".into()));
            }
        }
        TargetType::SingleEnemy => {
            if target_ids.len() != 1 || same_side(&target_ids[0]) {
                return Err(EngineError::InvalidTargets("expects exactly one enemy".into()));
            }
        }
        TargetType::AllAllies => {
            if target_ids.iter().any(|id| !same_side(id)) {
                return Err(EngineError::InvalidTargets("expects allies only".into()));
            }
        }
        TargetType::AllEnemies => {
            if target_ids.iter().any(|id| same_side(id)) {
                return Err(EngineError::InvalidTargets("expects enemies only".into()));
            }
        }
        TargetType::Aoe => {
            // All targets must fall within range of the first target's cell
            let center = battle
                .combatant(&target_ids[0])
                .expect("existence checked above")
                .position;
            for id in target_ids {
                let pos = battle.combatant(id).expect("existence checked above").position;
                if pos.distance_to(&center) > aoe_range {
                    return Err(EngineError::InvalidTargets("target outside area of effect".into()));
                }
            }
        }
    }
    Ok(())
}

/// Execute a skill. Validates caster, mana, cooldown, and target shape before
/// mutating anything; per-target crit rolls come from the battle RNG.
pub fn execute_skill(
    battle: &mut Battle,
    caster_id: &str,
    skill_id: &str,
    target_ids: &[String],
    mana_cost: u32,
    skill_multiplier: f64,
) -> Result<SkillOutcome, EngineError> {
    if battle.is_ended() {
        return Err(EngineError::BattleEnded);
    }
    let caster = battle
        .combatant(caster_id)
        .ok_or_else(|| EngineError::CharacterNotFound(caster_id.to_string()))?;
    if !caster.is_alive() {
        return Err(EngineError::CharacterDead(caster_id.to_string()));
    }
    if !caster.can_act() {
        return Err(EngineError::CannotAct(caster_id.to_string()));
    }
    if caster.current_mana < mana_cost {
        return Err(EngineError::InsufficientMana(InsufficientMana {
            have: caster.current_mana,
            need: mana_cost,
        }));
    }
    let skill = caster
        .skill(skill_id)
        .ok_or_else(|| EngineError::SkillNotFound(skill_id.to_string()))?;
    if skill.spec.is_passive() {
        return Err(EngineError::InvalidTargets("passive skills trigger automatically".into()));
    }
    if !skill.is_ready() {
        return Err(EngineError::SkillOnCooldown(skill_id.to_string()));
    }
    let spec = skill.spec.clone();
    validate_targets(battle, caster_id, spec.target, target_ids, spec.aoe_range)?;

    // Validation complete; commit
    let caster_atk;
    let caster_crit;
    let caster_element;
    {
        let caster = battle.combatant_mut(caster_id).expect("caster checked above");
        caster.spend_mana(mana_cost).expect("mana checked above");
        caster_atk = caster.effective_atk();
        caster_crit = caster.effective_stat(Stat::Crit);
        caster_element = caster.element;
        caster
            .skill_mut(skill_id)
            .expect("skill checked above")
            .trigger_cooldown();
    }
    let remaining_mana = battle.combatant(caster_id).expect("caster").current_mana;
    let skill_element = spec.element.unwrap_or(caster_element);

    let mut targets = Vec::new();
    for target_id in target_ids {
        let outcome = match spec.kind {
            SkillKind::Damage => {
                let target = battle.combatant(target_id).expect("target checked above");
                let def = target.effective_def();
                let element_multiplier = skill_element.multiplier(target.element);
                let is_crit = roll_crit(battle, caster_crit);
                let crit_multiplier =
                    if is_crit { 1.0 + caster_crit as f64 / 100.0 } else { 1.0 };
                let damage = calculate_damage(
                    caster_atk,
                    def,
                    skill_multiplier,
                    element_multiplier,
                    crit_multiplier,
                );
                let target = battle.combatant_mut(target_id).expect("target");
                let hit = target.take_damage(damage);
                if hit.died {
                    battle.remove_from_order(target_id);
                }
                if let Some((phase, _)) = battle
                    .combatant_mut(target_id)
                    .and_then(|t| t.check_phase_transition())
                {
                    battle.log(BattleEvent::PhaseTransition {
                        boss_id: target_id.clone(),
                        phase,
                    });
                }
                SkillTargetOutcome {
                    target_id: target_id.clone(),
                    damage,
                    heal: 0,
                    is_crit,
                    effect_applied: None,
                    target_died: hit.died,
                }
            }
            SkillKind::Heal => {
                let heal = calculate_heal_from_atk(caster_atk, skill_multiplier);
                let target = battle.combatant_mut(target_id).expect("target");
                let actual = target.heal(heal);
                SkillTargetOutcome {
                    target_id: target_id.clone(),
                    damage: 0,
                    heal: actual,
                    is_crit: false,
                    effect_applied: None,
                    target_died: false,
                }
            }
            SkillKind::Buff | SkillKind::Debuff => {
                let mut effect = StatusEffect::new(
                    &spec.id,
                    &spec.name,
                    if spec.kind == SkillKind::Buff {
                        StatusEffectKind::Buff
                    } else {
                        StatusEffectKind::Debuff
                    },
                    spec.duration.max(1),
                );
                effect.source_id = Some(caster_id.to_string());
                let map = if spec.kind == SkillKind::Buff { &spec.buff } else { &spec.debuff };
                for (stat, value) in map {
                    let signed = if spec.kind == SkillKind::Buff { *value } else { -*value };
                    effect.stat_modifiers.insert(*stat, signed);
                }
                let target = battle.combatant_mut(target_id).expect("target");
                // Bosses shrug off effects they are immune to
                let immune = target
                    .boss_data()
                    .map(|b| b.is_immune_to(&effect.id))
                    .unwrap_or(false);
                let applied = if immune {
                    None
                } else {
                    target.apply_effect(effect);
                    Some(spec.id.clone())
                };
                if let Some(effect_id) = &applied {
                    battle.log(BattleEvent::EffectApplied {
                        target_id: target_id.clone(),
                        effect_id: effect_id.clone(),
                    });
                }
                SkillTargetOutcome {
                    target_id: target_id.clone(),
                    damage: 0,
                    heal: 0,
                    is_crit: false,
                    effect_applied: applied,
                    target_died: false,
                }
            }
        };
        targets.push(outcome);
    }

    battle.log(BattleEvent::Skill {
        caster_id: caster_id.to_string(),
        skill_id: skill_id.to_string(),
        mana_cost,
        target_ids: target_ids.to_vec(),
    });

    Ok(SkillOutcome {
        skill_id: skill_id.to_string(),
        mana_spent: mana_cost,
        remaining_mana,
        targets,
    })
}

/// Percent-of-max-HP heal on each target.
pub fn execute_heal(
    battle: &mut Battle,
    caster_id: &str,
    target_ids: &[String],
    mana_cost: u32,
    heal_multiplier: f64,
) -> Result<HealOutcome, EngineError> {
    if battle.is_ended() {
        return Err(EngineError::BattleEnded);
    }
    let caster = battle
        .combatant(caster_id)
        .ok_or_else(|| EngineError::CharacterNotFound(caster_id.to_string()))?;
    if !caster.is_alive() {
        return Err(EngineError::CharacterDead(caster_id.to_string()));
    }
    if caster.current_mana < mana_cost {
        return Err(EngineError::InsufficientMana(InsufficientMana {
            have: caster.current_mana,
            need: mana_cost,
        }));
    }
    for id in target_ids {
        let t = battle
            .combatant(id)
            .ok_or_else(|| EngineError::CharacterNotFound(id.clone()))?;
        if !t.is_alive() {
            return Err(EngineError::TargetDead(id.clone()));
        }
    }

    battle
        .combatant_mut(caster_id)
        .expect("caster checked above")
        .spend_mana(mana_cost)
        .expect("mana checked above");
    let remaining_mana = battle.combatant(caster_id).expect("caster").current_mana;

    let mut targets = Vec::new();
    for target_id in target_ids {
        let target = battle.combatant_mut(target_id).expect("target checked above");
        let amount = calculate_heal(target.stats.hp, heal_multiplier);
        let actual = target.heal(amount);
        let new_hp = target.current_hp;
        battle.log(BattleEvent::Heal {
            caster_id: caster_id.to_string(),
            target_id: target_id.clone(),
            amount: actual,
        });
        targets.push(HealTargetOutcome {
            target_id: target_id.clone(),
            actual_heal: actual,
            new_hp,
        });
    }

    Ok(HealOutcome { mana_spent: mana_cost, remaining_mana, targets })
}

// ============================================================================
// AI
// ============================================================================

/// Pick the living hero with the lowest HP; ties break by grid position
/// (row-major), then id.
fn lowest_hp_hero(battle: &Battle) -> Option<&Combatant> {
    battle
        .living_heroes()
        .min_by_key(|h| (h.current_hp, h.position.y, h.position.x, h.id.clone()))
}

/// Deterministic enemy action selection.
///
/// Without skills or with mana below the floor the enemy basic-attacks the
/// weakest hero; otherwise a behavior-weighted roll decides between the first
/// ready skill and a basic attack.
pub fn ai_choose_action(battle: &mut Battle, enemy_id: &str) -> Result<AiAction, EngineError> {
    let enemy = battle
        .combatant(enemy_id)
        .ok_or_else(|| EngineError::CharacterNotFound(enemy_id.to_string()))?;
    if !enemy.is_alive() {
        return Err(EngineError::CharacterDead(enemy_id.to_string()));
    }
    let Some(target) = lowest_hp_hero(battle) else {
        return Ok(AiAction::Pass);
    };
    let target_id = target.id.clone();
    let enemy = battle.combatant(enemy_id).expect("checked above");

    let has_castable = enemy.skills.iter().any(|s| !s.spec.is_passive());
    if !has_castable || enemy.current_mana < AI_SKILL_MANA_FLOOR {
        return Ok(AiAction::Attack { target_id });
    }

    let behavior = enemy
        .enemy_data()
        .map(|d| d.behavior)
        .unwrap_or(super::combatant::Behavior::Balanced);
    let chance = behavior.skill_chance();
    let use_skill = battle.rng().gen::<f64>() < chance;
    if !use_skill {
        return Ok(AiAction::Attack { target_id });
    }

    let enemy = battle.combatant(enemy_id).expect("checked above");
    let ready = enemy
        .skills
        .iter()
        .find(|s| !s.spec.is_passive() && s.is_ready() && s.spec.mana_cost <= enemy.current_mana);
    let Some(skill) = ready else {
        return Ok(AiAction::Attack { target_id });
    };

    let target_ids = match skill.spec.target {
        TargetType::SelfOnly => vec![enemy_id.to_string()],
        TargetType::SingleAlly => {
            let ally = battle
                .living_enemies()
                .min_by_key(|e| (e.current_hp, e.id.clone()))
                .map(|e| e.id.clone())
                .unwrap_or_else(|| enemy_id.to_string());
            vec![ally]
        }
        TargetType::SingleEnemy => vec![target_id],
        TargetType::AllAllies => battle.living_enemies().map(|e| e.id.clone()).collect(),
        TargetType::AllEnemies | TargetType::Aoe => {
            battle.living_heroes().map(|h| h.id.clone()).collect()
        }
    };

    Ok(AiAction::Skill { skill_id: skill.spec.id.clone(), target_ids })
}

// ============================================================================
// TERMINATION & REWARDS
// ============================================================================

/// Victory once no enemy lives, defeat once no hero lives.
pub fn check_end(battle: &Battle) -> Option<BattleResult> {
    if battle.living_enemies().next().is_none() {
        Some(BattleResult::Victory)
    } else if battle.living_heroes().next().is_none() {
        Some(BattleResult::Defeat)
    } else {
        None
    }
}

pub fn end_battle(battle: &mut Battle, result: BattleResult) {
    battle.state = match result {
        BattleResult::Victory => BattleState::Victory,
        BattleResult::Defeat => BattleState::Defeat,
        BattleResult::Retreat => BattleState::Retreat,
    };
    battle.log(BattleEvent::BattleEnded { result });
}

/// Sum enemy rewards and roll the drop tables. Stars on victory: 3 minus one
/// per dead hero, floored at 1.
pub fn calculate_rewards(battle: &mut Battle) -> BattleRewards {
    let mut exp = 0u64;
    let mut gold = 0u64;
    let mut tables: Vec<DropEntry> = Vec::new();
    for enemy in &battle.enemies {
        if let Some(data) = enemy.enemy_data() {
            exp += data.exp_reward;
            gold += data.gold_reward;
            tables.extend(data.drop_table.iter().cloned());
        }
    }
    let mut drops = Vec::new();
    for entry in tables {
        if battle.rng().gen::<f64>() < entry.probability {
            drops.push(RewardDrop { item_id: entry.item_id, quantity: entry.quantity });
        }
    }
    let stars = if battle.state == BattleState::Victory {
        let dead = battle.heroes.iter().filter(|h| !h.is_alive()).count() as i32;
        (3 - dead).max(1) as u8
    } else {
        0
    };
    BattleRewards { exp, gold, drops, stars }
}
