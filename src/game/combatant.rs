//! Combat entities: the shared character core with hero / enemy / boss payloads.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::element::Element;
use super::grid::GridPosition;
use super::skill::BattleSkill;
use super::stats::{HexagonStats, Stat};
use super::status::{StatusEffect, StatusEffectKind};

pub const MAX_MANA: u32 = 100;

/// AI behavior patterns for enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Aggressive,
    Defensive,
    Balanced,
    Support,
    Berserker,
}

impl Behavior {
    /// Probability of preferring a skill over a basic attack.
    pub fn skill_chance(&self) -> f64 {
        match self {
            Behavior::Aggressive => 0.6,
            Behavior::Defensive => 0.4,
            Behavior::Balanced => 0.5,
            Behavior::Support => 0.7,
            Behavior::Berserker => 0.3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Aggressive => "aggressive",
            Behavior::Defensive => "defensive",
            Behavior::Balanced => "balanced",
            Behavior::Support => "support",
            Behavior::Berserker => "berserker",
        }
    }
}

/// Thiên Giới boss tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MythicalTier {
    TuLinh,
    ThienVuong,
    ThuongCo,
    HonDon,
}

impl MythicalTier {
    pub fn power_multiplier(&self) -> f64 {
        match self {
            MythicalTier::TuLinh => 2.0,
            MythicalTier::ThienVuong => 3.0,
            MythicalTier::ThuongCo => 4.0,
            MythicalTier::HonDon => 5.0,
        }
    }
}

/// One entry of an enemy drop table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropEntry {
    pub item_id: String,
    /// Probability in [0, 1].
    pub probability: f64,
    pub quantity: u32,
}

/// A boss phase, entered when the boss HP fraction falls to its threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossPhase {
    pub phase_number: u32,
    /// HP fraction at or below which this phase applies (1.0 = full HP).
    pub hp_threshold: f64,
    pub name: String,
    /// Multiplicative stat modifiers while this phase is active (atk -> 1.5).
    pub stat_modifiers: Vec<(Stat, f64)>,
    /// Skill ids unlocked on entering this phase.
    pub new_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyData {
    pub template_id: String,
    pub behavior: Behavior,
    /// 1-10 difficulty rating.
    pub difficulty: u8,
    pub exp_reward: u64,
    pub gold_reward: u64,
    pub drop_table: Vec<DropEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossData {
    pub title: String,
    pub phases: Vec<BossPhase>,
    pub current_phase: u32,
    pub mythical_tier: Option<MythicalTier>,
    pub immunities: HashSet<String>,
    /// Phase-locked skills, resolved at battle build time and promoted into
    /// the active skill list when their phase is reached.
    pub reserve_skills: Vec<BattleSkill>,
}

impl BossData {
    pub fn new(title: &str, phases: Vec<BossPhase>, mythical_tier: Option<MythicalTier>) -> Self {
        BossData {
            title: title.to_string(),
            phases,
            current_phase: 1,
            mythical_tier,
            immunities: ["instant_death", "charm"].iter().map(|s| s.to_string()).collect(),
            reserve_skills: Vec::new(),
        }
    }

    pub fn is_immune_to(&self, effect: &str) -> bool {
        self.immunities.contains(effect)
    }

    fn phase(&self, number: u32) -> Option<&BossPhase> {
        self.phases.iter().find(|p| p.phase_number == number)
    }

    /// Multiplier the active phase applies to `stat`, 1.0 when none.
    pub fn phase_modifier(&self, stat: Stat) -> f64 {
        self.phase(self.current_phase)
            .and_then(|p| p.stat_modifiers.iter().find(|(s, _)| *s == stat))
            .map(|(_, m)| *m)
            .unwrap_or(1.0)
    }
}

/// Role-specific payload attached to a combatant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombatantKind {
    Hero {
        template_id: String,
        /// Owning hero row, for post-battle exp application.
        hero_id: String,
    },
    Enemy(EnemyData),
    Boss { enemy: EnemyData, boss: BossData },
}

#[derive(Debug, Clone, Copy)]
pub struct DamageOutcome {
    /// Damage soaked by shields before HP loss.
    pub absorbed: u32,
    /// HP actually removed.
    pub hp_lost: u32,
    pub died: bool,
}

/// A character in an active battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub element: Element,
    pub position: GridPosition,
    pub stats: HexagonStats,
    pub current_hp: u32,
    pub current_mana: u32,
    pub max_mana: u32,
    pub skills: Vec<BattleSkill>,
    pub effects: Vec<StatusEffect>,
    pub kind: CombatantKind,
}

impl Combatant {
    pub fn new(
        id: &str,
        name: &str,
        element: Element,
        position: GridPosition,
        stats: HexagonStats,
        kind: CombatantKind,
    ) -> Self {
        Combatant {
            id: id.to_string(),
            name: name.to_string(),
            element,
            position,
            stats,
            current_hp: stats.hp,
            current_mana: 0,
            max_mana: MAX_MANA,
            skills: Vec::new(),
            effects: Vec::new(),
            kind,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    pub fn is_hero(&self) -> bool {
        matches!(self.kind, CombatantKind::Hero { .. })
    }

    pub fn enemy_data(&self) -> Option<&EnemyData> {
        match &self.kind {
            CombatantKind::Enemy(data) => Some(data),
            CombatantKind::Boss { enemy, .. } => Some(enemy),
            CombatantKind::Hero { .. } => None,
        }
    }

    pub fn boss_data(&self) -> Option<&BossData> {
        match &self.kind {
            CombatantKind::Boss { boss, .. } => Some(boss),
            _ => None,
        }
    }

    /// Apply damage: shields absorb in insertion order, the remainder comes
    /// off HP, clamped at zero.
    pub fn take_damage(&mut self, damage: u32) -> DamageOutcome {
        let mut remaining = damage;
        for effect in self.effects.iter_mut() {
            if remaining == 0 {
                break;
            }
            remaining -= effect.absorb(remaining);
        }
        // Drained shields are spent
        self.effects
            .retain(|e| !(e.kind == StatusEffectKind::Shield && e.shield_amount == 0));

        let hp_lost = remaining.min(self.current_hp);
        self.current_hp -= hp_lost;
        DamageOutcome {
            absorbed: damage - remaining,
            hp_lost,
            died: self.current_hp == 0,
        }
    }

    /// Heal clamped at max HP. Returns the actual amount restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let max_hp = self.stats.hp;
        let actual = amount.min(max_hp - self.current_hp);
        self.current_hp += actual;
        actual
    }

    pub fn gain_mana(&mut self, amount: u32) {
        self.current_mana = (self.current_mana + amount).min(self.max_mana);
    }

    /// Spend mana; fails without mutation when short.
    pub fn spend_mana(&mut self, amount: u32) -> Result<(), InsufficientMana> {
        if amount > self.current_mana {
            return Err(InsufficientMana { have: self.current_mana, need: amount });
        }
        self.current_mana -= amount;
        Ok(())
    }

    /// False while a crowd-control effect with `prevents_action` is active.
    pub fn can_act(&self) -> bool {
        !self.effects.iter().any(|e| e.prevents_action)
    }

    /// Effective stat value: base, scaled by active effect modifiers, then by
    /// the boss phase multiplier when applicable.
    pub fn effective_stat(&self, stat: Stat) -> u32 {
        let base = self.stats.get(stat) as f64;
        let effect_factor: f64 = 1.0 + self.effects.iter().map(|e| e.modifier_for(stat)).sum::<f64>();
        let phase_factor = self.boss_data().map(|b| b.phase_modifier(stat)).unwrap_or(1.0);
        let value = base * effect_factor.max(0.0) * phase_factor;
        value as u32
    }

    pub fn effective_atk(&self) -> u32 {
        self.effective_stat(Stat::Atk)
    }

    pub fn effective_def(&self) -> u32 {
        self.effective_stat(Stat::Def)
    }

    pub fn effective_spd(&self) -> u32 {
        self.effective_stat(Stat::Spd)
    }

    /// Apply a status effect, honoring stacking rules: a matching stackable
    /// effect gains a stack and refreshes, a matching non-stackable effect is
    /// replaced, anything else is appended.
    pub fn apply_effect(&mut self, effect: StatusEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.id == effect.id) {
            if existing.is_stackable {
                existing.add_stack();
                existing.refresh(effect.duration);
            } else {
                *existing = effect;
            }
            return;
        }
        self.effects.push(effect);
    }

    pub fn skill(&self, skill_id: &str) -> Option<&BattleSkill> {
        self.skills.iter().find(|s| s.spec.id == skill_id)
    }

    pub fn skill_mut(&mut self, skill_id: &str) -> Option<&mut BattleSkill> {
        self.skills.iter_mut().find(|s| s.spec.id == skill_id)
    }

    /// Monotonic phase transition: move to the highest phase whose HP
    /// threshold is met and whose number is above the current phase. A single
    /// large hit can therefore cross several phases at once. Skills of every
    /// phase passed through are promoted from the reserve; their ids are
    /// returned.
    pub fn check_phase_transition(&mut self) -> Option<(u32, Vec<String>)> {
        let hp_fraction = self.current_hp as f64 / self.stats.hp as f64;
        let Combatant { kind, skills, .. } = self;
        let boss = match kind {
            CombatantKind::Boss { boss, .. } => boss,
            _ => return None,
        };
        let target = boss
            .phases
            .iter()
            .filter(|p| p.phase_number > boss.current_phase && hp_fraction <= p.hp_threshold)
            .max_by_key(|p| p.phase_number)?
            .phase_number;

        let mut unlocked = Vec::new();
        for phase in &boss.phases {
            if phase.phase_number > boss.current_phase && phase.phase_number <= target {
                unlocked.extend(phase.new_skills.iter().cloned());
            }
        }
        for id in &unlocked {
            if let Some(pos) = boss.reserve_skills.iter().position(|s| &s.spec.id == id) {
                skills.push(boss.reserve_skills.remove(pos));
            }
        }
        boss.current_phase = target;
        Some((target, unlocked))
    }

    /// Power rating for enemies and bosses; heroes are rated in
    /// [`crate::game::hero`].
    pub fn power_rating(&self) -> u64 {
        let base = self.stats.total_power() as f64;
        let Some(enemy) = self.enemy_data() else {
            return base as u64;
        };
        let difficulty_factor = 1.0 + 0.2 * (enemy.difficulty.max(1) - 1) as f64;
        let mut power = (base * difficulty_factor).floor();
        if let Some(boss) = self.boss_data() {
            if let Some(tier) = boss.mythical_tier {
                power = (power * tier.power_multiplier()).floor();
            }
        }
        power as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("insufficient mana: have {have}, need {need}")]
pub struct InsufficientMana {
    pub have: u32,
    pub need: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(hp: u32) -> Combatant {
        Combatant::new(
            "c1",
            "Lính Thử",
            Element::Kim,
            GridPosition::new(0, 0).unwrap(),
            HexagonStats::new(hp, 100, 40, 90, 10, 10),
            CombatantKind::Enemy(EnemyData {
                template_id: "dan_binh".into(),
                behavior: Behavior::Balanced,
                difficulty: 1,
                exp_reward: 10,
                gold_reward: 5,
                drop_table: Vec::new(),
            }),
        )
    }

    #[test]
    fn damage_clamps_at_zero_and_reports_death() {
        let mut c = fighter(100);
        let out = c.take_damage(30);
        assert_eq!(out.hp_lost, 30);
        assert!(!out.died);
        let out = c.take_damage(500);
        assert_eq!(out.hp_lost, 70);
        assert!(out.died);
        assert_eq!(c.current_hp, 0);
        assert!(!c.is_alive());
    }

    #[test]
    fn heal_clamps_at_max_and_reports_actual() {
        let mut c = fighter(100);
        c.take_damage(40);
        assert_eq!(c.heal(25), 25);
        assert_eq!(c.heal(100), 15);
        assert_eq!(c.current_hp, 100);
        // Heal on full HP is zero
        assert_eq!(c.heal(50), 0);
    }

    #[test]
    fn mana_bounds() {
        let mut c = fighter(100);
        assert_eq!(c.current_mana, 0);
        c.gain_mana(150);
        assert_eq!(c.current_mana, MAX_MANA);
        assert!(c.spend_mana(60).is_ok());
        let err = c.spend_mana(60).unwrap_err();
        assert_eq!(err, InsufficientMana { have: 40, need: 60 });
        // Failed spend mutates nothing
        assert_eq!(c.current_mana, 40);
    }

    #[test]
    fn shields_absorb_in_insertion_order() {
        let mut c = fighter(100);
        let mut first = StatusEffect::new("shield_a", "Thuẫn A", StatusEffectKind::Shield, 3);
        first.shield_amount = 20;
        let mut second = StatusEffect::new("shield_b", "Thuẫn B", StatusEffectKind::Shield, 3);
        second.shield_amount = 50;
        c.apply_effect(first);
        c.apply_effect(second);

        let out = c.take_damage(30);
        assert_eq!(out.absorbed, 30);
        assert_eq!(out.hp_lost, 0);
        // First shield fully drained and removed, second at 40
        assert_eq!(c.effects.len(), 1);
        assert_eq!(c.effects[0].id, "shield_b");
        assert_eq!(c.effects[0].shield_amount, 40);

        let out = c.take_damage(60);
        assert_eq!(out.absorbed, 40);
        assert_eq!(out.hp_lost, 20);
    }

    #[test]
    fn crowd_control_disables_actions() {
        let mut c = fighter(100);
        assert!(c.can_act());
        let mut stun = StatusEffect::new("stun", "Choáng", StatusEffectKind::CrowdControl, 1);
        stun.prevents_action = true;
        c.apply_effect(stun);
        assert!(!c.can_act());
    }

    #[test]
    fn reapplying_stackable_effect_adds_stack_and_refreshes() {
        let mut c = fighter(100);
        let mut poison = StatusEffect::new("poison", "Độc", StatusEffectKind::Dot, 2);
        poison.damage_per_turn = 5;
        poison.is_stackable = true;
        poison.max_stacks = 3;
        c.apply_effect(poison.clone());
        poison.duration = 4;
        c.apply_effect(poison);
        assert_eq!(c.effects.len(), 1);
        assert_eq!(c.effects[0].current_stacks, 2);
        assert_eq!(c.effects[0].duration, 4);
    }

    #[test]
    fn buff_changes_effective_stat() {
        let mut c = fighter(100);
        assert_eq!(c.effective_atk(), 100);
        let mut buff = StatusEffect::new("war_cry", "Chiến Hống", StatusEffectKind::Buff, 2);
        buff.stat_modifiers.insert(Stat::Atk, 0.2);
        c.apply_effect(buff);
        assert_eq!(c.effective_atk(), 120);
    }

    fn boss_with_phases(hp: u32) -> Combatant {
        let phases = vec![
            BossPhase {
                phase_number: 1,
                hp_threshold: 1.0,
                name: "Khởi Đầu".into(),
                stat_modifiers: Vec::new(),
                new_skills: Vec::new(),
            },
            BossPhase {
                phase_number: 2,
                hp_threshold: 0.5,
                name: "Cuồng Bạo".into(),
                stat_modifiers: vec![(Stat::Atk, 1.5)],
                new_skills: vec!["dia_liet".into()],
            },
            BossPhase {
                phase_number: 3,
                hp_threshold: 0.2,
                name: "Tuyệt Vọng".into(),
                stat_modifiers: vec![(Stat::Atk, 2.0), (Stat::Spd, 1.5)],
                new_skills: vec!["thien_phat".into()],
            },
        ];
        Combatant::new(
            "boss",
            "Trương Giác",
            Element::Tho,
            GridPosition::new(1, 1).unwrap(),
            HexagonStats::new(hp, 100, 50, 80, 10, 10),
            CombatantKind::Boss {
                enemy: EnemyData {
                    template_id: "truong_giac".into(),
                    behavior: Behavior::Aggressive,
                    difficulty: 5,
                    exp_reward: 100,
                    gold_reward: 200,
                    drop_table: Vec::new(),
                },
                boss: BossData::new("Đại Hiền Lương Sư", phases, None),
            },
        )
    }

    #[test]
    fn phase_transition_at_threshold() {
        let mut boss = boss_with_phases(1000);
        boss.take_damage(600);
        let (phase, unlocked) = boss.check_phase_transition().unwrap();
        assert_eq!(phase, 2);
        assert_eq!(unlocked, vec!["dia_liet".to_string()]);
        assert_eq!(boss.boss_data().unwrap().current_phase, 2);
        // atk modifier now applies multiplicatively
        assert_eq!(boss.effective_atk(), 150);
    }

    #[test]
    fn large_spike_jumps_to_highest_phase_and_collects_skills() {
        let mut boss = boss_with_phases(1000);
        boss.take_damage(900);
        let (phase, unlocked) = boss.check_phase_transition().unwrap();
        assert_eq!(phase, 3);
        assert_eq!(unlocked, vec!["dia_liet".to_string(), "thien_phat".to_string()]);
        assert_eq!(boss.effective_atk(), 200);
        // No further transition without more damage
        assert!(boss.check_phase_transition().is_none());
    }

    #[test]
    fn default_boss_immunities() {
        let boss = boss_with_phases(1000);
        let data = boss.boss_data().unwrap();
        assert!(data.is_immune_to("instant_death"));
        assert!(data.is_immune_to("charm"));
        assert!(!data.is_immune_to("poison"));
    }

    #[test]
    fn enemy_power_scales_with_difficulty() {
        let mut c = fighter(100);
        // total power = 100+100+40+90+10+10 = 350, difficulty 1 -> x1.0
        assert_eq!(c.power_rating(), 350);
        if let CombatantKind::Enemy(data) = &mut c.kind {
            data.difficulty = 6;
        }
        assert_eq!(c.power_rating(), 700);
    }

    #[test]
    fn mythical_tier_multiplies_boss_power() {
        let mut boss = boss_with_phases(1000);
        let base = boss.power_rating();
        if let CombatantKind::Boss { boss: data, .. } = &mut boss.kind {
            data.mythical_tier = Some(MythicalTier::HonDon);
        }
        assert_eq!(boss.power_rating(), base * 5);
    }
}
