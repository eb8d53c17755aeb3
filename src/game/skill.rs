//! Skills: catalog-level specs and per-battle instances with cooldown state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::element::Element;
use super::stats::Stat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Damage,
    Heal,
    Buff,
    Debuff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    SelfOnly,
    SingleAlly,
    SingleEnemy,
    AllAllies,
    AllEnemies,
    Aoe,
}

/// When a passive skill fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassiveTrigger {
    Always,
    OnAttack,
    OnHit,
    OnLowHp,
}

/// What distinguishes the three skill families. Actives are castable,
/// passives never cost mana or cooldown, ultimates are actives gated on the
/// ultimate gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum SkillVariant {
    Active,
    Passive { trigger: PassiveTrigger },
    Ultimate { gauge_cost: u32, animation_id: String },
}

/// Full description of a skill. Catalog templates hand out clones of these;
/// the battle engine reads everything it needs from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mana_cost: u32,
    pub cooldown: u32,
    pub max_level: u32,
    pub kind: SkillKind,
    pub target: TargetType,
    pub element: Option<Element>,
    pub damage_multiplier: f64,
    pub heal_multiplier: f64,
    /// Stat buffs applied to targets, fractional (atk -> 0.2 is +20%).
    pub buff: HashMap<Stat, f64>,
    /// Stat debuffs applied to targets, fractional and positive (stored as reductions).
    pub debuff: HashMap<Stat, f64>,
    pub aoe_range: u8,
    /// Buff/debuff duration in turns.
    pub duration: u32,
    pub variant: SkillVariant,
}

impl SkillSpec {
    pub fn is_passive(&self) -> bool {
        matches!(self.variant, SkillVariant::Passive { .. })
    }
}

/// A skill as carried by a combatant in battle: a [`SkillSpec`] plus mutable
/// cooldown and level state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSkill {
    pub spec: SkillSpec,
    pub level: u32,
    pub current_cooldown: u32,
}

impl BattleSkill {
    pub fn new(spec: SkillSpec, level: u32) -> Self {
        let level = level.clamp(1, spec.max_level);
        BattleSkill { spec, level, current_cooldown: 0 }
    }

    pub fn is_ready(&self) -> bool {
        self.current_cooldown == 0
    }

    pub fn trigger_cooldown(&mut self) {
        self.current_cooldown = self.spec.cooldown;
    }

    pub fn reduce_cooldown(&mut self) {
        self.current_cooldown = self.current_cooldown.saturating_sub(1);
    }

    /// Damage or heal multiplier including the per-level bonus.
    pub fn effective_multiplier(&self) -> f64 {
        let level_bonus = (self.level - 1) as f64;
        match self.spec.kind {
            SkillKind::Damage => self.spec.damage_multiplier + level_bonus * 0.05,
            SkillKind::Heal => self.spec.heal_multiplier + level_bonus * 0.03,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn damage_spec(cooldown: u32) -> SkillSpec {
        SkillSpec {
            id: "thanh_long_trảm".into(),
            name: "Thanh Long Trảm".into(),
            description: String::new(),
            mana_cost: 50,
            cooldown,
            max_level: 10,
            kind: SkillKind::Damage,
            target: TargetType::SingleEnemy,
            element: Some(Element::Kim),
            damage_multiplier: 1.5,
            heal_multiplier: 0.0,
            buff: HashMap::new(),
            debuff: HashMap::new(),
            aoe_range: 0,
            duration: 0,
            variant: SkillVariant::Active,
        }
    }

    #[test]
    fn cooldown_lifecycle() {
        let mut skill = BattleSkill::new(damage_spec(3), 1);
        assert!(skill.is_ready());
        skill.trigger_cooldown();
        assert_eq!(skill.current_cooldown, 3);
        assert!(!skill.is_ready());
        skill.reduce_cooldown();
        skill.reduce_cooldown();
        skill.reduce_cooldown();
        assert!(skill.is_ready());
        // Reduction clamps at zero
        skill.reduce_cooldown();
        assert_eq!(skill.current_cooldown, 0);
    }

    #[test]
    fn level_is_clamped_to_spec_max() {
        let skill = BattleSkill::new(damage_spec(0), 99);
        assert_eq!(skill.level, 10);
        let skill = BattleSkill::new(damage_spec(0), 0);
        assert_eq!(skill.level, 1);
    }

    #[test]
    fn effective_multiplier_grows_with_level() {
        let l1 = BattleSkill::new(damage_spec(0), 1);
        let l5 = BattleSkill::new(damage_spec(0), 5);
        assert!((l1.effective_multiplier() - 1.5).abs() < 1e-9);
        assert!((l5.effective_multiplier() - 1.7).abs() < 1e-9);
    }
}
