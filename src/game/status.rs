//! Status effects: buffs, debuffs, damage/heal over time, crowd control, shields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::stats::Stat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffectKind {
    Buff,
    Debuff,
    Dot,
    Hot,
    CrowdControl,
    Shield,
}

/// An effect currently applied to a combatant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffect {
    pub id: String,
    pub name: String,
    pub kind: StatusEffectKind,
    /// Remaining turns; decremented once per turn-start tick.
    pub duration: u32,
    /// Fractional stat modifiers, e.g. atk -> 0.2 for +20%.
    #[serde(default)]
    pub stat_modifiers: HashMap<Stat, f64>,
    #[serde(default)]
    pub damage_per_turn: u32,
    #[serde(default)]
    pub heal_per_turn: u32,
    #[serde(default)]
    pub prevents_action: bool,
    /// Remaining absorption for shields; drained by incoming damage.
    #[serde(default)]
    pub shield_amount: u32,
    #[serde(default)]
    pub is_stackable: bool,
    #[serde(default = "one")]
    pub max_stacks: u32,
    #[serde(default = "one")]
    pub current_stacks: u32,
    #[serde(default)]
    pub source_id: Option<String>,
}

fn one() -> u32 {
    1
}

impl StatusEffect {
    pub fn new(id: &str, name: &str, kind: StatusEffectKind, duration: u32) -> Self {
        StatusEffect {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            duration,
            stat_modifiers: HashMap::new(),
            damage_per_turn: 0,
            heal_per_turn: 0,
            prevents_action: false,
            shield_amount: 0,
            is_stackable: false,
            max_stacks: 1,
            current_stacks: 1,
            source_id: None,
        }
    }

    pub fn reduce_duration(&mut self) {
        self.duration = self.duration.saturating_sub(1);
    }

    pub fn is_expired(&self) -> bool {
        self.duration == 0
    }

    pub fn is_positive(&self) -> bool {
        matches!(
            self.kind,
            StatusEffectKind::Buff | StatusEffectKind::Hot | StatusEffectKind::Shield
        )
    }

    /// Add a stack if allowed. Returns true when the stack count changed.
    pub fn add_stack(&mut self) -> bool {
        if !self.is_stackable || self.current_stacks >= self.max_stacks {
            return false;
        }
        self.current_stacks += 1;
        true
    }

    pub fn refresh(&mut self, duration: u32) {
        self.duration = duration;
    }

    /// DOT damage this tick, scaled by stacks.
    pub fn tick_damage(&self) -> u32 {
        if self.kind != StatusEffectKind::Dot {
            return 0;
        }
        self.damage_per_turn * self.current_stacks
    }

    /// HOT healing this tick, scaled by stacks.
    pub fn tick_heal(&self) -> u32 {
        if self.kind != StatusEffectKind::Hot {
            return 0;
        }
        self.heal_per_turn * self.current_stacks
    }

    /// Modifier for a stat, scaled by stacks when stackable.
    pub fn modifier_for(&self, stat: Stat) -> f64 {
        let base = self.stat_modifiers.get(&stat).copied().unwrap_or(0.0);
        if self.is_stackable {
            base * self.current_stacks as f64
        } else {
            base
        }
    }

    /// Absorb incoming damage into the shield. Returns the amount absorbed.
    pub fn absorb(&mut self, damage: u32) -> u32 {
        if self.kind != StatusEffectKind::Shield {
            return 0;
        }
        let absorbed = self.shield_amount.min(damage);
        self.shield_amount -= absorbed;
        absorbed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(damage: u32, stacks: u32) -> StatusEffect {
        let mut e = StatusEffect::new("poison", "Độc", StatusEffectKind::Dot, 3);
        e.damage_per_turn = damage;
        e.is_stackable = true;
        e.max_stacks = 5;
        e.current_stacks = stacks;
        e
    }

    #[test]
    fn dot_tick_scales_with_stacks() {
        assert_eq!(dot(10, 1).tick_damage(), 10);
        assert_eq!(dot(10, 3).tick_damage(), 30);
        // HOT accessor on a DOT is zero and vice versa
        assert_eq!(dot(10, 3).tick_heal(), 0);
    }

    #[test]
    fn duration_clamps_at_zero() {
        let mut e = StatusEffect::new("stun", "Choáng", StatusEffectKind::CrowdControl, 1);
        e.reduce_duration();
        assert!(e.is_expired());
        e.reduce_duration();
        assert_eq!(e.duration, 0);
    }

    #[test]
    fn stacking_respects_max() {
        let mut e = dot(5, 4);
        assert!(e.add_stack());
        assert_eq!(e.current_stacks, 5);
        assert!(!e.add_stack());
        assert_eq!(e.current_stacks, 5);
    }

    #[test]
    fn non_stackable_never_stacks() {
        let mut e = StatusEffect::new("war_cry", "Chiến Hống", StatusEffectKind::Buff, 2);
        assert!(!e.add_stack());
        assert_eq!(e.current_stacks, 1);
    }

    #[test]
    fn shield_absorbs_up_to_its_amount() {
        let mut e = StatusEffect::new("barrier", "Hộ Thuẫn", StatusEffectKind::Shield, 2);
        e.shield_amount = 50;
        assert_eq!(e.absorb(30), 30);
        assert_eq!(e.shield_amount, 20);
        assert_eq!(e.absorb(100), 20);
        assert_eq!(e.shield_amount, 0);
        assert_eq!(e.absorb(10), 0);
    }

    #[test]
    fn stackable_modifier_scales() {
        let mut e = StatusEffect::new("fury", "Cuồng Nộ", StatusEffectKind::Buff, 2);
        e.stat_modifiers.insert(Stat::Atk, 0.1);
        e.is_stackable = true;
        e.max_stacks = 3;
        e.current_stacks = 3;
        assert!((e.modifier_for(Stat::Atk) - 0.3).abs() < f64::EPSILON);
        assert_eq!(e.modifier_for(Stat::Def), 0.0);
    }
}
