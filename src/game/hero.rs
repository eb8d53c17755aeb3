//! Hero progression: experience curve, ascension, awakening, and power rating.

use serde::{Deserialize, Serialize};

use super::element::Element;
use super::stats::HexagonStats;

pub const MAX_ASCENSION: u32 = 6;
pub const MAX_AWAKENING: u32 = 6;
pub const BASE_MAX_LEVEL: u32 = 20;

/// Exp to go from `level` to `level + 1`. Levels 1-10 use the hand-tuned
/// table; past that the linear formula takes over.
pub fn required_exp(level: u32) -> u64 {
    match level {
        1 => 100,
        2 => 150,
        3 => 200,
        4 => 250,
        5 => 300,
        6 => 400,
        7 => 500,
        8 => 600,
        9 => 700,
        10 => 800,
        l => 100 + l as u64 * 50,
    }
}

/// Level cap: 20 plus 10 per ascension.
pub fn max_level(ascension_level: u32) -> u32 {
    BASE_MAX_LEVEL + 10 * ascension_level
}

/// Level required before the next ascension.
pub fn ascension_requirement(ascension_level: u32) -> u32 {
    const REQUIREMENTS: [u32; 6] = [20, 30, 40, 50, 60, 70];
    REQUIREMENTS.get(ascension_level as usize).copied().unwrap_or(80)
}

/// Per-stat fractional growth applied on level-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub hp: f64,
    pub atk: f64,
    pub def: f64,
    pub spd: f64,
    pub crit: f64,
    pub dex: f64,
}

impl GrowthRates {
    pub const fn flat() -> Self {
        GrowthRates { hp: 0.0, atk: 0.0, def: 0.0, spd: 0.0, crit: 0.0, dex: 0.0 }
    }
}

/// new base = old base + floor(growth * delta) per stat.
pub fn apply_growth(base: &HexagonStats, growth: &GrowthRates, delta_levels: u32) -> HexagonStats {
    let d = delta_levels as f64;
    HexagonStats::new(
        base.hp + (growth.hp * d) as u32,
        base.atk + (growth.atk * d) as u32,
        base.def + (growth.def * d) as u32,
        base.spd + (growth.spd * d) as u32,
        base.crit + (growth.crit * d) as u32,
        base.dex + (growth.dex * d) as u32,
    )
}

/// Battle-ready stats for a hero: template base grown to `level`, boosted 10%
/// per awakening level, plus the total stats of everything equipped.
pub fn compose_stats(
    template_base: &HexagonStats,
    growth: &GrowthRates,
    level: u32,
    awakening_level: u32,
    equipment_stats: &[HexagonStats],
) -> HexagonStats {
    let grown = apply_growth(template_base, growth, level.saturating_sub(1));
    let awakened = grown.scale(1.0 + 0.1 * awakening_level as f64);
    equipment_stats.iter().fold(awakened, |acc, s| acc.add(s))
}

/// power = round(base * (1 + 0.05(L-1)) * (1 + 0.2(stars-1))) + 100*asc + 150*awaken
pub fn power_rating(
    base_stats: &HexagonStats,
    level: u32,
    stars: u32,
    ascension_level: u32,
    awakening_level: u32,
) -> u64 {
    let base = base_stats.total_power() as f64;
    let level_multiplier = 1.0 + 0.05 * (level.max(1) - 1) as f64;
    let star_multiplier = 1.0 + 0.2 * (stars.max(1) - 1) as f64;
    (base * level_multiplier * star_multiplier).round() as u64
        + 100 * ascension_level as u64
        + 150 * awakening_level as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpResult {
    pub leveled_up: bool,
    pub old_level: u32,
    pub new_level: u32,
    pub exp_remaining: u64,
}

/// An owned hero as the progression services see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub player_id: String,
    pub template_id: String,
    pub name: String,
    pub element: Element,
    /// Base rarity, 1-6.
    pub rarity: u32,
    pub level: u32,
    pub exp: u64,
    pub stars: u32,
    pub ascension_level: u32,
    pub awakening_level: u32,
    pub base_stats: HexagonStats,
    pub growth_rates: GrowthRates,
    pub weapon_id: Option<String>,
    pub armor_id: Option<String>,
    pub accessory_id: Option<String>,
    pub relic_id: Option<String>,
    pub mount_id: Option<String>,
    pub is_locked: bool,
    pub is_favorite: bool,
}

impl Hero {
    pub fn max_level(&self) -> u32 {
        max_level(self.ascension_level)
    }

    /// Run the exp-gain loop: consume exp while a level-up is affordable and
    /// the cap allows it. Leftover exp below the cap is kept; exp at the cap
    /// accumulates without leveling.
    pub fn gain_exp(&mut self, amount: u64) -> LevelUpResult {
        let old_level = self.level;
        self.exp += amount;
        let cap = self.max_level();
        while self.level < cap && self.exp >= required_exp(self.level) {
            self.exp -= required_exp(self.level);
            self.level += 1;
        }
        LevelUpResult {
            leveled_up: self.level > old_level,
            old_level,
            new_level: self.level,
            exp_remaining: self.exp,
        }
    }

    pub fn can_ascend(&self) -> bool {
        self.ascension_level < MAX_ASCENSION
            && self.level >= ascension_requirement(self.ascension_level)
    }

    pub fn can_awaken(&self) -> bool {
        self.awakening_level < MAX_AWAKENING
    }

    pub fn power(&self) -> u64 {
        power_rating(
            &self.base_stats,
            self.level,
            self.stars,
            self.ascension_level,
            self.awakening_level,
        )
    }

    pub fn equipped_in(&self, slot: EquipSlot) -> Option<&str> {
        match slot {
            EquipSlot::Weapon => self.weapon_id.as_deref(),
            EquipSlot::Armor => self.armor_id.as_deref(),
            EquipSlot::Accessory => self.accessory_id.as_deref(),
            EquipSlot::Relic => self.relic_id.as_deref(),
        }
    }

    pub fn set_slot(&mut self, slot: EquipSlot, equipment_id: Option<String>) {
        match slot {
            EquipSlot::Weapon => self.weapon_id = equipment_id,
            EquipSlot::Armor => self.armor_id = equipment_id,
            EquipSlot::Accessory => self.accessory_id = equipment_id,
            EquipSlot::Relic => self.relic_id = equipment_id,
        }
    }
}

/// The four equipment slots on a hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory,
    Relic,
}

impl EquipSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Armor => "armor",
            EquipSlot::Accessory => "accessory",
            EquipSlot::Relic => "relic",
        }
    }

    pub fn parse(s: &str) -> Option<EquipSlot> {
        match s {
            "weapon" => Some(EquipSlot::Weapon),
            "armor" => Some(EquipSlot::Armor),
            "accessory" => Some(EquipSlot::Accessory),
            "relic" => Some(EquipSlot::Relic),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero(level: u32, ascension: u32) -> Hero {
        Hero {
            id: "h1".into(),
            player_id: "p1".into(),
            template_id: "quan_vu".into(),
            name: "Quan Vũ".into(),
            element: Element::Kim,
            rarity: 5,
            level,
            exp: 0,
            stars: 1,
            ascension_level: ascension,
            awakening_level: 0,
            base_stats: HexagonStats::new(1000, 120, 80, 95, 15, 10),
            growth_rates: GrowthRates { hp: 50.0, atk: 5.0, def: 3.0, spd: 0.0, crit: 1.0, dex: 1.0 },
            weapon_id: None,
            armor_id: None,
            accessory_id: None,
            relic_id: None,
            mount_id: None,
            is_locked: false,
            is_favorite: false,
        }
    }

    #[test]
    fn exp_table_override_then_formula() {
        assert_eq!(required_exp(1), 100);
        assert_eq!(required_exp(5), 300);
        assert_eq!(required_exp(10), 800);
        assert_eq!(required_exp(11), 650);
        assert_eq!(required_exp(20), 1100);
    }

    #[test]
    fn gain_exp_levels_up_and_keeps_remainder() {
        let mut h = hero(1, 0);
        let result = h.gain_exp(270);
        // 100 for 1->2, 150 for 2->3, 20 left over
        assert!(result.leveled_up);
        assert_eq!(result.old_level, 1);
        assert_eq!(result.new_level, 3);
        assert_eq!(result.exp_remaining, 20);
    }

    #[test]
    fn gain_zero_exp_is_a_noop() {
        let mut h = hero(3, 0);
        h.exp = 50;
        let result = h.gain_exp(0);
        assert!(!result.leveled_up);
        assert_eq!(result.new_level, 3);
        assert_eq!(result.exp_remaining, 50);
    }

    #[test]
    fn level_cap_blocks_level_ups() {
        let mut h = hero(20, 0);
        let result = h.gain_exp(100_000);
        assert!(!result.leveled_up);
        assert_eq!(h.level, 20);
        // Exp banks at the cap
        assert_eq!(h.exp, 100_000);
    }

    #[test]
    fn ascension_raises_cap_and_requires_level() {
        let h = hero(20, 0);
        assert!(h.can_ascend());
        let h = hero(19, 0);
        assert!(!h.can_ascend());
        let h = hero(29, 1);
        assert!(!h.can_ascend());
        let h = hero(30, 1);
        assert!(h.can_ascend());
        let h = hero(80, 6);
        assert!(!h.can_ascend(), "ascension is capped at 6");
        assert_eq!(max_level(6), 80);
    }

    #[test]
    fn growth_is_floored_per_stat() {
        let base = HexagonStats::new(100, 10, 5, 100, 5, 10);
        let growth = GrowthRates { hp: 7.5, atk: 1.2, def: 0.4, spd: 0.0, crit: 0.0, dex: 0.9 };
        let grown = apply_growth(&base, &growth, 3);
        assert_eq!(grown, HexagonStats::new(122, 13, 6, 100, 5, 12));
    }

    #[test]
    fn power_matches_formula() {
        // base 1320, level 1, stars 1: no multipliers
        let h = hero(1, 0);
        assert_eq!(h.power(), 1320);

        let mut h = hero(10, 2);
        h.stars = 3;
        h.awakening_level = 1;
        // 1320 * 1.45 * 1.4 = 2679.6 -> 2680, + 200 + 150
        assert_eq!(h.power(), 3030);
    }

    #[test]
    fn compose_stats_applies_growth_awakening_and_equipment() {
        let base = HexagonStats::new(100, 10, 5, 100, 5, 10);
        let growth = GrowthRates { hp: 10.0, atk: 2.0, def: 1.0, spd: 0.0, crit: 0.0, dex: 0.0 };
        let weapon = HexagonStats::new(0, 50, 0, 10, 5, 5);
        let stats = compose_stats(&base, &growth, 11, 1, &[weapon]);
        // grown: (200, 30, 15, 100, 5, 10); awakened x1.1: (220, 33, 16, 110, 5, 11)
        assert_eq!(stats, HexagonStats::new(220, 83, 16, 120, 10, 16));
    }

    #[test]
    fn slot_accessors_round_trip() {
        let mut h = hero(1, 0);
        assert_eq!(h.equipped_in(EquipSlot::Weapon), None);
        h.set_slot(EquipSlot::Weapon, Some("eq1".into()));
        assert_eq!(h.equipped_in(EquipSlot::Weapon), Some("eq1"));
        h.set_slot(EquipSlot::Weapon, None);
        assert_eq!(h.equipped_in(EquipSlot::Weapon), None);
        assert_eq!(EquipSlot::parse("relic"), Some(EquipSlot::Relic));
        assert_eq!(EquipSlot::parse("boots"), None);
    }
}
