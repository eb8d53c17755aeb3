//! Equipment: typed gear with rarity-capped enhancement levels.

use serde::{Deserialize, Serialize};

use super::stats::HexagonStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Weapon,
    Armor,
    Accessory,
    Relic,
}

impl EquipmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::Weapon => "weapon",
            EquipmentType::Armor => "armor",
            EquipmentType::Accessory => "accessory",
            EquipmentType::Relic => "relic",
        }
    }

    pub fn parse(s: &str) -> Option<EquipmentType> {
        match s {
            "weapon" => Some(EquipmentType::Weapon),
            "armor" => Some(EquipmentType::Armor),
            "accessory" => Some(EquipmentType::Accessory),
            "relic" => Some(EquipmentType::Relic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    /// Enhancement level cap.
    pub fn max_level(&self) -> u32 {
        match self {
            Rarity::Common => 10,
            Rarity::Rare => 15,
            Rarity::Epic => 20,
            Rarity::Legendary => 25,
            Rarity::Mythic => 30,
        }
    }

    pub fn power_multiplier(&self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Rare => 1.2,
            Rarity::Epic => 1.5,
            Rarity::Legendary => 2.0,
            Rarity::Mythic => 2.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
        }
    }

    pub fn parse(s: &str) -> Option<Rarity> {
        match s {
            "common" => Some(Rarity::Common),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            "mythic" => Some(Rarity::Mythic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnhanceOutcome {
    pub new_level: u32,
    pub stats_gained: HexagonStats,
}

/// An owned piece of equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub player_id: String,
    pub template_id: String,
    pub name: String,
    pub equipment_type: EquipmentType,
    pub rarity: Rarity,
    /// Enhancement level, 1..=rarity cap.
    pub level: u32,
    pub base_stats: HexagonStats,
    /// Accumulated enhancement gains.
    pub bonus_stats: HexagonStats,
    pub set_id: Option<String>,
    pub unique_effect: Option<String>,
    pub required_level: u32,
    pub required_element: Option<super::element::Element>,
    pub equipped_by: Option<String>,
    pub is_locked: bool,
}

impl Equipment {
    pub fn max_level(&self) -> u32 {
        self.rarity.max_level()
    }

    pub fn can_enhance(&self) -> bool {
        self.level < self.max_level()
    }

    /// Raise one enhancement level, adding floor(10% of base) to each bonus
    /// stat. Returns `None` at the rarity cap.
    pub fn enhance(&mut self) -> Option<EnhanceOutcome> {
        if !self.can_enhance() {
            return None;
        }
        self.level += 1;
        let gained = self.base_stats.scale(0.1);
        self.bonus_stats = self.bonus_stats.add(&gained);
        Some(EnhanceOutcome { new_level: self.level, stats_gained: gained })
    }

    pub fn total_stats(&self) -> HexagonStats {
        self.base_stats.add(&self.bonus_stats)
    }

    pub fn power_rating(&self) -> u64 {
        (self.total_stats().total_power() as f64 * self.rarity.power_multiplier()) as u64
    }
}
