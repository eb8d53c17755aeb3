//! Hexagonal stats (Lục Giác) shared by heroes, enemies, equipment, and mounts.

use serde::{Deserialize, Serialize};

/// One axis of the stat hexagon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Hp,
    Atk,
    Def,
    Spd,
    Crit,
    Dex,
}

pub const ALL_STATS: [Stat; 6] = [Stat::Hp, Stat::Atk, Stat::Def, Stat::Spd, Stat::Crit, Stat::Dex];

impl Stat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Atk => "atk",
            Stat::Def => "def",
            Stat::Spd => "spd",
            Stat::Crit => "crit",
            Stat::Dex => "dex",
        }
    }

    pub fn parse(s: &str) -> Option<Stat> {
        match s {
            "hp" => Some(Stat::Hp),
            "atk" => Some(Stat::Atk),
            "def" => Some(Stat::Def),
            "spd" => Some(Stat::Spd),
            "crit" => Some(Stat::Crit),
            "dex" => Some(Stat::Dex),
            _ => None,
        }
    }
}

/// Immutable six-axis stat record.
///
/// Serialized with the uppercase keys the game data format uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HexagonStats {
    #[serde(rename = "HP")]
    pub hp: u32,
    #[serde(rename = "ATK")]
    pub atk: u32,
    #[serde(rename = "DEF")]
    pub def: u32,
    #[serde(rename = "SPD")]
    pub spd: u32,
    #[serde(rename = "CRIT")]
    pub crit: u32,
    #[serde(rename = "DEX")]
    pub dex: u32,
}

impl HexagonStats {
    pub const fn new(hp: u32, atk: u32, def: u32, spd: u32, crit: u32, dex: u32) -> Self {
        Self { hp, atk, def, spd, crit, dex }
    }

    /// Baseline stats for a freshly created character.
    pub const fn baseline() -> Self {
        Self::new(100, 10, 5, 100, 5, 10)
    }

    /// Sum of all six axes.
    pub fn total_power(&self) -> u32 {
        self.hp + self.atk + self.def + self.spd + self.crit + self.dex
    }

    /// Componentwise sum.
    pub fn add(&self, other: &HexagonStats) -> HexagonStats {
        HexagonStats::new(
            self.hp + other.hp,
            self.atk + other.atk,
            self.def + other.def,
            self.spd + other.spd,
            self.crit + other.crit,
            self.dex + other.dex,
        )
    }

    /// Scalar multiply, truncating each axis to an integer.
    pub fn scale(&self, factor: f64) -> HexagonStats {
        HexagonStats::new(
            (self.hp as f64 * factor) as u32,
            (self.atk as f64 * factor) as u32,
            (self.def as f64 * factor) as u32,
            (self.spd as f64 * factor) as u32,
            (self.crit as f64 * factor) as u32,
            (self.dex as f64 * factor) as u32,
        )
    }

    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spd => self.spd,
            Stat::Crit => self.crit,
            Stat::Dex => self.dex,
        }
    }

    pub fn with(&self, stat: Stat, value: u32) -> HexagonStats {
        let mut out = *self;
        match stat {
            Stat::Hp => out.hp = value,
            Stat::Atk => out.atk = value,
            Stat::Def => out.def = value,
            Stat::Spd => out.spd = value,
            Stat::Crit => out.crit = value,
            Stat::Dex => out.dex = value,
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_power_sums_all_axes() {
        let s = HexagonStats::new(100, 20, 10, 95, 5, 12);
        assert_eq!(s.total_power(), 242);
    }

    #[test]
    fn add_is_componentwise() {
        let a = HexagonStats::new(10, 1, 2, 3, 4, 5);
        let b = HexagonStats::new(1, 1, 1, 1, 1, 1);
        assert_eq!(a.add(&b), HexagonStats::new(11, 2, 3, 4, 5, 6));
    }

    #[test]
    fn scale_truncates() {
        let s = HexagonStats::new(10, 5, 3, 7, 1, 9);
        let scaled = s.scale(1.5);
        assert_eq!(scaled, HexagonStats::new(15, 7, 4, 10, 1, 13));
    }

    #[test]
    fn serde_round_trip_with_uppercase_keys() {
        let s = HexagonStats::new(1000, 120, 80, 95, 15, 10);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"HP\":1000"));
        assert!(json.contains("\"ATK\":120"));
        let back: HexagonStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn get_and_with_cover_every_axis() {
        let s = HexagonStats::new(1, 2, 3, 4, 5, 6);
        for (stat, expected) in ALL_STATS.iter().zip([1, 2, 3, 4, 5, 6]) {
            assert_eq!(s.get(*stat), expected);
            assert_eq!(s.with(*stat, 99).get(*stat), 99);
        }
    }
}
