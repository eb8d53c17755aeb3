//! Mounts (Chiến Mã) and dragon companions (Linh Long).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::element::Element;
use super::stats::HexagonStats;
use super::team::BonusKind;

pub const MAX_BOND_LEVEL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountType {
    Horse,
    Dragon,
    Mythical,
}

/// A team-wide bonus entry with explicit units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamBonus {
    pub value: f64,
    pub kind: BonusKind,
}

/// Evolution stage for dragons, gated on mount level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStage {
    pub stage: u32,
    pub name: String,
    pub level_req: u32,
    pub stat_bonus: HexagonStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mount {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub mount_type: MountType,
    /// Rarity 1-5.
    pub rarity: u32,
    pub level: u32,
    pub exp: u64,
    /// Bond with the rider, 1-10.
    pub bond_level: u32,
    pub bond_points: u64,
    pub base_stats: HexagonStats,
    /// Flat or percent bonuses applied team-wide, keyed by bonus tag.
    pub team_bonus: HashMap<String, TeamBonus>,
    /// Dragon-only payload.
    pub dragon: Option<DragonData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DragonData {
    pub element: Element,
    pub evolution_stage: u32,
    pub awakening_level: u32,
    pub evolution_stages: Vec<EvolutionStage>,
}

impl Mount {
    /// Stats scale with level (10% per level) and bond (5% per bond level);
    /// dragons add their current evolution stage bonus on top.
    pub fn stats(&self) -> HexagonStats {
        let level_multiplier = 1.0 + 0.1 * (self.level.max(1) - 1) as f64;
        let bond_multiplier = 1.0 + 0.05 * (self.bond_level.max(1) - 1) as f64;
        let scaled = self.base_stats.scale(level_multiplier * bond_multiplier);
        match self.dragon.as_ref().and_then(|d| d.current_stage()) {
            Some(stage) => scaled.add(&stage.stat_bonus),
            None => scaled,
        }
    }

    /// Gain exp on the shared curve. Returns true when at least one level was
    /// gained.
    pub fn gain_exp(&mut self, amount: u64) -> bool {
        self.exp += amount;
        let mut leveled = false;
        while self.exp >= self.required_exp() {
            self.exp -= self.required_exp();
            self.level += 1;
            leveled = true;
        }
        leveled
    }

    fn required_exp(&self) -> u64 {
        100 + self.level as u64 * 50
    }

    /// Bond points accumulate toward the next bond level; the cost grows with
    /// the level and the level caps at 10.
    pub fn add_bond_points(&mut self, points: u64) -> bool {
        self.bond_points += points;
        let mut leveled = false;
        while self.bond_level < MAX_BOND_LEVEL {
            let required = self.bond_level as u64 * 500;
            if self.bond_points < required {
                break;
            }
            self.bond_points -= required;
            self.bond_level += 1;
            leveled = true;
        }
        if self.bond_level >= MAX_BOND_LEVEL {
            self.bond_level = MAX_BOND_LEVEL;
            self.bond_points = 0;
        }
        leveled
    }

    /// Team-wide bonuses, level-scaled (5% per level), merged with the
    /// dragon's element buff when present.
    pub fn team_bonuses(&self) -> HashMap<String, TeamBonus> {
        let level_multiplier = 1.0 + 0.05 * (self.level.max(1) - 1) as f64;
        let mut out: HashMap<String, TeamBonus> = self
            .team_bonus
            .iter()
            .map(|(tag, bonus)| {
                let value = match bonus.kind {
                    BonusKind::Flat => (bonus.value * level_multiplier).floor(),
                    BonusKind::Percent => bonus.value * level_multiplier,
                };
                (tag.clone(), TeamBonus { value, kind: bonus.kind })
            })
            .collect();
        if let Some(dragon) = &self.dragon {
            for (tag, bonus) in dragon.element_buff() {
                out.insert(tag, bonus);
            }
        }
        out
    }

    pub fn power_rating(&self) -> u64 {
        let rarity_multiplier = 1.0 + 0.3 * (self.rarity.max(1) - 1) as f64;
        (self.stats().total_power() as f64 * rarity_multiplier) as u64
    }
}

impl DragonData {
    pub fn current_stage(&self) -> Option<&EvolutionStage> {
        self.evolution_stages.iter().find(|s| s.stage == self.evolution_stage)
    }

    pub fn next_stage(&self) -> Option<&EvolutionStage> {
        self.evolution_stages.iter().find(|s| s.stage == self.evolution_stage + 1)
    }

    /// Element damage and resistance buffs; magnitude grows with awakening.
    pub fn element_buff(&self) -> HashMap<String, TeamBonus> {
        let base = 0.1 + 0.05 * self.awakening_level as f64;
        let element = self.element.as_str();
        HashMap::from([
            (
                format!("{element}_damage"),
                TeamBonus { value: base, kind: BonusKind::Percent },
            ),
            (
                format!("{element}_resistance"),
                TeamBonus { value: base + 0.05, kind: BonusKind::Percent },
            ),
        ])
    }
}

/// Evolution is gated on the next stage's level requirement.
pub fn can_evolve(mount: &Mount) -> bool {
    let Some(dragon) = &mount.dragon else {
        return false;
    };
    dragon.next_stage().map(|s| mount.level >= s.level_req).unwrap_or(false)
}

pub fn evolve(mount: &mut Mount) -> bool {
    if !can_evolve(mount) {
        return false;
    }
    if let Some(dragon) = &mut mount.dragon {
        dragon.evolution_stage += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horse() -> Mount {
        Mount {
            id: "m1".into(),
            template_id: "xich_tho".into(),
            name: "Xích Thố".into(),
            mount_type: MountType::Horse,
            rarity: 4,
            level: 1,
            exp: 0,
            bond_level: 1,
            bond_points: 0,
            base_stats: HexagonStats::new(100, 20, 10, 40, 0, 10),
            team_bonus: HashMap::from([(
                "spd".to_string(),
                TeamBonus { value: 10.0, kind: BonusKind::Flat },
            )]),
            dragon: None,
        }
    }

    fn dragon() -> Mount {
        let mut m = horse();
        m.name = "Hỏa Long".into();
        m.mount_type = MountType::Dragon;
        m.dragon = Some(DragonData {
            element: Element::Hoa,
            evolution_stage: 0,
            awakening_level: 0,
            evolution_stages: vec![
                EvolutionStage {
                    stage: 0,
                    name: "Hỏa Long Ấu Thể".into(),
                    level_req: 1,
                    stat_bonus: HexagonStats::default(),
                },
                EvolutionStage {
                    stage: 1,
                    name: "Hỏa Long Thành Thể".into(),
                    level_req: 10,
                    stat_bonus: HexagonStats::new(50, 10, 5, 10, 0, 0),
                },
            ],
        });
        m
    }

    #[test]
    fn stats_scale_with_level_and_bond() {
        let mut m = horse();
        m.level = 11; // x2.0
        m.bond_level = 5; // x1.2
        // hp 100 * 2.4 = 240
        assert_eq!(m.stats().hp, 240);
        assert_eq!(m.stats().atk, 48);
    }

    #[test]
    fn bond_levels_cap_at_ten() {
        let mut m = horse();
        assert!(m.add_bond_points(500));
        assert_eq!(m.bond_level, 2);
        m.add_bond_points(1_000_000);
        assert_eq!(m.bond_level, MAX_BOND_LEVEL);
        assert_eq!(m.bond_points, 0);
    }

    #[test]
    fn exp_loop_levels_mount() {
        let mut m = horse();
        assert!(m.gain_exp(150)); // needs 150 at level 1
        assert_eq!(m.level, 2);
        assert_eq!(m.exp, 0);
        assert!(!m.gain_exp(10));
    }

    #[test]
    fn dragon_element_buff_scales_with_awakening() {
        let mut m = dragon();
        let buffs = m.team_bonuses();
        let dmg = buffs.get("hoa_damage").unwrap();
        assert!((dmg.value - 0.1).abs() < 1e-9);
        assert_eq!(dmg.kind, BonusKind::Percent);
        let res = buffs.get("hoa_resistance").unwrap();
        assert!((res.value - 0.15).abs() < 1e-9);

        m.dragon.as_mut().unwrap().awakening_level = 2;
        let buffs = m.team_bonuses();
        assert!((buffs.get("hoa_damage").unwrap().value - 0.2).abs() < 1e-9);
    }

    #[test]
    fn evolution_gated_on_level() {
        let mut m = dragon();
        assert!(!can_evolve(&m));
        m.level = 10;
        assert!(can_evolve(&m));
        assert!(evolve(&mut m));
        assert_eq!(m.dragon.as_ref().unwrap().evolution_stage, 1);
        // Stage bonus now applies to stats
        assert_eq!(m.stats().hp, m.base_stats.scale(1.9).hp + 50);
        // No further stage to evolve into
        assert!(!can_evolve(&m));
    }

    #[test]
    fn flat_team_bonus_scales_and_floors() {
        let mut m = horse();
        m.level = 3; // x1.1
        let buffs = m.team_bonuses();
        assert_eq!(buffs.get("spd").unwrap().value, 11.0);
        assert_eq!(buffs.get("spd").unwrap().kind, BonusKind::Flat);
    }
}
