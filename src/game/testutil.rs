//! Shared combatant builders for unit tests.

use super::combatant::{Behavior, Combatant, CombatantKind, EnemyData};
use super::element::Element;
use super::grid::GridPosition;
use super::stats::HexagonStats;

pub(crate) fn hero(id: &str, spd: u32) -> Combatant {
    Combatant::new(
        id,
        id,
        Element::Kim,
        GridPosition::new(0, 0).unwrap(),
        HexagonStats::new(500, 100, 40, spd, 0, 10),
        CombatantKind::Hero { template_id: format!("tpl_{id}"), hero_id: format!("row_{id}") },
    )
}

pub(crate) fn enemy(id: &str, spd: u32) -> Combatant {
    Combatant::new(
        id,
        id,
        Element::Thuy,
        GridPosition::new(1, 1).unwrap(),
        HexagonStats::new(300, 80, 30, spd, 0, 10),
        CombatantKind::Enemy(EnemyData {
            template_id: format!("tpl_{id}"),
            behavior: Behavior::Balanced,
            difficulty: 1,
            exp_reward: 50,
            gold_reward: 100,
            drop_table: Vec::new(),
        }),
    )
}
