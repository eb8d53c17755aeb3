//! Equipment templates and set definitions.

use crate::game::element::Element;
use crate::game::equipment::{EquipmentType, Rarity};
use crate::game::stats::{HexagonStats, Stat};

pub struct EquipmentTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub equipment_type: EquipmentType,
    pub rarity: Rarity,
    pub base_stats: HexagonStats,
    pub set_id: Option<&'static str>,
    pub unique_effect: Option<&'static str>,
    pub required_level: u32,
    pub required_element: Option<Element>,
    /// Gold per enhancement level is level * this factor.
    pub enhance_cost_per_level: u64,
}

pub struct EquipmentSet {
    pub id: &'static str,
    pub name: &'static str,
    /// (pieces required, stat, percent bonus)
    pub bonuses: &'static [(u32, Stat, f64)],
}

pub const EQUIPMENT_TEMPLATES: &[EquipmentTemplate] = &[
    EquipmentTemplate {
        id: "thiet_kiem",
        name: "Thiết Kiếm",
        equipment_type: EquipmentType::Weapon,
        rarity: Rarity::Common,
        base_stats: HexagonStats::new(0, 25, 0, 0, 2, 2),
        set_id: None,
        unique_effect: None,
        required_level: 1,
        required_element: None,
        enhance_cost_per_level: 100,
    },
    EquipmentTemplate {
        id: "thanh_long_dao",
        name: "Thanh Long Yển Nguyệt Đao",
        equipment_type: EquipmentType::Weapon,
        rarity: Rarity::Legendary,
        base_stats: HexagonStats::new(0, 80, 0, 10, 12, 5),
        set_id: Some("chien_than"),
        unique_effect: Some("kim_damage_up"),
        required_level: 30,
        required_element: Some(Element::Kim),
        enhance_cost_per_level: 100,
    },
    EquipmentTemplate {
        id: "bat_xa_mau",
        name: "Bát Xà Mâu",
        equipment_type: EquipmentType::Weapon,
        rarity: Rarity::Epic,
        base_stats: HexagonStats::new(0, 60, 0, 5, 8, 4),
        set_id: None,
        unique_effect: None,
        required_level: 20,
        required_element: None,
        enhance_cost_per_level: 100,
    },
    EquipmentTemplate {
        id: "da_giap",
        name: "Da Giáp",
        equipment_type: EquipmentType::Armor,
        rarity: Rarity::Common,
        base_stats: HexagonStats::new(80, 0, 20, 0, 0, 0),
        set_id: None,
        unique_effect: None,
        required_level: 1,
        required_element: None,
        enhance_cost_per_level: 100,
    },
    EquipmentTemplate {
        id: "minh_quang_khai",
        name: "Minh Quang Khải",
        equipment_type: EquipmentType::Armor,
        rarity: Rarity::Legendary,
        base_stats: HexagonStats::new(300, 0, 70, 0, 0, 5),
        set_id: Some("chien_than"),
        unique_effect: None,
        required_level: 30,
        required_element: None,
        enhance_cost_per_level: 100,
    },
    EquipmentTemplate {
        id: "ngoc_boi",
        name: "Ngọc Bội",
        equipment_type: EquipmentType::Accessory,
        rarity: Rarity::Rare,
        base_stats: HexagonStats::new(40, 5, 5, 5, 3, 3),
        set_id: None,
        unique_effect: None,
        required_level: 10,
        required_element: None,
        enhance_cost_per_level: 100,
    },
    EquipmentTemplate {
        id: "ho_phu",
        name: "Hổ Phù",
        equipment_type: EquipmentType::Relic,
        rarity: Rarity::Epic,
        base_stats: HexagonStats::new(60, 10, 10, 0, 5, 5),
        set_id: None,
        unique_effect: Some("rally"),
        required_level: 15,
        required_element: None,
        enhance_cost_per_level: 100,
    },
    EquipmentTemplate {
        id: "ngu_hanh_an",
        name: "Ngũ Hành Ấn",
        equipment_type: EquipmentType::Relic,
        rarity: Rarity::Mythic,
        base_stats: HexagonStats::new(100, 20, 20, 10, 8, 8),
        set_id: None,
        unique_effect: Some("element_mastery"),
        required_level: 50,
        required_element: None,
        enhance_cost_per_level: 100,
    },
];

pub const EQUIPMENT_SETS: &[EquipmentSet] = &[EquipmentSet {
    id: "chien_than",
    name: "Chiến Thần",
    bonuses: &[(2, Stat::Atk, 10.0)],
}];

pub fn get_equipment_template(id: &str) -> Option<&'static EquipmentTemplate> {
    EQUIPMENT_TEMPLATES.iter().find(|t| t.id == id)
}

pub fn get_equipment_set(id: &str) -> Option<&'static EquipmentSet> {
    EQUIPMENT_SETS.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        let t = get_equipment_template("thanh_long_dao").unwrap();
        assert_eq!(t.rarity, Rarity::Legendary);
        assert_eq!(t.required_element, Some(Element::Kim));
        assert!(get_equipment_template("excalibur").is_none());
    }

    #[test]
    fn referenced_sets_exist() {
        for t in EQUIPMENT_TEMPLATES {
            if let Some(set_id) = t.set_id {
                assert!(get_equipment_set(set_id).is_some(), "{} references unknown set", t.id);
            }
        }
    }

    #[test]
    fn template_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for t in EQUIPMENT_TEMPLATES {
            assert!(seen.insert(t.id));
        }
    }
}
