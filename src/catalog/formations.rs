//! Formation catalog. Definitions expand into owned [`Formation`] values.

use crate::game::stats::Stat;
use crate::game::team::{BonusKind, Formation, FormationBonus};

struct FormationDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    required_elements: usize,
    required_heroes: &'static [&'static str],
    min_members: usize,
    /// (stat or None for "all", value, kind)
    bonuses: &'static [(Option<Stat>, f64, BonusKind)],
}

const FORMATIONS: &[FormationDef] = &[
    FormationDef {
        id: "ngu_hanh_tran",
        name: "Ngũ Hành Trận",
        description: "Đủ năm hệ Ngũ Hành cùng bày trận.",
        required_elements: 5,
        required_heroes: &[],
        min_members: 5,
        bonuses: &[(None, 5.0, BonusKind::Percent)],
    },
    FormationDef {
        id: "long_dang_ho_khieu",
        name: "Long Đằng Hổ Khiếu",
        description: "Trận công kích cho ba vũ tướng.",
        required_elements: 0,
        required_heroes: &[],
        min_members: 3,
        bonuses: &[
            (Some(Stat::Atk), 15.0, BonusKind::Percent),
            (Some(Stat::Spd), 10.0, BonusKind::Percent),
        ],
    },
    FormationDef {
        id: "dao_vien_ket_nghia",
        name: "Đào Viên Kết Nghĩa",
        description: "Ba anh em kết nghĩa vườn đào cùng ra trận.",
        required_elements: 0,
        required_heroes: &["luu_bi", "quan_vu", "truong_phi"],
        min_members: 3,
        bonuses: &[(None, 10.0, BonusKind::Percent)],
    },
];

fn expand(def: &FormationDef) -> Formation {
    Formation {
        id: def.id.to_string(),
        name: def.name.to_string(),
        description: def.description.to_string(),
        required_elements: def.required_elements,
        required_heroes: def.required_heroes.iter().map(|s| s.to_string()).collect(),
        min_members: def.min_members,
        bonuses: def
            .bonuses
            .iter()
            .map(|(stat, value, kind)| FormationBonus { stat: *stat, value: *value, kind: *kind })
            .collect(),
    }
}

pub fn get_formation(id: &str) -> Option<Formation> {
    FORMATIONS.iter().find(|f| f.id == id).map(expand)
}

pub fn all_formations() -> Vec<Formation> {
    FORMATIONS.iter().map(expand).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_expands_definition() {
        let f = get_formation("ngu_hanh_tran").unwrap();
        assert_eq!(f.required_elements, 5);
        assert_eq!(f.min_members, 5);
        assert!((f.all_percent_bonus() - 5.0).abs() < 1e-9);
        assert!(get_formation("bat_quai").is_none());
    }

    #[test]
    fn hero_requirements_reference_real_templates() {
        for f in all_formations() {
            for hero in &f.required_heroes {
                assert!(crate::catalog::heroes::get_hero_template(hero).is_some());
            }
        }
    }

    #[test]
    fn all_formations_have_unique_ids() {
        let all = all_formations();
        let ids: std::collections::HashSet<_> = all.iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids.len(), all.len());
    }
}
