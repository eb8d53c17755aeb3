//! Hero templates: the recruitable roster with base stats and growth rates.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::game::element::Element;
use crate::game::hero::GrowthRates;
use crate::game::stats::HexagonStats;

pub struct HeroTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub element: Element,
    /// Base rarity 1-6; the gacha pools draw 3-5.
    pub rarity: u32,
    pub base_stats: HexagonStats,
    pub growth: GrowthRates,
    pub skills: &'static [&'static str],
}

pub const HERO_TEMPLATES: &[HeroTemplate] = &[
    // ------------------------------------------------------------------ 5*
    HeroTemplate {
        id: "quan_vu",
        name: "Quan Vũ",
        title: "Võ Thánh",
        element: Element::Kim,
        rarity: 5,
        base_stats: HexagonStats::new(1000, 120, 80, 95, 15, 10),
        growth: GrowthRates { hp: 52.0, atk: 6.5, def: 4.0, spd: 0.5, crit: 0.8, dex: 0.6 },
        skills: &["thanh_long_tram", "nghia_khi", "thanh_long_yen_nguyet"],
    },
    HeroTemplate {
        id: "truong_phi",
        name: "Trương Phi",
        title: "Vạn Nhân Địch",
        element: Element::Hoa,
        rarity: 5,
        base_stats: HexagonStats::new(1150, 110, 90, 85, 12, 8),
        growth: GrowthRates { hp: 60.0, atk: 5.5, def: 4.5, spd: 0.4, crit: 0.6, dex: 0.5 },
        skills: &["xa_mau_loan_vu", "ha_khau_tieng_gam"],
    },
    HeroTemplate {
        id: "trieu_van",
        name: "Triệu Vân",
        title: "Thường Thắng Tướng Quân",
        element: Element::Thuy,
        rarity: 5,
        base_stats: HexagonStats::new(950, 115, 75, 110, 18, 14),
        growth: GrowthRates { hp: 48.0, atk: 6.0, def: 3.5, spd: 0.8, crit: 1.0, dex: 0.8 },
        skills: &["long_dam_thuong", "cuu_chua_a_dau"],
    },
    HeroTemplate {
        id: "luu_bi",
        name: "Lưu Bị",
        title: "Hán Chiêu Liệt Đế",
        element: Element::Moc,
        rarity: 5,
        base_stats: HexagonStats::new(1050, 90, 85, 90, 10, 12),
        growth: GrowthRates { hp: 55.0, atk: 4.5, def: 4.2, spd: 0.5, crit: 0.5, dex: 0.7 },
        skills: &["nhan_duc_ho", "song_co_kiem"],
    },
    HeroTemplate {
        id: "gia_cat_luong",
        name: "Gia Cát Lượng",
        title: "Ngọa Long",
        element: Element::Tho,
        rarity: 5,
        base_stats: HexagonStats::new(880, 130, 65, 100, 20, 16),
        growth: GrowthRates { hp: 44.0, atk: 7.0, def: 3.0, spd: 0.6, crit: 1.2, dex: 1.0 },
        skills: &["bat_tran_do", "hoa_cong"],
    },
    // ------------------------------------------------------------------ 4*
    HeroTemplate {
        id: "truong_liao",
        name: "Trương Liêu",
        title: "Uy Chấn Tiêu Diêu Tân",
        element: Element::Kim,
        rarity: 4,
        base_stats: HexagonStats::new(850, 100, 70, 100, 14, 12),
        growth: GrowthRates { hp: 44.0, atk: 5.0, def: 3.5, spd: 0.6, crit: 0.7, dex: 0.6 },
        skills: &["dot_kich"],
    },
    HeroTemplate {
        id: "xu_chu",
        name: "Hứa Chử",
        title: "Hổ Si",
        element: Element::Tho,
        rarity: 4,
        base_stats: HexagonStats::new(980, 95, 85, 80, 10, 8),
        growth: GrowthRates { hp: 52.0, atk: 4.5, def: 4.5, spd: 0.3, crit: 0.5, dex: 0.4 },
        skills: &["cuong_phong"],
    },
    HeroTemplate {
        id: "dien_vi",
        name: "Điển Vi",
        title: "Cổ Chi Ác Lai",
        element: Element::Hoa,
        rarity: 4,
        base_stats: HexagonStats::new(920, 105, 75, 90, 13, 9),
        growth: GrowthRates { hp: 48.0, atk: 5.2, def: 3.8, spd: 0.4, crit: 0.7, dex: 0.5 },
        skills: &["song_kich"],
    },
    HeroTemplate {
        id: "hoa_huu",
        name: "Hoàng Hựu",
        title: "Lão Tướng",
        element: Element::Moc,
        rarity: 4,
        base_stats: HexagonStats::new(800, 98, 68, 95, 16, 15),
        growth: GrowthRates { hp: 42.0, atk: 4.8, def: 3.2, spd: 0.5, crit: 0.9, dex: 0.8 },
        skills: &["xuyen_duong_tien"],
    },
    HeroTemplate {
        id: "cam_ninh",
        name: "Cam Ninh",
        title: "Cẩm Phàm Tặc",
        element: Element::Thuy,
        rarity: 4,
        base_stats: HexagonStats::new(830, 102, 66, 105, 15, 13),
        growth: GrowthRates { hp: 43.0, atk: 5.0, def: 3.0, spd: 0.7, crit: 0.8, dex: 0.7 },
        skills: &["da_thiet_linh"],
    },
    // ------------------------------------------------------------------ 3*
    HeroTemplate {
        id: "quan_binh",
        name: "Quan Bình",
        title: "",
        element: Element::Kim,
        rarity: 3,
        base_stats: HexagonStats::new(700, 80, 55, 85, 8, 8),
        growth: GrowthRates { hp: 36.0, atk: 4.0, def: 2.8, spd: 0.3, crit: 0.4, dex: 0.4 },
        skills: &["dot_kich"],
    },
    HeroTemplate {
        id: "hoang_can_binh",
        name: "Hoàng Cân Binh",
        title: "",
        element: Element::Tho,
        rarity: 3,
        base_stats: HexagonStats::new(650, 75, 50, 80, 6, 6),
        growth: GrowthRates { hp: 34.0, atk: 3.8, def: 2.5, spd: 0.3, crit: 0.3, dex: 0.3 },
        skills: &[],
    },
    HeroTemplate {
        id: "dan_binh",
        name: "Dân Binh",
        title: "",
        element: Element::Moc,
        rarity: 3,
        base_stats: HexagonStats::new(620, 70, 48, 78, 5, 6),
        growth: GrowthRates { hp: 32.0, atk: 3.5, def: 2.4, spd: 0.2, crit: 0.3, dex: 0.3 },
        skills: &[],
    },
];

static TEMPLATE_INDEX: Lazy<HashMap<&'static str, &'static HeroTemplate>> =
    Lazy::new(|| HERO_TEMPLATES.iter().map(|t| (t.id, t)).collect());

static POOLS_BY_RARITY: Lazy<HashMap<u32, Vec<&'static str>>> = Lazy::new(|| {
    let mut pools: HashMap<u32, Vec<&'static str>> = HashMap::new();
    for template in HERO_TEMPLATES {
        pools.entry(template.rarity).or_default().push(template.id);
    }
    pools
});

pub fn get_hero_template(id: &str) -> Option<&'static HeroTemplate> {
    TEMPLATE_INDEX.get(id).copied()
}

/// Template ids of a rarity, in declaration order. Used by the gacha pools.
pub fn pool_by_rarity(rarity: u32) -> Vec<&'static str> {
    POOLS_BY_RARITY.get(&rarity).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        let t = get_hero_template("quan_vu").unwrap();
        assert_eq!(t.name, "Quan Vũ");
        assert_eq!(t.rarity, 5);
        assert!(get_hero_template("lu_bo").is_none());
    }

    #[test]
    fn pools_cover_gacha_rarities() {
        assert_eq!(pool_by_rarity(3).len(), 3);
        assert_eq!(pool_by_rarity(4).len(), 5);
        assert_eq!(pool_by_rarity(5).len(), 5);
    }

    #[test]
    fn template_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for t in HERO_TEMPLATES {
            assert!(seen.insert(t.id), "duplicate template id {}", t.id);
        }
    }

    #[test]
    fn every_template_skill_exists_in_the_skill_catalog() {
        for t in HERO_TEMPLATES {
            for skill_id in t.skills {
                assert!(
                    crate::catalog::skills::get_skill_spec(skill_id).is_some(),
                    "hero {} references unknown skill {}",
                    t.id,
                    skill_id
                );
            }
        }
    }
}
