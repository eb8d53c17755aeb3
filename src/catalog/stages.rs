//! Story chapters, stages, and the enemy groups they field.

use crate::game::combatant::{Behavior, MythicalTier};
use crate::game::element::Element;
use crate::game::stats::{HexagonStats, Stat};

pub struct ChapterDef {
    pub id: &'static str,
    pub chapter_number: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub is_mythical: bool,
    pub stages: &'static [StageDef],
}

pub struct StageDef {
    pub id: &'static str,
    pub stage_number: u32,
    pub name: &'static str,
    /// 1-10, drives rewards and enemy scaling.
    pub difficulty: u32,
    pub recommended_power: u64,
    pub stamina_cost: u64,
    pub waves: u32,
    pub is_boss_stage: bool,
    pub enemies: &'static [EnemySpec],
}

pub struct EnemySpec {
    pub template_id: &'static str,
    pub name: &'static str,
    pub element: Element,
    pub behavior: Behavior,
    pub difficulty: u8,
    pub stats: HexagonStats,
    pub skills: &'static [&'static str],
    pub exp_reward: u64,
    pub gold_reward: u64,
    /// (item id, probability, quantity)
    pub drops: &'static [(&'static str, f64, u32)],
    pub boss: Option<BossSpec>,
}

pub struct BossSpec {
    pub title: &'static str,
    pub mythical_tier: Option<MythicalTier>,
    pub phases: &'static [PhaseSpec],
}

pub struct PhaseSpec {
    pub phase_number: u32,
    pub hp_threshold: f64,
    pub name: &'static str,
    pub stat_modifiers: &'static [(Stat, f64)],
    pub new_skills: &'static [&'static str],
}

pub const CHAPTERS: &[ChapterDef] = &[
    ChapterDef {
        id: "chapter_1",
        chapter_number: 1,
        title: "Khởi Nghĩa Hoàng Cân",
        description: "Loạn Hoàng Cân nổi dậy, thiên hạ đại loạn.",
        is_mythical: false,
        stages: &[
            StageDef {
                id: "stage_1_1",
                stage_number: 1,
                name: "Hoàng Cân Chi Loạn",
                difficulty: 1,
                recommended_power: 1000,
                stamina_cost: 10,
                waves: 3,
                is_boss_stage: false,
                enemies: &[
                    EnemySpec {
                        template_id: "hoang_can_giao_do",
                        name: "Hoàng Cân Giáo Đồ",
                        element: Element::Tho,
                        behavior: Behavior::Aggressive,
                        difficulty: 1,
                        stats: HexagonStats::new(400, 60, 30, 70, 5, 5),
                        skills: &[],
                        exp_reward: 50,
                        gold_reward: 100,
                        drops: &[("luyen_thach", 0.3, 1)],
                        boss: None,
                    },
                    EnemySpec {
                        template_id: "hoang_can_giao_do",
                        name: "Hoàng Cân Giáo Đồ",
                        element: Element::Tho,
                        behavior: Behavior::Balanced,
                        difficulty: 1,
                        stats: HexagonStats::new(400, 60, 30, 65, 5, 5),
                        skills: &[],
                        exp_reward: 50,
                        gold_reward: 100,
                        drops: &[],
                        boss: None,
                    },
                ],
            },
            StageDef {
                id: "stage_1_2",
                stage_number: 2,
                name: "Tiêu Diệt Phản Quân",
                difficulty: 2,
                recommended_power: 1500,
                stamina_cost: 10,
                waves: 3,
                is_boss_stage: false,
                enemies: &[
                    EnemySpec {
                        template_id: "phan_quan_cung_thu",
                        name: "Phản Quân Cung Thủ",
                        element: Element::Moc,
                        behavior: Behavior::Defensive,
                        difficulty: 2,
                        stats: HexagonStats::new(450, 70, 30, 85, 8, 10),
                        skills: &["dot_kich"],
                        exp_reward: 70,
                        gold_reward: 140,
                        drops: &[("luyen_thach", 0.3, 1)],
                        boss: None,
                    },
                    EnemySpec {
                        template_id: "phan_quan_vo_si",
                        name: "Phản Quân Võ Sĩ",
                        element: Element::Hoa,
                        behavior: Behavior::Aggressive,
                        difficulty: 2,
                        stats: HexagonStats::new(550, 75, 40, 75, 6, 6),
                        skills: &[],
                        exp_reward: 70,
                        gold_reward: 140,
                        drops: &[],
                        boss: None,
                    },
                ],
            },
            StageDef {
                id: "stage_1_3",
                stage_number: 3,
                name: "Đối Đầu Trương Giác",
                difficulty: 3,
                recommended_power: 2000,
                stamina_cost: 15,
                waves: 1,
                is_boss_stage: true,
                enemies: &[EnemySpec {
                    template_id: "truong_giac",
                    name: "Trương Giác",
                    element: Element::Tho,
                    behavior: Behavior::Aggressive,
                    difficulty: 5,
                    stats: HexagonStats::new(2000, 110, 60, 90, 10, 10),
                    skills: &["dia_liet"],
                    exp_reward: 200,
                    gold_reward: 500,
                    drops: &[("thai_binh_yeu_thuat", 0.5, 1)],
                    boss: Some(BossSpec {
                        title: "Đại Hiền Lương Sư",
                        mythical_tier: None,
                        phases: &[
                            PhaseSpec {
                                phase_number: 1,
                                hp_threshold: 1.0,
                                name: "Thái Bình Đạo",
                                stat_modifiers: &[],
                                new_skills: &[],
                            },
                            PhaseSpec {
                                phase_number: 2,
                                hp_threshold: 0.5,
                                name: "Thiên Công Tướng Quân",
                                stat_modifiers: &[(Stat::Atk, 1.5)],
                                new_skills: &["thien_loi"],
                            },
                        ],
                    }),
                }],
            },
        ],
    },
    ChapterDef {
        id: "chapter_2",
        chapter_number: 2,
        title: "Đổng Trác Loạn Kinh",
        description: "Đổng Trác kiểm soát triều đình.",
        is_mythical: false,
        stages: &[
            StageDef {
                id: "stage_2_1",
                stage_number: 1,
                name: "Kinh Thành Hỗn Loạn",
                difficulty: 3,
                recommended_power: 2500,
                stamina_cost: 12,
                waves: 3,
                is_boss_stage: false,
                enemies: &[
                    EnemySpec {
                        template_id: "tay_luong_ky_binh",
                        name: "Tây Lương Kỵ Binh",
                        element: Element::Hoa,
                        behavior: Behavior::Berserker,
                        difficulty: 3,
                        stats: HexagonStats::new(600, 90, 45, 100, 10, 8),
                        skills: &["song_kich"],
                        exp_reward: 100,
                        gold_reward: 200,
                        drops: &[("luyen_thach", 0.4, 1)],
                        boss: None,
                    },
                    EnemySpec {
                        template_id: "cam_quan_vo_su",
                        name: "Cấm Quân Võ Sư",
                        element: Element::Kim,
                        behavior: Behavior::Support,
                        difficulty: 3,
                        stats: HexagonStats::new(650, 80, 55, 80, 8, 8),
                        skills: &["cuong_phong"],
                        exp_reward: 100,
                        gold_reward: 200,
                        drops: &[],
                        boss: None,
                    },
                ],
            },
            StageDef {
                id: "stage_2_2",
                stage_number: 2,
                name: "Hổ Lao Quan",
                difficulty: 4,
                recommended_power: 3200,
                stamina_cost: 12,
                waves: 2,
                is_boss_stage: false,
                enemies: &[EnemySpec {
                    template_id: "ly_nho",
                    name: "Lý Nho",
                    element: Element::Thuy,
                    behavior: Behavior::Defensive,
                    difficulty: 4,
                    stats: HexagonStats::new(800, 100, 50, 95, 12, 12),
                    skills: &["bat_tran_do"],
                    exp_reward: 150,
                    gold_reward: 300,
                    drops: &[("luyen_thach", 0.5, 2)],
                    boss: None,
                }],
            },
        ],
    },
];

pub fn get_chapter(id: &str) -> Option<&'static ChapterDef> {
    CHAPTERS.iter().find(|c| c.id == id)
}

pub fn get_chapter_by_number(number: u32) -> Option<&'static ChapterDef> {
    CHAPTERS.iter().find(|c| c.chapter_number == number)
}

/// Find a stage and its owning chapter.
pub fn get_stage(id: &str) -> Option<(&'static ChapterDef, &'static StageDef)> {
    for chapter in CHAPTERS {
        for stage in chapter.stages {
            if stage.id == id {
                return Some((chapter, stage));
            }
        }
    }
    None
}

/// Rewards derive from stage difficulty, first-clear paying out more.
pub struct StageRewards {
    pub gold: u64,
    pub gems: u64,
    pub exp: u64,
}

pub fn first_clear_rewards(stage: &StageDef) -> StageRewards {
    StageRewards {
        gold: stage.difficulty as u64 * 500,
        gems: stage.difficulty as u64 * 10,
        exp: stage.difficulty as u64 * 100,
    }
}

pub fn repeat_rewards(stage: &StageDef) -> StageRewards {
    StageRewards {
        gold: stage.difficulty as u64 * 100,
        gems: 0,
        exp: stage.difficulty as u64 * 50,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_lookup_finds_owning_chapter() {
        let (chapter, stage) = get_stage("stage_1_3").unwrap();
        assert_eq!(chapter.id, "chapter_1");
        assert!(stage.is_boss_stage);
        assert!(get_stage("stage_9_9").is_none());
    }

    #[test]
    fn boss_stage_carries_phases() {
        let (_, stage) = get_stage("stage_1_3").unwrap();
        let boss = stage.enemies[0].boss.as_ref().unwrap();
        assert_eq!(boss.phases.len(), 2);
        assert_eq!(boss.phases[1].hp_threshold, 0.5);
    }

    #[test]
    fn rewards_scale_with_difficulty() {
        let (_, stage) = get_stage("stage_1_1").unwrap();
        let first = first_clear_rewards(stage);
        assert_eq!(first.gold, 500);
        assert_eq!(first.gems, 10);
        assert_eq!(first.exp, 100);
        let repeat = repeat_rewards(stage);
        assert_eq!(repeat.gold, 100);
        assert_eq!(repeat.gems, 0);
        assert_eq!(repeat.exp, 50);
    }

    #[test]
    fn stage_ids_are_unique_and_numbered_in_order() {
        let mut seen = std::collections::HashSet::new();
        for chapter in CHAPTERS {
            for (i, stage) in chapter.stages.iter().enumerate() {
                assert!(seen.insert(stage.id));
                assert_eq!(stage.stage_number as usize, i + 1);
            }
        }
    }

    #[test]
    fn enemy_skills_exist_in_the_skill_catalog() {
        for chapter in CHAPTERS {
            for stage in chapter.stages {
                for enemy in stage.enemies {
                    for skill in enemy.skills {
                        assert!(crate::catalog::skills::get_skill_spec(skill).is_some());
                    }
                    if let Some(boss) = &enemy.boss {
                        for phase in boss.phases {
                            for skill in phase.new_skills {
                                assert!(crate::catalog::skills::get_skill_spec(skill).is_some());
                            }
                        }
                    }
                }
            }
        }
    }
}
