//! Skill templates. Static definitions are expanded into owned
//! [`SkillSpec`] values at lookup; callers get fresh copies they may attach
//! to combatants.

use crate::game::element::Element;
use crate::game::skill::{PassiveTrigger, SkillKind, SkillSpec, SkillVariant, TargetType};
use crate::game::stats::Stat;

enum Family {
    Active,
    Passive(PassiveTrigger),
    Ultimate { gauge_cost: u32, animation_id: &'static str },
}

struct SkillTemplate {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    mana_cost: u32,
    cooldown: u32,
    max_level: u32,
    kind: SkillKind,
    target: TargetType,
    element: Option<Element>,
    damage_multiplier: f64,
    heal_multiplier: f64,
    buff: &'static [(Stat, f64)],
    debuff: &'static [(Stat, f64)],
    aoe_range: u8,
    duration: u32,
    family: Family,
}

const SKILL_TEMPLATES: &[SkillTemplate] = &[
    SkillTemplate {
        id: "thanh_long_tram",
        name: "Thanh Long Trảm",
        description: "Chém một đòn chí mạng bằng Thanh Long Yển Nguyệt Đao.",
        mana_cost: 50,
        cooldown: 3,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::SingleEnemy,
        element: Some(Element::Kim),
        damage_multiplier: 1.8,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "xa_mau_loan_vu",
        name: "Xà Mâu Loạn Vũ",
        description: "Quét mâu đánh toàn bộ địch trước mặt.",
        mana_cost: 60,
        cooldown: 4,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::AllEnemies,
        element: Some(Element::Hoa),
        damage_multiplier: 1.2,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "ha_khau_tieng_gam",
        name: "Hà Khẩu Tiếng Gầm",
        description: "Tiếng gầm uy hiếp làm giảm công địch.",
        mana_cost: 40,
        cooldown: 3,
        max_level: 10,
        kind: SkillKind::Debuff,
        target: TargetType::AllEnemies,
        element: None,
        damage_multiplier: 0.0,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[(Stat::Atk, 0.15)],
        aoe_range: 0,
        duration: 2,
        family: Family::Active,
    },
    SkillTemplate {
        id: "long_dam_thuong",
        name: "Long Đảm Thương",
        description: "Một thương xuyên phá, tỉ lệ chí mạng cao.",
        mana_cost: 45,
        cooldown: 3,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::SingleEnemy,
        element: Some(Element::Thuy),
        damage_multiplier: 1.6,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "cuu_chua_a_dau",
        name: "Cứu Chúa Phá Vây",
        description: "Lao vào vòng vây che chắn đồng đội yếu nhất.",
        mana_cost: 50,
        cooldown: 4,
        max_level: 10,
        kind: SkillKind::Buff,
        target: TargetType::SingleAlly,
        element: None,
        damage_multiplier: 0.0,
        heal_multiplier: 0.0,
        buff: &[(Stat::Def, 0.3)],
        debuff: &[],
        aoe_range: 0,
        duration: 2,
        family: Family::Active,
    },
    SkillTemplate {
        id: "nhan_duc_ho",
        name: "Nhân Đức Hộ",
        description: "Lòng nhân đức chữa lành vết thương đồng đội.",
        mana_cost: 40,
        cooldown: 2,
        max_level: 10,
        kind: SkillKind::Heal,
        target: TargetType::SingleAlly,
        element: None,
        damage_multiplier: 0.0,
        heal_multiplier: 1.2,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "song_co_kiem",
        name: "Song Cổ Kiếm",
        description: "Song kiếm liên hoàn.",
        mana_cost: 45,
        cooldown: 3,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::SingleEnemy,
        element: Some(Element::Moc),
        damage_multiplier: 1.5,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "bat_tran_do",
        name: "Bát Trận Đồ",
        description: "Bày trận vây khốn, làm chậm toàn bộ địch.",
        mana_cost: 55,
        cooldown: 4,
        max_level: 10,
        kind: SkillKind::Debuff,
        target: TargetType::AllEnemies,
        element: Some(Element::Tho),
        damage_multiplier: 0.0,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[(Stat::Spd, 0.2), (Stat::Def, 0.1)],
        aoe_range: 0,
        duration: 2,
        family: Family::Active,
    },
    SkillTemplate {
        id: "hoa_cong",
        name: "Hỏa Công",
        description: "Gọi lửa thiêu đốt một vùng.",
        mana_cost: 50,
        cooldown: 3,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::Aoe,
        element: Some(Element::Hoa),
        damage_multiplier: 1.3,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 2,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "dot_kich",
        name: "Đột Kích",
        description: "Đánh nhanh vào sơ hở của địch.",
        mana_cost: 30,
        cooldown: 2,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::SingleEnemy,
        element: None,
        damage_multiplier: 1.3,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "song_kich",
        name: "Song Kích",
        description: "Hai đòn liên tiếp bằng song thiết kích.",
        mana_cost: 35,
        cooldown: 2,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::SingleEnemy,
        element: Some(Element::Hoa),
        damage_multiplier: 1.4,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "xuyen_duong_tien",
        name: "Xuyên Dương Tiễn",
        description: "Bắn xuyên lá dương trăm bước.",
        mana_cost: 35,
        cooldown: 2,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::SingleEnemy,
        element: Some(Element::Moc),
        damage_multiplier: 1.45,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "da_thiet_linh",
        name: "Dạ Thiết Linh",
        description: "Tập kích ban đêm với lục lạc sắt.",
        mana_cost: 40,
        cooldown: 3,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::SingleEnemy,
        element: Some(Element::Thuy),
        damage_multiplier: 1.5,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "cuong_phong",
        name: "Cuồng Phong",
        description: "Gầm thét tăng sức công phá của bản thân.",
        mana_cost: 30,
        cooldown: 3,
        max_level: 10,
        kind: SkillKind::Buff,
        target: TargetType::SelfOnly,
        element: None,
        damage_multiplier: 0.0,
        heal_multiplier: 0.0,
        buff: &[(Stat::Atk, 0.25)],
        debuff: &[],
        aoe_range: 0,
        duration: 2,
        family: Family::Active,
    },
    SkillTemplate {
        id: "nghia_khi",
        name: "Nghĩa Khí",
        description: "Khí chất trung nghĩa nâng cao sức chiến đấu.",
        mana_cost: 0,
        cooldown: 0,
        max_level: 5,
        kind: SkillKind::Buff,
        target: TargetType::SelfOnly,
        element: None,
        damage_multiplier: 0.0,
        heal_multiplier: 0.0,
        buff: &[(Stat::Atk, 0.1)],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Passive(PassiveTrigger::Always),
    },
    SkillTemplate {
        id: "thanh_long_yen_nguyet",
        name: "Thanh Long Yển Nguyệt",
        description: "Tuyệt kỹ trảm toàn quân địch.",
        mana_cost: 80,
        cooldown: 6,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::AllEnemies,
        element: Some(Element::Kim),
        damage_multiplier: 2.5,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Ultimate { gauge_cost: 100, animation_id: "ult_thanh_long" },
    },
    // Boss-only skills
    SkillTemplate {
        id: "dia_liet",
        name: "Địa Liệt",
        description: "Xé toạc mặt đất dưới chân toàn đội.",
        mana_cost: 60,
        cooldown: 4,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::AllEnemies,
        element: Some(Element::Tho),
        damage_multiplier: 1.4,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
    SkillTemplate {
        id: "thien_loi",
        name: "Thiên Lôi",
        description: "Gọi sấm sét đánh xuống một mục tiêu.",
        mana_cost: 50,
        cooldown: 3,
        max_level: 10,
        kind: SkillKind::Damage,
        target: TargetType::SingleEnemy,
        element: None,
        damage_multiplier: 2.0,
        heal_multiplier: 0.0,
        buff: &[],
        debuff: &[],
        aoe_range: 0,
        duration: 0,
        family: Family::Active,
    },
];

fn expand(template: &SkillTemplate) -> SkillSpec {
    let variant = match &template.family {
        Family::Active => SkillVariant::Active,
        Family::Passive(trigger) => SkillVariant::Passive { trigger: *trigger },
        Family::Ultimate { gauge_cost, animation_id } => SkillVariant::Ultimate {
            gauge_cost: *gauge_cost,
            animation_id: animation_id.to_string(),
        },
    };
    // Passives never cost mana nor cooldown, whatever the data says
    let (mana_cost, cooldown) = if matches!(variant, SkillVariant::Passive { .. }) {
        (0, 0)
    } else {
        (template.mana_cost, template.cooldown)
    };
    SkillSpec {
        id: template.id.to_string(),
        name: template.name.to_string(),
        description: template.description.to_string(),
        mana_cost,
        cooldown,
        max_level: template.max_level,
        kind: template.kind,
        target: template.target,
        element: template.element,
        damage_multiplier: template.damage_multiplier,
        heal_multiplier: template.heal_multiplier,
        buff: template.buff.iter().copied().collect(),
        debuff: template.debuff.iter().copied().collect(),
        aoe_range: template.aoe_range,
        duration: template.duration,
        variant,
    }
}

/// Build a fresh spec for a skill id.
pub fn get_skill_spec(id: &str) -> Option<SkillSpec> {
    SKILL_TEMPLATES.iter().find(|t| t.id == id).map(expand)
}

pub fn all_skill_ids() -> Vec<&'static str> {
    SKILL_TEMPLATES.iter().map(|t| t.id).collect()
}
